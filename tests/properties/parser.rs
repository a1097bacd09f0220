//! Property tests for the parser and interpreter pipeline.

use proptest::prelude::*;

use canterbury::{parse, tokenize, Interpreter, InterpreterOptions};

fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "x", "y", ":=", ";", "[", "]", ",", "1", "'s'", "+", "-", "*", "/", "=", "<>", "<",
        "and", "or", "!", "func", "struct", "if", "elif", "else", "while", "for", "match",
        "against", "->", "_", "return", "import", "Math", "self", "is", "null", "true",
    ])
}

fn arithmetic() -> impl Strategy<Value = (String, f64)> {
    let leaf = (0u8..50).prop_map(|n| (n.to_string(), f64::from(n)));
    leaf.prop_recursive(4, 16, 2, |inner| {
        (inner.clone(), prop::sample::select(vec!['+', '-', '*']), inner).prop_map(
            |((ls, lv), op, (rs, rv))| {
                let value = match op {
                    '+' => lv + rv,
                    '-' => lv - rv,
                    _ => lv * rv,
                };
                (format!("[{} {} {}]", ls, op, rs), value)
            },
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any token soup parses or reports syntax errors, never panics.
    #[test]
    fn property_parse_never_panics(parts in proptest::collection::vec(fragment(), 0..40)) {
        let src = parts.join(" ");
        if let Ok(tokens) = tokenize(&src) {
            let _ = parse(tokens);
        }
    }

    /// PROPERTY: Every reported syntax error points at a line that exists.
    #[test]
    fn property_error_lines_in_range(parts in proptest::collection::vec(fragment(), 1..30)) {
        let src = parts.join("\n");
        if let Ok(tokens) = tokenize(&src) {
            if let Err(errors) = parse(tokens) {
                prop_assert!(!errors.is_empty());
                for error in errors {
                    prop_assert!(error.line >= 1 && error.line <= parts.len());
                }
            }
        }
    }

    /// PROPERTY: Programs that parse run to a value or a runtime error, never a panic.
    #[test]
    fn property_interpret_never_panics(parts in proptest::collection::vec(fragment(), 0..30)) {
        let src = parts.join(" ");
        let Ok(tokens) = tokenize(&src) else { return Ok(()); };
        let Ok(stmts) = parse(tokens) else { return Ok(()); };
        let options = InterpreterOptions { max_call_depth: 16, ..InterpreterOptions::default() };
        let mut interpreter = Interpreter::new(options).with_output(std::io::sink());
        // `while [true]` soups could spin; only run loop-free programs
        if !src.contains("while") && !src.contains("for") {
            let _ = interpreter.interpret(&stmts);
        }
    }

    /// PROPERTY: Integer arithmetic evaluates like f64 arithmetic.
    #[test]
    fn property_arithmetic_matches_f64((src, expected) in arithmetic()) {
        let tokens = tokenize(&format!("result := {};", src)).unwrap();
        let stmts = parse(tokens).unwrap();
        let value = Interpreter::default()
            .with_output(std::io::sink())
            .interpret(&stmts)
            .unwrap();
        prop_assert_eq!(value.to_string(), expected.to_string());
    }
}
