//! Whole programs run through the library, checked by what they print.

mod common;

use canterbury::InterpreterOptions;
use common::{error_of, output_of, run_program, run_program_with};

#[test]
fn test_print_values() {
    let out = output_of(
        r#"
        print[1];
        print[2.5];
        print['text'];
        print[true];
        print[null];
        print[0x10 + 0b11];
        "#,
    );
    assert_eq!(out, "1\n2.5\ntext\ntrue\nnull\n19\n");
}

#[test]
fn test_fizzbuzz() {
    let out = output_of(
        r#"
        # classic, with nested ifs since there is no modulo operator
        mod := func [a, b] [ return a - b * Math floor[a / b]; ];
        import Math []
        for [i := 1, i <= 15, i := i + 1] [
            if [mod[i, 15] = 0] print['FizzBuzz'];
            elif [mod[i, 3] = 0] print['Fizz'];
            elif [mod[i, 5] = 0] print['Buzz'];
            else print[i];
        ]
        "#,
    );
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[2], "Fizz");
    assert_eq!(lines[4], "Buzz");
    assert_eq!(lines[14], "FizzBuzz");
    assert_eq!(lines[13], "14");
}

#[test]
fn test_recursive_fibonacci() {
    let out = output_of(
        r#"
        fib := func [n] [
            if [n < 2] return n;
            return fib[n - 1] + fib[n - 2];
        ];
        for [i := 0, i < 10, i := i + 1] [ print[fib[i]]; ]
        "#,
    );
    assert_eq!(out, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn test_higher_order_functions() {
    let out = output_of(
        r#"
        twice := func [f] [ return func [x] [ return f[f[x]]; ]; ];
        add3 := λ [x] [ x + 3; ];
        print[twice[add3][10]];
        compose := lambda [f, g] [ return func [x] [ return f[g[x]]; ]; ];
        print[compose[add3, func [x] [ x * 2; ]][5]];
        "#,
    );
    assert_eq!(out, "16\n13\n");
}

#[test]
fn test_struct_methods_and_state() {
    let out = output_of(
        r#"
        Account := struct [owner, balance] [
            deposit := func [amount] [
                self balance := self balance + amount;
                return self;
            ];
            describe := func [] [ return owner + ': ' + 'ok'; ];
        ];
        acct := Account['ada', 10];
        acct deposit[5] deposit[7];
        print[acct balance];
        print[acct describe[]];
        print[acct is Account];
        print[acct];
        "#,
    );
    assert_eq!(
        out,
        "22\nada: ok\ntrue\ninstance of <struct [owner, balance]>\n"
    );
}

#[test]
fn test_struct_fields_are_per_instance() {
    let out = output_of(
        r#"
        Cell := struct [v] [ set := func [n] [ self v := n; ]; ];
        a := Cell[1];
        b := Cell[2];
        a set[100];
        print[a v];
        print[b v];
        "#,
    );
    assert_eq!(out, "100\n2\n");
}

#[test]
fn test_match_dispatch() {
    let out = output_of(
        r#"
        name := func [code] [
            match [code] against [
                [200 -> return 'ok';]
                [404 -> return 'not found';]
                [_ -> return 'unknown';]
            ]
        ];
        print[name[200]];
        print[name[404]];
        print[name[500]];
        "#,
    );
    assert_eq!(out, "ok\nnot found\nunknown\n");
}

#[test]
fn test_while_with_bitwise() {
    let out = output_of(
        r#"
        import Math [floor]
        n := 0b1011;
        bits := 0;
        while [n <> 0] [
            if [n & 1 = 1] bits := bits + 1;
            n := floor[n / 2];
        ]
        print[bits];
        "#,
    );
    assert_eq!(out, "3\n");
}

#[test]
fn test_stdlib_modules() {
    let out = output_of(
        r#"
        import Math [sqrt, pow, abs, max, min, pi]
        print[sqrt[81]];
        print[pow[2, 8]];
        print[abs[-4]];
        print[max[3, 9] - min[3, 9]];
        print[pi > 3.14 and pi < 3.15];
        import Time []
        print[Time clock[] > 0];
        "#,
    );
    assert_eq!(out, "9\n256\n4\n6\ntrue\ntrue\n");
}

#[test]
fn test_io_input_reads_lines() {
    let out = run_program_with(
        "import IO [input, print] print['hello ' + input[]]; print[input[]]; print[input[]];",
        InterpreterOptions::default(),
        "world\nagain\n",
    )
    .unwrap();
    assert_eq!(out, "hello world\nagain\nnull\n");
}

#[test]
fn test_output_before_runtime_error_is_kept() {
    let (out, err) = run_program("print['before'];\nprint[missing];\nprint['after'];").unwrap_err();
    assert_eq!(out, "before\n");
    assert_eq!(err.to_string(), "Undefined variable 'missing'.\n[line 2]");
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn test_syntax_errors_stop_everything() {
    let (out, err) = run_program("print['never'];\nprint[;\nx := ;").unwrap_err();
    assert_eq!(out, "");
    assert_eq!(
        err.to_string(),
        "[line 2] Error at ';': Expect expression.\n[line 3] Error at ';': Expect expression."
    );
}

#[test]
fn test_tokenizer_errors() {
    let (_, err) = run_program("x := 'unterminated;").unwrap_err();
    assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");
    assert_eq!(err.exit_code(), 65);
}

#[test]
fn test_runtime_error_messages() {
    assert_eq!(
        error_of("'a' - 1;"),
        "Operands must be numbers.\n[line 1]"
    );
    assert_eq!(
        error_of("f := func [a, b] [ a; ];\nf[1];"),
        "Expected 2 arguments but got 1.\n[line 2]"
    );
    assert_eq!(
        error_of("true[];"),
        "Can only call functions and structs.\n[line 1]"
    );
}

#[test]
fn test_call_depth_limit() {
    let options = InterpreterOptions {
        max_call_depth: 50,
        ..InterpreterOptions::default()
    };
    let (_, err) = run_program_with(
        "down := func [n] [ return down[n + 1]; ];\ndown[0];",
        options,
        "",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Stack overflow.\n[line 1]");
}
