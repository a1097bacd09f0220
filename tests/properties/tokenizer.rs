//! Property tests for the tokenizer.

use proptest::prelude::*;

use canterbury::token::Literal;
use canterbury::{tokenize, TokenType};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Arbitrary text either tokenizes or reports errors, never panics.
    #[test]
    fn property_tokenize_never_panics(src in any::<String>()) {
        let _ = tokenize(&src);
    }

    /// PROPERTY: Successful output always ends with exactly one EOF token.
    #[test]
    fn property_single_trailing_eof(src in "[a-z0-9 :=;\\[\\],+*/<>\n-]{0,64}") {
        if let Ok(tokens) = tokenize(&src) {
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenType::Eof));
            let eofs = tokens.iter().filter(|t| t.kind == TokenType::Eof).count();
            prop_assert_eq!(eofs, 1);
        }
    }

    /// PROPERTY: Integer literals keep their value in decimal, binary and hex.
    #[test]
    fn property_integer_literals_round_trip(n in 0u32..=u32::MAX) {
        for src in [n.to_string(), format!("0b{:b}", n), format!("0x{:X}", n)] {
            let tokens = tokenize(&src).unwrap();
            prop_assert_eq!(tokens.len(), 2);
            prop_assert_eq!(tokens[0].kind, TokenType::Num);
            prop_assert_eq!(&tokens[0].lexeme, &src);
            prop_assert_eq!(tokens[0].literal.clone(), Some(Literal::Num(f64::from(n))));
        }
    }

    /// PROPERTY: Line numbers never decrease and the EOF line counts every newline.
    #[test]
    fn property_lines_are_monotonic(lines in proptest::collection::vec("[a-z]{1,6};", 1..12)) {
        let src = lines.join("\n");
        let tokens = tokenize(&src).unwrap();
        prop_assert!(tokens.windows(2).all(|w| w[0].line <= w[1].line));
        prop_assert_eq!(tokens.last().unwrap().line, lines.len());
    }
}
