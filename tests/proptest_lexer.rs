//! Property-based checks for literal and identifier lexing.

use proptest::prelude::*;
use star::lexer::{is_keyword, Lexer, TokenKind, MAX_INT_VALUE};

proptest! {
    #[test]
    fn integer_literals_in_range_lex_exactly(v in 0u64..=MAX_INT_VALUE) {
        let tokens = Lexer::new(v.to_string()).scan_tokens().expect("tokenize");
        prop_assert_eq!(tokens[0].kind, TokenKind::IntConst);
        prop_assert_eq!(&tokens[0].text, &v.to_string());
        prop_assert_eq!(tokens[1].kind, TokenKind::EndOfInput);
    }

    #[test]
    fn integer_literals_above_range_are_rejected(v in (MAX_INT_VALUE + 1)..=u64::MAX) {
        let result = Lexer::new(v.to_string()).scan_tokens();
        prop_assert!(result.is_err());
    }

    #[test]
    fn plain_words_lex_as_identifiers(name in "[A-Za-z][A-Za-z0-9_]{0,40}") {
        prop_assume!(!is_keyword(&name));
        let tokens = Lexer::new(name.clone()).scan_tokens().expect("tokenize");
        prop_assert_eq!(tokens[0].kind, TokenKind::Identifier);
        prop_assert_eq!(&tokens[0].text, &name);
    }

    #[test]
    fn short_strings_lex_verbatim(content in "[a-zA-Z0-9 .,!?]{0,30}") {
        let source = format!("\"{}\"", content);
        let tokens = Lexer::new(source).scan_tokens().expect("tokenize");
        prop_assert_eq!(tokens[0].kind, TokenKind::StrConst);
        prop_assert_eq!(&tokens[0].text, &content);
    }
}
