//! Token construction helpers for the lexer's pattern table.

/// Builds a [`Token`](crate::lexer::tokens::Token) from its kind, text and span.
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Handler for a pattern that only ever matches `$value`.
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new(r"^==").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Equals, "=="),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, matched: &str| -> Option<Token> {
            debug_assert_eq!(matched, $value);
            let span = lexer.consume(matched);
            Some(MK_TOKEN!($kind, String::from($value), span))
        }
    };
}
