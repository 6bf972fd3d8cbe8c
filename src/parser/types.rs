//! Type parsing implementation.
//!
//! Type annotations are a single token: `number`, `void`, or an identifier.
//! Identifiers are accepted here and rejected by the resolver, so that the
//! error can name the declaration that uses them.

use crate::{ast::types::Type, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

/// Parses a type annotation.
///
/// # Arguments
///
/// * `parser` - The parser positioned at the type
///
/// # Returns
///
/// The parsed type, or an error when the current token cannot name a type.
pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let parsed = match parser.current_token_kind() {
        TokenKind::NumberType => Type::Number,
        TokenKind::VoidType => Type::Void,
        TokenKind::Identifier => Type::Custom(parser.current_token().value.clone()),
        _ => return Err(parser.unexpected("expected type specifier")),
    };

    parser.advance();
    Ok(parsed)
}
