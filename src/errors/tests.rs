//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::diagnostics::Diagnostics;
use crate::errors::errors::{Error, ErrorClass, ErrorImpl, ErrorTip, Severity};
use crate::Position;
use std::rc::Rc;

fn position(offset: u32) -> Position {
    Position::new(offset, 1, offset + 1, Rc::new("test.num".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedCharacter {
            character: "#".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedCharacter");
    assert_eq!(error.get_error_class(), ErrorClass::Lex);
    assert_eq!(error.get_severity(), Severity::Error);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
            message: "expected expression".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().column, 43);
}

#[test]
fn test_unexpected_token_error() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "}".to_string(),
            message: "expected ';' at the end of expression".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.get_error_class(), ErrorClass::Parse);
    assert_eq!(error.get_message(), "expected ';' at the end of expression");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(tip) if tip == "found `}`"));
}

#[test]
fn test_invalid_type_error() {
    let error = Error::new(
        ErrorImpl::InvalidType {
            subject: "variable",
            identifier: "x".to_string(),
            type_name: "string".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_class(), ErrorClass::Resolution);
    assert_eq!(error.get_message(), "variable 'x' has invalid 'string' type");
}

#[test]
fn test_symbol_not_found_error() {
    let error = Error::new(
        ErrorImpl::SymbolNotFound {
            symbol: "foo".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "SymbolNotFound");
    assert_eq!(error.get_message(), "symbol 'foo' not found");
}

#[test]
fn test_flow_errors() {
    let missing = Error::new(ErrorImpl::MissingReturnOnSomePaths, position(0));
    let mutated = Error::new(
        ErrorImpl::ImmutableMutation {
            identifier: "x".to_string(),
        },
        position(0),
    );

    assert_eq!(missing.get_error_class(), ErrorClass::Flow);
    assert_eq!(
        missing.get_message(),
        "non-void function doesn't return a value on every path"
    );
    assert_eq!(mutated.get_message(), "'x' cannot be mutated");
}

#[test]
fn test_warning_display() {
    let warning = Error::warning(ErrorImpl::UnreachableStatement, position(4));

    assert!(warning.is_warning());
    assert_eq!(
        warning.to_string(),
        "test.num:1:5: warning: unreachable statement"
    );
}

#[test]
fn test_tip_display() {
    let tip = ErrorTip::Suggestion("declare `x` with `var` to allow mutation".to_string());
    assert_eq!(tip.to_string(), "declare `x` with `var` to allow mutation");
    assert_eq!(ErrorTip::None.to_string(), "");
}

#[test]
fn test_diagnostics_counts() {
    let mut diagnostics = Diagnostics::new();
    assert!(diagnostics.is_empty());
    assert!(!diagnostics.has_errors());

    diagnostics.report(Error::warning(ErrorImpl::UnreachableStatement, position(0)));
    assert!(!diagnostics.has_errors());

    diagnostics.report(Error::new(ErrorImpl::NotCallable, position(1)));
    diagnostics.report(Error::new(ErrorImpl::MissingReturn, position(2)));

    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics.error_count(), 2);
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.of_class(ErrorClass::Flow).count(), 1);
    assert_eq!(
        diagnostics.messages(),
        vec![
            "unreachable statement",
            "expression cannot be called as a function",
            "non-void function doesn't return a value",
        ]
    );
}
