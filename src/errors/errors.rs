use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The phase that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Lex,
    Parse,
    Resolution,
    Flow,
    Codegen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    severity: Severity,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            severity: Severity::Error,
        }
    }

    pub fn warning(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            severity: Severity::Warning,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedCharacter { .. } => "UnrecognisedCharacter",
            ErrorImpl::InvalidNumber { .. } => "InvalidNumber",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::TopLevelDeclaration => "TopLevelDeclaration",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::SymbolNotFound { .. } => "SymbolNotFound",
            ErrorImpl::Redeclaration { .. } => "Redeclaration",
            ErrorImpl::InvalidType { .. } => "InvalidType",
            ErrorImpl::ExpectedFunctionCall { .. } => "ExpectedFunctionCall",
            ErrorImpl::NotCallable => "NotCallable",
            ErrorImpl::CallingNonFunction { .. } => "CallingNonFunction",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::ArgumentTypeMismatch { .. } => "ArgumentTypeMismatch",
            ErrorImpl::VoidUnaryOperand => "VoidUnaryOperand",
            ErrorImpl::VoidBinaryOperand { .. } => "VoidBinaryOperand",
            ErrorImpl::ConditionNotNumber => "ConditionNotNumber",
            ErrorImpl::InitializerTypeMismatch { .. } => "InitializerTypeMismatch",
            ErrorImpl::AssignmentTypeMismatch { .. } => "AssignmentTypeMismatch",
            ErrorImpl::ParameterAssignment { .. } => "ParameterAssignment",
            ErrorImpl::ExpectedReturnValue => "ExpectedReturnValue",
            ErrorImpl::UnexpectedReturnValue => "UnexpectedReturnValue",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::MainReturnType => "MainReturnType",
            ErrorImpl::MainParameters => "MainParameters",
            ErrorImpl::UnreachableStatement => "UnreachableStatement",
            ErrorImpl::MissingReturn => "MissingReturn",
            ErrorImpl::MissingReturnOnSomePaths => "MissingReturnOnSomePaths",
            ErrorImpl::UninitializedVariable { .. } => "UninitializedVariable",
            ErrorImpl::ImmutableMutation { .. } => "ImmutableMutation",
            ErrorImpl::InvalidProgram => "InvalidProgram",
        }
    }

    pub fn get_error_class(&self) -> ErrorClass {
        match &self.internal_error {
            ErrorImpl::UnrecognisedCharacter { .. } | ErrorImpl::InvalidNumber { .. } => {
                ErrorClass::Lex
            }
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::TopLevelDeclaration
            | ErrorImpl::InvalidAssignmentTarget => ErrorClass::Parse,
            ErrorImpl::MissingReturn
            | ErrorImpl::MissingReturnOnSomePaths
            | ErrorImpl::UninitializedVariable { .. }
            | ErrorImpl::ImmutableMutation { .. } => ErrorClass::Flow,
            ErrorImpl::InvalidProgram => ErrorClass::Codegen,
            _ => ErrorClass::Resolution,
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedCharacter { .. } => ErrorTip::None,
            ErrorImpl::InvalidNumber { literal } => ErrorTip::Suggestion(format!(
                "a fractional part must follow the dot, try `{}0`",
                literal
            )),
            ErrorImpl::UnexpectedToken { token, .. } => {
                ErrorTip::Suggestion(format!("found `{}`", token))
            }
            ErrorImpl::TopLevelDeclaration => ErrorTip::None,
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::None,
            ErrorImpl::SymbolNotFound { symbol } => {
                ErrorTip::Suggestion(format!("declare `{}` before using it", symbol))
            }
            ErrorImpl::Redeclaration { .. } => ErrorTip::None,
            ErrorImpl::InvalidType { .. } => ErrorTip::Suggestion(String::from(
                "the only value type is `number`",
            )),
            ErrorImpl::ExpectedFunctionCall { identifier } => {
                ErrorTip::Suggestion(format!("did you mean `{}(...)`?", identifier))
            }
            ErrorImpl::NotCallable => ErrorTip::None,
            ErrorImpl::CallingNonFunction { .. } => ErrorTip::None,
            ErrorImpl::ArgumentCountMismatch { expected, received } => ErrorTip::Suggestion(
                format!("expected {} arguments, received {}", expected, received),
            ),
            ErrorImpl::ArgumentTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::VoidUnaryOperand | ErrorImpl::VoidBinaryOperand { .. } => ErrorTip::None,
            ErrorImpl::ConditionNotNumber => ErrorTip::None,
            ErrorImpl::InitializerTypeMismatch { expected, received }
            | ErrorImpl::AssignmentTypeMismatch { expected, received }
            | ErrorImpl::ReturnTypeMismatch { expected, received } => ErrorTip::Suggestion(
                format!("expected type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::ParameterAssignment { identifier } => ErrorTip::Suggestion(format!(
                "copy `{}` into a `var` to modify it",
                identifier
            )),
            ErrorImpl::ExpectedReturnValue | ErrorImpl::UnexpectedReturnValue => ErrorTip::None,
            ErrorImpl::MainReturnType | ErrorImpl::MainParameters => {
                ErrorTip::Suggestion(String::from("declare it as `fn main(): void`"))
            }
            ErrorImpl::UnreachableStatement => ErrorTip::None,
            ErrorImpl::MissingReturn | ErrorImpl::MissingReturnOnSomePaths => {
                ErrorTip::Suggestion(String::from("end every path with a `return` statement"))
            }
            ErrorImpl::UninitializedVariable { .. } => ErrorTip::None,
            ErrorImpl::ImmutableMutation { identifier } => ErrorTip::Suggestion(format!(
                "declare `{}` with `var` to allow mutation",
                identifier
            )),
            ErrorImpl::InvalidProgram => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.position, self.severity, self.internal_error
        )
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexing
    #[error("unrecognised character '{character}'")]
    UnrecognisedCharacter { character: String },
    #[error("invalid number literal '{literal}'")]
    InvalidNumber { literal: String },

    // Parsing
    #[error("{message}")]
    UnexpectedToken { token: String, message: String },
    #[error("only function declarations are allowed on the top level")]
    TopLevelDeclaration,
    #[error("expected variable on the LHS of an assignment")]
    InvalidAssignmentTarget,

    // Resolution
    #[error("symbol '{symbol}' not found")]
    SymbolNotFound { symbol: String },
    #[error("redeclaration of '{identifier}'")]
    Redeclaration { identifier: String },
    #[error("{subject} '{identifier}' has invalid '{type_name}' type")]
    InvalidType {
        subject: &'static str,
        identifier: String,
        type_name: String,
    },
    #[error("expected to call function '{identifier}'")]
    ExpectedFunctionCall { identifier: String },
    #[error("expression cannot be called as a function")]
    NotCallable,
    #[error("calling non-function symbol '{identifier}'")]
    CallingNonFunction { identifier: String },
    #[error("argument count mismatch in function call")]
    ArgumentCountMismatch { expected: usize, received: usize },
    #[error("unexpected type of argument")]
    ArgumentTypeMismatch { expected: String, received: String },
    #[error("void expression cannot be used as an operand to unary operator")]
    VoidUnaryOperand,
    #[error("void expression cannot be used as {side} operand to binary operator")]
    VoidBinaryOperand { side: &'static str },
    #[error("expected number in condition")]
    ConditionNotNumber,
    #[error("initializer type mismatch")]
    InitializerTypeMismatch { expected: String, received: String },
    #[error("assigned value type doesn't match variable type")]
    AssignmentTypeMismatch { expected: String, received: String },
    #[error("parameters are immutable and cannot be assigned")]
    ParameterAssignment { identifier: String },
    #[error("expected a return value")]
    ExpectedReturnValue,
    #[error("unexpected return value in void function")]
    UnexpectedReturnValue,
    #[error("unexpected return type")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("'main' function is expected to have 'void' type")]
    MainReturnType,
    #[error("'main' function is expected to take no arguments")]
    MainParameters,
    #[error("unreachable statement")]
    UnreachableStatement,

    // Flow-sensitive checks
    #[error("non-void function doesn't return a value")]
    MissingReturn,
    #[error("non-void function doesn't return a value on every path")]
    MissingReturnOnSomePaths,
    #[error("'{identifier}' is not initialized")]
    UninitializedVariable { identifier: String },
    #[error("'{identifier}' cannot be mutated")]
    ImmutableMutation { identifier: String },

    // Code generation
    #[error("cannot generate code for a program that failed resolution")]
    InvalidProgram,
}
