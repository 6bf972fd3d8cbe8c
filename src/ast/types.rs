//! Type annotations as written in the source.
//!
//! The language has a single value type, `number`, plus `void` for
//! functions that produce nothing. Any other name parses into
//! `Type::Custom` and is rejected later by the resolver.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Number,
    Custom(String),
}

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Void => "void",
            Type::Number => "number",
            Type::Custom(name) => name,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
