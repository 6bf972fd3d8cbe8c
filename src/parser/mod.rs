//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a list of function declarations. It uses a Pratt parser for
//! expressions with proper operator precedence and handles:
//!
//! - Function, parameter and variable declarations
//! - Statements (if/else, while, return, assignment, expression)
//! - Expression parsing (binary and unary ops, calls, literals)
//! - Type annotations
//! - Error recovery and reporting
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
