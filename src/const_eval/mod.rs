//! Compile-time evaluation of resolved expressions.
//!
//! Folding is best effort: anything that cannot be proven constant is
//! reported as unknown rather than as an error.

pub mod evaluator;
