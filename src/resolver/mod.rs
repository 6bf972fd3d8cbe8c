//! Semantic analysis.
//!
//! Turns the syntactic tree into the resolved tree: every reference is bound
//! to its declaration, every expression gets a type, and each function body
//! goes through the flow-sensitive checks in [`flow`].

pub mod flow;
pub mod resolved_ast;
pub mod resolver;

#[cfg(test)]
mod tests;
