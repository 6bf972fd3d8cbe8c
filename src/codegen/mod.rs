//! Lowers a resolved program to the basic-block IR in [`crate::ir`].
//!
//! Every local and parameter gets one stack cell in the entry block. Each
//! function has a single `return` block that reads the return cell, and
//! `&&`/`||` become branches that meet again in a `phi`.

pub mod codegen;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
