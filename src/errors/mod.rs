//! Error types and error handling for the compiler.
//!
//! This module defines the diagnostics produced throughout the compilation
//! process. It includes:
//!
//! - Error structures with source position and severity
//! - Specific error variants for every compilation phase
//! - A collector that lets phases report and keep going
//! - Helpful error messages and suggestions

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
