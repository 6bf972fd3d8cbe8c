//! Control-flow graphs of resolved function bodies.

pub mod builder;
pub mod cfg;

#[cfg(test)]
mod tests;
