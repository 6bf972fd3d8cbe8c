//! The basic-block IR produced by code generation.
//!
//! Every value is a double, a bool or an int. Locals live in stack cells
//! created with `alloca` and are accessed through `load` and `store`.

pub mod builder;
pub mod display;
pub mod module;
