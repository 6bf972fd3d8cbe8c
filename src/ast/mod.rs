/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the syntax tree built by the parser
///
/// Submodules:
/// - ast: Declarations (functions, parameters, variables) and the tree dump
/// - expressions: Definitions for the expression kinds and operators
/// - statements: Definitions for the statement kinds and blocks
/// - types: Definitions for type annotations
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
