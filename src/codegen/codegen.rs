use std::collections::HashMap;

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    ir::{
        builder::Builder,
        module::{BlockId, Function, IrType, Module, Value},
    },
    resolver::resolved_ast::{
        DeclArena, DeclId, ResolvedBlock, ResolvedDecl, ResolvedFunctionDecl, ResolvedProgram,
    },
    Position,
};

use super::stmt::gen_block;

/// Symbol the user's `main` is emitted under, so that the real entry point
/// can wrap it.
pub const USER_MAIN_SYMBOL: &str = "__builtin_main";

/// State for lowering one function.
pub struct Codegen<'a> {
    pub decls: &'a DeclArena,
    pub builder: Builder,

    /// Stack cell of every parameter and local seen so far.
    pub named_allocas: HashMap<DeclId, Value>,
    /// The return cell, absent for `void` functions.
    pub ret_val: Option<Value>,
    pub return_block: BlockId,
}

impl<'a> Codegen<'a> {
    fn new(decls: &'a DeclArena, function: Function) -> Self {
        let mut builder = Builder::new(function);

        let entry = builder.append_basic_block("entry");
        builder.position_at_end(entry);
        let return_block = builder.create_basic_block("return");

        Codegen {
            decls,
            builder,
            named_allocas: HashMap::new(),
            ret_val: None,
            return_block,
        }
    }

    pub fn alloca_of(&self, decl: DeclId) -> Value {
        match self.named_allocas.get(&decl) {
            Some(alloca) => *alloca,
            None => panic!(
                "no stack cell for '{}'",
                self.decls
                    .get(decl)
                    .map(|decl| decl.identifier())
                    .unwrap_or("<unknown>")
            ),
        }
    }

    /// Moves the builder into the shared return block, if anything
    /// branches there, and emits the function's only `ret`.
    fn gen_return(&mut self) {
        let return_block = self.return_block;

        if self.builder.has_predecessors(return_block) {
            if self.builder.get_insert_block().is_some() {
                self.builder.build_unconditional_branch(return_block);
            }
            self.builder.insert_basic_block(return_block);
            self.builder.position_at_end(return_block);
        } else if self.builder.get_insert_block().is_none() {
            panic!(
                "function '{}' has no block to return from",
                self.builder.function().name
            );
        }

        match self.ret_val {
            Some(ret_val) => {
                let value = self.builder.build_load(ret_val);
                self.builder.build_return(Some(value));
            }
            None => self.builder.build_return(None),
        }
    }
}

pub fn ir_type(t: &Type) -> IrType {
    match t {
        Type::Void => IrType::Void,
        Type::Number => IrType::Double,
        Type::Custom(name) => unreachable!("unresolved type '{}' reached code generation", name),
    }
}

/// The IR name of a function.
pub fn symbol_name(function: &ResolvedFunctionDecl) -> &str {
    if function.identifier == "main" && !function.is_builtin {
        USER_MAIN_SYMBOL
    } else {
        &function.identifier
    }
}

/// Generates the IR module for a program that passed every check.
///
/// Programs that are not valid are rejected instead of partially lowered.
pub fn generate(program: &ResolvedProgram, source_file: &str) -> Result<Module, Error> {
    if !program.is_valid() {
        return Err(Error::new(ErrorImpl::InvalidProgram, Position::null()));
    }

    let decls = &program.decls;
    let mut module = Module::new("<translation_unit>", source_file);

    for (_, decl) in decls.iter() {
        if let ResolvedDecl::Function(function) = decl {
            if function.is_builtin {
                module.add_function(gen_builtin_function(decls, function), true);
            }
        }
    }

    for id in &program.functions {
        let Some(function) = decls.function(*id) else {
            unreachable!("function list refers to a non-function declaration");
        };
        let Some(body) = &function.body else {
            return Err(Error::new(ErrorImpl::InvalidProgram, function.position.clone()));
        };

        module.add_function(gen_function(decls, function, body), false);
    }

    if program.find_function("main").is_some() {
        module.add_function(gen_main_wrapper(), false);
        module.entry = Some(String::from("main"));
    }

    Ok(module)
}

fn function_header(decls: &DeclArena, function: &ResolvedFunctionDecl) -> Function {
    let params = function
        .params
        .iter()
        .map(|param| ir_type(decls[*param].decl_type()))
        .collect();

    Function::new(symbol_name(function), params, ir_type(&function.return_type))
}

fn gen_function(
    decls: &DeclArena,
    function: &ResolvedFunctionDecl,
    body: &ResolvedBlock,
) -> Function {
    let mut codegen = Codegen::new(decls, function_header(decls, function));

    if !function.return_type.is_void() {
        codegen.ret_val = Some(codegen.builder.build_alloca("retval"));
    }

    for (index, param) in function.params.iter().enumerate() {
        let alloca = codegen.builder.build_alloca(decls[*param].identifier());
        codegen.builder.build_store(Value::Param(index), alloca);
        codegen.named_allocas.insert(*param, alloca);
    }

    gen_block(&mut codegen, body);
    codegen.gen_return();

    codegen.builder.finish()
}

/// `println` prints its only argument.
fn gen_builtin_function(decls: &DeclArena, function: &ResolvedFunctionDecl) -> Function {
    let mut builder = Builder::new(function_header(decls, function));

    let entry = builder.append_basic_block("entry");
    builder.position_at_end(entry);
    builder.build_print(Value::Param(0));
    builder.build_return(None);

    builder.finish()
}

/// The process entry point: runs the user's `main` and exits with 0.
fn gen_main_wrapper() -> Function {
    let mut builder = Builder::new(Function::new("main", Vec::new(), IrType::Int));

    let entry = builder.append_basic_block("entry");
    builder.position_at_end(entry);
    builder.build_call(USER_MAIN_SYMBOL, Vec::new(), IrType::Void);
    builder.build_return(Some(Value::ConstInt(0)));

    builder.finish()
}
