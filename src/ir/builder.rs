//! Instruction builder.
//!
//! Owns the function under construction and appends instructions at the end
//! of the current insertion block.

use super::module::{
    ArithOp, BlockId, FloatPredicate, Function, Instruction, InstructionKind, IrType, Value,
};

pub struct Builder {
    function: Function,
    insert_block: Option<BlockId>,
}

impl Builder {
    pub fn new(function: Function) -> Self {
        Builder {
            function,
            insert_block: None,
        }
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn finish(self) -> Function {
        self.function
    }

    pub fn append_basic_block(&mut self, label: &str) -> BlockId {
        self.function.append_block(label)
    }

    /// Creates a block that is only emitted once it is inserted.
    pub fn create_basic_block(&mut self, label: &str) -> BlockId {
        self.function.create_block(label)
    }

    pub fn insert_basic_block(&mut self, block: BlockId) {
        self.function.insert_block(block);
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.insert_block = Some(block);
    }

    pub fn get_insert_block(&self) -> Option<BlockId> {
        self.insert_block
    }

    /// Code built after this point goes nowhere until the builder is
    /// positioned again.
    pub fn clear_insertion_position(&mut self) {
        self.insert_block = None;
    }

    pub fn has_predecessors(&self, block: BlockId) -> bool {
        !self.function.predecessors(block).is_empty()
    }

    fn push(&mut self, kind: InstructionKind) -> Option<Value> {
        let Some(block) = self.insert_block else {
            panic!("instruction built without an insertion block");
        };

        let result = kind.produces_value().then(|| self.function.next_value());
        self.function
            .block_mut(block)
            .instructions
            .push(Instruction { result, kind });

        result.map(Value::Instruction)
    }

    fn push_value(&mut self, kind: InstructionKind) -> Value {
        match self.push(kind) {
            Some(value) => value,
            None => unreachable!("instruction does not produce a value"),
        }
    }

    /// Allocates a stack cell at the top of the entry block, whatever the
    /// current insertion block is.
    pub fn build_alloca(&mut self, name: &str) -> Value {
        let Some(entry) = self.function.entry_block() else {
            panic!("alloca built before the entry block");
        };

        let result = self.function.next_value();
        let block = self.function.block_mut(entry);
        let position = block
            .instructions
            .iter()
            .take_while(|instruction| matches!(instruction.kind, InstructionKind::Alloca { .. }))
            .count();

        block.instructions.insert(
            position,
            Instruction {
                result: Some(result),
                kind: InstructionKind::Alloca {
                    name: name.to_string(),
                },
            },
        );

        Value::Instruction(result)
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) {
        self.push(InstructionKind::Store { value, ptr });
    }

    pub fn build_load(&mut self, ptr: Value) -> Value {
        self.push_value(InstructionKind::Load { ptr })
    }

    pub fn build_arithmetic(&mut self, op: ArithOp, lhs: Value, rhs: Value) -> Value {
        self.push_value(InstructionKind::Arithmetic { op, lhs, rhs })
    }

    pub fn build_float_neg(&mut self, operand: Value) -> Value {
        self.push_value(InstructionKind::FNeg { operand })
    }

    pub fn build_float_compare(
        &mut self,
        predicate: FloatPredicate,
        lhs: Value,
        rhs: Value,
    ) -> Value {
        self.push_value(InstructionKind::FCmp {
            predicate,
            lhs,
            rhs,
        })
    }

    pub fn build_not(&mut self, operand: Value) -> Value {
        self.push_value(InstructionKind::Not { operand })
    }

    pub fn build_select(&mut self, condition: Value, then_value: Value, else_value: Value) -> Value {
        self.push_value(InstructionKind::Select {
            condition,
            then_value,
            else_value,
        })
    }

    pub fn build_phi(&mut self, incoming: Vec<(Value, BlockId)>) -> Value {
        self.push_value(InstructionKind::Phi { incoming })
    }

    /// Returns the call's value unless the callee returns `void`.
    pub fn build_call(
        &mut self,
        callee: &str,
        arguments: Vec<Value>,
        return_type: IrType,
    ) -> Option<Value> {
        self.push(InstructionKind::Call {
            callee: callee.to_string(),
            arguments,
            return_type,
        })
    }

    pub fn build_print(&mut self, value: Value) {
        self.push(InstructionKind::Print { value });
    }

    pub fn build_unconditional_branch(&mut self, target: BlockId) {
        self.push(InstructionKind::Br { target });
    }

    pub fn build_conditional_branch(
        &mut self,
        condition: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) {
        self.push(InstructionKind::CondBr {
            condition,
            then_block,
            else_block,
        });
    }

    pub fn build_return(&mut self, value: Option<Value>) {
        self.push(InstructionKind::Ret { value });
    }
}
