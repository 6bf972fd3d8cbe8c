use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// Names the result of a value-producing instruction within its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrType {
    Void,
    Double,
    Bool,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    ConstNumber(f64),
    ConstBool(bool),
    ConstInt(i64),
    /// The n-th parameter of the enclosing function.
    Param(usize),
    Instruction(InstructionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPredicate {
    Oeq,
    One,
    Olt,
    Ogt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    FAdd,
    FSub,
    FMul,
    FDiv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub result: Option<InstructionId>,
    pub kind: InstructionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// A stack cell holding one double.
    Alloca { name: String },
    Store { value: Value, ptr: Value },
    Load { ptr: Value },
    Arithmetic { op: ArithOp, lhs: Value, rhs: Value },
    FNeg { operand: Value },
    FCmp { predicate: FloatPredicate, lhs: Value, rhs: Value },
    Not { operand: Value },
    Select { condition: Value, then_value: Value, else_value: Value },
    Phi { incoming: Vec<(Value, BlockId)> },
    Call { callee: String, arguments: Vec<Value>, return_type: IrType },
    Print { value: Value },
    Br { target: BlockId },
    CondBr { condition: Value, then_block: BlockId, else_block: BlockId },
    Ret { value: Option<Value> },
}

impl InstructionKind {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstructionKind::Br { .. } | InstructionKind::CondBr { .. } | InstructionKind::Ret { .. }
        )
    }

    pub fn produces_value(&self) -> bool {
        match self {
            InstructionKind::Alloca { .. }
            | InstructionKind::Load { .. }
            | InstructionKind::Arithmetic { .. }
            | InstructionKind::FNeg { .. }
            | InstructionKind::FCmp { .. }
            | InstructionKind::Not { .. }
            | InstructionKind::Select { .. }
            | InstructionKind::Phi { .. } => true,
            InstructionKind::Call { return_type, .. } => *return_type != IrType::Void,
            InstructionKind::Store { .. }
            | InstructionKind::Print { .. }
            | InstructionKind::Br { .. }
            | InstructionKind::CondBr { .. }
            | InstructionKind::Ret { .. } => false,
        }
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            InstructionKind::Br { target } => vec![*target],
            InstructionKind::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions
            .last()
            .filter(|instruction| instruction.kind.is_terminator())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<IrType>,
    pub return_type: IrType,
    blocks: Vec<BasicBlock>,
    /// Blocks that are part of the function body, in print order. Blocks
    /// created but never inserted are not emitted.
    layout: Vec<BlockId>,
    label_counts: BTreeMap<String, usize>,
    next_value: usize,
}

impl Function {
    pub fn new(name: &str, params: Vec<IrType>, return_type: IrType) -> Self {
        Function {
            name: name.to_string(),
            params,
            return_type,
            blocks: Vec::new(),
            layout: Vec::new(),
            label_counts: BTreeMap::new(),
            next_value: 0,
        }
    }

    /// Creates a block that is not part of the function yet.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let count = self.label_counts.entry(label.to_string()).or_insert(0);
        let label = if *count == 0 {
            label.to_string()
        } else {
            format!("{}{}", label, count)
        };
        *count += 1;

        self.blocks.push(BasicBlock {
            label,
            instructions: Vec::new(),
        });
        BlockId(self.blocks.len() - 1)
    }

    pub fn insert_block(&mut self, block: BlockId) {
        if !self.layout.contains(&block) {
            self.layout.push(block);
        }
    }

    pub fn append_block(&mut self, label: &str) -> BlockId {
        let block = self.create_block(label);
        self.insert_block(block);
        block
    }

    pub fn block(&self, block: BlockId) -> &BasicBlock {
        &self.blocks[block.0]
    }

    pub fn block_mut(&mut self, block: BlockId) -> &mut BasicBlock {
        &mut self.blocks[block.0]
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.layout.first().copied()
    }

    /// Blocks in print order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> {
        self.layout.iter().map(|id| (*id, &self.blocks[id.0]))
    }

    pub fn block_count(&self) -> usize {
        self.layout.len()
    }

    pub fn find_block(&self, label: &str) -> Option<BlockId> {
        self.blocks()
            .find(|(_, block)| block.label == label)
            .map(|(id, _)| id)
    }

    /// Inserted blocks whose terminator branches to `block`.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        self.blocks()
            .filter(|(_, candidate)| {
                candidate
                    .terminator()
                    .is_some_and(|terminator| terminator.kind.successors().contains(&block))
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn next_value(&mut self) -> InstructionId {
        let id = InstructionId(self.next_value);
        self.next_value += 1;
        id
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks().flat_map(|(_, block)| block.instructions.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<IrType>,
    pub return_type: IrType,
    pub is_builtin: bool,
}

/// The lowered program handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub source_file: String,
    pub functions: Vec<Function>,
    pub symbols: BTreeMap<String, Signature>,
    /// The function a backend should call first, if the program has one.
    pub entry: Option<String>,
}

impl Module {
    pub fn new(name: &str, source_file: &str) -> Self {
        Module {
            name: name.to_string(),
            source_file: source_file.to_string(),
            functions: Vec::new(),
            symbols: BTreeMap::new(),
            entry: None,
        }
    }

    pub fn add_function(&mut self, function: Function, is_builtin: bool) {
        self.symbols.insert(
            function.name.clone(),
            Signature {
                params: function.params.clone(),
                return_type: function.return_type,
                is_builtin,
            },
        );
        self.functions.push(function);
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }
}
