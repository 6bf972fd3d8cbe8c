//! Display implementations for the IR.

use std::fmt;

use super::module::{
    ArithOp, BlockId, FloatPredicate, Function, Instruction, InstructionKind, IrType, Module, Value,
};

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::Double => write!(f, "double"),
            IrType::Bool => write!(f, "bool"),
            IrType::Int => write!(f, "int"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::ConstNumber(value) => write!(f, "{:?}", value),
            Value::ConstBool(value) => write!(f, "{}", value),
            Value::ConstInt(value) => write!(f, "{}", value),
            Value::Param(index) => write!(f, "%arg{}", index),
            Value::Instruction(id) => write!(f, "%{}", id.0),
        }
    }
}

impl fmt::Display for FloatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ogt => "ogt",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithOp::FAdd => "fadd",
            ArithOp::FSub => "fsub",
            ArithOp::FMul => "fmul",
            ArithOp::FDiv => "fdiv",
        };
        write!(f, "{}", name)
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Function {
    fn fmt_instruction(&self, instruction: &Instruction, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        if let Some(result) = instruction.result {
            write!(f, "%{} = ", result.0)?;
        }

        let label = |block: BlockId| self.block(block).label.as_str();

        match &instruction.kind {
            InstructionKind::Alloca { name } => write!(f, "alloca double ; {}", name),
            InstructionKind::Store { value, ptr } => write!(f, "store {}, {}", value, ptr),
            InstructionKind::Load { ptr } => write!(f, "load {}", ptr),
            InstructionKind::Arithmetic { op, lhs, rhs } => write!(f, "{} {}, {}", op, lhs, rhs),
            InstructionKind::FNeg { operand } => write!(f, "fneg {}", operand),
            InstructionKind::FCmp {
                predicate,
                lhs,
                rhs,
            } => write!(f, "fcmp {} {}, {}", predicate, lhs, rhs),
            InstructionKind::Not { operand } => write!(f, "not {}", operand),
            InstructionKind::Select {
                condition,
                then_value,
                else_value,
            } => write!(f, "select {}, {}, {}", condition, then_value, else_value),
            InstructionKind::Phi { incoming } => {
                let incoming = incoming
                    .iter()
                    .map(|(value, block)| format!("[{}, {}]", value, label(*block)))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "phi {}", incoming)
            }
            InstructionKind::Call {
                callee, arguments, ..
            } => write!(f, "call @{}({})", callee, join_values(arguments)),
            InstructionKind::Print { value } => write!(f, "print {}", value),
            InstructionKind::Br { target } => write!(f, "br {}", label(*target)),
            InstructionKind::CondBr {
                condition,
                then_block,
                else_block,
            } => write!(
                f,
                "br {}, {}, {}",
                condition,
                label(*then_block),
                label(*else_block)
            ),
            InstructionKind::Ret { value: Some(value) } => write!(f, "ret {}", value),
            InstructionKind::Ret { value: None } => write!(f, "ret void"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|param| param.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "fn {}({}) -> {} {{", self.name, params, self.return_type)?;

        for (_, block) in self.blocks() {
            writeln!(f, "{}:", block.label)?;
            for instruction in &block.instructions {
                self.fmt_instruction(instruction, f)?;
                writeln!(f)?;
            }
        }

        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module '{}'", self.name)?;
        writeln!(f, "; source '{}'", self.source_file)?;
        if let Some(entry) = &self.entry {
            writeln!(f, "; entry @{}", entry)?;
        }

        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }

        Ok(())
    }
}
