//! Loaded-form instructions: the decoded wire stream with every embedded
//! expression compiled once at load time.

use crate::engine::error::EngineError;
use crate::expr::{self, ExprNode};
use crate::module::{RawCond, RawInstr};
use crate::value::{Value, ValueType};

/// Condition operand of a loaded IF. Always re-evaluated, never memoized.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Variable by local id.
    Var(u32),
    /// Compiled expression tree.
    Expr(ExprNode),
}

/// One executable instruction of a context's code segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// Skipped at execution.
    Nop,
    /// Assigns an immediate value.
    SetImmediate {
        /// Target variable id.
        var: u32,
        /// Declared type.
        ty: ValueType,
        /// Stored value.
        value: Value,
    },
    /// Links a variable to another variable.
    SetLinked {
        /// Target variable id.
        var: u32,
        /// Declared type.
        ty: ValueType,
        /// Source variable id.
        target: u32,
    },
    /// Assigns from a compiled expression.
    SetExpr {
        /// Target variable id.
        var: u32,
        /// Declared type.
        ty: ValueType,
        /// Compiled tree.
        tree: ExprNode,
    },
    /// Discards an object.
    Push {
        /// Object id.
        id: u32,
        /// `true` for a procedure.
        procedure: bool,
    },
    /// Prints a literal line.
    WriteLiteral(String),
    /// Prints a variable's value.
    WriteVar(u32),
    /// Reads one console line into a variable.
    Input {
        /// Target variable id.
        var: u32,
        /// Parse type.
        ty: ValueType,
    },
    /// Unconditional jump.
    Jump(i32),
    /// Conditional branch.
    If {
        /// Target taken when the condition is false.
        else_target: i32,
        /// Condition operand.
        cond: Condition,
    },
    /// Branch-target no-op (ELSE marker or block END).
    Marker,
    /// Registers or replaces a procedure.
    Define {
        /// Procedure id.
        proc: u32,
        /// Body start index.
        start: i32,
    },
    /// Returns through the engine return stack.
    Ret,
    /// Calls a procedure by id.
    Call(u32),
    /// Halts the owning context.
    Eof,
}

impl Instr {
    /// Lifts a decoded wire instruction, compiling embedded expressions.
    pub fn from_raw(raw: RawInstr) -> Result<Self, EngineError> {
        Ok(match raw {
            RawInstr::Nop => Self::Nop,
            RawInstr::SetImmediate { var, ty, value } => Self::SetImmediate { var, ty, value },
            RawInstr::SetLinked { var, ty, target } => Self::SetLinked { var, ty, target },
            RawInstr::SetExpr { var, ty, expr } => Self::SetExpr {
                var,
                ty,
                tree: expr::compile(&expr)?,
            },
            RawInstr::Push { id, procedure } => Self::Push { id, procedure },
            RawInstr::WriteLiteral(text) => Self::WriteLiteral(text),
            RawInstr::WriteVar(id) => Self::WriteVar(id),
            RawInstr::Input { var, ty } => Self::Input { var, ty },
            RawInstr::Jump(target) => Self::Jump(target),
            RawInstr::If { else_target, cond } => Self::If {
                else_target,
                cond: match cond {
                    RawCond::Var(id) => Condition::Var(id),
                    RawCond::Expr(text) => Condition::Expr(expr::compile(&text)?),
                },
            },
            RawInstr::ElseMarker | RawInstr::End => Self::Marker,
            RawInstr::Define { proc, start } => Self::Define { proc, start },
            RawInstr::Ret => Self::Ret,
            RawInstr::Call(id) => Self::Call(id),
            RawInstr::Eof => Self::Eof,
        })
    }
}
