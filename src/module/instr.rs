//! Instruction wire format: opcodes, flag bits, and the decoded raw
//! instruction enum.
//!
//! Byte 0 of every instruction is `opcode << 4 | flags`. Payload layouts
//! are fixed per opcode and flag combination, so the stream decodes
//! without a separate length table.

use crate::module::format::{FormatError, Reader};
use crate::value::{Value, ValueType};

/// Instruction opcodes (high nibble of byte 0).
pub mod op {
    /// No operation; also what blank and unrecognized lines compile to.
    pub const NOP: u8 = 0x0;
    /// Variable assignment.
    pub const SET: u8 = 0x1;
    /// Discards a variable or procedure.
    pub const PUSH: u8 = 0x2;
    /// Unconditional jump to an instruction index.
    pub const JUMP: u8 = 0x3;
    /// Conditional branch.
    pub const IF: u8 = 0x4;
    /// Else marker, a runtime no-op branch target.
    pub const ELSE: u8 = 0x5;
    /// Inline conditional; expanded at build time, never serialized.
    pub const IF_SHORT: u8 = 0x6;
    /// Block end, a runtime no-op branch target.
    pub const END: u8 = 0x7;
    /// Procedure registration.
    pub const DEFINE: u8 = 0x8;
    /// Return through the engine return stack.
    pub const RET: u8 = 0x9;
    /// Procedure call.
    pub const CALL: u8 = 0xA;
    /// Console output.
    pub const WRITE: u8 = 0xB;
    /// Console input.
    pub const INPUT: u8 = 0xC;
    /// Compile-time module inclusion.
    pub const INCLUDE: u8 = 0xD;
    /// Module end; sets the context's EOF flag.
    pub const EOF: u8 = 0xF;
}

/// Flag bits (low nibble of byte 0).
pub mod flag {
    /// SET: the value is another variable's id.
    pub const SET_LINKED: u8 = 0b0100;
    /// SET: the value is an expression string.
    pub const SET_EXPR: u8 = 0b1000;
    /// WRITE: payload is a variable id rather than a literal.
    pub const WRITE_VAR: u8 = 0b1000;
    /// IF: the condition is an expression string rather than a variable id.
    pub const IF_EXPR: u8 = 0b1000;
    /// PUSH: the object is a procedure rather than a variable.
    pub const PUSH_PROC: u8 = 0b0001;
    /// SET / INPUT: mask of the two type-tag bits.
    pub const TYPE_MASK: u8 = 0b0011;
}

/// Condition operand of a decoded IF.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCond {
    /// Variable by local id.
    Var(u32),
    /// Finalized expression string (`@id` references).
    Expr(String),
}

/// One decoded runtime instruction, expressions still in string form.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInstr {
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
    /// Assigns from an expression.
    SetExpr {
        /// Target variable id.
        var: u32,
        /// Declared type.
        ty: ValueType,
        /// Finalized expression text.
        expr: String,
    },
    /// Discards an object.
    Push {
        /// Object id.
        id: u32,
        /// `true` for a procedure, `false` for a variable.
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
    /// Unconditional jump; -1 marks a target never resolved.
    Jump(i32),
    /// Conditional branch.
    If {
        /// Instruction index taken when the condition is false.
        else_target: i32,
        /// Condition operand.
        cond: RawCond,
    },
    /// Else marker (no-op).
    ElseMarker,
    /// Block end (no-op).
    End,
    /// Registers or replaces a procedure.
    Define {
        /// Procedure id.
        proc: u32,
        /// Body start instruction index.
        start: i32,
    },
    /// Returns to the recorded caller.
    Ret,
    /// Calls a procedure by id.
    Call(u32),
    /// Halts the owning context.
    Eof,
}

/// One decoded include-section instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInclude {
    /// Local include index assigned by the builder.
    pub index: u32,
    /// Path as written in the source.
    pub path: String,
}

fn read_type(flags: u8) -> Result<ValueType, FormatError> {
    ValueType::from_tag(flags & flag::TYPE_MASK).ok_or(FormatError::BadTag(flags))
}

fn read_value(r: &mut Reader<'_>, ty: ValueType) -> Result<Value, FormatError> {
    Ok(match ty {
        ValueType::Bool => Value::Bool(r.read_u8()? != 0),
        ValueType::Int => Value::Int(r.read_i32()?),
        ValueType::Float => Value::Float(r.read_f32()?),
        ValueType::Str => Value::Str(r.read_str8()?),
    })
}

impl RawInstr {
    /// Decodes one instruction from the stream.
    pub fn read(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        let head = r.read_u8()?;
        let opcode = head >> 4;
        let flags = head & 0x0F;

        Ok(match opcode {
            op::NOP => Self::Nop,
            op::SET => {
                let ty = read_type(flags)?;
                let var = r.read_u32()?;
                if flags & flag::SET_EXPR != 0 {
                    Self::SetExpr {
                        var,
                        ty,
                        expr: r.read_str8()?,
                    }
                } else if flags & flag::SET_LINKED != 0 {
                    Self::SetLinked {
                        var,
                        ty,
                        target: r.read_u32()?,
                    }
                } else {
                    Self::SetImmediate {
                        var,
                        ty,
                        value: read_value(r, ty)?,
                    }
                }
            }
            op::PUSH => Self::Push {
                id: r.read_u32()?,
                procedure: flags & flag::PUSH_PROC != 0,
            },
            op::JUMP => Self::Jump(r.read_i32()?),
            op::IF => {
                let else_target = r.read_i32()?;
                let cond = if flags & flag::IF_EXPR != 0 {
                    RawCond::Expr(r.read_str8()?)
                } else {
                    RawCond::Var(r.read_u32()?)
                };
                Self::If { else_target, cond }
            }
            op::ELSE => Self::ElseMarker,
            op::END => Self::End,
            op::DEFINE => Self::Define {
                proc: r.read_u32()?,
                start: r.read_i32()?,
            },
            op::RET => Self::Ret,
            op::CALL => Self::Call(r.read_u32()?),
            op::WRITE => {
                if flags & flag::WRITE_VAR != 0 {
                    Self::WriteVar(r.read_u32()?)
                } else {
                    Self::WriteLiteral(r.read_str8()?)
                }
            }
            op::INPUT => Self::Input {
                var: r.read_u32()?,
                ty: read_type(flags)?,
            },
            op::EOF => Self::Eof,
            // INCLUDE only appears in the include section; IF_SHORT never
            // survives the build.
            other => return Err(FormatError::BadTag(other << 4 | flags)),
        })
    }
}

impl RawInclude {
    /// Decodes one include-section instruction.
    pub fn read(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        let head = r.read_u8()?;
        if head >> 4 != op::INCLUDE {
            return Err(FormatError::BadTag(head));
        }
        Ok(Self {
            index: r.read_u32()?,
            path: r.read_str8()?,
        })
    }
}
