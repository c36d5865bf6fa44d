//! Runtime value model: declared types, the tagged value union, variable
//! cells, and procedure descriptors.

use std::fmt;

use crate::expr::ExprNode;

/// Declarable variable types, in serialized tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean flag.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 32-bit binary float.
    Float,
    /// Length-prefixed UTF-8 string (0-255 bytes on disk).
    Str,
}

impl ValueType {
    /// Returns the two-bit on-disk tag.
    pub const fn tag(self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::Int => 1,
            Self::Float => 2,
            Self::Str => 3,
        }
    }

    /// Decodes a two-bit tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag & 0b11 {
            0 => Some(Self::Bool),
            1 => Some(Self::Int),
            2 => Some(Self::Float),
            3 => Some(Self::Str),
            _ => None,
        }
    }

    /// Parses the surface keyword (`INT`, `FLOAT`, `BOOL`, `STRING`).
    pub fn parse_keyword(word: &str) -> Option<Self> {
        match word {
            "BOOL" => Some(Self::Bool),
            "INT" => Some(Self::Int),
            "FLOAT" => Some(Self::Float),
            "STRING" => Some(Self::Str),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int => write!(f, "INT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Str => write!(f, "STRING"),
        }
    }
}

/// Coercion failure raised at a cell read or write site.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionError {
    /// Type the value was asked to become.
    pub target: ValueType,
    /// Display form of the offending value.
    pub value: String,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot coerce {} to {}", self.value, self.target)
    }
}

impl std::error::Error for CoercionError {}

/// Runtime value.
///
/// `Double` is the internal expression width (intrinsics and exponent work
/// in double precision); it is never a declared type and never serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit binary float.
    Float(f32),
    /// UTF-8 string.
    Str(String),
    /// Double-precision intermediate.
    Double(f64),
}

impl Value {
    /// Returns the declared type this value naturally carries.
    ///
    /// `Double` reports `Float` since FLOAT is the nearest declarable type.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) | Self::Double(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
        }
    }

    /// Coerces into `target` using the fixed conversion table.
    ///
    /// - BOOL <-> INT: `false` <-> 0, `true` <-> non-zero (stored as 1).
    /// - INT -> FLOAT widens; FLOAT/Double -> INT truncates.
    /// - Anything -> STRING uses the display form.
    /// - STRING -> numeric/boolean is rejected (INPUT parses text instead).
    pub fn coerce(&self, target: ValueType) -> Result<Value, CoercionError> {
        let reject = || CoercionError {
            target,
            value: self.to_string(),
        };

        Ok(match target {
            ValueType::Bool => Value::Bool(match self {
                Self::Bool(b) => *b,
                Self::Int(n) => *n != 0,
                Self::Float(x) => *x != 0.0,
                Self::Double(x) => *x != 0.0,
                Self::Str(_) => return Err(reject()),
            }),
            ValueType::Int => Value::Int(match self {
                Self::Bool(b) => i32::from(*b),
                Self::Int(n) => *n,
                Self::Float(x) => *x as i32,
                Self::Double(x) => *x as i32,
                Self::Str(_) => return Err(reject()),
            }),
            ValueType::Float => Value::Float(match self {
                Self::Bool(b) => f32::from(u8::from(*b)),
                Self::Int(n) => *n as f32,
                Self::Float(x) => *x,
                Self::Double(x) => *x as f32,
                Self::Str(_) => return Err(reject()),
            }),
            ValueType::Str => Value::Str(self.to_string()),
        })
    }

    /// Widens into the double-precision intermediate form.
    pub fn as_double(&self) -> Result<f64, CoercionError> {
        match self {
            Self::Bool(b) => Ok(f64::from(u8::from(*b))),
            Self::Int(n) => Ok(f64::from(*n)),
            Self::Float(x) => Ok(f64::from(*x)),
            Self::Double(x) => Ok(*x),
            Self::Str(_) => Err(CoercionError {
                target: ValueType::Float,
                value: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Double(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Storage shape of a variable cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellSlot {
    /// Plain stored value.
    Immediate(Value),
    /// Reads another local variable lazily. The id may name an imported
    /// symbol, in which case the owning context resolves it further.
    Linked(u32),
    /// Precompiled expression plus its memoized last-computed value.
    Expr {
        /// Compiled tree, retained for re-evaluation on re-assignment.
        tree: ExprNode,
        /// Last computed value, already coerced to the declared type.
        last: Value,
    },
}

/// One variable cell in a context's data segment.
#[derive(Debug, Clone, PartialEq)]
pub struct VarCell {
    /// Declared type; every read coerces into it.
    pub ty: ValueType,
    /// Storage.
    pub slot: CellSlot,
}

impl VarCell {
    /// Creates an immediate cell, coercing the value to the declared type.
    pub fn immediate(ty: ValueType, value: Value) -> Result<Self, CoercionError> {
        Ok(Self {
            ty,
            slot: CellSlot::Immediate(value.coerce(ty)?),
        })
    }

    /// Creates a linked cell.
    pub fn linked(ty: ValueType, target: u32) -> Self {
        Self {
            ty,
            slot: CellSlot::Linked(target),
        }
    }

    /// Creates an expression cell with its freshly computed value.
    pub fn expression(ty: ValueType, tree: ExprNode, value: Value) -> Result<Self, CoercionError> {
        let last = value.coerce(ty)?;
        Ok(Self {
            ty,
            slot: CellSlot::Expr { tree, last },
        })
    }
}

/// Runtime descriptor of a registered procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcDescriptor {
    /// Context that owns the procedure body.
    pub context_id: u32,
    /// Procedure id local to that context.
    pub proc_id: u32,
    /// Instruction index of the body's first instruction.
    pub start: u32,
}
