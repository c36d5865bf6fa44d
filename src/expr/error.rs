//! Expression compiler and evaluator error contracts.

use std::fmt;

/// Stable expression-compile error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprErrorKind {
    /// Token stream is malformed (unbalanced parens, dangling operator).
    Syntax,
    /// An identifier survived name finalization and matches no intrinsic
    /// or constant.
    UnknownName,
    /// An operand's type is outside the operator's allowable set.
    OperandType,
    /// An intrinsic call has the wrong argument count.
    Arity,
}

/// Expression-compile error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError {
    /// Error category.
    pub kind: ExprErrorKind,
    /// Human-readable error summary.
    pub message: String,
}

impl ExprError {
    /// Creates an expression error.
    pub fn new(kind: ExprErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a `Syntax` error.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ExprErrorKind::Syntax, message)
    }

    /// Creates an `UnknownName` error.
    pub fn unknown_name(name: &str) -> Self {
        Self::new(
            ExprErrorKind::UnknownName,
            format!("unknown name in expression: {name}"),
        )
    }

    /// Creates an `OperandType` error.
    pub fn operand_type(message: impl Into<String>) -> Self {
        Self::new(ExprErrorKind::OperandType, message)
    }

    /// Creates an `Arity` error.
    pub fn arity(name: &str, expected: &str, got: usize) -> Self {
        Self::new(
            ExprErrorKind::Arity,
            format!("{name} expects {expected} argument(s), got {got}"),
        )
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExprError {}

/// Stable evaluation error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Integer or float division/modulo by zero.
    DivisionByZero,
    /// Operand value does not fit the operator at runtime.
    TypeMismatch,
    /// A variable fetch could not be satisfied.
    Undefined,
}

/// Evaluation error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    /// Error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl EvalError {
    /// Creates an evaluation error.
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a `DivisionByZero` error.
    pub fn division_by_zero() -> Self {
        Self::new(EvalErrorKind::DivisionByZero, "division by zero")
    }

    /// Creates a `TypeMismatch` error.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::TypeMismatch, message)
    }

    /// Creates an `Undefined` error for a variable id.
    pub fn undefined(id: u32) -> Self {
        Self::new(
            EvalErrorKind::Undefined,
            format!("variable @{id} is not defined"),
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}
