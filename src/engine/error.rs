//! Execution engine error contracts.

use std::fmt;

use crate::build::BuildError;
use crate::expr::{EvalError, EvalErrorKind, ExprError};
use crate::module::FormatError;
use crate::value::CoercionError;

/// Stable engine error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// A module file or the console could not be read or written.
    Io,
    /// The binary module's bytes do not decode.
    MalformedModule,
    /// A module referenced by an include had to be packed and failed.
    Pack,
    /// A variable or procedure id resolves to nothing at runtime.
    UndefinedObject,
    /// A value did not fit where an instruction needed it.
    TypeMismatch,
    /// Division by zero or other arithmetic failure.
    Arithmetic,
    /// Console input did not parse as the declared type.
    InputParse,
    /// RET with an empty return stack.
    ReturnStackUnderflow,
    /// A jump or branch target is outside the code segment.
    InvalidJumpTarget,
    /// A context id resolves to no loaded context.
    UnknownContext,
}

/// Engine error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Error category.
    pub kind: EngineErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl EngineError {
    /// Creates an engine error.
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an `Io` error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Io, message)
    }

    /// Creates an `UndefinedObject` error.
    pub fn undefined_object(module: &str, what: &str, id: u32) -> Self {
        Self::new(
            EngineErrorKind::UndefinedObject,
            format!("{module}: {what} {id} is not defined"),
        )
    }

    /// Creates a `ReturnStackUnderflow` error.
    pub fn return_stack_underflow() -> Self {
        Self::new(
            EngineErrorKind::ReturnStackUnderflow,
            "RET with an empty return stack",
        )
    }

    /// Creates an `InvalidJumpTarget` error.
    pub fn invalid_jump_target(target: i32) -> Self {
        Self::new(
            EngineErrorKind::InvalidJumpTarget,
            format!("jump target {target} is outside the code segment"),
        )
    }

    /// Creates an `InputParse` error.
    pub fn input_parse(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::InputParse, message)
    }

    /// Creates an `UnknownContext` error.
    pub fn unknown_context(id: u32) -> Self {
        Self::new(
            EngineErrorKind::UnknownContext,
            format!("context {id} is not loaded"),
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<FormatError> for EngineError {
    fn from(err: FormatError) -> Self {
        Self::new(EngineErrorKind::MalformedModule, err.to_string())
    }
}

impl From<ExprError> for EngineError {
    fn from(err: ExprError) -> Self {
        Self::new(
            EngineErrorKind::MalformedModule,
            format!("embedded expression does not compile: {err}"),
        )
    }
}

impl From<EvalError> for EngineError {
    fn from(err: EvalError) -> Self {
        let kind = match err.kind {
            EvalErrorKind::DivisionByZero => EngineErrorKind::Arithmetic,
            EvalErrorKind::TypeMismatch => EngineErrorKind::TypeMismatch,
            EvalErrorKind::Undefined => EngineErrorKind::UndefinedObject,
        };
        Self::new(kind, err.message)
    }
}

impl From<CoercionError> for EngineError {
    fn from(err: CoercionError) -> Self {
        Self::new(EngineErrorKind::TypeMismatch, err.to_string())
    }
}

impl From<BuildError> for EngineError {
    fn from(err: BuildError) -> Self {
        Self::new(EngineErrorKind::Pack, err.message)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
