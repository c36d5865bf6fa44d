//! Build error and diagnostic contracts.

use std::fmt;

use crate::expr::{ExprError, ExprErrorKind};
use crate::module::FormatError;

/// Stable build error categories. These abort packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// Source or output file could not be read or written.
    Io,
    /// An expression's operand types are outside its operator's allowable
    /// set.
    Type,
    /// An expression string is malformed beyond recovery.
    Expression,
    /// A value exceeded the wire format's limits.
    Encoding,
    /// An include could not be compiled or loaded.
    Include,
}

/// Build error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    /// Error category.
    pub kind: BuildErrorKind,
    /// Human-readable error summary.
    pub message: String,
}

impl BuildError {
    /// Creates a build error.
    pub fn new(kind: BuildErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an `Io` error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(BuildErrorKind::Io, message)
    }

    /// Creates an `Include` error.
    pub fn include(message: impl Into<String>) -> Self {
        Self::new(BuildErrorKind::Include, message)
    }

    /// Creates an `Encoding` error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(BuildErrorKind::Encoding, message)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BuildError {}

impl From<FormatError> for BuildError {
    fn from(err: FormatError) -> Self {
        Self::new(BuildErrorKind::Encoding, err.to_string())
    }
}

impl From<ExprError> for BuildError {
    fn from(err: ExprError) -> Self {
        let kind = match err.kind {
            ExprErrorKind::OperandType | ExprErrorKind::Arity => BuildErrorKind::Type,
            ExprErrorKind::Syntax | ExprErrorKind::UnknownName => BuildErrorKind::Expression,
        };
        Self::new(kind, err.message)
    }
}

/// Non-fatal diagnostic categories; packing continues past these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A non-blank line matched no command shape.
    Parse,
    /// A name resolved neither locally nor through any include.
    Unresolved,
}

/// One recoverable diagnostic, reported after packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Module base name the diagnostic belongs to.
    pub module: String,
    /// 1-based source line, when known.
    pub line: Option<u32>,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.module, line, self.message),
            None => write!(f, "{}: {}", self.module, self.message),
        }
    }
}
