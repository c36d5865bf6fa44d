//! Typed expression tree produced by the compiler and walked by the
//! evaluator.

use crate::expr::intrinsics::Intrinsic;
use crate::expr::typing::Width;
use crate::value::Value;

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation.
    Not,
}

/// Binary operators, one variant per surface operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
}

/// One node of a compiled expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Constant leaf.
    Literal(Value),
    /// Dynamic fetch of a variable by local id.
    Fetch(u32),
    /// Explicit widening/narrowing inserted by the cast policy.
    Cast {
        /// Numeric width the operand is forced into.
        target: Width,
        /// Operand being cast.
        inner: Box<ExprNode>,
    },
    /// Unary prefix application.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<ExprNode>,
    },
    /// Binary application.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<ExprNode>,
        /// Right operand.
        right: Box<ExprNode>,
    },
    /// Math intrinsic call.
    Call {
        /// Which intrinsic.
        intrinsic: Intrinsic,
        /// Arguments, already cast to double width.
        args: Vec<ExprNode>,
    },
}

impl ExprNode {
    /// Returns `true` when no `Fetch` leaf occurs anywhere in the tree.
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Fetch(_) => false,
            Self::Cast { inner, .. } => inner.is_constant(),
            Self::Unary { operand, .. } => operand.is_constant(),
            Self::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            Self::Call { args, .. } => args.iter().all(ExprNode::is_constant),
        }
    }
}
