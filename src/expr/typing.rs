//! Operand typing: the numeric width lattice, per-operator descriptors,
//! and the cast policy applied between binary operands.

use crate::expr::error::ExprError;
use crate::expr::node::{BinaryOp, ExprNode, UnaryOp};
use crate::value::Value;

/// Numeric widths in promotion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    /// Boolean, the narrowest width.
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 32-bit float.
    Float,
    /// Double precision, the internal widest width.
    Double,
}

/// Compile-time type of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticType {
    /// Known numeric width.
    Concrete(Width),
    /// A variable fetch whose width is only known at evaluation time.
    Variable,
    /// String; participates in WRITE only, never in operators.
    Text,
}

/// Casting policy between the two operands of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastPolicy {
    /// Leave both operands alone.
    DoNotCast,
    /// Cast the left operand to the right operand's width.
    CastLeftToRight,
    /// Cast the right operand to the left operand's width.
    CastRightToLeft,
    /// Cast both operands to the narrower width.
    CastToMinimum,
    /// Cast both operands to the wider width.
    CastToMaximum,
}

/// What width a binary operator's result takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRule {
    /// The (common) operand width after casting.
    Operand,
    /// Always boolean.
    Bool,
}

/// Per-operator typing descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    /// When set, both operands are cast to this width unconditionally.
    pub preferred: Option<Width>,
    /// Policy applied when no preferred width is declared.
    pub policy: CastPolicy,
    /// Result width rule.
    pub result: ResultRule,
}

/// Returns the typing descriptor for a binary operator.
pub const fn spec_of(op: BinaryOp) -> OperatorSpec {
    match op {
        BinaryOp::And | BinaryOp::Or => OperatorSpec {
            preferred: Some(Width::Bool),
            policy: CastPolicy::DoNotCast,
            result: ResultRule::Bool,
        },
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => OperatorSpec {
            preferred: None,
            policy: CastPolicy::CastToMaximum,
            result: ResultRule::Bool,
        },
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            OperatorSpec {
                preferred: None,
                policy: CastPolicy::CastToMaximum,
                result: ResultRule::Operand,
            }
        }
        BinaryOp::Pow => OperatorSpec {
            preferred: Some(Width::Double),
            policy: CastPolicy::DoNotCast,
            result: ResultRule::Operand,
        },
        BinaryOp::Shl | BinaryOp::Shr => OperatorSpec {
            preferred: Some(Width::Int),
            policy: CastPolicy::DoNotCast,
            result: ResultRule::Operand,
        },
    }
}

/// Computes the compile-time type of a subtree.
pub fn static_type(node: &ExprNode) -> StaticType {
    match node {
        ExprNode::Literal(value) => match value {
            Value::Bool(_) => StaticType::Concrete(Width::Bool),
            Value::Int(_) => StaticType::Concrete(Width::Int),
            Value::Float(_) => StaticType::Concrete(Width::Float),
            Value::Double(_) => StaticType::Concrete(Width::Double),
            Value::Str(_) => StaticType::Text,
        },
        ExprNode::Fetch(_) => StaticType::Variable,
        ExprNode::Cast { target, .. } => StaticType::Concrete(*target),
        ExprNode::Unary { op, operand } => match op {
            UnaryOp::Not => StaticType::Concrete(Width::Bool),
            UnaryOp::Neg => static_type(operand),
        },
        ExprNode::Binary { op, left, right } => {
            let spec = spec_of(*op);
            match spec.result {
                ResultRule::Bool => StaticType::Concrete(Width::Bool),
                ResultRule::Operand => {
                    if let Some(width) = spec.preferred {
                        return StaticType::Concrete(width);
                    }
                    match (static_type(left), static_type(right)) {
                        (StaticType::Concrete(a), StaticType::Concrete(b)) => {
                            StaticType::Concrete(a.max(b))
                        }
                        (StaticType::Concrete(w), StaticType::Variable)
                        | (StaticType::Variable, StaticType::Concrete(w)) => {
                            StaticType::Concrete(w)
                        }
                        _ => StaticType::Variable,
                    }
                }
            }
        }
        ExprNode::Call { .. } => StaticType::Concrete(Width::Double),
    }
}

fn cast_to(node: ExprNode, target: Width) -> ExprNode {
    if static_type(&node) == StaticType::Concrete(target) {
        return node;
    }
    ExprNode::Cast {
        target,
        inner: Box::new(node),
    }
}

fn reject_text(op: BinaryOp, side: &ExprNode) -> Result<(), ExprError> {
    if static_type(side) == StaticType::Text {
        return Err(ExprError::operand_type(format!(
            "string operand is not allowed for {op:?}"
        )));
    }
    Ok(())
}

/// Builds a binary node with the operator's cast policy applied.
///
/// A variable fetch is never the cast target selector: against a concrete
/// operand the fetch side is cast to the concrete width; fetch against
/// fetch is left to evaluation-time promotion.
pub fn apply_binary(op: BinaryOp, left: ExprNode, right: ExprNode) -> Result<ExprNode, ExprError> {
    reject_text(op, &left)?;
    reject_text(op, &right)?;

    let spec = spec_of(op);
    let (left, right) = if let Some(width) = spec.preferred {
        (cast_to(left, width), cast_to(right, width))
    } else {
        match (static_type(&left), static_type(&right)) {
            (StaticType::Concrete(a), StaticType::Concrete(b)) => match spec.policy {
                CastPolicy::DoNotCast => (left, right),
                CastPolicy::CastLeftToRight => (cast_to(left, b), right),
                CastPolicy::CastRightToLeft => (left, cast_to(right, a)),
                CastPolicy::CastToMinimum => {
                    let w = a.min(b);
                    (cast_to(left, w), cast_to(right, w))
                }
                CastPolicy::CastToMaximum => {
                    let w = a.max(b);
                    (cast_to(left, w), cast_to(right, w))
                }
            },
            (StaticType::Variable, StaticType::Concrete(w)) => (cast_to(left, w), right),
            (StaticType::Concrete(w), StaticType::Variable) => (left, cast_to(right, w)),
            _ => (left, right),
        }
    };

    Ok(ExprNode::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Builds a unary node. `!` forces its operand to boolean width.
pub fn apply_unary(op: UnaryOp, operand: ExprNode) -> Result<ExprNode, ExprError> {
    if static_type(&operand) == StaticType::Text {
        return Err(ExprError::operand_type(format!(
            "string operand is not allowed for {op:?}"
        )));
    }
    let operand = match op {
        UnaryOp::Not => cast_to(operand, Width::Bool),
        UnaryOp::Neg => operand,
    };
    Ok(ExprNode::Unary {
        op,
        operand: Box::new(operand),
    })
}
