//! Tree evaluator with evaluation-time numeric promotion.

use crate::expr::error::EvalError;
use crate::expr::node::{BinaryOp, ExprNode, UnaryOp};
use crate::expr::typing::Width;
use crate::value::Value;

/// Variable-fetch seam between the evaluator and its host.
pub trait VarResolver {
    /// Returns the current value of a variable by local id.
    fn fetch(&self, id: u32) -> Result<Value, EvalError>;
}

/// Resolver for expressions known to contain no variable references.
pub struct NoVars;

impl VarResolver for NoVars {
    fn fetch(&self, id: u32) -> Result<Value, EvalError> {
        Err(EvalError::undefined(id))
    }
}

/// Evaluates a compiled tree against a variable resolver.
pub fn evaluate(node: &ExprNode, vars: &dyn VarResolver) -> Result<Value, EvalError> {
    match node {
        ExprNode::Literal(value) => Ok(value.clone()),
        ExprNode::Fetch(id) => vars.fetch(*id),
        ExprNode::Cast { target, inner } => cast(evaluate(inner, vars)?, *target),
        ExprNode::Unary { op, operand } => unary(*op, evaluate(operand, vars)?),
        ExprNode::Binary { op, left, right } => {
            binary(*op, evaluate(left, vars)?, evaluate(right, vars)?)
        }
        ExprNode::Call { intrinsic, args } => {
            let mut doubles = Vec::with_capacity(args.len());
            for arg in args {
                doubles.push(as_double(&evaluate(arg, vars)?)?);
            }
            Ok(Value::Double(intrinsic.apply(&doubles)))
        }
    }
}

fn as_double(value: &Value) -> Result<f64, EvalError> {
    value
        .as_double()
        .map_err(|err| EvalError::type_mismatch(err.to_string()))
}

fn truthy(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(n) => Ok(*n != 0),
        Value::Float(x) => Ok(*x != 0.0),
        Value::Double(x) => Ok(*x != 0.0),
        Value::Str(_) => Err(EvalError::type_mismatch(
            "string has no boolean interpretation",
        )),
    }
}

fn as_int(value: &Value) -> Result<i32, EvalError> {
    match value {
        Value::Bool(b) => Ok(i32::from(*b)),
        Value::Int(n) => Ok(*n),
        Value::Float(x) => Ok(*x as i32),
        Value::Double(x) => Ok(*x as i32),
        Value::Str(_) => Err(EvalError::type_mismatch(
            "string has no integer interpretation",
        )),
    }
}

fn cast(value: Value, target: Width) -> Result<Value, EvalError> {
    Ok(match target {
        Width::Bool => Value::Bool(truthy(&value)?),
        Width::Int => Value::Int(as_int(&value)?),
        Width::Float => Value::Float(as_double(&value)? as f32),
        Width::Double => Value::Double(as_double(&value)?),
    })
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!truthy(&value)?)),
        UnaryOp::Neg => Ok(match value {
            Value::Bool(b) => Value::Int(-i32::from(b)),
            Value::Int(n) => Value::Int(n.wrapping_neg()),
            Value::Float(x) => Value::Float(-x),
            Value::Double(x) => Value::Double(-x),
            Value::Str(_) => {
                return Err(EvalError::type_mismatch("cannot negate a string"));
            }
        }),
    }
}

/// Promoted operand pair, by the wider actual width.
enum NumPair {
    Int(i32, i32),
    Float(f32, f32),
    Double(f64, f64),
}

fn promote(left: &Value, right: &Value) -> Result<NumPair, EvalError> {
    let rank = |v: &Value| match v {
        Value::Bool(_) | Value::Int(_) => 1,
        Value::Float(_) => 2,
        Value::Double(_) => 3,
        Value::Str(_) => 0,
    };
    if rank(left) == 0 || rank(right) == 0 {
        return Err(EvalError::type_mismatch(
            "string operand in numeric operation",
        ));
    }

    Ok(match rank(left).max(rank(right)) {
        3 => NumPair::Double(as_double(left)?, as_double(right)?),
        2 => NumPair::Float(as_double(left)? as f32, as_double(right)? as f32),
        _ => NumPair::Int(as_int(left)?, as_int(right)?),
    })
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => Ok(Value::Bool(truthy(&left)? && truthy(&right)?)),
        BinaryOp::Or => Ok(Value::Bool(truthy(&left)? || truthy(&right)?)),

        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let ordering = match promote(&left, &right)? {
                NumPair::Int(a, b) => a.partial_cmp(&b),
                NumPair::Float(a, b) => a.partial_cmp(&b),
                NumPair::Double(a, b) => a.partial_cmp(&b),
            };
            let result = match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Eq, Some(ord)) => ord.is_eq(),
                (BinaryOp::Ne, Some(ord)) => ord.is_ne(),
                (BinaryOp::Lt, Some(ord)) => ord.is_lt(),
                (BinaryOp::Gt, Some(ord)) => ord.is_gt(),
                (BinaryOp::Le, Some(ord)) => ord.is_le(),
                (BinaryOp::Ge, Some(ord)) => ord.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }

        BinaryOp::Add => Ok(match promote(&left, &right)? {
            NumPair::Int(a, b) => Value::Int(a.wrapping_add(b)),
            NumPair::Float(a, b) => Value::Float(a + b),
            NumPair::Double(a, b) => Value::Double(a + b),
        }),
        BinaryOp::Sub => Ok(match promote(&left, &right)? {
            NumPair::Int(a, b) => Value::Int(a.wrapping_sub(b)),
            NumPair::Float(a, b) => Value::Float(a - b),
            NumPair::Double(a, b) => Value::Double(a - b),
        }),
        BinaryOp::Mul => Ok(match promote(&left, &right)? {
            NumPair::Int(a, b) => Value::Int(a.wrapping_mul(b)),
            NumPair::Float(a, b) => Value::Float(a * b),
            NumPair::Double(a, b) => Value::Double(a * b),
        }),
        BinaryOp::Div => match promote(&left, &right)? {
            NumPair::Int(_, 0) => Err(EvalError::division_by_zero()),
            NumPair::Int(a, b) => Ok(Value::Int(a.wrapping_div(b))),
            NumPair::Float(_, b) if b == 0.0 => Err(EvalError::division_by_zero()),
            NumPair::Float(a, b) => Ok(Value::Float(a / b)),
            NumPair::Double(_, b) if b == 0.0 => Err(EvalError::division_by_zero()),
            NumPair::Double(a, b) => Ok(Value::Double(a / b)),
        },
        BinaryOp::Rem => match promote(&left, &right)? {
            NumPair::Int(_, 0) => Err(EvalError::division_by_zero()),
            NumPair::Int(a, b) => Ok(Value::Int(a.wrapping_rem(b))),
            NumPair::Float(_, b) if b == 0.0 => Err(EvalError::division_by_zero()),
            NumPair::Float(a, b) => Ok(Value::Float(a % b)),
            NumPair::Double(_, b) if b == 0.0 => Err(EvalError::division_by_zero()),
            NumPair::Double(a, b) => Ok(Value::Double(a % b)),
        },

        BinaryOp::Pow => Ok(Value::Double(as_double(&left)?.powf(as_double(&right)?))),

        BinaryOp::Shl => Ok(Value::Int(
            as_int(&left)?.wrapping_shl(as_int(&right)? as u32),
        )),
        BinaryOp::Shr => Ok(Value::Int(
            as_int(&left)?.wrapping_shr(as_int(&right)? as u32),
        )),
    }
}
