//! Infix expression compiler and evaluator.
//!
//! Source strings arrive with variable references already rewritten to
//! `@id` form by the post-pass; [`compile`] produces a typed tree with the
//! cast policy applied, and [`evaluate`] walks it against a
//! [`VarResolver`].

mod compile;
mod error;
mod eval;
mod intrinsics;
mod node;
mod token;
mod typing;

pub use compile::compile;
pub use error::{EvalError, EvalErrorKind, ExprError, ExprErrorKind};
pub use eval::{NoVars, VarResolver, evaluate};
pub use intrinsics::{Arity, Intrinsic, constant};
pub use node::{BinaryOp, ExprNode, UnaryOp};
pub use typing::{
    CastPolicy, OperatorSpec, ResultRule, StaticType, Width, apply_binary, apply_unary, spec_of,
    static_type,
};
