//! Infix expression compiler: parity normalization, precedence grouping,
//! and cast-policy application.

use crate::expr::error::ExprError;
use crate::expr::intrinsics::{self, Arity, Intrinsic};
use crate::expr::node::{BinaryOp, ExprNode, UnaryOp};
use crate::expr::token::{ExprToken, OpToken, tokenize};
use crate::expr::typing::{Width, apply_binary, apply_unary};
use crate::value::Value;

/// Compiles one finalized expression string into an evaluable tree.
///
/// The input has already been through name finalization, so variable
/// references appear as `@id`; the only bare identifiers left are
/// intrinsic and constant names.
pub fn compile(source: &str) -> Result<ExprNode, ExprError> {
    let tokens = normalize(tokenize(source)?);
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_and()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::syntax("trailing tokens after expression"));
    }
    Ok(node)
}

/// Collapses runs of consecutive `+`/`-` tokens into one sign by parity
/// (an even count of `-` yields `+`), and runs of `!` by parity (even
/// disappears, odd keeps a single `!`). Runs never cross parentheses
/// because a paren token breaks adjacency.
fn normalize(tokens: Vec<ExprToken>) -> Vec<ExprToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i] {
            ExprToken::Op(OpToken::Plus) | ExprToken::Op(OpToken::Minus) => {
                let mut minuses = 0usize;
                while i < tokens.len() {
                    match tokens[i] {
                        ExprToken::Op(OpToken::Minus) => minuses += 1,
                        ExprToken::Op(OpToken::Plus) => {}
                        _ => break,
                    }
                    i += 1;
                }
                out.push(ExprToken::Op(if minuses % 2 == 0 {
                    OpToken::Plus
                } else {
                    OpToken::Minus
                }));
            }
            ExprToken::Op(OpToken::Not) => {
                let mut nots = 0usize;
                while i < tokens.len() && tokens[i] == ExprToken::Op(OpToken::Not) {
                    nots += 1;
                    i += 1;
                }
                if nots % 2 == 1 {
                    out.push(ExprToken::Op(OpToken::Not));
                }
            }
            _ => {
                out.push(tokens[i].clone());
                i += 1;
            }
        }
    }

    out
}

struct Parser {
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<OpToken> {
        match self.peek() {
            Some(ExprToken::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn bump(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // Precedence groups, loosest first: `&&`, `||`, comparisons, additive,
    // unary, multiplicative, `^`, shifts.

    fn parse_and(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_or()?;
        while self.peek_op() == Some(OpToken::And) {
            self.pos += 1;
            let right = self.parse_or()?;
            left = apply_binary(BinaryOp::And, left, right)?;
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_comparison()?;
        while self.peek_op() == Some(OpToken::Or) {
            self.pos += 1;
            let right = self.parse_comparison()?;
            left = apply_binary(BinaryOp::Or, left, right)?;
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_op() {
                Some(OpToken::Eq) => BinaryOp::Eq,
                Some(OpToken::Ne) => BinaryOp::Ne,
                Some(OpToken::Lt) => BinaryOp::Lt,
                Some(OpToken::Gt) => BinaryOp::Gt,
                Some(OpToken::Le) => BinaryOp::Le,
                Some(OpToken::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_op() {
                Some(OpToken::Plus) => BinaryOp::Add,
                Some(OpToken::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    /// Prefix `-` and `!` bind looser than multiplication: `-a * b`
    /// negates the whole product.
    fn parse_unary(&mut self) -> Result<ExprNode, ExprError> {
        match self.peek_op() {
            Some(OpToken::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            Some(OpToken::Minus) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                apply_unary(UnaryOp::Neg, operand)
            }
            Some(OpToken::Not) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                apply_unary(UnaryOp::Not, operand)
            }
            _ => self.parse_multiplicative(),
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.peek_op() {
                Some(OpToken::Star) => BinaryOp::Mul,
                Some(OpToken::Slash) => BinaryOp::Div,
                Some(OpToken::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_power()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_power(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_shift()?;
        while self.peek_op() == Some(OpToken::Caret) {
            self.pos += 1;
            let right = self.parse_shift()?;
            left = apply_binary(BinaryOp::Pow, left, right)?;
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<ExprNode, ExprError> {
        let mut left = self.parse_atom()?;
        loop {
            let op = match self.peek_op() {
                Some(OpToken::Shl) => BinaryOp::Shl,
                Some(OpToken::Shr) => BinaryOp::Shr,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_atom()?;
            left = apply_binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<ExprNode, ExprError> {
        match self.bump() {
            Some(ExprToken::Number(text)) => parse_number(&text),
            Some(ExprToken::BoolLit(b)) => Ok(ExprNode::Literal(Value::Bool(b))),
            Some(ExprToken::VarRef(id)) => Ok(ExprNode::Fetch(id)),
            Some(ExprToken::Ident(name)) => self.parse_named(&name),
            Some(ExprToken::LParen) => {
                let inner = self.parse_and()?;
                match self.bump() {
                    Some(ExprToken::RParen) => Ok(inner),
                    _ => Err(ExprError::syntax("missing closing parenthesis")),
                }
            }
            Some(other) => Err(ExprError::syntax(format!(
                "operand expected, found {other:?}"
            ))),
            None => Err(ExprError::syntax("operand expected, found end of input")),
        }
    }

    fn parse_named(&mut self, name: &str) -> Result<ExprNode, ExprError> {
        if let Some(value) = intrinsics::constant(name) {
            return Ok(ExprNode::Literal(Value::Float(value)));
        }

        let Some(intrinsic) = Intrinsic::lookup(name) else {
            return Err(ExprError::unknown_name(name));
        };

        match self.bump() {
            Some(ExprToken::LParen) => {}
            _ => {
                return Err(ExprError::syntax(format!(
                    "intrinsic {name} must be followed by an argument list"
                )))
            }
        }

        let mut args = Vec::new();
        loop {
            args.push(self.parse_and()?);
            match self.bump() {
                Some(ExprToken::Semi) => continue,
                Some(ExprToken::RParen) => break,
                _ => {
                    return Err(ExprError::syntax(format!(
                        "unterminated argument list for {name}"
                    )))
                }
            }
        }

        check_arity(intrinsic, args.len())?;

        let args = args
            .into_iter()
            .map(|arg| ExprNode::Cast {
                target: Width::Double,
                inner: Box::new(arg),
            })
            .collect();

        Ok(ExprNode::Call { intrinsic, args })
    }
}

fn check_arity(intrinsic: Intrinsic, got: usize) -> Result<(), ExprError> {
    match intrinsic.arity() {
        Arity::Exact(n) if got == n => Ok(()),
        Arity::AtLeast(n) if got >= n => Ok(()),
        Arity::Exact(n) => Err(ExprError::arity(intrinsic.name(), &n.to_string(), got)),
        Arity::AtLeast(n) => Err(ExprError::arity(
            intrinsic.name(),
            &format!("at least {n}"),
            got,
        )),
    }
}

fn parse_number(text: &str) -> Result<ExprNode, ExprError> {
    if text.contains('.') {
        let value: f32 = text
            .parse()
            .map_err(|_| ExprError::syntax(format!("malformed float literal {text}")))?;
        Ok(ExprNode::Literal(Value::Float(value)))
    } else {
        let value: i32 = text
            .parse()
            .map_err(|_| ExprError::syntax(format!("integer literal {text} out of range")))?;
        Ok(ExprNode::Literal(Value::Int(value)))
    }
}
