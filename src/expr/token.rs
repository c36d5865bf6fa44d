//! Expression tokenizer with longest-match operator scanning.

use crate::expr::error::ExprError;

/// Operator tokens, before precedence grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpToken {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    Not,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
}

/// One lexical unit of an expression string.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprToken {
    /// Unsigned numeric literal text (sign is an operator token).
    Number(String),
    /// `TRUE` / `FALSE`.
    BoolLit(bool),
    /// `@id` variable reference produced by name finalization.
    VarRef(u32),
    /// Bare identifier (intrinsic or constant name).
    Ident(String),
    /// Operator.
    Op(OpToken),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `;` intrinsic-argument separator.
    Semi,
}

/// Tokenizes one expression string.
///
/// Two-character operators win over their one-character prefixes, so `<<`
/// is scanned before `<` and `<=` before `<`.
pub fn tokenize(source: &str) -> Result<Vec<ExprToken>, ExprError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' => {
                pos += 1;
            }
            b'(' => {
                tokens.push(ExprToken::LParen);
                pos += 1;
            }
            b')' => {
                tokens.push(ExprToken::RParen);
                pos += 1;
            }
            b';' => {
                tokens.push(ExprToken::Semi);
                pos += 1;
            }
            b'@' => {
                let start = pos + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end == start {
                    return Err(ExprError::syntax("'@' must be followed by a variable id"));
                }
                let id: u32 = source[start..end]
                    .parse()
                    .map_err(|_| ExprError::syntax("variable id does not fit in 32 bits"))?;
                tokens.push(ExprToken::VarRef(id));
                pos = end;
            }
            b'0'..=b'9' | b'.' => {
                let start = pos;
                let mut seen_dot = false;
                while pos < bytes.len() {
                    match bytes[pos] {
                        b'0'..=b'9' => pos += 1,
                        b'.' if !seen_dot => {
                            seen_dot = true;
                            pos += 1;
                        }
                        _ => break,
                    }
                }
                tokens.push(ExprToken::Number(source[start..pos].to_string()));
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                let start = pos;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                let word = &source[start..pos];
                tokens.push(match word {
                    "TRUE" => ExprToken::BoolLit(true),
                    "FALSE" => ExprToken::BoolLit(false),
                    _ => ExprToken::Ident(word.to_string()),
                });
            }
            _ => {
                let (op, width) = scan_operator(&bytes[pos..]).ok_or_else(|| {
                    ExprError::syntax(format!("unexpected character {:?}", b as char))
                })?;
                tokens.push(ExprToken::Op(op));
                pos += width;
            }
        }
    }

    Ok(tokens)
}

fn scan_operator(rest: &[u8]) -> Option<(OpToken, usize)> {
    if rest.len() >= 2 {
        let two = match (rest[0], rest[1]) {
            (b'&', b'&') => Some(OpToken::And),
            (b'|', b'|') => Some(OpToken::Or),
            (b'=', b'=') => Some(OpToken::Eq),
            (b'!', b'=') => Some(OpToken::Ne),
            (b'<', b'=') => Some(OpToken::Le),
            (b'>', b'=') => Some(OpToken::Ge),
            (b'<', b'<') => Some(OpToken::Shl),
            (b'>', b'>') => Some(OpToken::Shr),
            _ => None,
        };
        if let Some(op) = two {
            return Some((op, 2));
        }
    }

    let one = match rest.first()? {
        b'<' => OpToken::Lt,
        b'>' => OpToken::Gt,
        b'+' => OpToken::Plus,
        b'-' => OpToken::Minus,
        b'!' => OpToken::Not,
        b'*' => OpToken::Star,
        b'/' => OpToken::Slash,
        b'%' => OpToken::Percent,
        b'^' => OpToken::Caret,
        _ => return None,
    };
    Some((one, 1))
}
