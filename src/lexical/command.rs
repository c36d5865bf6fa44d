//! Per-command shape recognizers.
//!
//! Each command has one canonical syntactic shape; [`recognize`] attempts
//! them in a fixed priority order and returns the first match. Lines that
//! match nothing are reported as such so the builder can emit a diagnostic
//! no-op and keep going.

use crate::lexical::names::{is_identifier, strip_comment};
use crate::value::ValueType;

/// Where a SET assignment takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetSource {
    /// Raw literal text, parsed against the declared type by the builder.
    Literal(String),
    /// Another variable, read lazily.
    Linked(String),
    /// Parenthesized expression text.
    Expression(String),
}

/// Condition operand of an IF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondSource {
    /// Variable by name.
    Var(String),
    /// Parenthesized expression text.
    Expression(String),
}

/// One recognized source command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET name , value : TYPE`
    Set {
        /// Target variable name.
        name: String,
        /// Value source.
        source: SetSource,
        /// Declared type.
        ty: ValueType,
    },
    /// `PUSH name`
    Push {
        /// Variable or procedure to discard.
        name: String,
    },
    /// `WRITE "literal"`
    WriteLiteral {
        /// Text between the quotes.
        text: String,
    },
    /// `WRITE name`
    WriteVar {
        /// Variable to print.
        name: String,
    },
    /// `INPUT name TYPE`
    Input {
        /// Target variable name.
        name: String,
        /// Parse type for the console line.
        ty: ValueType,
    },
    /// `JUMP line`
    Jump {
        /// 1-based source line number.
        line: u32,
    },
    /// `DEFINE name`
    Define {
        /// Procedure name.
        name: String,
    },
    /// `RET`
    Ret,
    /// `CALL name`
    Call {
        /// Procedure name.
        name: String,
    },
    /// `END`
    End,
    /// `IF cond :` (block form)
    IfBlock {
        /// Condition operand.
        cond: CondSource,
    },
    /// `END ?` (else marker)
    ElseMarker,
    /// `IF cond : left ? right` (inline form)
    IfInline {
        /// Condition operand.
        cond: CondSource,
        /// Command text of the true arm.
        left: String,
        /// Command text of the false arm, when present.
        right: Option<String>,
    },
    /// `%include% path`
    Include {
        /// Source or binary module path.
        path: String,
    },
}

/// Outcome of recognizing one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    /// The line matched a command shape.
    Command(Command),
    /// The line is blank or comment-only.
    Blank,
    /// The line is neither blank nor a known command shape.
    Unrecognized,
}

/// Recognizes one raw source line.
pub fn recognize(line: &str) -> Recognized {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Recognized::Blank;
    }

    let matchers: &[fn(&str) -> Option<Command>] = &[
        match_set,
        match_push,
        match_write,
        match_input,
        match_jump,
        match_define,
        match_ret,
        match_call,
        match_end,
        match_if,
        match_else_marker,
        match_include,
    ];

    for matcher in matchers {
        if let Some(command) = matcher(line) {
            return Recognized::Command(command);
        }
    }
    Recognized::Unrecognized
}

/// Strips a leading keyword followed by whitespace (or exact match).
fn keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    if rest.is_empty() {
        return Some(rest);
    }
    if rest.starts_with(char::is_whitespace) {
        return Some(rest.trim_start());
    }
    None
}

/// Finds the byte position of `needle` at paren depth zero, outside quotes.
fn find_top_level(text: &str, needle: u8, from_end: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut found = None;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_string = !in_string,
            b'(' if !in_string => depth += 1,
            b')' if !in_string => depth -= 1,
            _ if b == needle && !in_string && depth == 0 => {
                if !from_end {
                    return Some(i);
                }
                found = Some(i);
            }
            _ => {}
        }
    }
    found
}

fn match_set(line: &str) -> Option<Command> {
    let rest = keyword(line, "SET")?;
    let comma = find_top_level(rest, b',', false)?;
    let name = rest[..comma].trim();
    if !is_identifier(name) {
        return None;
    }

    let after = &rest[comma + 1..];
    let colon = find_top_level(after, b':', true)?;
    let value = after[..colon].trim();
    let ty = ValueType::parse_keyword(after[colon + 1..].trim())?;

    let source = classify_set_source(value)?;
    Some(Command::Set {
        name: name.to_string(),
        source,
        ty,
    })
}

fn classify_set_source(value: &str) -> Option<SetSource> {
    if value.is_empty() {
        return None;
    }
    if value.starts_with('(') {
        if !value.ends_with(')') {
            return None;
        }
        return Some(SetSource::Expression(value.to_string()));
    }
    if value == "TRUE" || value == "FALSE" {
        return Some(SetSource::Literal(value.to_string()));
    }
    if value.starts_with('"') {
        if value.len() < 2 || !value.ends_with('"') {
            return None;
        }
        return Some(SetSource::Literal(value.to_string()));
    }
    let numeric_start = value.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        || (value.len() > 1 && (value.starts_with('-') || value.starts_with('+')));
    if numeric_start {
        return Some(SetSource::Literal(value.to_string()));
    }
    if is_identifier(value) {
        return Some(SetSource::Linked(value.to_string()));
    }
    None
}

fn match_push(line: &str) -> Option<Command> {
    let name = keyword(line, "PUSH")?;
    is_identifier(name).then(|| Command::Push {
        name: name.to_string(),
    })
}

fn match_write(line: &str) -> Option<Command> {
    let rest = keyword(line, "WRITE")?;
    if let Some(body) = rest.strip_prefix('"') {
        let text = body.strip_suffix('"')?;
        return Some(Command::WriteLiteral {
            text: text.to_string(),
        });
    }
    is_identifier(rest).then(|| Command::WriteVar {
        name: rest.to_string(),
    })
}

fn match_input(line: &str) -> Option<Command> {
    let rest = keyword(line, "INPUT")?;
    let (name, ty_word) = rest.split_once(char::is_whitespace)?;
    let ty = ValueType::parse_keyword(ty_word.trim())?;
    is_identifier(name).then(|| Command::Input {
        name: name.to_string(),
        ty,
    })
}

fn match_jump(line: &str) -> Option<Command> {
    let rest = keyword(line, "JUMP")?;
    let line_no: u32 = rest.parse().ok()?;
    Some(Command::Jump { line: line_no })
}

fn match_define(line: &str) -> Option<Command> {
    let name = keyword(line, "DEFINE")?;
    is_identifier(name).then(|| Command::Define {
        name: name.to_string(),
    })
}

fn match_ret(line: &str) -> Option<Command> {
    (line == "RET").then_some(Command::Ret)
}

fn match_call(line: &str) -> Option<Command> {
    let name = keyword(line, "CALL")?;
    is_identifier(name).then(|| Command::Call {
        name: name.to_string(),
    })
}

fn match_end(line: &str) -> Option<Command> {
    (line == "END").then_some(Command::End)
}

fn match_else_marker(line: &str) -> Option<Command> {
    let rest = keyword(line, "END")?;
    (rest == "?").then_some(Command::ElseMarker)
}

fn match_if(line: &str) -> Option<Command> {
    let rest = keyword(line, "IF")?;
    let colon = find_top_level(rest, b':', false)?;
    let cond_text = rest[..colon].trim();

    let cond = if cond_text.starts_with('(') {
        cond_text
            .ends_with(')')
            .then(|| CondSource::Expression(cond_text.to_string()))?
    } else {
        is_identifier(cond_text).then(|| CondSource::Var(cond_text.to_string()))?
    };

    let body = rest[colon + 1..].trim();
    if body.is_empty() {
        return Some(Command::IfBlock { cond });
    }

    let (left, right) = match find_top_level(body, b'?', false) {
        Some(q) => {
            let right = body[q + 1..].trim();
            (
                body[..q].trim().to_string(),
                (!right.is_empty()).then(|| right.to_string()),
            )
        }
        None => (body.to_string(), None),
    };
    Some(Command::IfInline { cond, left, right })
}

fn match_include(line: &str) -> Option<Command> {
    let path = keyword(line, "%include%")?;
    if path.is_empty() {
        return None;
    }
    let lowered = path.to_ascii_lowercase();
    (lowered.ends_with(".txt") || lowered.ends_with(".bin")).then(|| Command::Include {
        path: path.to_string(),
    })
}
