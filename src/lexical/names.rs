//! Identifier validation and the reserved-name test.

use crate::expr::{Intrinsic, constant};

/// Returns `true` for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns `true` for names a variable or procedure may not take:
/// boolean literals, intrinsic names, and math constants.
pub fn is_reserved(name: &str) -> bool {
    matches!(name, "TRUE" | "FALSE") || Intrinsic::lookup(name).is_some() || constant(name).is_some()
}

/// Splits off a trailing `#…` comment, honoring double quotes.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_string = !in_string,
            b'#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}
