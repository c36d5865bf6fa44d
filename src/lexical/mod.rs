//! Lexical rules for the line-oriented surface language.

mod command;
mod names;

pub use command::{Command, CondSource, Recognized, SetSource, recognize};
pub use names::{is_identifier, is_reserved, strip_comment};
