//! `rill`: a line-oriented scripting toolchain.
//!
//! Two stages: [`build::Compiler`] lowers a line-oriented source program
//! into a compact binary module, and [`engine::Engine`] loads such a
//! module into per-module execution contexts and interprets it.

pub mod build;
pub mod engine;
pub mod expr;
pub mod lexical;
pub mod module;
pub mod value;

pub use build::{Compiler, PackReport};
pub use engine::Engine;
