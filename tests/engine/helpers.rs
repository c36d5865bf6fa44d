//! Shared fixtures for end-to-end engine tests.

use std::fs;
use std::path::Path;

use rill::build::Compiler;
use rill::engine::{BufferConsole, EngineError};
use rill::Engine;
use tempfile::TempDir;

/// Packs `main.txt` (plus any extra module files) into a tempdir and runs
/// it with scripted console input. Returns the captured output lines.
pub fn run_modules(
    modules: &[(&str, &str)],
    inputs: &[&str],
) -> Result<Vec<String>, EngineError> {
    let dir = TempDir::new().expect("tempdir");
    for (name, text) in modules {
        fs::write(dir.path().join(name), text).expect("write module source");
    }

    let source = dir.path().join("main.txt");
    let binary = dir.path().join("main.bin");
    let report = Compiler::new(dir.path())
        .pack(&source, &binary)
        .expect("pack should succeed");
    assert!(!report.has_errors(), "{:?}", report.diagnostics);

    run_binary(dir.path(), &binary, inputs)
}

/// Runs an already-packed binary with scripted console input.
pub fn run_binary(
    root: &Path,
    binary: &Path,
    inputs: &[&str],
) -> Result<Vec<String>, EngineError> {
    let (console, output) = BufferConsole::new(inputs.iter().copied());
    let mut engine = Engine::with_console(root, Box::new(console));
    engine.execute(binary)?;
    let lines = output.borrow().clone();
    Ok(lines)
}

/// Single-module convenience wrapper.
pub fn run_script(program: &str, inputs: &[&str]) -> Result<Vec<String>, EngineError> {
    run_modules(&[("main.txt", program)], inputs)
}
