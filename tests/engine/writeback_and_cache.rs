use std::fs;

use rill::build::Compiler;
use rill::engine::BufferConsole;
use rill::Engine;
use tempfile::TempDir;

use crate::helpers::run_modules;

#[test]
fn loading_the_same_module_twice_reuses_the_context() {
    let dir = TempDir::new().expect("tempdir");
    let source = dir.path().join("main.txt");
    fs::write(&source, "SET x, 1: INT\n").expect("write source");
    let binary = dir.path().join("main.bin");
    Compiler::new(dir.path())
        .pack(&source, &binary)
        .expect("pack");

    let mut engine = Engine::new(dir.path());
    let first = engine.load_module(&binary).expect("first load");
    let second = engine.load_module(&binary).expect("second load");
    assert_eq!(first, second);
    assert_eq!(engine.loaded_context("main"), Some(first));
}

#[test]
fn duplicate_includes_load_and_execute_once() {
    let lib = "WRITE \"side effect\"\nSET k, 7: INT\n";
    let main = "%include% lib.txt\n%include% lib.txt\nWRITE k\n";
    let output = run_modules(&[("main.txt", main), ("lib.txt", lib)], &[]).expect("run");
    assert_eq!(output, vec!["side effect", "7"]);
}

#[test]
fn call_into_an_include_writes_shared_state_back() {
    let lib = "\
SET counter, 0: INT
DEFINE bump
SET counter, (counter + 1): INT
END
";
    let main = "\
%include% lib.txt
SET counter, 10: INT
CALL bump
WRITE counter
";
    let output = run_modules(&[("main.txt", main), ("lib.txt", lib)], &[]).expect("run");
    // 10 flows into the include at CALL, 11 flows back at RET.
    assert_eq!(output, vec!["11"]);
}

#[test]
fn push_discards_a_variable_cell() {
    let dir = TempDir::new().expect("tempdir");
    let source = dir.path().join("main.txt");
    fs::write(&source, "SET x, 1: INT\nPUSH x\nWRITE x\n").expect("write source");
    let binary = dir.path().join("main.bin");
    Compiler::new(dir.path())
        .pack(&source, &binary)
        .expect("pack");

    let (console, _output) = BufferConsole::new(Vec::<String>::new());
    let mut engine = Engine::with_console(dir.path(), Box::new(console));
    let err = engine.execute(&binary).unwrap_err();
    assert_eq!(err.kind, rill::engine::EngineErrorKind::UndefinedObject);
}

#[test]
fn nested_includes_execute_leaf_first() {
    let inner = "WRITE \"inner\"\n";
    let middle = "%include% inner.txt\nWRITE \"middle\"\n";
    let main = "%include% middle.txt\nWRITE \"main\"\n";
    let output = run_modules(
        &[
            ("main.txt", main),
            ("middle.txt", middle),
            ("inner.txt", inner),
        ],
        &[],
    )
    .expect("run");
    assert_eq!(output, vec!["inner", "middle", "main"]);
}
