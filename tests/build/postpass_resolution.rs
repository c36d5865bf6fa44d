use crate::helpers::{CannedInclude, build_lines, build_lines_with, decode};
use rill::build::{DiagnosticKind, ModuleBuilder, run_postpass};
use rill::module::{DataEntry, DataSegment, RawInstr};

fn lib_segment() -> DataSegment {
    DataSegment {
        entries: vec![
            DataEntry::local(false, 3, "k"),
            DataEntry::local(true, 1, "g"),
        ],
    }
}

#[test]
fn unresolved_names_get_id_zero_and_a_diagnostic() {
    let result = build_lines(&["WRITE nothere"]);
    assert_eq!(
        result
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Unresolved)
            .count(),
        1
    );
    let image = decode(&result);
    assert_eq!(image.code[0], RawInstr::WriteVar(0));
}

#[test]
fn imported_variables_synthesize_a_local_id() {
    let mut canned = CannedInclude(lib_segment());
    let result = build_lines_with(&["%include% lib.txt", "WRITE k"], &mut canned);
    assert!(result.diagnostics.is_empty());

    let image = decode(&result);
    assert_eq!(image.includes.len(), 1);
    assert_eq!(image.includes[0].path, "lib.txt");
    assert_eq!(image.code[0], RawInstr::WriteVar(0));

    let entry = image.data.find_variable("k").expect("k should be recorded");
    assert_eq!(entry.owner_include, Some(0));
    assert!(entry.intersections.is_empty());
}

#[test]
fn imported_procedures_synthesize_a_local_id() {
    let mut canned = CannedInclude(lib_segment());
    let result = build_lines_with(&["%include% lib.txt", "CALL g"], &mut canned);
    assert!(result.diagnostics.is_empty());

    let image = decode(&result);
    assert_eq!(image.code[0], RawInstr::Call(0));
    let entry = image
        .data
        .find_procedure("g")
        .expect("g should be recorded");
    assert_eq!(entry.owner_include, Some(0));
}

#[test]
fn owned_variables_meeting_in_includes_get_intersections() {
    let mut canned = CannedInclude(lib_segment());
    let result = build_lines_with(&["%include% lib.txt", "SET k, 1: INT"], &mut canned);

    let image = decode(&result);
    let entry = image.data.find_variable("k").expect("k should be recorded");
    assert_eq!(entry.owner_include, None);
    assert_eq!(entry.intersections, vec![(0, 3)]);
}

#[test]
fn expression_names_rewrite_to_id_references() {
    let result = build_lines(&["SET x, 1: INT", "SET y, (x + pi): FLOAT"]);
    let image = decode(&result);
    assert_eq!(
        image.code[1],
        RawInstr::SetExpr {
            var: 1,
            ty: rill::value::ValueType::Float,
            expr: "(@0 + pi)".into(),
        }
    );
}

#[test]
fn unknown_expression_names_become_id_zero() {
    let result = build_lines(&["SET x, (zilch): INT"]);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::Unresolved));
    let image = decode(&result);
    assert_eq!(
        image.code[0],
        RawInstr::SetExpr {
            var: 0,
            ty: rill::value::ValueType::Int,
            expr: "(@0)".into(),
        }
    );
}

#[test]
fn type_errors_in_expressions_abort_the_pack() {
    let mut builder = ModuleBuilder::new("test");
    builder
        .add_line("SET x, (sqrt(1;2)): INT", &mut crate::helpers::NoIncludes)
        .unwrap();
    let err = run_postpass(builder.finish()).unwrap_err();
    assert_eq!(err.kind, rill::build::BuildErrorKind::Type);
}

#[test]
fn reused_names_share_one_synthesized_import() {
    let mut canned = CannedInclude(lib_segment());
    let result = build_lines_with(
        &["%include% lib.txt", "WRITE k", "SET y, (k*2): INT"],
        &mut canned,
    );
    let image = decode(&result);
    // `y` took local id 0 during the walk; the import synthesizes id 1
    // once and both references share it.
    assert_eq!(image.code[1], RawInstr::WriteVar(1));
    assert_eq!(
        image.code[2],
        RawInstr::SetExpr {
            var: 0,
            ty: rill::value::ValueType::Int,
            expr: "(@1*2)".into(),
        }
    );
    // One imported entry, not two.
    assert_eq!(
        image
            .data
            .entries
            .iter()
            .filter(|entry| entry.name == "k")
            .count(),
        1
    );
}
