use crate::helpers::{build_lines, decode_lines};
use rill::build::DiagnosticKind;
use rill::module::RawInstr;
use rill::value::{Value, ValueType};

#[test]
fn set_int_immediate_blob_bytes() {
    let result = build_lines(&["SET x, 5: INT"]);
    // opcode 1, INT tag 1; var id 0; value 5 little-endian.
    assert_eq!(result.code[0], vec![0x11, 0, 0, 0, 0, 5, 0, 0, 0]);
}

#[test]
fn write_literal_blob_bytes() {
    let result = build_lines(&["WRITE \"hi\""]);
    assert_eq!(result.code[0], vec![0xB0, 2, b'h', b'i']);
}

#[test]
fn blank_and_unrecognized_lines_compile_to_a_zero_byte() {
    let result = build_lines(&["", "   # comment only", "garbage here"]);
    assert_eq!(result.code[0], vec![0x00]);
    assert_eq!(result.code[1], vec![0x00]);
    assert_eq!(result.code[2], vec![0x00]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Parse);
}

#[test]
fn set_immediates_round_trip_per_type() {
    let code = decode_lines(&[
        "SET b, TRUE: BOOL",
        "SET i, -12: INT",
        "SET f, 2.5: FLOAT",
        "SET s, \"ab\": STRING",
    ]);
    assert_eq!(
        code[0],
        RawInstr::SetImmediate {
            var: 0,
            ty: ValueType::Bool,
            value: Value::Bool(true),
        }
    );
    assert_eq!(
        code[1],
        RawInstr::SetImmediate {
            var: 1,
            ty: ValueType::Int,
            value: Value::Int(-12),
        }
    );
    assert_eq!(
        code[2],
        RawInstr::SetImmediate {
            var: 2,
            ty: ValueType::Float,
            value: Value::Float(2.5),
        }
    );
    assert_eq!(
        code[3],
        RawInstr::SetImmediate {
            var: 3,
            ty: ValueType::Str,
            value: Value::Str("ab".into()),
        }
    );
}

#[test]
fn set_linked_defers_the_source_id() {
    let code = decode_lines(&["SET a, 1: INT", "SET b, a: INT"]);
    assert_eq!(
        code[1],
        RawInstr::SetLinked {
            var: 1,
            ty: ValueType::Int,
            target: 0,
        }
    );
}

#[test]
fn set_expression_records_the_placeholder() {
    let result = build_lines(&["SET x, (1+2): INT"]);
    // Build-time blob carries no expression yet; the post-pass appends it.
    let code = decode_lines(&["SET x, (1+2): INT"]);
    assert_eq!(
        code[0],
        RawInstr::SetExpr {
            var: 0,
            ty: ValueType::Int,
            expr: "(1+2)".into(),
        }
    );
    assert!(result.diagnostics.is_empty());
}

#[test]
fn input_carries_the_type_tag() {
    let code = decode_lines(&["INPUT x FLOAT"]);
    assert_eq!(
        code[0],
        RawInstr::Input {
            var: 0,
            ty: ValueType::Float,
        }
    );
}

#[test]
fn push_distinguishes_variables_from_procedures() {
    let code = decode_lines(&["SET x, 1: INT", "PUSH x"]);
    assert_eq!(
        code[1],
        RawInstr::Push {
            id: 0,
            procedure: false,
        }
    );

    let code = decode_lines(&["DEFINE g", "END", "PUSH g"]);
    assert_eq!(
        code[3],
        RawInstr::Push {
            id: 0,
            procedure: true,
        }
    );
}

#[test]
fn write_variable_resolves_by_id() {
    let code = decode_lines(&["SET x, 1: INT", "WRITE x"]);
    assert_eq!(code[1], RawInstr::WriteVar(0));
}

#[test]
fn trailing_comments_are_ignored() {
    let code = decode_lines(&["SET x, 3: INT # three"]);
    assert_eq!(
        code[0],
        RawInstr::SetImmediate {
            var: 0,
            ty: ValueType::Int,
            value: Value::Int(3),
        }
    );
}

#[test]
fn reserved_names_cannot_be_assigned() {
    let result = build_lines(&["SET pi, 1: INT"]);
    assert_eq!(result.code[0], vec![0x00]);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::Parse);
}

#[test]
fn every_program_ends_with_eof() {
    let code = decode_lines(&["WRITE \"x\""]);
    assert_eq!(code.last(), Some(&RawInstr::Eof));
}
