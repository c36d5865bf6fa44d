use crate::helpers::{run_modules, run_script};

#[test]
fn write_of_an_immediate_variable() {
    let output = run_script("SET x, 5: INT\nWRITE x\n", &[]).expect("run");
    assert_eq!(output, vec!["5"]);
}

#[test]
fn expression_assignment_respects_precedence() {
    let output = run_script("SET x, (2+3*4): INT\nWRITE x\n", &[]).expect("run");
    assert_eq!(output, vec!["14"]);
}

#[test]
fn double_negative_collapses() {
    let output = run_script("SET x, (-(-2)): INT\nWRITE x\n", &[]).expect("run");
    assert_eq!(output, vec!["2"]);
}

#[test]
fn recursive_factorial_through_call_and_ret() {
    let program = "\
SET digit, 5: INT
SET fact_return, 1: INT
DEFINE factorial
SET fact_return, (fact_return * digit): INT
SET digit, (digit - 1): INT
IF (digit > 0) :
CALL factorial
END
END
CALL factorial
WRITE fact_return
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["120"]);
}

#[test]
fn include_executes_at_load_time_and_shares_state() {
    let lib = "\
WRITE \"lib loading\"
DEFINE g
WRITE \"g ran\"
END
SET k, 7: INT
";
    let main = "%include% lib.txt\nWRITE k\n";
    let output = run_modules(&[("main.txt", main), ("lib.txt", lib)], &[]).expect("run");
    // The include's WRITE fires during load, before main's first
    // instruction.
    assert_eq!(output, vec!["lib loading", "7"]);
}

#[test]
fn inline_if_takes_the_true_arm() {
    let program = "\
SET a, 3: INT
SET b, 4: INT
IF (a<b): SET r, 1: INT ? SET r, 0: INT
WRITE r
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["1"]);
}

#[test]
fn inline_if_takes_the_false_arm() {
    let program = "\
SET a, 4: INT
SET b, 3: INT
IF (a<b): SET r, 1: INT ? SET r, 0: INT
WRITE r
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["0"]);
}

#[test]
fn block_if_with_else_marker() {
    let program = "\
SET a, FALSE: BOOL
IF a :
WRITE \"then\"
END ?
WRITE \"else\"
END
WRITE \"after\"
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["else", "after"]);
}

#[test]
fn jump_skips_lines() {
    let program = "\
JUMP 3
WRITE \"skipped\"
WRITE \"landed\"
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["landed"]);
}

#[test]
fn input_parses_per_declared_type() {
    let program = "\
INPUT x INT
SET y, (x+1): INT
WRITE y
";
    let output = run_script(program, &["41"]).expect("run");
    assert_eq!(output, vec!["42"]);
}

#[test]
fn float_input_accepts_a_comma_separator() {
    let output = run_script("INPUT f FLOAT\nWRITE f\n", &["2,5"]).expect("run");
    assert_eq!(output, vec!["2.5"]);
}

#[test]
fn float_output_uses_a_decimal_point() {
    let output = run_script("SET f, 2.5: FLOAT\nWRITE f\n", &[]).expect("run");
    assert_eq!(output, vec!["2.5"]);
}

#[test]
fn linked_cells_read_through_lazily() {
    let program = "\
SET a, 1: INT
SET b, a: INT
SET a, 9: INT
WRITE b
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["9"]);
}

#[test]
fn write_string_variables() {
    let program = "SET s, \"hello\": STRING\nWRITE s\nWRITE \"bye\"\n";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["hello", "bye"]);
}

#[test]
fn procedures_communicate_through_shared_variables() {
    let program = "\
SET n, 0: INT
DEFINE bump
SET n, (n + 10): INT
END
CALL bump
CALL bump
WRITE n
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["20"]);
}

#[test]
fn hot_redefine_replaces_a_procedure() {
    let program = "\
DEFINE greet
WRITE \"old\"
END
CALL greet
DEFINE greet
WRITE \"new\"
END
CALL greet
";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["old", "new"]);
}

#[test]
fn intrinsics_run_end_to_end() {
    let program = "SET x, (max2(sqrt(81); 5)): INT\nWRITE x\n";
    let output = run_script(program, &[]).expect("run");
    assert_eq!(output, vec!["9"]);
}
