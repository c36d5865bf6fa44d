use rill::expr::{NoVars, compile, evaluate};
use rill::value::Value;

fn eval_const(source: &str) -> Value {
    let tree = compile(source).expect("expression should compile");
    evaluate(&tree, &NoVars).expect("expression should evaluate")
}

#[test]
fn double_negative_collapses() {
    assert_eq!(eval_const("(-(-2))"), Value::Int(2));
}

#[test]
fn sign_runs_collapse_by_parity() {
    assert_eq!(eval_const("(2--3)"), Value::Int(5));
    assert_eq!(eval_const("(2---3)"), Value::Int(-1));
    assert_eq!(eval_const("(2+-3)"), Value::Int(-1));
    assert_eq!(eval_const("(--2)"), Value::Int(2));
}

#[test]
fn negation_runs_collapse_by_parity() {
    assert_eq!(eval_const("(!TRUE)"), Value::Bool(false));
    assert_eq!(eval_const("(!!TRUE)"), Value::Bool(true));
    assert_eq!(eval_const("(!!!FALSE)"), Value::Bool(true));
}

#[test]
fn parentheses_break_sign_runs() {
    // The outer minus and the inner minus are separate regions.
    assert_eq!(eval_const("(1-(-2))"), Value::Int(3));
}
