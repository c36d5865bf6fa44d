use rill::expr::{NoVars, compile, evaluate};
use rill::value::Value;

fn eval_const(source: &str) -> Value {
    let tree = compile(source).expect("expression should compile");
    evaluate(&tree, &NoVars).expect("expression should evaluate")
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(eval_const("(2+3*4)"), Value::Int(14));
    assert_eq!(eval_const("(2*3+4)"), Value::Int(10));
}

#[test]
fn additive_chains_are_left_associative() {
    assert_eq!(eval_const("(10-2-3)"), Value::Int(5));
}

#[test]
fn shifts_bind_tighter_than_addition() {
    assert_eq!(eval_const("(1<<2+1)"), Value::Int(5));
}

#[test]
fn exponent_works_in_double_width() {
    match eval_const("(2^10)") {
        Value::Double(x) => assert_eq!(x, 1024.0),
        other => panic!("expected a double, got {other:?}"),
    }
}

#[test]
fn unary_minus_binds_looser_than_exponent() {
    match eval_const("(-2^2)") {
        Value::Double(x) => assert_eq!(x, -4.0),
        other => panic!("expected a double, got {other:?}"),
    }
}

#[test]
fn logical_and_splits_before_or() {
    // `&&` is the loosest group, so the `||` side groups first.
    assert_eq!(eval_const("(TRUE && FALSE || TRUE)"), Value::Bool(true));
    assert_eq!(eval_const("(FALSE && TRUE || TRUE)"), Value::Bool(false));
}

#[test]
fn comparison_sees_full_additive_operands() {
    assert_eq!(eval_const("(1+2 == 3)"), Value::Bool(true));
    assert_eq!(eval_const("(2 >= 2)"), Value::Bool(true));
    assert_eq!(eval_const("(1 >= 2)"), Value::Bool(false));
}

#[test]
fn nested_parentheses_override_grouping() {
    assert_eq!(eval_const("((2+3)*4)"), Value::Int(20));
}

#[test]
fn dangling_operator_is_a_syntax_error() {
    assert!(compile("(1+)").is_err());
    assert!(compile("(1").is_err());
    assert!(compile("()").is_err());
}
