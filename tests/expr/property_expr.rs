//! Property tests for the expression pipeline using `proptest`.

use proptest::prelude::*;
use rill::expr::{NoVars, compile, evaluate};
use rill::value::Value;

fn eval_const(source: &str) -> Value {
    evaluate(&compile(source).expect("compile"), &NoVars).expect("evaluate")
}

proptest! {
    #[test]
    fn addition_matches_the_integer_model(a in -1000i32..1000, b in -1000i32..1000) {
        let source = format!("(({a})+({b}))");
        prop_assert_eq!(eval_const(&source), Value::Int(a + b));
    }

    #[test]
    fn multiplication_matches_the_integer_model(a in -100i32..100, b in -100i32..100) {
        let source = format!("(({a})*({b}))");
        prop_assert_eq!(eval_const(&source), Value::Int(a * b));
    }

    #[test]
    fn precedence_matches_the_model(a in 0i32..50, b in 0i32..50, c in 1i32..50) {
        let source = format!("({a}+{b}*{c})");
        prop_assert_eq!(eval_const(&source), Value::Int(a + b * c));
    }

    #[test]
    fn comparison_matches_the_model(a in -100i32..100, b in -100i32..100) {
        let source = format!("(({a})<({b}))");
        prop_assert_eq!(eval_const(&source), Value::Bool(a < b));
    }

    #[test]
    fn constant_expressions_evaluate_idempotently(a in -1000i32..1000, b in 1i32..1000) {
        let source = format!("(({a})*7-({b})%3)");
        let tree = compile(&source).expect("compile");
        let first = evaluate(&tree, &NoVars).expect("first evaluation");
        let second = evaluate(&tree, &NoVars).expect("second evaluation");
        prop_assert_eq!(first, second);
    }
}
