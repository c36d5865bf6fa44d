use std::collections::BTreeMap;

use rill::expr::{
    BinaryOp, EvalError, EvalErrorKind, ExprErrorKind, NoVars, StaticType, VarResolver, Width,
    apply_binary, compile, evaluate, static_type,
};
use rill::value::Value;

struct MapVars(BTreeMap<u32, Value>);

impl VarResolver for MapVars {
    fn fetch(&self, id: u32) -> Result<Value, EvalError> {
        self.0.get(&id).cloned().ok_or_else(|| EvalError::undefined(id))
    }
}

fn eval_const(source: &str) -> Value {
    evaluate(&compile(source).expect("compile"), &NoVars).expect("evaluate")
}

#[test]
fn mixed_int_float_promotes_to_float() {
    assert_eq!(eval_const("(1+2.5)"), Value::Float(3.5));
    let tree = compile("(1+2.5)").unwrap();
    assert_eq!(static_type(&tree), StaticType::Concrete(Width::Float));
}

#[test]
fn bool_operands_promote_to_int_for_arithmetic() {
    assert_eq!(eval_const("(TRUE+TRUE)"), Value::Int(2));
}

#[test]
fn shift_operands_cast_to_int() {
    assert_eq!(eval_const("(2.9<<1)"), Value::Int(4));
}

#[test]
fn logical_operands_cast_to_bool() {
    assert_eq!(eval_const("(1 && 0)"), Value::Bool(false));
    assert_eq!(eval_const("(3 || 0)"), Value::Bool(true));
}

#[test]
fn variable_fetch_casts_toward_the_concrete_side() {
    // @0 meets an INT literal, so the fetched float truncates.
    let tree = compile("(@0+1)").unwrap();
    let vars = MapVars(BTreeMap::from([(0, Value::Float(2.7))]));
    assert_eq!(evaluate(&tree, &vars).unwrap(), Value::Int(3));
}

#[test]
fn fetch_against_fetch_promotes_at_evaluation_time() {
    let tree = compile("(@0+@1)").unwrap();
    let vars = MapVars(BTreeMap::from([
        (0, Value::Int(1)),
        (1, Value::Float(0.5)),
    ]));
    assert_eq!(evaluate(&tree, &vars).unwrap(), Value::Float(1.5));
}

#[test]
fn division_by_zero_fails() {
    let err = evaluate(&compile("(1/0)").unwrap(), &NoVars).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    let err = evaluate(&compile("(1.5/0.0)").unwrap(), &NoVars).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    let err = evaluate(&compile("(7%0)").unwrap(), &NoVars).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn string_fetch_in_arithmetic_is_a_runtime_type_error() {
    let tree = compile("(@0+1)").unwrap();
    let vars = MapVars(BTreeMap::from([(0, Value::Str("oops".into()))]));
    let err = evaluate(&tree, &vars).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
}

#[test]
fn string_literal_operand_is_rejected_at_compile_time() {
    let err = apply_binary(
        BinaryOp::Add,
        rill::expr::ExprNode::Literal(Value::Str("a".into())),
        rill::expr::ExprNode::Literal(Value::Int(1)),
    )
    .unwrap_err();
    assert_eq!(err.kind, ExprErrorKind::OperandType);
}

#[test]
fn integer_division_truncates() {
    assert_eq!(eval_const("(7/2)"), Value::Int(3));
    assert_eq!(eval_const("(7%2)"), Value::Int(1));
}
