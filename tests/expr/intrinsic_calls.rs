use rill::expr::{ExprErrorKind, NoVars, compile, evaluate};
use rill::value::Value;

fn eval_double(source: &str) -> f64 {
    match evaluate(&compile(source).expect("compile"), &NoVars).expect("evaluate") {
        Value::Double(x) => x,
        other => panic!("expected a double, got {other:?}"),
    }
}

#[test]
fn unary_intrinsics() {
    assert_eq!(eval_double("(abs(-7))"), 7.0);
    assert_eq!(eval_double("(sqrt(16))"), 4.0);
    assert_eq!(eval_double("(floor(2.7))"), 2.0);
    assert_eq!(eval_double("(ceiling(2.1))"), 3.0);
    assert!(eval_double("(sin(0))").abs() < 1e-12);
    assert_eq!(eval_double("(cos(0))"), 1.0);
    assert!(eval_double("(tan(0))").abs() < 1e-12);
}

#[test]
fn binary_and_reduction_intrinsics() {
    assert_eq!(eval_double("(min2(3; 1+1))"), 2.0);
    assert_eq!(eval_double("(max2(3; 5))"), 5.0);
    assert_eq!(eval_double("(minx(4; 1; 3))"), 1.0);
    assert_eq!(eval_double("(maxx(4; 1; 3))"), 4.0);
    assert_eq!(eval_double("(maxx(9))"), 9.0);
}

#[test]
fn intrinsic_results_compose_with_operators() {
    assert_eq!(eval_double("(sqrt(16)+1)"), 5.0);
    assert_eq!(eval_double("(min2(maxx(1; 8; 3); 10))"), 8.0);
}

#[test]
fn constants_substitute_as_float_literals() {
    match evaluate(&compile("(pi)").unwrap(), &NoVars).unwrap() {
        Value::Float(x) => assert!((x - std::f32::consts::PI).abs() < 1e-6),
        other => panic!("expected a float, got {other:?}"),
    }
    match evaluate(&compile("(e)").unwrap(), &NoVars).unwrap() {
        Value::Float(x) => assert!((x - std::f32::consts::E).abs() < 1e-6),
        other => panic!("expected a float, got {other:?}"),
    }
}

#[test]
fn wrong_arity_is_rejected() {
    assert_eq!(compile("(sqrt(1;2))").unwrap_err().kind, ExprErrorKind::Arity);
    assert_eq!(compile("(min2(1))").unwrap_err().kind, ExprErrorKind::Arity);
}

#[test]
fn unknown_names_are_rejected() {
    assert_eq!(
        compile("(bogus(1))").unwrap_err().kind,
        ExprErrorKind::UnknownName
    );
}
