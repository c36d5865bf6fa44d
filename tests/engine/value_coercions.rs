use rill::value::{Value, ValueType};

#[test]
fn bool_and_int_convert_both_ways() {
    assert_eq!(
        Value::Bool(true).coerce(ValueType::Int).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        Value::Bool(false).coerce(ValueType::Int).unwrap(),
        Value::Int(0)
    );
    assert_eq!(
        Value::Int(1).coerce(ValueType::Bool).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        Value::Int(0).coerce(ValueType::Bool).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn int_to_float_is_exact_below_two_to_the_24() {
    let n = (1 << 24) - 1;
    let Value::Float(x) = Value::Int(n).coerce(ValueType::Float).unwrap() else {
        panic!("expected a float");
    };
    assert_eq!(x as i32, n);
}

#[test]
fn float_to_int_truncates() {
    assert_eq!(
        Value::Float(2.9).coerce(ValueType::Int).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        Value::Float(-2.9).coerce(ValueType::Int).unwrap(),
        Value::Int(-2)
    );
}

#[test]
fn everything_formats_into_strings() {
    assert_eq!(
        Value::Int(42).coerce(ValueType::Str).unwrap(),
        Value::Str("42".into())
    );
    assert_eq!(
        Value::Float(2.5).coerce(ValueType::Str).unwrap(),
        Value::Str("2.5".into())
    );
    assert_eq!(
        Value::Bool(true).coerce(ValueType::Str).unwrap(),
        Value::Str("TRUE".into())
    );
}

#[test]
fn strings_do_not_coerce_to_numbers() {
    assert!(Value::Str("5".into()).coerce(ValueType::Int).is_err());
    assert!(Value::Str("x".into()).coerce(ValueType::Bool).is_err());
}

#[test]
fn storing_and_reading_back_preserves_semantics() {
    // BOOL <-> INT round trip through the declared type.
    let stored = Value::Int(1).coerce(ValueType::Bool).unwrap();
    assert_eq!(stored.coerce(ValueType::Int).unwrap(), Value::Int(1));

    // INT -> FLOAT -> INT below the exactness bound.
    let stored = Value::Int(123_456).coerce(ValueType::Float).unwrap();
    assert_eq!(stored.coerce(ValueType::Int).unwrap(), Value::Int(123_456));
}
