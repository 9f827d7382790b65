mod common;

use aks::interpreter::RuntimeError;
use aks::{Error, Value};
use common::{num, run, run_err, string};

// ==========================================
// Arithmetic
// ==========================================

#[test]
fn test_precedence() {
    assert_eq!(run("2 + 3 * 4"), num(14.0));
    assert_eq!(run("(2 + 3) * 4"), num(20.0));
    assert_eq!(run("10 - 4 - 3"), num(3.0));
    assert_eq!(run("24 / 4 / 2"), num(3.0));
}

#[test]
fn test_negation() {
    assert_eq!(run("-5 + 2"), num(-3.0));
    assert_eq!(run("bind x to 4\n-x * 2"), num(-8.0));
    assert_eq!(run("--3"), num(3.0));
}

#[test]
fn test_division_is_floating_point() {
    assert_eq!(run("1 / 4"), num(0.25));
}

#[test]
fn test_string_plus_is_type_error() {
    let err = run_err("\"a\" + \"b\"");
    assert!(matches!(err, Error::Runtime(RuntimeError::TypeError { .. })));
}

#[test]
fn test_number_plus_bool_is_type_error() {
    let err = run_err("1 + true");
    assert!(matches!(err, Error::Runtime(RuntimeError::TypeError { .. })));
}

#[test]
fn test_negating_string_is_type_error() {
    let err = run_err("-\"x\"");
    assert!(matches!(err, Error::Runtime(RuntimeError::TypeError { .. })));
}

// ==========================================
// Comparison
// ==========================================

#[test]
fn test_number_ordering() {
    assert_eq!(run("1 < 2"), Value::Bool(true));
    assert_eq!(run("2 <= 2"), Value::Bool(true));
    assert_eq!(run("3 > 4"), Value::Bool(false));
    assert_eq!(run("4 >= 5"), Value::Bool(false));
}

#[test]
fn test_string_ordering() {
    assert_eq!(run("\"apple\" < \"banana\""), Value::Bool(true));
    assert_eq!(run("\"b\" >= \"a\""), Value::Bool(true));
}

#[test]
fn test_mixed_ordering_is_type_error() {
    let err = run_err("1 < \"2\"");
    assert!(matches!(err, Error::Runtime(RuntimeError::TypeError { .. })));
}

#[test]
fn test_equality() {
    assert_eq!(run("1 == 1"), Value::Bool(true));
    assert_eq!(run("1 == \"1\""), Value::Bool(false));
    assert_eq!(run("\"a\" != \"b\""), Value::Bool(true));
    assert_eq!(run("[1, [2]] == [1, [2]]"), Value::Bool(true));
    assert_eq!(run("{a: 1} == {a: 2}"), Value::Bool(false));
    assert_eq!(run("null() == null()"), Value::Bool(true));
}

#[test]
fn test_comparison_binds_tighter_than_equality() {
    assert_eq!(run("1 < 2 == true"), Value::Bool(true));
}

// ==========================================
// Logic
// ==========================================

#[test]
fn test_and_or_return_operands() {
    assert_eq!(run("0 or \"fallback\""), string("fallback"));
    assert_eq!(run("\"first\" or \"second\""), string("first"));
    assert_eq!(run("1 and 2"), num(2.0));
    assert_eq!(run("[] and 2"), Value::list(vec![]));
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(run("true or false and false"), Value::Bool(true));
}

#[test]
fn test_not() {
    assert_eq!(run("not true"), Value::Bool(false));
    assert_eq!(run("not 0"), Value::Bool(true));
    assert_eq!(run("not \"\""), Value::Bool(true));
    assert_eq!(run("not {}"), Value::Bool(true));
    assert_eq!(run("not [0]"), Value::Bool(false));
}

#[test]
fn test_or_evaluates_right_operand() {
    let (result, output) = common::run_capturing("true or mirror(1)", "");
    assert_eq!(result.unwrap(), Value::Bool(true));
    assert_eq!(output, "1\n");
}

#[test]
fn test_and_evaluates_right_operand() {
    let err = run_err("false and 1 / 0");
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { .. })));
}
