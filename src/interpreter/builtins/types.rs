//! Type inspection and conversion built-in functions.

use super::super::error::RuntimeError;
use super::super::evaluator::Interpreter;
use super::require_args;
use crate::format;
use crate::value::Value;

pub fn builtin_type(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "type");
    Ok(Value::string(args[0].type_name()))
}

pub fn builtin_str(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "str");
    Ok(Value::string(format::display(&args[0])))
}

pub fn builtin_int(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "int");
    match &args[0] {
        Value::Number(n) if n.is_finite() => Ok(Value::Number(n.trunc())),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n as f64))
            .map_err(|_| RuntimeError::conversion(format!("invalid literal for int(): \"{}\"", s))),
        other => Err(RuntimeError::conversion(format!(
            "cannot convert {} to an integer",
            other.type_name()
        ))),
    }
}

pub fn builtin_float(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "float");
    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| {
                RuntimeError::conversion(format!("could not convert string to float: \"{}\"", s))
            }),
        other => Err(RuntimeError::conversion(format!(
            "cannot convert {} to a float",
            other.type_name()
        ))),
    }
}

pub fn builtin_bool(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "bool");
    Ok(Value::Bool(args[0].is_truthy()))
}
