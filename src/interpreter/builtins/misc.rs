//! Length, null and introspection built-in functions.

use super::super::error::RuntimeError;
use super::super::evaluator::Interpreter;
use super::{require_args, BUILTINS};
use crate::value::Value;

pub fn builtin_len(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    require_args!(args, 1, "len");
    let length = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Mapping(map) => map.borrow().len(),
        other => {
            return Err(RuntimeError::type_error(format!(
                "object of type {} has no len()",
                other.type_name()
            )))
        }
    };
    Ok(Value::Number(length as f64))
}

pub fn builtin_null(_: &mut Interpreter, _: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Null)
}

/// Names of the visible non-function bindings.
pub fn builtin_whoami(interp: &mut Interpreter, _: &[Value]) -> Result<Value, RuntimeError> {
    let names = interp
        .current_env()
        .bindings()
        .into_iter()
        .filter(|(_, value)| !value.is_callable())
        .map(|(name, _)| Value::string(name))
        .collect();
    Ok(Value::list(names))
}

/// Names of every visible function, builtins included.
pub fn builtin_symbols(interp: &mut Interpreter, _: &[Value]) -> Result<Value, RuntimeError> {
    let names = interp
        .current_env()
        .bindings()
        .into_iter()
        .filter(|(_, value)| value.is_callable())
        .map(|(name, _)| Value::string(name))
        .collect();
    Ok(Value::list(names))
}

/// Ends the program with a status, 0 when none is given.
pub fn builtin_exit(_: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let code = match args.first() {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => *n as i32,
        Some(other) => {
            return Err(RuntimeError::type_error(format!(
                "exit() expects a whole number, got {} `{}`",
                other.type_name(),
                crate::format::repr(other)
            )))
        }
    };
    Err(RuntimeError::exit(code))
}

pub fn builtin_help(_: &mut Interpreter, _: &[Value]) -> Result<Value, RuntimeError> {
    let mut text = String::from("Available built-in functions:\n");
    for (name, _) in BUILTINS {
        text.push_str(&format!("- {}{}\n", name, usage(name)));
    }
    Ok(Value::string(text.trim_end()))
}

fn usage(name: &str) -> &'static str {
    match name {
        "print" => "(...): write values separated by spaces",
        "mirror" => "(...): echo each value and return the last",
        "input" => "(prompt): read a line of input",
        "len" => "(x): length of a string, list or mapping",
        "type" => "(x): type name",
        "str" | "int" | "float" | "bool" => "(x): conversion",
        "null" => "(): the null value",
        "whoami" => "(): names of bound variables",
        "symbols" => "(): names of functions",
        "exit" => "(code): stop the program with an exit status",
        "help" => "(): this message",
        _ => "",
    }
}
