//! Input/output built-in functions. All traffic goes through the interpreter's
//! writer and reader so tests can capture it.

use super::super::error::RuntimeError;
use super::super::evaluator::Interpreter;
use crate::format;
use crate::value::Value;

pub fn builtin_print(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    let output: Vec<String> = args.iter().map(format::display).collect();
    interp.write_line(&output.join(" "))?;
    Ok(Value::Null)
}

/// Prints each argument on its own line and hands back the last one.
pub fn builtin_mirror(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    for arg in args {
        interp.write_line(&format::display(arg))?;
    }
    Ok(args.last().cloned().unwrap_or(Value::Null))
}

pub fn builtin_input(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    if let Some(prompt) = args.first() {
        interp.write(&format::display(prompt))?;
    }
    Ok(interp.read_line()?.map_or(Value::Null, Value::string))
}
