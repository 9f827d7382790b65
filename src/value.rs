use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::format;
use crate::interpreter::environment::Environment;
use crate::interpreter::error::RuntimeError;
use crate::interpreter::evaluator::Interpreter;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Mapping(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(left_bool), Value::Bool(right_bool)) => left_bool == right_bool,
            (Value::Number(left_num), Value::Number(right_num)) => left_num == right_num,
            (Value::String(left_str), Value::String(right_str)) => left_str == right_str,
            (Value::List(left_list), Value::List(right_list)) => {
                Rc::ptr_eq(left_list, right_list) || left_list == right_list
            }
            (Value::Mapping(left_map), Value::Mapping(right_map)) => {
                Rc::ptr_eq(left_map, right_map) || left_map == right_map
            }
            (Value::Function(left_fn), Value::Function(right_fn)) => Rc::ptr_eq(left_fn, right_fn),
            (Value::Builtin(left_fn), Value::Builtin(right_fn)) => left_fn.name == right_fn.name,
            _ => false,
        }
    }
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn mapping(entries: IndexMap<String, Value>) -> Self {
        Value::Mapping(Rc::new(RefCell::new(entries)))
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(numeric_value) = self {
            Some(*numeric_value)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(string_ref) = self {
            Some(string_ref.as_ref())
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(bool_value) = self {
            Some(*bool_value)
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<Ref<'_, Vec<Value>>> {
        if let Value::List(list) = self {
            Some(list.borrow())
        } else {
            None
        }
    }

    pub fn as_mapping(&self) -> Option<Ref<'_, IndexMap<String, Value>>> {
        if let Value::Mapping(mapping) = self {
            Some(mapping.borrow())
        } else {
            None
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    /// Null, false, zero and empty strings/lists/mappings are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(list) => !list.borrow().is_empty(),
            Value::Mapping(mapping) => !mapping.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Mapping(_) => "Mapping",
            Value::Function(_) | Value::Builtin(_) => "Function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::display(self))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// A user-defined function closed over the environment it was declared in.
pub struct Function {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    pub body: Rc<Block>,
    pub closure: Rc<Environment>,
}

// The closure environment usually contains this very function, so it is left out.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub type NativeFn = fn(&mut Interpreter, &[Value]) -> Result<Value, RuntimeError>;

/// A host function installed in the root environment.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}
