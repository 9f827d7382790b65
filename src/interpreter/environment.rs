use crate::interpreter::error::RuntimeError;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// One lexical scope: its own bindings plus a link to the enclosing scope.
///
/// Scopes are shared through `Rc` so that closures can keep their defining
/// environment alive after the block that created it has finished.
#[derive(Debug, Default)]
pub struct Environment {
    values: RefCell<IndexMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A fresh scope nested inside this one.
    pub fn child(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(IndexMap::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Insert or overwrite in this scope only, shadowing any outer binding.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    /// Overwrite the nearest existing binding of `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut scope = self;
        loop {
            if let Some(slot) = scope.values.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
            match scope.parent.as_deref() {
                Some(parent) => scope = parent,
                None => return Err(RuntimeError::undefined_variable(name)),
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        self.get(name)
            .ok_or_else(|| RuntimeError::undefined_variable(name))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.values.borrow().get(name) {
                return Some(value.clone());
            }
            scope = scope.parent.as_deref()?;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bindings of this scope alone, in definition order.
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        self.values
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Every visible binding, outermost scope first, with inner scopes taking precedence.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut chain = Vec::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            chain.push(current);
            scope = current.parent.as_deref();
        }

        let mut visible: IndexMap<String, Value> = IndexMap::new();
        for scope in chain.into_iter().rev() {
            for (name, value) in scope.values.borrow().iter() {
                visible.insert(name.clone(), value.clone());
            }
        }
        visible.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.lookup("x").unwrap(), Value::Number(42.0));
    }

    #[test]
    fn test_lookup_missing_is_name_error() {
        let env = Environment::new();
        assert!(matches!(
            env.lookup("nope"),
            Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn test_child_shadows_without_touching_parent() {
        let env = Environment::new();
        env.define("x", Value::Number(1.0));

        let inner = env.child();
        inner.define("x", Value::Number(2.0));
        assert_eq!(inner.lookup("x").unwrap(), Value::Number(2.0));
        assert_eq!(env.lookup("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let env = Environment::new();
        env.define("x", Value::Number(1.0));

        let inner = env.child();
        inner.assign("x", Value::Number(2.0)).unwrap();
        assert!(inner.local_bindings().is_empty());
        assert_eq!(env.lookup("x").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_assign_undeclared_fails() {
        let env = Environment::new();
        assert!(env.child().assign("y", Value::Number(1.0)).is_err());
        assert!(!env.contains("y"));
    }

    #[test]
    fn test_bindings_prefer_inner_scope() {
        let env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("b", Value::Number(2.0));
        let inner = env.child();
        inner.define("b", Value::Number(3.0));

        let bindings = inner.bindings();
        assert_eq!(bindings.len(), 2);
        assert!(bindings.contains(&("b".to_string(), Value::Number(3.0))));
        assert!(bindings.contains(&("a".to_string(), Value::Number(1.0))));
    }
}
