//! Environment for variable bindings

use super::value::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Environment holding variable bindings
#[derive(Debug, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Object>,
    /// Enclosing environment for lexical scoping
    outer: Option<EnvRef>,
}

impl Environment {
    /// Create a new global environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment enclosed by `outer`
    pub fn with_outer(outer: EnvRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind in this scope, shadowing any outer binding
    pub fn define(&mut self, name: impl Into<String>, value: Object) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable along the scope chain
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(outer) = &self.outer {
            outer.borrow().get(name)
        } else {
            None
        }
    }
}

/// Fresh top-level environment
pub fn new_environment() -> EnvRef {
    Environment::new().into_ref()
}

/// Child environment whose lookups fall back to `outer`
pub fn new_enclosed_environment(outer: &EnvRef) -> EnvRef {
    Environment::with_outer(Rc::clone(outer)).into_ref()
}
