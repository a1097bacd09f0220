//! Lexical scopes

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::token::Token;

use super::value::Value;

/// What opened a scope. Function and global scopes bound assignment lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

pub struct Environment {
    kind: ScopeKind,
    values: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn global() -> Rc<Self> {
        Rc::new(Self {
            kind: ScopeKind::Global,
            values: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn child(parent: &Rc<Environment>, kind: ScopeKind) -> Rc<Self> {
        Rc::new(Self {
            kind,
            values: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Bind `name` in this scope, shadowing any outer binding
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.lookup(&name.lexeme).ok_or_else(|| {
            RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
        })
    }

    /// Rebind the nearest existing binding up to the enclosing function or
    /// global scope; otherwise define it here.
    pub fn assign(&self, name: &str, value: Value) {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(slot) = current.values.borrow_mut().get_mut(name) {
                *slot = value;
                return;
            }
            if current.kind != ScopeKind::Block {
                break;
            }
            scope = current.parent.as_deref();
        }
        self.define(name, value);
    }
}
