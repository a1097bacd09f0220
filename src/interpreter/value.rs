//! Runtime values

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{FuncDecl, StructDecl};
use crate::error::RuntimeError;
use crate::token::Token;

use super::environment::{Environment, ScopeKind};
use super::Interpreter;

/// Signature of functions implemented in Rust
pub type NativeFn = fn(&mut Interpreter, &[Value], &Token) -> Result<Value, RuntimeError>;

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Func(Rc<Function>),
    Native(Rc<NativeFunction>),
    Struct(Rc<StructDef>),
    Instance(Rc<Instance>),
    Module(Rc<Module>),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// `null` and `false` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Value equality for primitives, identity for heap values
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Func(func) => write!(f, "<func [{}]>", param_list(&func.decl.params)),
            Value::Native(native) => write!(f, "<native func {}>", native.name),
            Value::Struct(def) => write!(f, "{}", def),
            Value::Instance(instance) => write!(f, "instance of {}", instance.def),
            Value::Module(module) => write!(f, "<module {}>", module.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

fn param_list(params: &[Token]) -> String {
    params
        .iter()
        .map(|p| p.lexeme.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A user-defined closure
pub struct Function {
    pub decl: Rc<FuncDecl>,
    pub closure: Rc<Environment>,
}

impl Function {
    pub fn new(decl: Rc<FuncDecl>, closure: Rc<Environment>) -> Self {
        Self { decl, closure }
    }

    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    /// Method view of this function with `self` bound to `instance`
    pub fn bind(&self, instance: Rc<Instance>) -> Function {
        let env = Environment::child(&self.closure, ScopeKind::Block);
        env.define("self", Value::Instance(instance));
        Function::new(Rc::clone(&self.decl), env)
    }
}

pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: impl Into<String>, arity: usize, func: NativeFn) -> Self {
        Self {
            name: name.into(),
            arity,
            func,
        }
    }
}

/// A struct type; calling it builds an [`Instance`]
pub struct StructDef {
    pub decl: Rc<StructDecl>,
    pub closure: Rc<Environment>,
}

impl StructDef {
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }
}

impl fmt::Display for StructDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<struct [{}]>", param_list(&self.decl.params))
    }
}

pub struct Instance {
    pub def: Rc<StructDef>,
    fields: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(def: Rc<StructDef>) -> Self {
        Self {
            def,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }

    /// Read an attribute; functions come back bound to this instance
    pub fn get(this: &Rc<Self>, name: &Token) -> Result<Value, RuntimeError> {
        match this.field(&name.lexeme) {
            Some(Value::Func(func)) => Ok(Value::Func(Rc::new(func.bind(Rc::clone(this))))),
            Some(value) => Ok(value),
            None => Err(RuntimeError::new(
                name,
                format!("Undefined attribute '{}'.", name.lexeme),
            )),
        }
    }
}

/// A named bundle of native members, brought into scope with `import`
pub struct Module {
    pub name: String,
    members: HashMap<String, Value>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.members.insert(name.to_string(), value);
    }

    pub fn define_native(&mut self, name: &str, arity: usize, func: NativeFn) {
        let native = NativeFunction::new(name, arity, func);
        self.define(name, Value::Native(Rc::new(native)));
    }

    pub fn member(&self, name: &str) -> Option<Value> {
        self.members.get(name).cloned()
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.member(&name.lexeme).ok_or_else(|| {
            RuntimeError::new(
                name,
                format!("Module '{}' has no member '{}'.", self.name, name.lexeme),
            )
        })
    }

    #[cfg(test)]
    pub(crate) fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
