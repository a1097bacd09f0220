//! Tree-walking interpreter
//!
//! Executes parsed statements directly. Every statement produces a value:
//! a block yields its last statement's value, and a function without an
//! explicit `return` yields the value of the last statement it ran.

mod environment;
pub mod stdlib;
mod value;

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ast::{AssignTarget, Expr, FieldInit, LiteralValue, MatchCase, Stmt};
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};

pub use environment::{Environment, ScopeKind};
pub use value::{Function, Instance, Module, NativeFn, NativeFunction, StructDef, Value};

/// Default limit on nested calls before `Stack overflow.` is raised
pub const DEFAULT_MAX_CALL_DEPTH: usize = 255;

/// Largest `max_call_depth` the CLI's 64 MiB interpreter thread can hold
pub const MAX_CALL_DEPTH_LIMIT: usize = 4096;

/// Knobs the runner passes in from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    pub max_call_depth: usize,
    /// Built-in modules that `import` may resolve
    pub modules: Vec<String>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            modules: stdlib::MODULE_NAMES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Non-local exits while executing statements
enum Unwind {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

type Exec = Result<Value, Unwind>;

pub struct Interpreter {
    env: Rc<Environment>,
    modules: HashMap<String, Rc<Module>>,
    out: Box<dyn Write>,
    input: Box<dyn BufRead>,
    interrupt: Arc<AtomicBool>,
    call_depth: usize,
    max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterOptions::default())
    }
}

impl Interpreter {
    pub fn new(options: InterpreterOptions) -> Self {
        let globals = Environment::global();
        for (name, value) in stdlib::globals() {
            globals.define(name, value);
        }

        let mut modules = HashMap::new();
        for name in &options.modules {
            match stdlib::module(name) {
                Some(module) => {
                    modules.insert(name.clone(), Rc::new(module));
                }
                None => tracing::warn!(module = %name, "ignoring unknown module in config"),
            }
        }

        Self {
            env: globals,
            modules,
            out: Box::new(io::stdout()),
            input: Box::new(io::BufReader::new(io::stdin())),
            interrupt: Arc::new(AtomicBool::new(false)),
            call_depth: 0,
            max_call_depth: options.max_call_depth,
        }
    }

    /// Redirect `print` output
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Redirect `IO input` reads
    pub fn with_input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Share a flag that aborts execution with `Interrupted.` once set
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Run a program, returning the value of its last statement
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<Value, RuntimeError> {
        let mut last = Value::Null;
        for stmt in stmts {
            match self.execute(stmt) {
                Ok(value) => last = value,
                Err(Unwind::Return(value)) => return Ok(value),
                Err(Unwind::Error(error)) => {
                    self.call_depth = 0;
                    return Err(error);
                }
            }
        }
        Ok(last)
    }

    /// Look up a binding visible from the current scope
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env.lookup(name)
    }

    pub(crate) fn write_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub(crate) fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    pub(crate) fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn check_interrupt(&self, token: &Token) -> Result<(), RuntimeError> {
        if self.interrupt.swap(false, Ordering::SeqCst) {
            return Err(RuntimeError::new(token, "Interrupted."));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn execute(&mut self, stmt: &Stmt) -> Exec {
        match stmt {
            Stmt::Expression { expr } => Ok(self.evaluate(expr)?),
            Stmt::Block { stmts } => {
                let env = Environment::child(&self.env, ScopeKind::Block);
                self.execute_block(stmts, env)
            }
            Stmt::If {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then)
                } else if let Some(otherwise) = otherwise {
                    self.execute(otherwise)
                } else {
                    Ok(Value::Null)
                }
            }
            Stmt::While {
                keyword,
                condition,
                body,
            } => self.execute_while(keyword, condition, body),
            Stmt::Match {
                keyword,
                subject,
                cases,
            } => self.execute_match(keyword, subject, cases),
            Stmt::Import { module, names } => {
                self.execute_import(module, names)?;
                Ok(Value::Null)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Err(Unwind::Return(value))
            }
        }
    }

    /// Run `stmts` inside `env`, restoring the previous scope afterwards
    fn execute_block(&mut self, stmts: &[Stmt], env: Rc<Environment>) -> Exec {
        let previous = std::mem::replace(&mut self.env, env);
        let mut result = Ok(Value::Null);
        for stmt in stmts {
            result = self.execute(stmt);
            if result.is_err() {
                break;
            }
        }
        self.env = previous;
        result
    }

    fn execute_while(&mut self, keyword: &Token, condition: &Expr, body: &Stmt) -> Exec {
        let mut last = Value::Null;
        while self.evaluate(condition)?.is_truthy() {
            self.check_interrupt(keyword)?;
            last = self.execute(body)?;
        }
        Ok(last)
    }

    fn execute_match(&mut self, keyword: &Token, subject: &Expr, cases: &[MatchCase]) -> Exec {
        let subject = self.evaluate(subject)?;
        for case in cases {
            if case.pattern.is_wildcard() || self.evaluate(&case.pattern)?.is_equal(&subject) {
                tracing::trace!(line = keyword.line, "match case selected");
                return self.execute(&case.then);
            }
        }
        Ok(Value::Null)
    }

    fn execute_import(&mut self, module: &Token, names: &[Token]) -> Result<(), RuntimeError> {
        let resolved = self.modules.get(&module.lexeme).cloned().ok_or_else(|| {
            RuntimeError::new(module, format!("Undefined module '{}'.", module.lexeme))
        })?;

        if names.is_empty() {
            self.env.define(&module.lexeme, Value::Module(resolved));
            return Ok(());
        }

        for name in names {
            let value = resolved.get(name)?;
            self.env.define(&name.lexeme, value);
        }
        tracing::debug!(module = %module.lexeme, names = names.len(), "imported module members");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(match value {
                LiteralValue::Null => Value::Null,
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Num(n) => Value::Num(*n),
                LiteralValue::Str(s) => Value::str(s),
            }),
            Expr::Variable { name } => self.env.get(name),
            Expr::SelfRef { keyword } => self.env.get(keyword),
            Expr::Grouping { inner } => self.evaluate(inner),
            Expr::Assign { target, value } => {
                let value = self.evaluate(value)?;
                self.assign(target, value.clone())?;
                Ok(value)
            }
            Expr::Unary { op, right } => {
                let right = self.evaluate(right)?;
                unary(op, right)
            }
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(left, op, right)
            }
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left)?;
                let decided = match op.kind {
                    TokenType::Or => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Call {
                callee,
                bracket,
                args,
            } => {
                let callee = self.evaluate(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, args, bracket)
            }
            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                Value::Module(module) => module.get(name),
                _ => Err(RuntimeError::new(
                    name,
                    "Only instances and modules have attributes.",
                )),
            },
            Expr::Func { decl } => Ok(Value::Func(Rc::new(Function::new(
                Rc::clone(decl),
                Rc::clone(&self.env),
            )))),
            Expr::Struct { decl } => Ok(Value::Struct(Rc::new(StructDef {
                decl: Rc::clone(decl),
                closure: Rc::clone(&self.env),
            }))),
        }
    }

    fn assign(&mut self, target: &AssignTarget, value: Value) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Variable { name } => {
                self.env.assign(&name.lexeme, value);
                Ok(())
            }
            AssignTarget::SelfField { keyword, name } => match self.env.get(keyword)? {
                Value::Instance(instance) => {
                    instance.set(&name.lexeme, value);
                    Ok(())
                }
                _ => Err(RuntimeError::new(name, "Only instances have fields.")),
            },
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, bracket: &Token) -> Result<Value, RuntimeError> {
        let arity = match &callee {
            Value::Func(func) => func.arity(),
            Value::Native(native) => native.arity,
            Value::Struct(def) => def.arity(),
            _ => {
                return Err(RuntimeError::new(
                    bracket,
                    "Can only call functions and structs.",
                ))
            }
        };
        if args.len() != arity {
            return Err(RuntimeError::new(
                bracket,
                format!("Expected {} arguments but got {}.", arity, args.len()),
            ));
        }

        self.check_interrupt(bracket)?;
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::new(bracket, "Stack overflow."));
        }

        tracing::trace!(callee = %callee, depth = self.call_depth, "call");
        self.call_depth += 1;
        let result = match callee {
            Value::Func(func) => self.call_function(&func, args),
            Value::Native(native) => (native.func)(self, &args, bracket),
            Value::Struct(def) => self.instantiate(def, args),
            _ => unreachable!("callee kind checked above"),
        };
        self.call_depth -= 1;
        result
    }

    fn call_function(&mut self, func: &Function, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let env = Environment::child(&func.closure, ScopeKind::Function);
        for (param, arg) in func.decl.params.iter().zip(args) {
            env.define(&param.lexeme, arg);
        }
        match self.execute_block(&func.decl.body, env) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    /// Bind params, then evaluate the body's field initializers in a
    /// constructor scope that methods close over.
    fn instantiate(&mut self, def: Rc<StructDef>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let scope = Environment::child(&def.closure, ScopeKind::Function);
        let instance = Rc::new(Instance::new(Rc::clone(&def)));

        for (param, arg) in def.decl.params.iter().zip(args) {
            scope.define(&param.lexeme, arg.clone());
            instance.set(&param.lexeme, arg);
        }

        let previous = std::mem::replace(&mut self.env, scope);
        let result = self.initialize_fields(&instance, &def.decl.body);
        self.env = previous;
        result?;

        Ok(Value::Instance(instance))
    }

    fn initialize_fields(&mut self, instance: &Instance, body: &[FieldInit]) -> Result<(), RuntimeError> {
        for field in body {
            let value = self.evaluate(&field.value)?;
            self.env.define(&field.name.lexeme, value.clone());
            instance.set(&field.name.lexeme, value);
        }
        Ok(())
    }
}

fn number_operands(op: &Token, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::new(op, "Operands must be numbers.")),
    }
}

fn unary(op: &Token, right: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenType::Bang => Ok(Value::Bool(!right.is_truthy())),
        TokenType::Minus | TokenType::BitNeg => {
            let Value::Num(n) = right else {
                return Err(RuntimeError::new(op, "Operand must be a number."));
            };
            if op.kind == TokenType::Minus {
                Ok(Value::Num(-n))
            } else {
                Ok(Value::Num(!(n as i64) as f64))
            }
        }
        _ => Err(RuntimeError::new(op, "Unknown unary operator.")),
    }
}

fn binary(left: Value, op: &Token, right: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenType::Plus => match (&left, &right) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
            (Value::Str(a), Value::Str(b)) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Ok(Value::str(joined))
            }
            _ => Err(RuntimeError::new(
                op,
                "Operands must be two numbers or two strings.",
            )),
        },
        TokenType::Minus => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Num(a - b))
        }
        TokenType::Star => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Num(a * b))
        }
        TokenType::Slash => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Num(a / b))
        }
        TokenType::BitAnd => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Num(((a as i64) & (b as i64)) as f64))
        }
        TokenType::BitOr => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Num(((a as i64) | (b as i64)) as f64))
        }
        TokenType::Lesser => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(a < b))
        }
        TokenType::LesserEqual => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(a <= b))
        }
        TokenType::Greater => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(a > b))
        }
        TokenType::GreaterEqual => {
            let (a, b) = number_operands(op, &left, &right)?;
            Ok(Value::Bool(a >= b))
        }
        TokenType::Equal => Ok(Value::Bool(left.is_equal(&right))),
        TokenType::Unequal => Ok(Value::Bool(!left.is_equal(&right))),
        TokenType::Is => Ok(Value::Bool(match (&left, &right) {
            (Value::Instance(instance), Value::Struct(def)) => Rc::ptr_eq(&instance.def, def),
            (_, Value::Struct(_)) => false,
            _ => left.is_equal(&right),
        })),
        _ => Err(RuntimeError::new(op, "Unknown binary operator.")),
    }
}
