//! Native globals and the built-in `Math`, `Time` and `IO` modules

use std::rc::Rc;

use crate::error::RuntimeError;
use crate::token::Token;

use super::value::{Module, NativeFunction, Value};
use super::Interpreter;

/// Names of every built-in module, in registration order
pub const MODULE_NAMES: &[&str] = &["Math", "Time", "IO"];

/// Functions available without an import
pub fn globals() -> Vec<(&'static str, Value)> {
    vec![
        ("clock", native("clock", 0, clock)),
        ("print", native("print", 1, print)),
    ]
}

/// Build the named module, or `None` if no such module exists
pub fn module(name: &str) -> Option<Module> {
    let module = match name {
        "Math" => math(),
        "Time" => time(),
        "IO" => io(),
        _ => return None,
    };
    Some(module)
}

fn native(name: &str, arity: usize, func: super::value::NativeFn) -> Value {
    Value::Native(Rc::new(NativeFunction::new(name, arity, func)))
}

fn math() -> Module {
    let mut math = Module::new("Math");
    math.define("pi", Value::Num(std::f64::consts::PI));
    math.define_native("sqrt", 1, |_, args, token| {
        Ok(Value::Num(number("sqrt", &args[0], token)?.sqrt()))
    });
    math.define_native("pow", 2, |_, args, token| {
        let base = number("pow", &args[0], token)?;
        let exp = number("pow", &args[1], token)?;
        Ok(Value::Num(base.powf(exp)))
    });
    math.define_native("abs", 1, |_, args, token| {
        Ok(Value::Num(number("abs", &args[0], token)?.abs()))
    });
    math.define_native("floor", 1, |_, args, token| {
        Ok(Value::Num(number("floor", &args[0], token)?.floor()))
    });
    math.define_native("ceil", 1, |_, args, token| {
        Ok(Value::Num(number("ceil", &args[0], token)?.ceil()))
    });
    math.define_native("max", 2, |_, args, token| {
        let a = number("max", &args[0], token)?;
        let b = number("max", &args[1], token)?;
        Ok(Value::Num(a.max(b)))
    });
    math.define_native("min", 2, |_, args, token| {
        let a = number("min", &args[0], token)?;
        let b = number("min", &args[1], token)?;
        Ok(Value::Num(a.min(b)))
    });
    math
}

fn time() -> Module {
    let mut time = Module::new("Time");
    time.define_native("clock", 0, clock);
    time.define_native("date", 0, |_, _, _| {
        let now = chrono::Local::now();
        Ok(Value::str(now.format("%Y-%m-%d %H:%M:%S").to_string()))
    });
    time
}

fn io() -> Module {
    let mut io = Module::new("IO");
    io.define_native("print", 1, print);
    io.define_native("input", 0, |interpreter, _, token| {
        match interpreter.read_line() {
            Ok(Some(line)) => Ok(Value::str(line)),
            Ok(None) => Ok(Value::Null),
            Err(e) => Err(RuntimeError::new(token, format!("Could not read input: {}.", e))),
        }
    });
    io
}

fn clock(_: &mut Interpreter, _: &[Value], _: &Token) -> Result<Value, RuntimeError> {
    let millis = chrono::Utc::now().timestamp_millis();
    Ok(Value::Num(millis as f64 / 1000.0))
}

fn print(interpreter: &mut Interpreter, args: &[Value], token: &Token) -> Result<Value, RuntimeError> {
    let text = args[0].to_string();
    interpreter
        .write_line(&text)
        .map_err(|e| RuntimeError::new(token, format!("Could not write output: {}.", e)))?;
    Ok(Value::Null)
}

fn number(name: &str, value: &Value, token: &Token) -> Result<f64, RuntimeError> {
    match value {
        Value::Num(n) => Ok(*n),
        _ => Err(RuntimeError::new(token, format!("{} expects a number.", name))),
    }
}
