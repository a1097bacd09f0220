//! Configuration types

use serde::{Deserialize, Serialize};

use crate::interpreter::{stdlib, InterpreterOptions, DEFAULT_MAX_CALL_DEPTH, MAX_CALL_DEPTH_LIMIT};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub repl: ReplConfig,

    #[serde(default)]
    pub interpreter: InterpreterConfig,

    #[serde(default)]
    pub stdlib: StdlibConfig,
}

/// Interactive session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
        }
    }
}

fn default_prompt() -> String {
    "> ".to_string()
}

/// Evaluation limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
        }
    }
}

fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}

/// Which built-in modules `import` can see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdlibConfig {
    #[serde(default = "default_modules")]
    pub modules: Vec<String>,
}

impl Default for StdlibConfig {
    fn default() -> Self {
        Self {
            modules: default_modules(),
        }
    }
}

fn default_modules() -> Vec<String> {
    stdlib::MODULE_NAMES.iter().map(|m| m.to_string()).collect()
}

impl Config {
    /// Reject values that deserialize but cannot be honored
    pub fn validate(&self) -> Result<(), String> {
        let depth = self.interpreter.max_call_depth;
        if !(1..=MAX_CALL_DEPTH_LIMIT).contains(&depth) {
            return Err(format!(
                "interpreter.max_call_depth must be between 1 and {}, got {}",
                MAX_CALL_DEPTH_LIMIT, depth
            ));
        }
        Ok(())
    }

    /// Options handed to [`crate::Interpreter::new`]
    pub fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            max_call_depth: self.interpreter.max_call_depth,
            modules: self.stdlib.modules.clone(),
        }
    }
}
