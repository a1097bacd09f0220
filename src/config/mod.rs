//! Configuration module for Canterbury
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CANTERBURY_*)
//! 3. Explicit `--config` file, else `./canterbury.toml`
//! 4. User config (~/.config/canterbury/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load_with_warnings, resolve, user_config_path, with_env_overrides, ConfigWarning, LoadedConfig,
};
pub use types::{Config, InterpreterConfig, ReplConfig, StdlibConfig};
