//! Configuration discovery and loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CanterburyError, CanterburyResult};
use crate::interpreter::MAX_CALL_DEPTH_LIMIT;

use super::types::Config;

/// File name looked up in the working directory
const PROJECT_CONFIG: &str = "canterbury.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Result of [`resolve`]: the effective config, where it came from, and any warnings
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> CanterburyResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| CanterburyError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config
        .validate()
        .map_err(|message| CanterburyError::InvalidConfig {
            file: path.to_path_buf(),
            message,
        })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Pick the first config file that applies and layer env overrides on top.
///
/// An explicit path must exist; the project and user files are optional.
pub fn resolve(explicit: Option<&Path>) -> CanterburyResult<LoadedConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(),
    };

    let Some(path) = candidate else {
        tracing::debug!("no config file found, using defaults");
        return Ok(LoadedConfig {
            config: with_env_overrides(Config::default()),
            ..LoadedConfig::default()
        });
    };

    let (config, warnings) = load_with_warnings(&path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(LoadedConfig {
        config: with_env_overrides(config),
        source: Some(path),
        warnings,
    })
}

fn discover() -> Option<PathBuf> {
    let project = PathBuf::from(PROJECT_CONFIG);
    if project.is_file() {
        return Some(project);
    }
    user_config_path().filter(|p| p.is_file())
}

/// `$XDG_CONFIG_HOME/canterbury/config.toml`, falling back to the platform config dir
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("canterbury").join("config.toml"))
}

/// Apply environment variable overrides (CANTERBURY_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    // CANTERBURY_PROMPT
    if let Some(prompt) = var("CANTERBURY_PROMPT") {
        config.repl.prompt = prompt;
    }

    // CANTERBURY_MAX_CALL_DEPTH
    if let Some(depth) = var("CANTERBURY_MAX_CALL_DEPTH") {
        match depth.trim().parse::<usize>() {
            Ok(depth) if (1..=MAX_CALL_DEPTH_LIMIT).contains(&depth) => {
                config.interpreter.max_call_depth = depth
            }
            _ => tracing::warn!(value = %depth, "ignoring invalid CANTERBURY_MAX_CALL_DEPTH"),
        }
    }

    // CANTERBURY_MODULES (comma-separated, may be empty)
    if let Some(modules) = var("CANTERBURY_MODULES") {
        config.stdlib.modules = modules
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "repl",
        "prompt",
        "interpreter",
        "max_call_depth",
        "stdlib",
        "modules",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ac) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
pub(super) fn overrides_from(config: Config, vars: &[(&str, &str)]) -> Config {
    apply_overrides(config, |key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

#[cfg(test)]
pub(super) fn suggest(unknown: &str) -> Option<String> {
    suggest_key(unknown)
}
