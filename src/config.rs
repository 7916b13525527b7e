//! Configuration management for flatscript.
//!
//! Settings are merged in order, later sources winning:
//! 1. built-in defaults
//! 2. the user config file (`<config dir>/flatscript/config`)
//! 3. `.flatscriptrc` in the working directory
//! 4. `FLATSCRIPT_*` environment variables
//! 5. command line flags
//!
//! Files use `key=value` lines; `#` and `;` start comments.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flatscript_emitter::EmitOptions;
use serde::{Deserialize, Serialize};

use crate::cli::EmitArgs;

/// Project-local config file name.
const PROJECT_CONFIG: &str = ".flatscriptrc";

/// Prefix of configuration environment variables.
const ENV_PREFIX: &str = "FLATSCRIPT_";

/// Configuration for flatscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reorder chunks for fallthrough
    pub optimize: bool,

    /// Emit script statements on a thread pool
    pub parallel: bool,

    /// Thread pool size (0 = one per CPU)
    pub threads: usize,

    /// Log level used when `RUST_LOG` is not set
    pub loglevel: String,

    /// Unrecognized keys, kept so `flatscript config` can show them
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimize: true,
            parallel: false,
            threads: 0,
            loglevel: "warn".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                config.merge_from_file(&user_config_path)?;
            }
        }

        let project_config = PathBuf::from(PROJECT_CONFIG);
        if project_config.exists() {
            config.merge_from_file(&project_config)?;
        }

        config.load_from_env(std::env::vars());

        Ok(config)
    }

    /// Merge configuration from a file.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        self.merge_from_str(&content);
        Ok(())
    }

    /// Merge `key=value` lines.
    fn merge_from_str(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim());
            }
        }
    }

    /// Load configuration from `FLATSCRIPT_*` variables.
    fn load_from_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, &value);
            }
        }
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "optimize" => self.optimize = value == "true",
            "parallel" => self.parallel = value == "true",
            "threads" => {
                if let Ok(n) = value.parse() {
                    self.threads = n;
                }
            }
            "loglevel" => self.loglevel = value.to_string(),
            _ => {
                self.extra.insert(
                    key.to_string(),
                    serde_json::Value::String(value.to_string()),
                );
            }
        }
    }

    /// Apply the flags of the `emit` command on top of the loaded values.
    pub fn apply_emit_args(&mut self, args: &EmitArgs) {
        if args.no_optimize {
            self.optimize = false;
        }
        if args.parallel {
            self.parallel = true;
        }
        if let Some(threads) = args.threads {
            self.threads = threads;
            self.parallel = true;
        }
    }

    /// The emitter options these settings select.
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            optimize: self.optimize,
        }
    }
}

/// Get the user config path.
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flatscript").join("config"))
}
