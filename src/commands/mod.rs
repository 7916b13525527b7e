//! Command implementations for flatscript.

pub mod chunks;
pub mod config;
pub mod emit;

use std::path::Path;

use anyhow::{Context, Result};
use flatscript_emitter::{AsyncEmitter, Program};

use crate::config::Config;

/// Loads the JSON program at `path`.
pub async fn load_program(path: &Path, config: &Config) -> Result<Program> {
    AsyncEmitter::new(config.emit_options())
        .load(path)
        .await
        .with_context(|| format!("failed to load program {}", path.display()))
}
