//! Emit command implementation.

use anyhow::{Context, Result};
use flatscript_emitter::{Emitter, ParallelEmitter};
use owo_colors::OwoColorize;
use tracing::info;

use crate::cli::EmitArgs;
use crate::config::Config;

pub async fn run(args: &EmitArgs, config: &Config) -> Result<()> {
    let program = super::load_program(&args.input, config).await?;
    let options = config.emit_options();

    let text = if config.parallel {
        let threads = config.threads;
        tokio::task::spawn_blocking(move || -> flatscript_emitter::Result<String> {
            ParallelEmitter::with_threads(threads)?.emit(&program, options)
        })
        .await??
    } else {
        Emitter::new(&program, options).emit()?
    };

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &text)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(output = %path.display(), bytes = text.len(), "wrote script");
            eprintln!(
                "{} {} -> {}",
                "Emitted".green().bold(),
                args.input.display(),
                path.display().cyan()
            );
        }
        None => print!("{}", text),
    }
    Ok(())
}
