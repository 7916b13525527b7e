//! Chunks command implementation.

use anyhow::{bail, Result};
use flatscript_emitter::Emitter;
use owo_colors::OwoColorize;

use crate::cli::ChunksArgs;
use crate::config::Config;

pub async fn run(args: &ChunksArgs, config: &Config) -> Result<()> {
    let program = super::load_program(&args.input, config).await?;
    let emitter = Emitter::new(&program, config.emit_options());

    let mut shown = 0;
    for script in program.scripts() {
        if args.script.as_deref().is_some_and(|name| name != script.name) {
            continue;
        }
        let graph = emitter.chunk_graph(script)?;
        println!(
            "{} {}",
            script.name.cyan().bold(),
            format!("({} chunks)", graph.len()).dimmed()
        );
        print!("{}", graph);
        println!();
        shown += 1;
    }

    if shown == 0 {
        match &args.script {
            Some(name) => bail!("no script named '{}' in {}", name, args.input.display()),
            None => println!("{}", "No scripts in program".yellow()),
        }
    }
    Ok(())
}
