//! CLI argument parsing for flatscript.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// flatscript - lowers structured scripts into label-and-jump assembler scripts
#[derive(Parser, Debug)]
#[command(name = "flatscript")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub loglevel: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit the assembler script for a JSON program
    #[command(alias = "e")]
    Emit(EmitArgs),

    /// Print the chunk graphs of a program's scripts
    Chunks(ChunksArgs),

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args, Debug, Default)]
pub struct EmitArgs {
    /// The JSON program to emit
    pub input: PathBuf,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep chunks in id order instead of optimizing for fallthrough
    #[arg(long)]
    pub no_optimize: bool,

    /// Emit script statements on a thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Number of threads for parallel emission (0 = one per CPU)
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct ChunksArgs {
    /// The JSON program to inspect
    pub input: PathBuf,

    /// Only print the script with this name
    #[arg(long)]
    pub script: Option<String>,
}
