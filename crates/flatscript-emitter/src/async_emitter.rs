//! Asynchronous and parallel emission APIs.
//!
//! Emission of one script is a pure, synchronous transform. This module
//! adds two front doors on top of it:
//!
//! - [`AsyncEmitter`] (feature `async`) loads JSON programs with tokio's
//!   non-blocking file I/O and emits several files concurrently.
//! - [`ParallelEmitter`] (feature `parallel`) emits the script statements
//!   of one program on a rayon pool.
//!
//! Parallelism only ever happens across script statements. Each script is
//! still built by a single `ChunkBuilder` with its own id counter, so the
//! output is identical to [`Emitter::emit`](crate::Emitter::emit).
//!
//! # Example
//!
//! ```ignore
//! use flatscript_emitter::{AsyncEmitter, EmitOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let emitter = AsyncEmitter::new(EmitOptions::default());
//!     let text = emitter.emit_file("scripts.json").await.unwrap();
//!     print!("{}", text);
//! }
//! ```

#[cfg(feature = "async")]
use std::path::Path;

#[cfg(feature = "async")]
use tokio::fs;
#[cfg(any(feature = "async", feature = "parallel"))]
use tracing::debug;

#[cfg(any(feature = "async", feature = "parallel"))]
use crate::ast::Program;
#[cfg(any(feature = "async", feature = "parallel"))]
use crate::emitter::{EmitOptions, Emitter};
#[cfg(any(feature = "async", feature = "parallel"))]
use crate::error::Result;

/// Loads programs from disk and emits them without blocking the runtime
/// on file I/O.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncEmitter {
    options: EmitOptions,
}

#[cfg(feature = "async")]
impl AsyncEmitter {
    /// Creates an async emitter.
    pub fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Reads and parses a JSON program.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Program> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = source.len(), "loaded program");
        Program::from_json(&source)
    }

    /// Emits a JSON program file.
    pub async fn emit_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let program = self.load(path).await?;
        Emitter::new(&program, self.options).emit()
    }

    /// Emits several program files concurrently.
    ///
    /// Results are returned in the order of `paths`, whichever file
    /// finishes loading first.
    pub async fn emit_files(&self, paths: &[impl AsRef<Path>]) -> Vec<Result<String>> {
        let futures: Vec<_> = paths.iter().map(|p| self.emit_file(p)).collect();

        futures::future::join_all(futures).await
    }
}

/// Emits the scripts of a program on a thread pool.
#[cfg(feature = "parallel")]
pub struct ParallelEmitter {
    /// Thread pool for CPU-bound work
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl ParallelEmitter {
    /// Creates a parallel emitter with the default number of threads.
    pub fn new() -> Result<Self> {
        Self::with_threads(0)
    }

    /// Creates a parallel emitter with a specific number of threads.
    ///
    /// Zero lets rayon pick the thread count.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("flatscript-emit-{}", i))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Emits `program`, rendering its top-level statements in parallel.
    ///
    /// The blocks are joined in program order, so the text is identical to
    /// sequential emission.
    pub fn emit(&self, program: &Program, options: EmitOptions) -> Result<String> {
        use rayon::prelude::*;

        let emitter = Emitter::new(program, options);
        let mut blocks: Vec<String> = self.pool.install(|| {
            program
                .top_level_statements
                .par_iter()
                .enumerate()
                .map(|(index, stmt)| emitter.emit_top_level(index, stmt))
                .collect::<Result<Vec<_>>>()
        })?;
        debug!(
            blocks = blocks.len(),
            threads = self.threads(),
            "emitted top-level statements in parallel"
        );

        blocks.extend(program.texts.iter().map(crate::emitter::render_text));
        Ok(blocks.join("\n"))
    }
}
