//! Program emission.
//!
//! The emitter drives the whole pipeline for every script statement:
//!
//! ```text
//! ScriptStatement -> ChunkBuilder -> ChunkGraph -> order -> ChunkRenderer -> text
//! ```
//!
//! Raw statements and text blocks bypass chunking entirely.

pub mod order;
pub mod render;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::ast::{Program, ScriptStatement, TopLevelStatement};
use crate::compiler::{ChunkBuilder, ChunkGraph};
use crate::error::{EmitError, Result};

pub use order::{optimized_order, sequential_order};
pub use render::{label, render_raw, render_text, ChunkRenderer};

/// Options controlling emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Reorder chunks so sequential chunks fall through instead of jumping
    pub optimize: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Emits a program as flat label-and-jump text.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'p> {
    program: &'p Program,
    options: EmitOptions,
}

impl<'p> Emitter<'p> {
    /// Creates an emitter for `program`.
    pub fn new(program: &'p Program, options: EmitOptions) -> Self {
        Self { program, options }
    }

    /// Emits every top-level statement in order, then every text block.
    ///
    /// Blocks are separated by a newline. Any top-level statement that
    /// cannot be lowered fails the whole program; no partial output is
    /// returned.
    pub fn emit(&self) -> Result<String> {
        let mut blocks = Vec::with_capacity(
            self.program.top_level_statements.len() + self.program.texts.len(),
        );
        for (index, stmt) in self.program.top_level_statements.iter().enumerate() {
            blocks.push(self.emit_top_level(index, stmt)?);
        }
        blocks.extend(self.program.texts.iter().map(render_text));
        Ok(blocks.join("\n"))
    }

    /// Emits the top-level statement at position `index`.
    pub fn emit_top_level(&self, index: usize, stmt: &TopLevelStatement) -> Result<String> {
        match stmt {
            TopLevelStatement::Script(script) => self.emit_script(script),
            TopLevelStatement::Raw(raw) => Ok(render_raw(raw)),
            TopLevelStatement::Unsupported { .. } => Err(EmitError::UnrecognizedStatement {
                index,
                token: stmt.token_literal().to_string(),
            }),
        }
    }

    /// Emits one script statement.
    #[instrument(skip(self, script), fields(script = %script.name))]
    pub fn emit_script(&self, script: &ScriptStatement) -> Result<String> {
        let graph = self.chunk_graph(script)?;
        let order = if self.options.optimize {
            optimized_order(&graph)
        } else {
            sequential_order(&graph)
        };
        debug!(chunks = graph.len(), optimize = self.options.optimize, "rendering script");
        ChunkRenderer::new(&script.name, &graph).render(&order)
    }

    /// Builds the chunk graph of one script statement.
    pub fn chunk_graph<'s>(&self, script: &'s ScriptStatement) -> Result<ChunkGraph<'s>> {
        ChunkBuilder::new(&script.name).build(&script.body)
    }
}
