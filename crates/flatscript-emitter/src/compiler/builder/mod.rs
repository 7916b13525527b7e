//! Chunk building from structured script bodies.
//!
//! This module contains the `ChunkBuilder`, which splits one script's
//! structured body into basic-block chunks connected by explicit branches.
//! The builder works through a FIFO list of pending chunks. Each pending
//! chunk owns a run of statements; the builder scans leading commands and
//! splits at the first construct that changes control flow.

mod bindings;
mod condition;
mod statements;


pub use bindings::{LoopBinding, LoopBindings};
pub use condition::linearize;

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::ast::*;
use crate::compiler::chunk::{Branch, Chunk, ChunkGraph, ChunkId, ChunkIds};
use crate::error::Result;

/// A chunk whose statements have not been scanned yet.
#[derive(Debug, Clone)]
pub struct PendingChunk<'a> {
    /// The chunk's id
    pub id: ChunkId,
    /// Statements still to be split
    pub statements: &'a [Statement],
    /// Where control continues after the statements run out
    pub return_id: Option<ChunkId>,
    /// Explicit branch, already known for control chunks
    pub branch: Option<Branch<'a>>,
    /// Loops whose bodies contain these statements, outermost first
    pub enclosing: Vec<LoopId>,
}

impl<'a> PendingChunk<'a> {
    /// A chunk holding a run of statements.
    pub fn new(id: ChunkId, statements: &'a [Statement], return_id: Option<ChunkId>) -> Self {
        Self {
            id,
            statements,
            return_id,
            branch: None,
            enclosing: Vec::new(),
        }
    }

    /// Marks the chunk as nested inside `enclosing` loops.
    pub fn within(mut self, enclosing: Vec<LoopId>) -> Self {
        self.enclosing = enclosing;
        self
    }

    /// A statement-less chunk that only transfers control.
    pub fn control(id: ChunkId, branch: Branch<'a>) -> Self {
        Self {
            id,
            statements: &[],
            return_id: None,
            branch: Some(branch),
            enclosing: Vec::new(),
        }
    }

    /// Finalizes the chunk with the commands before `at` and the given
    /// outgoing branch.
    fn finish_at(&self, at: usize, branch: Option<Branch<'a>>) -> Chunk<'a> {
        Chunk {
            id: self.id,
            commands: commands_of(&self.statements[..at]),
            return_id: self.return_id,
            branch,
            exit: None,
        }
    }

    /// Finalizes the chunk at a terminal command; nothing after it runs.
    fn terminate_at(&self, at: usize, exit: &'a Command) -> Chunk<'a> {
        Chunk {
            id: self.id,
            commands: commands_of(&self.statements[..at]),
            return_id: None,
            branch: None,
            exit: Some(exit),
        }
    }
}

fn commands_of(statements: &[Statement]) -> Vec<&Command> {
    statements
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::Command(command) => Some(command),
            _ => None,
        })
        .collect()
}

/// Builds the chunk graph of a single script.
///
/// A builder owns the id counter, the pending list and the loop bindings
/// of one compilation; nothing is shared between scripts.
pub struct ChunkBuilder<'a> {
    /// Chunk id allocator
    ids: ChunkIds,
    /// Chunks waiting to be split, processed front to back
    pending: VecDeque<PendingChunk<'a>>,
    /// Finalized chunks
    finished: ChunkGraph<'a>,
    /// Exit and header chunks of every loop split so far
    loops: LoopBindings,
}

impl<'a> ChunkBuilder<'a> {
    /// Creates a builder for the named script.
    pub fn new(script: &str) -> Self {
        Self {
            ids: ChunkIds::new(),
            pending: VecDeque::new(),
            finished: ChunkGraph::new(),
            loops: LoopBindings::new(script),
        }
    }

    // ========================================================================
    // Main Entry Point
    // ========================================================================

    /// Splits `body` into chunks. Chunk 0 is the entry chunk.
    pub fn build(mut self, body: &'a [Statement]) -> Result<ChunkGraph<'a>> {
        self.pending
            .push_back(PendingChunk::new(ChunkId::ENTRY, body, None));

        while let Some(chunk) = self.pending.pop_front() {
            self.process(chunk)?;
        }

        debug!(chunks = self.finished.len(), "finished chunk graph");
        Ok(self.finished)
    }

    fn process(&mut self, chunk: PendingChunk<'a>) -> Result<()> {
        let statements = chunk.statements;
        for (i, stmt) in statements.iter().enumerate() {
            let branch = match stmt {
                Statement::Command(command) if command.is_terminal() => {
                    trace!(chunk = %chunk.id, command = %command.name, "terminal command");
                    self.finish(chunk.terminate_at(i, command));
                    return Ok(());
                }
                Statement::Command(_) => continue,
                Statement::If(if_stmt) => self.split_if(if_stmt, &chunk, i)?,
                Statement::While(loop_stmt) => self.split_loop(loop_stmt, &chunk, i, false)?,
                Statement::DoWhile(loop_stmt) => self.split_loop(loop_stmt, &chunk, i, true)?,
                Statement::Break { loop_id } => Branch::Break {
                    dest: self.loops.exit_of(*loop_id, &chunk.enclosing)?,
                },
                Statement::Continue { loop_id } => Branch::Break {
                    dest: Some(self.loops.header_of(*loop_id, &chunk.enclosing)?),
                },
            };
            self.finish(chunk.finish_at(i, Some(branch)));
            return Ok(());
        }

        self.finish(chunk.finish_at(statements.len(), chunk.branch));
        Ok(())
    }

    fn finish(&mut self, chunk: Chunk<'a>) {
        trace!(chunk = %chunk.id, commands = chunk.commands.len(), "finalized chunk");
        self.finished.insert(chunk);
    }

    // ========================================================================
    // Splitting Helpers
    // ========================================================================

    /// Moves the statements after `at` into a new continuation chunk.
    ///
    /// Returns the id control reaches once the construct at `at` is done:
    /// the new continuation, or the chunk's own return point when nothing
    /// follows the construct.
    fn split_continuation(&mut self, chunk: &PendingChunk<'a>, at: usize) -> Option<ChunkId> {
        if at + 1 < chunk.statements.len() {
            let id = self.ids.allocate();
            self.pending.push_back(
                PendingChunk::new(id, &chunk.statements[at + 1..], chunk.return_id)
                    .within(chunk.enclosing.clone()),
            );
            Some(id)
        } else {
            chunk.return_id
        }
    }

    /// Queues a chunk for a nested body and returns its id.
    fn open(
        &mut self,
        body: &'a [Statement],
        return_id: Option<ChunkId>,
        enclosing: &[LoopId],
    ) -> ChunkId {
        let id = self.ids.allocate();
        self.pending
            .push_back(PendingChunk::new(id, body, return_id).within(enclosing.to_vec()));
        id
    }

    /// Linearizes a condition and queues its control chunks.
    fn condition(
        &mut self,
        expr: &'a BooleanExpression,
        success: ChunkId,
        failure: Option<ChunkId>,
    ) -> Result<ChunkId> {
        let mut chunks = Vec::with_capacity(2 * expr.leaf_count());
        let entry = linearize(expr, success, failure, &mut self.ids, &mut chunks)?;
        self.pending.extend(chunks);
        Ok(entry)
    }
}
