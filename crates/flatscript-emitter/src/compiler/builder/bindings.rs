//! Loop bindings for `break` / `continue` resolution.

use rustc_hash::FxHashMap;

use crate::ast::LoopId;
use crate::compiler::chunk::ChunkId;
use crate::error::{EmitError, Result};

/// The chunks a loop transfers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopBinding {
    /// Where the loop exits to (`None` = end of script)
    pub exit: Option<ChunkId>,
    /// The chunk that re-evaluates the loop condition
    pub header: ChunkId,
}

/// Bindings from loop ids to their exit and header chunks.
///
/// A binding is recorded when the loop itself is split, which always
/// happens before any chunk of its body is processed. Lookups also take the
/// loops enclosing the statement, so a loop that was split elsewhere in the
/// script never resolves.
#[derive(Debug, Default)]
pub struct LoopBindings {
    /// The script the bindings belong to, for diagnostics
    script: String,
    /// Bound loops
    loops: FxHashMap<LoopId, LoopBinding>,
}

impl LoopBindings {
    /// Creates an empty set of bindings.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            loops: FxHashMap::default(),
        }
    }

    /// Records the exit and header chunks of a loop. Each loop id may only
    /// be bound once per script.
    pub fn bind(&mut self, loop_id: LoopId, exit: Option<ChunkId>, header: ChunkId) -> Result<()> {
        if self.loops.contains_key(&loop_id) {
            return Err(EmitError::DuplicateLoop {
                script: self.script.clone(),
                loop_id,
            });
        }
        self.loops.insert(loop_id, LoopBinding { exit, header });
        Ok(())
    }

    /// Looks up a loop's binding.
    pub fn get(&self, loop_id: LoopId) -> Option<LoopBinding> {
        self.loops.get(&loop_id).copied()
    }

    fn enclosing(&self, loop_id: LoopId, enclosing: &[LoopId]) -> Option<LoopBinding> {
        if enclosing.contains(&loop_id) {
            self.get(loop_id)
        } else {
            None
        }
    }

    /// The destination of a `break` out of `loop_id`.
    pub fn exit_of(&self, loop_id: LoopId, enclosing: &[LoopId]) -> Result<Option<ChunkId>> {
        self.enclosing(loop_id, enclosing)
            .map(|binding| binding.exit)
            .ok_or_else(|| EmitError::UnresolvedBreak {
                script: self.script.clone(),
                loop_id,
            })
    }

    /// The destination of a `continue` in `loop_id`.
    pub fn header_of(&self, loop_id: LoopId, enclosing: &[LoopId]) -> Result<ChunkId> {
        self.enclosing(loop_id, enclosing)
            .map(|binding| binding.header)
            .ok_or_else(|| EmitError::UnresolvedContinue {
                script: self.script.clone(),
                loop_id,
            })
    }
}
