//! Chunk graph definitions.
//!
//! A chunk is a basic block: a run of non-branching commands plus a
//! description of how control leaves it. Destinations are `Option<ChunkId>`
//! throughout, where `None` means "end of script".

use std::fmt;

use rustc_hash::FxHashMap;

use crate::ast::{Command, OperatorExpression};

/// Identifier of a chunk within one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub usize);

impl ChunkId {
    /// The script's entry chunk.
    pub const ENTRY: ChunkId = ChunkId(0);

    /// Whether this is the entry chunk.
    pub fn is_entry(self) -> bool {
        self == Self::ENTRY
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic chunk id allocator, owned by one script's compilation.
///
/// Id 0 is reserved for the entry chunk, so the first allocation is 1.
#[derive(Debug, Default)]
pub struct ChunkIds {
    last: usize,
}

impl ChunkIds {
    /// Creates an allocator whose only used id is the entry chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id.
    pub fn allocate(&mut self) -> ChunkId {
        self.last += 1;
        ChunkId(self.last)
    }

    /// The most recently allocated id.
    pub fn last(&self) -> ChunkId {
        ChunkId(self.last)
    }
}

/// How control leaves a chunk when it has an explicit transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Branch<'a> {
    /// Unconditional transfer
    Jump {
        /// Destination chunk
        dest: ChunkId,
    },
    /// Test one comparison and go to one of two chunks
    Conditional {
        /// Taken when the comparison holds
        truthy: ChunkId,
        /// The comparison
        comparison: &'a OperatorExpression,
        /// Taken otherwise
        falsey: Option<ChunkId>,
    },
    /// `break` / `continue`, resolved to a loop's exit or header
    Break {
        /// Destination chunk
        dest: Option<ChunkId>,
    },
}

impl Branch<'_> {
    /// The natural continuation of the branch, used for fallthrough.
    pub fn tail(&self) -> Option<ChunkId> {
        match self {
            Branch::Jump { dest } => Some(*dest),
            Branch::Conditional { truthy, .. } => Some(*truthy),
            Branch::Break { dest } => *dest,
        }
    }
}

impl fmt::Display for Branch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Jump { dest } => write!(f, "jump {}", dest),
            Branch::Conditional { truthy, comparison, falsey } => {
                write!(f, "if {} then {} else {}", comparison, truthy, Dest(*falsey))
            }
            Branch::Break { dest } => write!(f, "break {}", Dest(*dest)),
        }
    }
}

struct Dest(Option<ChunkId>);

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("end"),
        }
    }
}

/// A finalized basic block.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<'a> {
    /// The chunk's id
    pub id: ChunkId,
    /// The commands executed in order
    pub commands: Vec<&'a Command>,
    /// Implicit successor when there is no explicit branch
    pub return_id: Option<ChunkId>,
    /// Explicit control transfer out of the chunk
    pub branch: Option<Branch<'a>>,
    /// Terminal command (`end` / `return`) that finished the chunk
    pub exit: Option<&'a Command>,
}

impl<'a> Chunk<'a> {
    /// The chunk that naturally follows this one.
    pub fn natural_next(&self) -> Option<ChunkId> {
        match &self.branch {
            Some(branch) => branch.tail(),
            None => self.return_id,
        }
    }

    /// Every chunk this chunk can transfer control to.
    pub fn successors(&self) -> Vec<ChunkId> {
        match &self.branch {
            Some(Branch::Conditional { truthy, falsey, .. }) => {
                std::iter::once(*truthy).chain(*falsey).collect()
            }
            Some(branch) => branch.tail().into_iter().collect(),
            None if self.exit.is_some() => Vec::new(),
            None => self.return_id.into_iter().collect(),
        }
    }
}

impl fmt::Display for Chunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}", self.id)?;
        match (&self.branch, self.exit) {
            (Some(branch), _) => writeln!(f, " ({})", branch)?,
            (None, Some(exit)) => writeln!(f, " (exit {})", exit.name)?,
            (None, None) => writeln!(f, " (return {})", Dest(self.return_id))?,
        }
        for command in &self.commands {
            writeln!(f, "    {}", command)?;
        }
        Ok(())
    }
}

/// The finalized chunks of one script, keyed by id.
#[derive(Debug, Default)]
pub struct ChunkGraph<'a> {
    chunks: FxHashMap<ChunkId, Chunk<'a>>,
}

impl<'a> ChunkGraph<'a> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a finalized chunk, replacing any chunk with the same id.
    pub fn insert(&mut self, chunk: Chunk<'a>) {
        self.chunks.insert(chunk.id, chunk);
    }

    /// Looks up a chunk.
    pub fn get(&self, id: ChunkId) -> Option<&Chunk<'a>> {
        self.chunks.get(&id)
    }

    /// Whether a chunk with this id exists.
    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }

    /// All chunk ids in ascending order.
    pub fn ids(&self) -> Vec<ChunkId> {
        let mut ids: Vec<ChunkId> = self.chunks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the graph has no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterates over the chunks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk<'a>> {
        self.ids().into_iter().filter_map(move |id| self.chunks.get(&id))
    }
}

impl fmt::Display for ChunkGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.iter() {
            write!(f, "{}", chunk)?;
        }
        Ok(())
    }
}
