//! Chunk ordering.
//!
//! The order decides which transfers can be elided: a chunk whose natural
//! successor is placed right after it falls through without a `goto`.

use std::collections::BTreeSet;

use crate::compiler::{ChunkGraph, ChunkId};

/// Orders chunks to maximize fallthrough.
///
/// Starting at the entry chunk, the walk follows each chunk's natural
/// successor while it is still unplaced. When the successor has already
/// been placed (or the chunk ends the script), the walk resumes at the
/// lowest unplaced id. The result is deterministic and contains every chunk
/// exactly once.
pub fn optimized_order(graph: &ChunkGraph<'_>) -> Vec<ChunkId> {
    let mut unvisited: BTreeSet<ChunkId> = graph.ids().into_iter().collect();
    let mut order = Vec::with_capacity(graph.len());

    let mut current = if unvisited.remove(&ChunkId::ENTRY) {
        Some(ChunkId::ENTRY)
    } else {
        unvisited.pop_first()
    };

    while let Some(id) = current {
        order.push(id);
        let next = graph.get(id).and_then(|chunk| chunk.natural_next());
        current = match next {
            Some(next) if unvisited.remove(&next) => Some(next),
            _ => unvisited.pop_first(),
        };
    }

    order
}

/// Orders chunks by ascending id.
pub fn sequential_order(graph: &ChunkGraph<'_>) -> Vec<ChunkId> {
    graph.ids()
}
