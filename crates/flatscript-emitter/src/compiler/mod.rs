//! Chunk compiler for structured scripts.
//!
//! Turns a script body into a graph of basic-block chunks.
//!
//! # Module Structure
//!
//! - `chunk`: Chunk, branch and chunk graph definitions
//! - `builder`: Splitting of statement lists into chunks
//!   - `builder::condition`: Short-circuit condition linearization
//!   - `builder::bindings`: `break` / `continue` targets

pub mod builder;
pub mod chunk;

pub use builder::ChunkBuilder;
pub use chunk::{Branch, Chunk, ChunkGraph, ChunkId, ChunkIds};
