// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # flatscript-emitter
//!
//! Lowers structured scripts (if/elif/else, while, do-while, break,
//! continue, flat commands) into flat label-and-jump assembler text.
//!
//! ## Overview
//!
//! Every script statement goes through the same pipeline:
//! - the chunk builder splits its body into basic-block chunks, turning
//!   short-circuit conditions into chains of single-comparison chunks
//! - the order optimizer places chunks so that natural successors fall
//!   through instead of jumping
//! - the renderer writes labels and bodies, labelling only chunks that
//!   some emitted jump targets
//!
//! Raw statements are passed through verbatim and text blocks become
//! `.string` directives.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flatscript_emitter::{EmitOptions, Emitter, Program};
//!
//! let program = Program::from_json(&source)?;
//! let text = Emitter::new(&program, EmitOptions::default()).emit()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod async_emitter;
pub mod compiler;
pub mod emitter;
pub mod error;

// Re-exports for convenience
pub use ast::Program;
pub use compiler::{ChunkBuilder, ChunkGraph, ChunkId};
pub use emitter::{EmitOptions, Emitter};
pub use error::{EmitError, Result};

#[cfg(feature = "async")]
pub use async_emitter::AsyncEmitter;
#[cfg(feature = "parallel")]
pub use async_emitter::ParallelEmitter;
