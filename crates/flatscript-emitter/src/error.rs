// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for script emission

use thiserror::Error;

use crate::ast::{LoopId, Operator};

/// Result type for emission operations
pub type Result<T> = std::result::Result<T, EmitError>;

/// Errors that can occur while emitting a program
#[derive(Debug, Error)]
pub enum EmitError {
    /// A `break` outside the loop it names
    #[error("could not emit 'break' in script '{script}': loop {loop_id} has no known exit point")]
    UnresolvedBreak {
        /// Script being compiled
        script: String,
        /// The loop the statement refers to
        loop_id: LoopId,
    },

    /// A `continue` outside the loop it names
    #[error("could not emit 'continue' in script '{script}': loop {loop_id} has no known header")]
    UnresolvedContinue {
        /// Script being compiled
        script: String,
        /// The loop the statement refers to
        loop_id: LoopId,
    },

    /// Two loops in one script share an id
    #[error("could not emit loop in script '{script}': loop id {loop_id} is used more than once")]
    DuplicateLoop {
        /// Script being compiled
        script: String,
        /// The repeated loop id
        loop_id: LoopId,
    },

    /// A top-level statement the emitter cannot lower
    #[error("could not emit top-level statement {index} because it is not recognized: {token:?}")]
    UnrecognizedStatement {
        /// Position among the top-level statements
        index: usize,
        /// The statement's leading token
        token: String,
    },

    /// A condition node joined by something other than `&&` / `||`, or a
    /// comparison using a logical operator. The front end should have
    /// rejected these already.
    #[error("internal error: malformed boolean expression using operator '{operator}'")]
    MalformedCondition {
        /// The offending operator
        operator: Operator,
    },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// The rayon pool for parallel emission could not be created
    #[cfg(feature = "parallel")]
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
