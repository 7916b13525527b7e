//! Splitting of branching statements.
//!
//! Each branching construct ends the chunk it appears in. The statements
//! before it stay in the head chunk, the statements after it move to a
//! continuation chunk, and the construct's bodies become pending chunks of
//! their own.
//!
//! | Statement | Head branch | New chunks |
//! |-----------|-------------|------------|
//! | `if` / `elif` / `else` | `Jump` to the `if` condition | one per body, condition chains |
//! | `while` | `Jump` to the header | header, body, condition chain |
//! | `do-while` | `Jump` to the body | header, body, condition chain |
//! | `break` | `Break` to the loop's exit | none |
//! | `continue` | `Break` to the loop's header | none |
//!
//! ## If Statement
//!
//! ```text
//! cmd_a
//! if (flag(A)) { cmd_b } elif (flag(B)) { cmd_c } else { cmd_d }
//! cmd_e
//!
//!   chunk 0: cmd_a; jump -> chunk 6
//!   chunk 1: cmd_e                         (continuation)
//!   chunk 2: cmd_b; return -> chunk 1      (consequence)
//!   chunk 3: cmd_c; return -> chunk 1      (elif body)
//!   chunk 4: cmd_d; return -> chunk 1      (else body)
//!   chunk 5: if flag(B) then 3 else 4      (elif condition)
//!   chunk 6: if flag(A) then 2 else 5      (if condition)
//! ```
//!
//! Elif conditions are linearized last to first, so each one already knows
//! where control goes when it fails.
//!
//! ## Loops
//!
//! ```text
//! while (flag(A)) { cmd_a }
//! cmd_b
//!
//!   chunk 0: jump -> chunk 2
//!   chunk 1: cmd_b                         (exit)
//!   chunk 2: jump -> chunk 4               (header)
//!   chunk 3: cmd_a; return -> chunk 2      (body)
//!   chunk 4: if flag(A) then 3 else 1
//! ```
//!
//! A do-while loop has the same chunks; only the head jumps straight to the
//! body. The loop's bindings are recorded before its body chunk is
//! processed. Every chunk carries the ids of the loops around it, and a
//! `break` or `continue` only resolves against one of those.

use tracing::debug;

use crate::ast::{IfStatement, LoopStatement};
use crate::compiler::chunk::Branch;
use crate::error::Result;

use super::{ChunkBuilder, PendingChunk};

impl<'a> ChunkBuilder<'a> {
    /// Splits `chunk` at the if statement in position `at`.
    ///
    /// Returns the head chunk's branch.
    pub(super) fn split_if(
        &mut self,
        if_stmt: &'a IfStatement,
        chunk: &PendingChunk<'a>,
        at: usize,
    ) -> Result<Branch<'a>> {
        let return_id = self.split_continuation(chunk, at);

        let consequence = self.open(&if_stmt.consequence.body, return_id, &chunk.enclosing);
        let elifs: Vec<_> = if_stmt
            .elifs
            .iter()
            .map(|elif| self.open(&elif.body, return_id, &chunk.enclosing))
            .collect();
        let alternative = if_stmt
            .alternative
            .as_deref()
            .map(|body| self.open(body, return_id, &chunk.enclosing));

        let mut failure = alternative.or(return_id);
        for (elif, body) in if_stmt.elifs.iter().zip(&elifs).rev() {
            failure = Some(self.condition(&elif.condition, *body, failure)?);
        }
        let entry = self.condition(&if_stmt.consequence.condition, consequence, failure)?;

        debug!(
            head = %chunk.id,
            consequence = %consequence,
            elifs = elifs.len(),
            has_else = alternative.is_some(),
            "split if statement"
        );
        Ok(Branch::Jump { dest: entry })
    }

    /// Splits `chunk` at the loop in position `at`.
    ///
    /// `do_while` selects where the head enters the loop: the body for a
    /// do-while loop, the header otherwise.
    pub(super) fn split_loop(
        &mut self,
        loop_stmt: &'a LoopStatement,
        chunk: &PendingChunk<'a>,
        at: usize,
        do_while: bool,
    ) -> Result<Branch<'a>> {
        let return_id = self.split_continuation(chunk, at);
        let header = self.ids.allocate();
        self.loops.bind(loop_stmt.id, return_id, header)?;
        let body = self.ids.allocate();

        let entry = self.condition(&loop_stmt.condition, body, return_id)?;
        let mut enclosing = chunk.enclosing.clone();
        enclosing.push(loop_stmt.id);
        self.pending.push_back(
            PendingChunk::new(body, &loop_stmt.body, Some(header)).within(enclosing),
        );
        self.pending.push_back(PendingChunk {
            id: header,
            statements: &[],
            return_id,
            branch: Some(Branch::Jump { dest: entry }),
            enclosing: Vec::new(),
        });

        debug!(
            head = %chunk.id,
            loop_id = %loop_stmt.id,
            header = %header,
            body = %body,
            do_while,
            "split loop"
        );
        Ok(Branch::Jump {
            dest: if do_while { body } else { header },
        })
    }
}
