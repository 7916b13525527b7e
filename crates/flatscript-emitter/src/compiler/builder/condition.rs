//! Boolean condition linearization.
//!
//! A short-circuit condition becomes a chain of control chunks, each of
//! which tests a single comparison. The caller supplies where control goes
//! when the whole condition holds (`success`) and when it does not
//! (`failure`), and gets back the chunk to enter first.
//!
//! | Expression | Chunks produced | Entry |
//! |------------|-----------------|-------|
//! | comparison | one `Conditional` (truthy = success, falsey = failure) | that chunk |
//! | `L && R` | link `Jump` to R's entry; L with success = link | L's entry |
//! | `L \|\| R` | link `Jump` to R's entry; L with failure = link | L's entry |
//!
//! ```text
//! if (flag(A) && flag(B)) { ... }
//!
//!   chunk 2: goto_if_set A -> chunk 1, else -> failure
//!   chunk 1: jump -> chunk 3
//!   chunk 3: goto_if_set B -> success, else -> failure
//! ```
//!
//! The left operand always sits in front of the right one, so `A && B`
//! never tests `B` once `A` failed and `A || B` never tests `B` once `A`
//! held.
//!
//! Ids are handed out link first, then the left operand, then the right.

use crate::ast::{BooleanExpression, Operator};
use crate::compiler::chunk::{Branch, ChunkId, ChunkIds};
use crate::error::{EmitError, Result};

use super::PendingChunk;

/// Linearizes `expr`, appending the new chunks to `out`.
///
/// Returns the id of the chunk that evaluates the expression first.
pub fn linearize<'a>(
    expr: &'a BooleanExpression,
    success: ChunkId,
    failure: Option<ChunkId>,
    ids: &mut ChunkIds,
    out: &mut Vec<PendingChunk<'a>>,
) -> Result<ChunkId> {
    match expr {
        BooleanExpression::Comparison(comparison) => {
            let id = ids.allocate();
            out.push(PendingChunk::control(
                id,
                Branch::Conditional {
                    truthy: success,
                    comparison,
                    falsey: failure,
                },
            ));
            Ok(id)
        }
        BooleanExpression::Binary {
            left,
            operator: Operator::And,
            right,
        } => {
            let link = ids.allocate();
            let entry = linearize(left, link, failure, ids, out)?;
            let right_entry = linearize(right, success, failure, ids, out)?;
            out.push(PendingChunk::control(link, Branch::Jump { dest: right_entry }));
            Ok(entry)
        }
        BooleanExpression::Binary {
            left,
            operator: Operator::Or,
            right,
        } => {
            let link = ids.allocate();
            let entry = linearize(left, success, Some(link), ids, out)?;
            let right_entry = linearize(right, success, failure, ids, out)?;
            out.push(PendingChunk::control(link, Branch::Jump { dest: right_entry }));
            Ok(entry)
        }
        BooleanExpression::Binary { operator, .. } => {
            Err(EmitError::MalformedCondition { operator: *operator })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OperatorExpression;

    fn run(expr: &BooleanExpression, success: usize, failure: Option<usize>) -> (ChunkId, Vec<PendingChunk<'_>>) {
        // Pretend ids up to 9 are already taken by the surrounding statement.
        let mut ids = ChunkIds::new();
        while ids.last() < ChunkId(9) {
            ids.allocate();
        }
        let mut out = Vec::new();
        let entry = linearize(expr, ChunkId(success), failure.map(ChunkId), &mut ids, &mut out)
            .expect("condition should linearize");
        (entry, out)
    }

    fn branch_of<'a>(chunks: &'a [PendingChunk<'a>], id: usize) -> &'a Branch<'a> {
        chunks
            .iter()
            .find(|c| c.id == ChunkId(id))
            .and_then(|c| c.branch.as_ref())
            .expect("chunk should have a branch")
    }

    fn tested_flag(branch: &Branch<'_>) -> String {
        match branch {
            Branch::Conditional {
                comparison: OperatorExpression::Flag { flag, .. },
                ..
            } => flag.clone(),
            other => panic!("expected a flag test, got {:?}", other),
        }
    }

    #[test]
    fn test_single_comparison() {
        let expr = BooleanExpression::flag("A");
        let (entry, chunks) = run(&expr, 1, Some(2));
        assert_eq!(entry, ChunkId(10));
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].statements.is_empty());
        assert!(matches!(
            branch_of(&chunks, 10),
            Branch::Conditional { truthy: ChunkId(1), falsey: Some(ChunkId(2)), .. }
        ));
    }

    #[test]
    fn test_and_short_circuits_on_failure() {
        let expr = BooleanExpression::and(BooleanExpression::flag("A"), BooleanExpression::flag("B"));
        let (entry, chunks) = run(&expr, 1, Some(2));
        // link = 10, A = 11, B = 12
        assert_eq!(entry, ChunkId(11));
        assert_eq!(chunks.len(), 3);
        assert_eq!(tested_flag(branch_of(&chunks, 11)), "A");
        assert!(matches!(
            branch_of(&chunks, 11),
            Branch::Conditional { truthy: ChunkId(10), falsey: Some(ChunkId(2)), .. }
        ));
        assert_eq!(*branch_of(&chunks, 10), Branch::Jump { dest: ChunkId(12) });
        assert_eq!(tested_flag(branch_of(&chunks, 12)), "B");
        assert!(matches!(
            branch_of(&chunks, 12),
            Branch::Conditional { truthy: ChunkId(1), falsey: Some(ChunkId(2)), .. }
        ));
    }

    #[test]
    fn test_or_short_circuits_on_success() {
        let expr = BooleanExpression::or(BooleanExpression::flag("A"), BooleanExpression::flag("B"));
        let (entry, chunks) = run(&expr, 1, None);
        assert_eq!(entry, ChunkId(11));
        assert!(matches!(
            branch_of(&chunks, 11),
            Branch::Conditional { truthy: ChunkId(1), falsey: Some(ChunkId(10)), .. }
        ));
        assert_eq!(*branch_of(&chunks, 10), Branch::Jump { dest: ChunkId(12) });
        assert!(matches!(
            branch_of(&chunks, 12),
            Branch::Conditional { truthy: ChunkId(1), falsey: None, .. }
        ));
    }

    #[test]
    fn test_nested_entry_is_leftmost_comparison() {
        // (A || B) && C
        let expr = BooleanExpression::and(
            BooleanExpression::or(BooleanExpression::flag("A"), BooleanExpression::flag("B")),
            BooleanExpression::flag("C"),
        );
        let (entry, chunks) = run(&expr, 1, Some(2));
        assert_eq!(tested_flag(branch_of(&chunks, entry.0)), "A");
        // Three comparisons and two link chunks.
        assert_eq!(chunks.len(), 5);
        let conditionals = chunks
            .iter()
            .filter(|c| matches!(c.branch, Some(Branch::Conditional { .. })))
            .count();
        assert_eq!(conditionals, expr.leaf_count());
    }

    #[test]
    fn test_malformed_operator() {
        let expr = BooleanExpression::binary(
            BooleanExpression::flag("A"),
            Operator::Equal,
            BooleanExpression::flag("B"),
        );
        let mut ids = ChunkIds::new();
        let mut out = Vec::new();
        let err = linearize(&expr, ChunkId(1), None, &mut ids, &mut out).unwrap_err();
        assert!(matches!(err, EmitError::MalformedCondition { operator: Operator::Equal }));
    }
}
