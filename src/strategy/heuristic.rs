//! Fixed-priority token selection.

use tracing::trace;

use super::stats::KillStats;
use super::OpponentStrategy;
use crate::tokens::{Table, TokenId};

/// Picks the candidate with the best `KillStats::rank`.
///
/// Candidates are scanned farthest-first, ties in slot order. The first
/// candidate scanned is the starting choice and is only replaced by a
/// strictly better rank, so among equally ranked moves the most advanced
/// token wins.
#[derive(Clone, Debug, Default)]
pub struct PriorityHeuristic;

impl PriorityHeuristic {
    pub fn new() -> Self {
        Self
    }
}

impl OpponentStrategy for PriorityHeuristic {
    fn select(&self, table: &Table, candidates: &[TokenId], roll: u8) -> Option<TokenId> {
        let mut ordered: Vec<(TokenId, i32)> = candidates
            .iter()
            .filter_map(|&id| table.token(id).ok().map(|t| (id, t.position())))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.slot.cmp(&b.0.slot)));

        let mut iter = ordered.into_iter();
        let (first, _) = iter.next()?;
        let mut best = first;
        let mut best_rank = KillStats::evaluate(table, first, roll).rank();

        for (id, _) in iter {
            let stats = KillStats::evaluate(table, id, roll);
            trace!(token = %id, ?stats, rank = stats.rank(), "candidate");
            if stats.rank() < best_rank {
                best = id;
                best_rank = stats.rank();
            }
        }
        Some(best)
    }
}
