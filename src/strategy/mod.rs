//! Computer opponent: token selection for a side controlled by the engine.
//!
//! Strategies are read-only over the table and deterministic: the same
//! table, candidates and roll always give the same choice.

pub mod heuristic;
pub mod stats;

pub use heuristic::PriorityHeuristic;
pub use stats::KillStats;

use crate::tokens::{Table, TokenId};

/// Chooses which token to move for a computer-controlled side.
pub trait OpponentStrategy: Send + Sync {
    /// Pick one of `candidates` (tokens with a legal move for `roll`).
    ///
    /// Returns `None` only when there are no candidates.
    fn select(&self, table: &Table, candidates: &[TokenId], roll: u8) -> Option<TokenId>;
}
