//! Per-candidate tactical statistics for the computer opponent.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::TileId;
use crate::core::DIE_MAX;
use crate::tokens::{Table, TokenId};

/// Tactical facts about moving one token by one roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KillStats {
    /// The landing tile holds an enemy now.
    pub kill_this: bool,
    /// Some follow-up roll from the landing index reaches an enemy.
    pub kill_next: bool,
    /// Some enemy can reach the landing tile with its next roll.
    pub vulnerable: bool,
}

impl KillStats {
    /// Evaluate moving `id` by `roll` on the current table.
    ///
    /// Finishing moves leave the board, so they can neither threaten nor be
    /// threatened.
    #[must_use]
    pub fn evaluate(table: &Table, id: TokenId, roll: u8) -> Self {
        let kill_this = !table.killable_pieces_for_roll(id, roll).is_empty();
        if table.is_finishing_move(id, roll) {
            return Self {
                kill_this,
                ..Self::default()
            };
        }

        let Some((landing_index, landing_tile)) = table
            .token(id)
            .ok()
            .and_then(|token| table.target_from(id.side, token.position(), roll))
        else {
            return Self::default();
        };

        let kill_next = (1..=DIE_MAX).any(|next| {
            forward_target(table, id, landing_index, next)
                .is_some_and(|tile| !table.enemies_on(tile, id.side).is_empty())
        });

        let vulnerable = enemy_reach(table, id).contains(&landing_tile);

        Self {
            kill_this,
            kill_next,
            vulnerable,
        }
    }

    /// Preference rank, 1 best through 8 worst.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match (self.kill_this, self.kill_next, self.vulnerable) {
            (true, true, false) => 1,
            (true, false, false) => 2,
            (true, true, true) => 3,
            (true, false, true) => 4,
            (false, true, false) => 5,
            (false, false, true) => 6,
            (false, true, true) => 7,
            (false, false, false) => 8,
        }
    }
}

/// Tile reached by moving `roll` from `from` without leaving the board.
fn forward_target(table: &Table, id: TokenId, from: i32, roll: u8) -> Option<TileId> {
    let (index, tile) = table.target_from(id.side, from, roll)?;
    (index > from).then_some(tile)
}

/// Every tile some opposing token could land on with its next roll.
fn enemy_reach(table: &Table, id: TokenId) -> FxHashSet<TileId> {
    let enemy = id.side.opponent();
    let mut reach = FxHashSet::default();
    for token in table.tokens(enemy).iter().filter(|t| !t.is_finished()) {
        for roll in 1..=DIE_MAX {
            if let Some(tile) = forward_target(table, token.id(), token.position(), roll) {
                reach.insert(tile);
            }
        }
    }
    reach
}
