//! Serializable match state for full resynchronization.

use serde::{Deserialize, Serialize};

use crate::core::{GameRngState, Side, SideMap};
use crate::tokens::Table;
use crate::turn::TurnState;

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    NotStarted,
    InProgress,
    /// Turn ended; waiting for an authoritative switch.
    AwaitingSwitch,
    Over { winner: Side },
}

/// Complete game state: table, turn bookkeeping and turn order.
///
/// Controllers, configuration and the RNG are not included; a snapshot
/// moves board state between peers that already agree on those.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub table: Table,
    pub turns: SideMap<TurnState>,
    pub active: Side,
    pub first: Side,
    pub status: MatchStatus,
    pub turn_number: u32,
}

/// Stream positions of a match's RNGs. Kept out of `MatchSnapshot`; only
/// useful for saving and replaying a match on one machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSnapshot {
    pub dice: GameRngState,
    pub coins: GameRngState,
}
