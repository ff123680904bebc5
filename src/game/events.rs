//! Events emitted by a match for presentation and networking layers.

use serde::{Deserialize, Serialize};

use crate::core::Side;
use crate::tokens::TokenId;

/// Something observable that happened during a match.
///
/// Events are buffered in order and drained with `Match::take_events`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    TurnStarted { side: Side, turn: u32 },
    Rolled { side: Side, roll: u8 },
    /// The side had no legal move and its turn ended without moving.
    Passed { side: Side },
    TokenMoved { token: TokenId, from: Option<u8>, to: u8 },
    TokenFinished { token: TokenId },
    TokenCaptured { token: TokenId, by: TokenId },
    /// A restart tile's coin was resolved for `token`.
    RestartResolved { token: TokenId, kicked_back: bool },
    Frozen { side: Side },
    RepeatGranted { side: Side },
    TurnEnded { side: Side },
    TurnSwitched { active: Side },
    GameOver { winner: Side },
}

impl MatchEvent {
    /// Whether the event changes which side is to move.
    #[must_use]
    pub fn is_switch(&self) -> bool {
        matches!(self, MatchEvent::TurnSwitched { .. })
    }
}
