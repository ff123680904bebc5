//! Read-only match view and input events for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::core::{Side, SideMap};
use crate::tokens::{TokenStatus, TOKENS_PER_SIDE};
use crate::turn::Phase;

/// Input from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiInput {
    RollRequested,
    /// Start slot of the chosen token on the active side.
    TokenSelected(u8),
}

/// Everything a front-end needs to draw the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub active: Side,
    pub phase: Phase,
    pub rolled: u8,
    /// Freeze flag per side; only the active side's flag restricts moves.
    pub frozen: SideMap<bool>,
    /// Selectable flags of the active side, by start slot.
    pub selectable: [bool; TOKENS_PER_SIDE],
    pub tokens: SideMap<Vec<TokenStatus>>,
    pub turn: u32,
    pub winner: Option<Side>,
}

impl MatchView {
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Slots the active side may currently pick.
    pub fn selectable_slots(&self) -> impl Iterator<Item = u8> + '_ {
        self.selectable
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s)
            .map(|(slot, _)| slot as u8)
    }
}
