//! Per-side turn state machine.
//!
//! ```text
//! Idle ──activate──► RollPending ──roll──► SelectionPending ──apply_move──► Ended
//!                        │                      │                 │
//!                        └──(no legal move)─────┴──► Ended        └─(Repeat)─► RollPending
//! ```
//!
//! Freeze is an orthogonal flag: while set, only undeployed tokens are
//! eligible. It is cleared only when the turn ends, so rolls granted by a
//! Repeat tile in the same turn stay frozen.
//!
//! The engine never switches sides itself. It reports a `TurnSignal` and
//! the match controller acts on it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ControlMode, GameRng, RuleError, RuleResult, Side, DIE_MAX};
use crate::tokens::{MoveOutcome, Table, TileEffect, TokenId, TOKENS_PER_SIDE};

/// Where a side's turn currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Not this side's turn.
    #[default]
    Idle,
    /// Waiting for the die.
    RollPending,
    /// Waiting for a token choice.
    SelectionPending,
    /// Turn finished; waiting for the controller to switch.
    Ended,
}

/// What the controller should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnSignal {
    AwaitRoll,
    AwaitSelection,
    /// Same side rolls again.
    Repeat,
    /// Turn is over; switch sides.
    Ended,
    /// All of this side's tokens are finished.
    GameOver,
    /// Nothing happened (e.g. `end` on an already ended turn).
    NoOp,
}

/// Turn bookkeeping for one side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Last roll, 0 when none or when the roll was a pass.
    pub rolled: u8,
    pub is_frozen: bool,
    pub phase: Phase,
    /// Per-slot selectable flags, only set during `SelectionPending`.
    pub selectable: [bool; TOKENS_PER_SIDE],
}

/// Turn state machine for one side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnEngine {
    side: Side,
    mode: ControlMode,
    state: TurnState,
}

impl TurnEngine {
    pub fn new(side: Side, mode: ControlMode) -> Self {
        Self {
            side,
            mode,
            state: TurnState::default(),
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn rolled(&self) -> u8 {
        self.state.rolled
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.state.is_frozen
    }

    pub(crate) fn restore_state(&mut self, state: TurnState) {
        self.state = state;
    }

    /// Mark this side frozen for its next turn.
    pub fn freeze(&mut self) {
        self.state.is_frozen = true;
    }

    fn require(&self, phase: Phase, action: &'static str) -> RuleResult<()> {
        if self.state.phase != phase {
            return Err(RuleError::WrongPhase {
                side: self.side,
                phase: self.state.phase,
                action,
            });
        }
        Ok(())
    }

    // === Eligibility ===

    /// Whether a token may be chosen for an arbitrary roll, honoring freeze.
    #[must_use]
    pub fn is_eligible_for(&self, table: &Table, id: TokenId, roll: u8) -> bool {
        if id.side != self.side || !table.can_move_to(id, roll) {
            return false;
        }
        !self.state.is_frozen || table.token(id).is_ok_and(|t| t.is_undeployed())
    }

    /// Whether the token in `slot` may be chosen for the current roll.
    #[must_use]
    pub fn is_eligible(&self, table: &Table, slot: u8) -> bool {
        self.is_eligible_for(table, TokenId::new(self.side, slot), self.state.rolled)
    }

    /// Tokens eligible for the current roll, in slot order.
    #[must_use]
    pub fn eligible_tokens(&self, table: &Table) -> Vec<TokenId> {
        TokenId::all(self.side)
            .filter(|&id| self.is_eligible_for(table, id, self.state.rolled))
            .collect()
    }

    /// True when some roll in 1..=3 would give a legal move.
    #[must_use]
    pub fn pre_roll_open_spaces_available(&self, table: &Table) -> bool {
        (1..=DIE_MAX).any(|roll| TokenId::all(self.side).any(|id| self.is_eligible_for(table, id, roll)))
    }

    /// True when the current roll gives a legal move.
    #[must_use]
    pub fn post_roll_open_spaces_available(&self, table: &Table) -> bool {
        self.state.rolled != 0 && TokenId::all(self.side).any(|id| self.is_eligible_for(table, id, self.state.rolled))
    }

    // === Transitions ===

    /// Start this side's turn.
    ///
    /// Ends immediately when the side is frozen with nothing to deploy, or
    /// when no roll could produce a legal move.
    pub fn activate(&mut self, table: &Table) -> TurnSignal {
        self.state.rolled = 0;
        self.state.selectable = [false; TOKENS_PER_SIDE];
        self.state.phase = Phase::RollPending;

        let frozen_out = self.state.is_frozen && !table.has_undeployed(self.side);
        if frozen_out || !self.pre_roll_open_spaces_available(table) {
            debug!(side = %self.side, frozen = self.state.is_frozen, "no move possible, skipping turn");
            return self.end(table);
        }
        TurnSignal::AwaitRoll
    }

    /// Roll the die and move on to selection.
    pub fn roll(&mut self, table: &Table, rng: &mut GameRng) -> RuleResult<TurnSignal> {
        self.require(Phase::RollPending, "roll")?;
        let roll = rng.roll_die();
        self.set_roll(table, roll)
    }

    /// Apply an externally decided roll. 0 is the pass sentinel.
    pub fn set_roll(&mut self, table: &Table, roll: u8) -> RuleResult<TurnSignal> {
        self.require(Phase::RollPending, "roll")?;
        if roll > DIE_MAX {
            return Err(RuleError::InvalidRoll { roll });
        }
        self.state.rolled = roll;
        debug!(side = %self.side, roll, "rolled");
        Ok(self.try_selection(table))
    }

    /// Enter selection if the roll gives a legal move, otherwise end.
    pub fn try_selection(&mut self, table: &Table) -> TurnSignal {
        if !self.post_roll_open_spaces_available(table) {
            return self.end(table);
        }
        for slot in 0..TOKENS_PER_SIDE as u8 {
            self.state.selectable[slot as usize] = self.is_eligible(table, slot);
        }
        self.state.phase = Phase::SelectionPending;
        TurnSignal::AwaitSelection
    }

    /// Move the token in `slot` by the current roll.
    ///
    /// The caller applies `TileEffect::FreezeOpponent` to the other side.
    /// `restart_coin` is consulted only for restart landings.
    pub fn apply_move(
        &mut self,
        table: &mut Table,
        slot: u8,
        restart_coin: impl FnOnce() -> bool,
    ) -> RuleResult<(MoveOutcome, TurnSignal)> {
        self.require(Phase::SelectionPending, "move")?;
        let id = TokenId::new(self.side, slot);
        if !self.state.selectable.get(slot as usize).copied().unwrap_or(false) {
            return Err(RuleError::IneligibleToken {
                token: id,
                roll: self.state.rolled,
            });
        }

        let outcome = table.commit_move(id, self.state.rolled, restart_coin)?;
        self.state.selectable = [false; TOKENS_PER_SIDE];

        let signal = match outcome.effect() {
            TileEffect::Repeat => {
                self.state.phase = Phase::Idle;
                TurnSignal::Repeat
            }
            TileEffect::EndTurn | TileEffect::FreezeOpponent | TileEffect::Finished => self.end(table),
        };
        Ok((outcome, signal))
    }

    /// Finish the turn. A no-op when the turn is not running.
    pub fn end(&mut self, table: &Table) -> TurnSignal {
        if matches!(self.state.phase, Phase::Idle | Phase::Ended) {
            return TurnSignal::NoOp;
        }
        self.state.is_frozen = false;
        self.state.selectable = [false; TOKENS_PER_SIDE];
        self.state.phase = Phase::Ended;

        if table.all_finished(self.side) {
            TurnSignal::GameOver
        } else {
            TurnSignal::Ended
        }
    }

    /// Grant another roll to the same side.
    pub fn set_repeat(&mut self, table: &Table) -> TurnSignal {
        self.activate(table)
    }

    /// Return to `Idle` once the controller has switched away.
    pub(crate) fn deactivate(&mut self) {
        self.state.phase = Phase::Idle;
        self.state.rolled = 0;
        self.state.selectable = [false; TOKENS_PER_SIDE];
    }
}
