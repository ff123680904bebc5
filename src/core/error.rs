//! Error types for the rules engine.
//!
//! - `RuleError`: contract violations (wrong phase, ineligible token,
//!   out-of-range tile index). Never silently corrected.
//! - `ConfigError`: invalid board layouts.
//!
//! Expected empty outcomes (no legal move, nothing to capture) are modeled
//! with `Option` and empty collections, not errors.

use crate::board::TileId;
use crate::core::config::ControlMode;
use crate::core::side::Side;
use crate::tokens::TokenId;
use crate::turn::Phase;

/// Errors raised by rule operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Side-relative tile index outside the track.
    #[error("tile index {index} is outside the track (0-13)")]
    IndexOutOfRange { index: i32 },

    /// Token slot that does not exist.
    #[error("no token in slot {slot} for {side}")]
    UnknownToken { side: Side, slot: u8 },

    /// Operation attempted in the wrong turn phase.
    #[error("{side} cannot {action} during {phase:?}")]
    WrongPhase {
        side: Side,
        phase: Phase,
        action: &'static str,
    },

    /// Token not selectable for the current roll.
    #[error("token {token} is not selectable with roll {roll}")]
    IneligibleToken { token: TokenId, roll: u8 },

    /// Token has no legal destination for the roll.
    #[error("token {token} has no legal move for roll {roll}")]
    IllegalMove { token: TokenId, roll: u8 },

    /// Placement onto a tile already holding its capacity of the side.
    #[error("{tile} is full for {side}")]
    TileFull { tile: TileId, side: Side },

    /// Roll outside the die range (0 is the pass sentinel).
    #[error("roll {roll} is outside 0-3")]
    InvalidRoll { roll: u8 },

    /// Operation addressed to the side that is not active.
    #[error("it is not {side}'s turn")]
    NotActive { side: Side },

    /// Operation requires a different controller for the active side.
    #[error("{side} is not controlled by {expected:?}")]
    WrongController { side: Side, expected: ControlMode },

    /// Turn switch that does not match the controller's expectation.
    #[error("unexpected switch to {requested}")]
    UnexpectedSwitch { requested: Side },

    /// Snapshot that cannot be adopted.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: &'static str },

    #[error("match has not started")]
    NotStarted,

    #[error("match has already started")]
    AlreadyStarted,

    #[error("match is over")]
    MatchOver,
}

/// Result type alias for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while validating configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Capacity tiles hold 1, 2 or 4 same-side tokens.
    #[error("tile {index} has capacity {capacity}; expected 1, 2 or 4")]
    InvalidCapacity { index: usize, capacity: u8 },

    /// Shared lane must lie inside the track.
    #[error("shared lane {start}..{end} does not fit the 14-tile track")]
    SharedSpanOutOfRange { start: u8, end: u8 },
}
