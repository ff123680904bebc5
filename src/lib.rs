//! # tile-race
//!
//! Rules engine and computer opponent for a two-player race board game.
//! Each side moves seven tokens along a 14-tile route; the middle of the
//! route is shared, and that is where tokens capture each other.
//!
//! ## Design Principles
//!
//! 1. **One Aggregate**: a `Match` owns the table, both turn engines, the RNG
//!    and the opponent strategy. No globals.
//!
//! 2. **Tagged, Not Inherited**: one `Tile` type carrying a `TileKind`, one
//!    `TurnEngine` parameterized by `ControlMode`.
//!
//! 3. **Deterministic**: every random decision goes through a seeded,
//!    snapshot-able `GameRng`, so matches replay exactly.
//!
//! 4. **Errors Are Values**: contract violations come back as `RuleError`;
//!    empty outcomes (no move, nothing to capture) are `None` or empty.
//!
//! ## Modules
//!
//! - `core`: Sides, RNG, configuration, errors
//! - `board`: Tiles, tile kinds, route geometry
//! - `tokens`: Tokens, movement, capture and tile effects
//! - `turn`: Per-side turn state machine
//! - `strategy`: Computer opponent
//! - `game`: Match controller, events, views and snapshots
//! - `net`: Authority/replica message contract
//! - `sim`: Headless playouts

pub mod core;
pub mod board;
pub mod tokens;
pub mod turn;
pub mod strategy;
pub mod game;
pub mod net;
pub mod sim;

// Re-export commonly used types
pub use crate::core::{
    Side, SideMap,
    GameRng, GameRngState, DIE_MAX,
    ControlMode, MatchConfig, SwitchPolicy, ViolationPolicy,
    ConfigError, RuleError, RuleResult,
};

pub use crate::board::{Board, BoardLayout, Tile, TileId, TileKind, TRACK_LEN};

pub use crate::tokens::{
    Landing, MoveOutcome, Table, TileEffect,
    Token, TokenId, TokenStatus, TOKENS_PER_SIDE, UNDEPLOYED,
};

pub use crate::turn::{Phase, TurnEngine, TurnSignal, TurnState};

pub use crate::strategy::{KillStats, OpponentStrategy, PriorityHeuristic};

pub use crate::game::{Match, MatchEvent, MatchSnapshot, MatchStatus, MatchView, RngSnapshot, UiInput};

pub use crate::net::{NetError, NetMessage, Peer, Role};

pub use crate::sim::{PlayoutConfig, PlayoutResult, PlayoutRunner};
