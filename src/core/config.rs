//! Match configuration.
//!
//! A match is configured at construction time by a `MatchConfig`:
//! - Who controls each side (`ControlMode`)
//! - The board layout (`BoardLayout`)
//! - How contract violations and turn switches are handled
//!
//! All types are serde-serializable so front-ends can load them from files.

use serde::{Deserialize, Serialize};

use super::side::{Side, SideMap};
use crate::board::BoardLayout;

/// Who drives a side's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlMode {
    /// Rolls and selections arrive from the presentation layer.
    Human,
    /// The built-in opponent strategy picks the token.
    Heuristic,
    /// Moves arrive as network messages from the other peer.
    RemoteProxy,
}

/// What to do when a front-end submits an invalid selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationPolicy {
    /// Reject the input and leave the match untouched.
    #[default]
    Reject,
    /// Reject the input and end the current turn so the match cannot stall.
    EndTurn,
}

/// How the controller reacts when a turn ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchPolicy {
    /// Switch to the other side immediately (local and authoritative play).
    #[default]
    Immediate,
    /// Wait for an explicit switch (network replica).
    Deferred,
}

/// Configuration for a single match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Seed for the match RNG (dice, restart tiles, start side).
    pub seed: u64,

    /// Side that moves first. `None` picks one at random.
    pub first_side: Option<Side>,

    /// Controller per side.
    pub control: SideMap<ControlMode>,

    /// Track geometry and tile kinds.
    pub layout: BoardLayout,

    /// Handling of invalid front-end selections.
    pub violation_policy: ViolationPolicy,

    /// Handling of turn ends.
    pub switch_policy: SwitchPolicy,

    /// Log the tile occupancy report whenever a turn starts.
    pub dump_occupancy: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            first_side: None,
            control: SideMap::new(|side| match side {
                Side::First => ControlMode::Human,
                Side::Second => ControlMode::Heuristic,
            }),
            layout: BoardLayout::default(),
            violation_policy: ViolationPolicy::Reject,
            switch_policy: SwitchPolicy::Immediate,
            dump_occupancy: false,
        }
    }
}

impl MatchConfig {
    /// Human on both sides (hot-seat play).
    pub fn hot_seat() -> Self {
        Self::default().with_control(Side::Second, ControlMode::Human)
    }

    /// Built-in strategy on both sides (headless simulation).
    pub fn computer_vs_computer() -> Self {
        Self::default()
            .with_control(Side::First, ControlMode::Heuristic)
            .with_control(Side::Second, ControlMode::Heuristic)
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fix the side that moves first.
    pub fn with_first_side(mut self, side: Side) -> Self {
        self.first_side = Some(side);
        self
    }

    /// Set the controller of one side.
    pub fn with_control(mut self, side: Side, mode: ControlMode) -> Self {
        self.control[side] = mode;
        self
    }

    /// Replace the board layout.
    pub fn with_layout(mut self, layout: BoardLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the violation policy.
    pub fn with_violation_policy(mut self, policy: ViolationPolicy) -> Self {
        self.violation_policy = policy;
        self
    }

    /// Set the switch policy.
    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.switch_policy = policy;
        self
    }

    /// Enable or disable the occupancy report.
    pub fn with_occupancy_dump(mut self, enabled: bool) -> Self {
        self.dump_occupancy = enabled;
        self
    }
}
