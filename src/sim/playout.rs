//! Headless computer-vs-computer playouts.
//!
//! Runs complete matches with both sides driven by the opponent strategy,
//! without pacing delays. Used for balancing layouts and in property tests.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::BoardLayout;
use crate::core::{ConfigError, MatchConfig, RuleError, Side, SideMap};
use crate::game::{Match, MatchEvent, MatchStatus};

/// Errors raised while running a playout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Configuration for playouts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayoutConfig {
    /// Board used for every match.
    pub layout: BoardLayout,

    /// Maximum engine steps per match (to bound degenerate games).
    pub max_steps: u32,

    /// Seed offset (combined with the game index for unique seeds).
    pub seed_offset: u64,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            layout: BoardLayout::default(),
            max_steps: 10_000,
            seed_offset: 0,
        }
    }
}

impl PlayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: BoardLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_seed_offset(mut self, offset: u64) -> Self {
        self.seed_offset = offset;
        self
    }
}

/// Result of one playout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutResult {
    pub seed: u64,
    /// `None` if the step limit was hit first.
    pub winner: Option<Side>,
    pub steps: u32,
    pub turns: u32,
    /// Tokens captured by each side.
    pub captures: SideMap<u32>,
    /// Final `side_value` of each side.
    pub side_values: SideMap<u32>,
}

/// Aggregate over many playouts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutSummary {
    pub games: u32,
    pub wins: SideMap<u32>,
    pub unfinished: u32,
    pub total_turns: u64,
}

impl PlayoutSummary {
    pub fn record(&mut self, result: &PlayoutResult) {
        self.games += 1;
        self.total_turns += result.turns as u64;
        match result.winner {
            Some(side) => self.wins[side] += 1,
            None => self.unfinished += 1,
        }
    }

    /// Average turns per game.
    #[must_use]
    pub fn avg_turns(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        }
    }
}

/// Drive an already configured match until it ends or `max_steps` runs out.
///
/// Both sides must be `ControlMode::Heuristic`. A match that has not started
/// is started first.
pub fn play_out(game: &mut Match, max_steps: u32) -> Result<PlayoutResult, RuleError> {
    if game.status() == MatchStatus::NotStarted {
        game.start()?;
    }

    let mut steps = 0;
    let mut captures = SideMap::with_value(0u32);
    while steps < max_steps && game.step()? {
        steps += 1;
        for event in game.take_events() {
            if let MatchEvent::TokenCaptured { by, .. } = event {
                captures[by.side] += 1;
            }
        }
    }

    Ok(PlayoutResult {
        seed: game.config().seed,
        winner: game.winner(),
        steps,
        turns: game.turn_number(),
        captures,
        side_values: SideMap::new(|side| game.side_value(side)),
    })
}

/// Runs batches of seeded playouts.
#[derive(Clone, Debug, Default)]
pub struct PlayoutRunner {
    config: PlayoutConfig,
}

impl PlayoutRunner {
    pub fn new(config: PlayoutConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PlayoutConfig {
        &self.config
    }

    /// Play one match with the given seed.
    pub fn run(&self, seed: u64) -> Result<PlayoutResult, PlayoutError> {
        let config = MatchConfig::computer_vs_computer()
            .with_seed(seed)
            .with_layout(self.config.layout.clone());
        let mut game = Match::new(config)?;
        let result = play_out(&mut game, self.config.max_steps)?;
        debug!(seed, winner = ?result.winner, turns = result.turns, "playout finished");
        Ok(result)
    }

    /// Play `games` matches with consecutive seeds.
    pub fn run_batch(&self, games: u32) -> Result<PlayoutSummary, PlayoutError> {
        let mut summary = PlayoutSummary::default();
        for index in 0..games {
            let result = self.run(self.config.seed_offset.wrapping_add(index as u64))?;
            summary.record(&result);
        }
        info!(
            games = summary.games,
            first_wins = summary.wins[Side::First],
            second_wins = summary.wins[Side::Second],
            avg_turns = summary.avg_turns(),
            "playout batch finished"
        );
        Ok(summary)
    }
}
