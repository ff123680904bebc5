//! The match controller.
//!
//! `Match` owns the table, both turn engines, the random streams and the
//! opponent strategy. It drives the active side's engine and reacts to the
//! `TurnSignal`s it reports: switching sides, granting repeats, applying
//! freezes and detecting the winner.
//!
//! ## Driving a match
//!
//! | Controller   | Roll              | Selection                    |
//! |--------------|-------------------|------------------------------|
//! | `Human`      | `roll`            | `select`                     |
//! | `Heuristic`  | `request_roll`    | `after_delay`                |
//! | `RemoteProxy`| `apply_remote_move` / `pass_remote`              ||
//!
//! The computer's pacing delay lives outside the engine: a front-end calls
//! `request_roll`, waits, then calls `after_delay`. `step` does both without
//! waiting.
//!
//! ## Switch policy
//!
//! With `SwitchPolicy::Immediate` the controller switches sides as soon as a
//! turn ends. With `SwitchPolicy::Deferred` it parks in
//! `MatchStatus::AwaitingSwitch` until `apply_switch` is called, which is how
//! a network replica waits for the authority.

use tracing::{debug, info, warn};

use super::events::MatchEvent;
use super::snapshot::{MatchSnapshot, MatchStatus, RngSnapshot};
use super::view::{MatchView, UiInput};
use crate::core::{
    ConfigError, ControlMode, GameRng, MatchConfig, RuleError, RuleResult, Side, SideMap,
    SwitchPolicy, ViolationPolicy, DIE_MAX,
};
use crate::strategy::{OpponentStrategy, PriorityHeuristic};
use crate::tokens::{Landing, MoveOutcome, Table, TileEffect, Token, TokenId, TokenStatus};
use crate::turn::{Phase, TurnEngine, TurnSignal};

/// A two-sided match.
pub struct Match {
    config: MatchConfig,
    table: Table,
    engines: SideMap<TurnEngine>,
    active: Side,
    first: Side,
    dice: GameRng,
    coins: GameRng,
    strategy: Box<dyn OpponentStrategy>,
    status: MatchStatus,
    events: Vec<MatchEvent>,
    turn_number: u32,
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("active", &self.active)
            .field("first", &self.first)
            .field("status", &self.status)
            .field("turn_number", &self.turn_number)
            .finish_non_exhaustive()
    }
}

impl Match {
    /// Create a match. The first side comes from the config or a coin flip.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        let table = Table::new(config.layout.clone())?;
        // Restart coins and the turn-order flip draw from their own streams,
        // so the dice sequence depends on the seed alone
        let mut dice = GameRng::new(config.seed);
        let coins = dice.fork();
        let first = config.first_side.unwrap_or_else(|| {
            if dice.for_context("turn-order").coin_flip() {
                Side::First
            } else {
                Side::Second
            }
        });
        let engines = SideMap::new(|side| TurnEngine::new(side, config.control[side]));

        Ok(Self {
            config,
            table,
            engines,
            active: first,
            first,
            dice,
            coins,
            strategy: Box::new(PriorityHeuristic),
            status: MatchStatus::NotStarted,
            events: Vec::new(),
            turn_number: 0,
        })
    }

    /// Replace the computer opponent's strategy (builder pattern).
    pub fn with_strategy(mut self, strategy: impl OpponentStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn engine(&self, side: Side) -> &TurnEngine {
        &self.engines[side]
    }

    #[must_use]
    pub fn active(&self) -> Side {
        self.active
    }

    #[must_use]
    pub fn first_side(&self) -> Side {
        self.first
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Number of turns started so far, counting from 1.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.engines[self.active].phase()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Over { winner } => Some(winner),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    /// Board value of a side (see `Table::side_value`).
    #[must_use]
    pub fn side_value(&self, side: Side) -> u32 {
        self.table.side_value(side)
    }

    /// Hover text for the tile at a side-relative index.
    pub fn tile_summary(&self, side: Side, index: i32) -> RuleResult<&'static str> {
        Ok(self.table.board().tile_at(index, side)?.kind().summary())
    }

    /// Presentation snapshot of the current state.
    #[must_use]
    pub fn view(&self) -> MatchView {
        let engine = &self.engines[self.active];
        MatchView {
            active: self.active,
            phase: engine.phase(),
            rolled: engine.rolled(),
            frozen: SideMap::new(|side| self.engines[side].is_frozen()),
            selectable: engine.state().selectable,
            tokens: SideMap::new(|side| self.table.tokens(side).iter().map(Token::status).collect()),
            turn: self.turn_number,
            winner: self.winner(),
        }
    }

    /// Drain buffered events.
    pub fn take_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    // === Setup ===

    /// Place a token before the match starts (puzzles, tutorials, tests).
    pub fn arrange(&mut self, id: TokenId, status: TokenStatus) -> RuleResult<()> {
        if self.status != MatchStatus::NotStarted {
            return Err(RuleError::AlreadyStarted);
        }
        self.table.set_status(id, status)
    }

    /// Begin the first turn.
    pub fn start(&mut self) -> RuleResult<()> {
        if self.status != MatchStatus::NotStarted {
            return Err(RuleError::AlreadyStarted);
        }
        self.status = MatchStatus::InProgress;
        info!(first = %self.first, seed = self.config.seed, "match started");

        let signal = self.start_turn(self.first);
        self.dispatch(signal);
        Ok(())
    }

    // === Local play ===

    /// Roll for the active human side.
    pub fn roll(&mut self) -> RuleResult<u8> {
        self.ensure_running()?;
        self.ensure_controller(ControlMode::Human)?;
        self.roll_active()
    }

    /// Apply a predetermined roll for the active human side (replays,
    /// tutorials, physical dice).
    pub fn force_roll(&mut self, roll: u8) -> RuleResult<u8> {
        self.ensure_running()?;
        self.ensure_controller(ControlMode::Human)?;
        let side = self.active;
        let signal = self.engines[side].set_roll(&self.table, roll)?;
        Ok(self.after_roll(side, signal))
    }

    /// Move the active human side's token in `slot`.
    pub fn select(&mut self, slot: u8) -> RuleResult<MoveOutcome> {
        self.ensure_running()?;
        self.ensure_controller(ControlMode::Human)?;
        self.apply_selection(slot, None)
    }

    /// Route a presentation-layer input.
    ///
    /// Inputs arriving in the wrong phase are rejected without touching the
    /// match. Under `ViolationPolicy::EndTurn` an invalid token choice also
    /// ends the current turn; the error is still returned.
    pub fn handle_input(&mut self, input: UiInput) -> RuleResult<()> {
        let result = match input {
            UiInput::RollRequested => self.roll().map(|_| ()),
            UiInput::TokenSelected(slot) => self.select(slot).map(|_| ()),
        };

        if let Err(err) = &result {
            warn!(?input, %err, "input rejected");
            let invalid_choice = matches!(
                err,
                RuleError::IneligibleToken { .. } | RuleError::IllegalMove { .. }
            );
            if invalid_choice && self.config.violation_policy == ViolationPolicy::EndTurn {
                self.force_end()?;
            }
        }
        result
    }

    /// End the active side's turn regardless of phase.
    pub fn force_end(&mut self) -> RuleResult<()> {
        self.ensure_running()?;
        let side = self.active;
        let signal = self.engines[side].end(&self.table);
        if signal != TurnSignal::NoOp {
            warn!(%side, "turn ended early");
        }
        self.dispatch(signal);
        Ok(())
    }

    // === Computer play ===

    /// First half of the computer's turn: roll the die.
    pub fn request_roll(&mut self) -> RuleResult<u8> {
        self.ensure_running()?;
        self.ensure_controller(ControlMode::Heuristic)?;
        self.roll_active()
    }

    /// Second half of the computer's turn: let the strategy pick and move.
    ///
    /// Returns `None` when the strategy found nothing to move, in which case
    /// the turn is ended.
    pub fn after_delay(&mut self) -> RuleResult<Option<MoveOutcome>> {
        self.ensure_running()?;
        self.ensure_controller(ControlMode::Heuristic)?;

        let side = self.active;
        let engine = &self.engines[side];
        if engine.phase() != Phase::SelectionPending {
            return Err(RuleError::WrongPhase {
                side,
                phase: engine.phase(),
                action: "select",
            });
        }
        let roll = engine.rolled();
        let candidates = engine.eligible_tokens(&self.table);

        match self.strategy.select(&self.table, &candidates, roll) {
            Some(token) => {
                debug!(token = %token, roll, "computer selected token");
                self.apply_selection(token.slot, None).map(Some)
            }
            None => {
                self.force_end()?;
                Ok(None)
            }
        }
    }

    /// Advance a computer-controlled side by one step without pacing.
    ///
    /// Returns `false` once the match is over.
    pub fn step(&mut self) -> RuleResult<bool> {
        if self.is_over() {
            return Ok(false);
        }
        self.ensure_running()?;

        match self.phase() {
            Phase::RollPending => {
                self.request_roll()?;
            }
            Phase::SelectionPending => {
                self.after_delay()?;
            }
            phase => {
                return Err(RuleError::WrongPhase {
                    side: self.active,
                    phase,
                    action: "step",
                })
            }
        }
        Ok(true)
    }

    // === Remote play ===

    /// Apply a move decided elsewhere: a remote peer's selection on the
    /// authority, or an authoritative commit on a replica.
    ///
    /// The side must be in `RollPending`, or already in `SelectionPending`
    /// with the same roll (a replica's own provisional roll). `restart` is
    /// the authoritative coin for restart tiles; `None` flips locally.
    pub fn apply_remote_move(
        &mut self,
        side: Side,
        slot: u8,
        roll: u8,
        restart: Option<bool>,
    ) -> RuleResult<MoveOutcome> {
        self.ensure_running()?;
        if side != self.active {
            return Err(RuleError::NotActive { side });
        }

        let id = TokenId::new(side, slot);
        let engine = &self.engines[side];
        let (phase, rolled) = (engine.phase(), engine.rolled());
        let eligible = engine.is_eligible_for(&self.table, id, roll);

        match phase {
            Phase::RollPending => {
                if !eligible {
                    return Err(RuleError::IneligibleToken { token: id, roll });
                }
                self.engines[side].set_roll(&self.table, roll)?;
                self.events.push(MatchEvent::Rolled { side, roll });
            }
            Phase::SelectionPending if rolled == roll => {}
            phase => {
                return Err(RuleError::WrongPhase {
                    side,
                    phase,
                    action: "apply a remote move",
                })
            }
        }
        self.apply_selection(slot, restart)
    }

    /// A remote side rolled and had no legal move.
    pub fn pass_remote(&mut self, side: Side) -> RuleResult<()> {
        self.ensure_running()?;
        if side != self.active {
            return Err(RuleError::NotActive { side });
        }
        self.ensure_controller(ControlMode::RemoteProxy)?;

        let signal = self.engines[side].set_roll(&self.table, 0)?;
        self.events.push(MatchEvent::Passed { side });
        self.dispatch(signal);
        Ok(())
    }

    /// Switch to `next` on an authoritative instruction.
    ///
    /// Ends the current turn first if it is still running.
    pub fn apply_switch(&mut self, next: Side) -> RuleResult<()> {
        self.ensure_running()?;
        if next != self.active.opponent() {
            return Err(RuleError::UnexpectedSwitch { requested: next });
        }

        let current = self.active;
        match self.engines[current].end(&self.table) {
            TurnSignal::GameOver => {
                self.dispatch(TurnSignal::GameOver);
                return Err(RuleError::MatchOver);
            }
            TurnSignal::Ended => self.events.push(MatchEvent::TurnEnded { side: current }),
            _ => {}
        }

        let signal = self.switch_to(next);
        self.dispatch(signal);
        Ok(())
    }

    // === Resync ===

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            table: self.table.clone(),
            turns: SideMap::new(|side| self.engines[side].state().clone()),
            active: self.active,
            first: self.first,
            status: self.status,
            turn_number: self.turn_number,
        }
    }

    /// Replace the game state with a snapshot. Configuration, controllers
    /// and the RNG are kept.
    ///
    /// The snapshot is checked first and rejected whole when it does not
    /// describe a reachable state for this match's layout.
    pub fn restore(&mut self, snapshot: MatchSnapshot) -> RuleResult<()> {
        let MatchSnapshot {
            table,
            turns,
            active,
            first,
            status,
            turn_number,
        } = snapshot;

        if table.board().layout() != &self.config.layout {
            return Err(RuleError::InvalidSnapshot { reason: "board layout differs" });
        }
        if !table.is_consistent() {
            return Err(RuleError::InvalidSnapshot { reason: "tokens and tiles disagree" });
        }
        if turns.iter().any(|(_, state)| state.rolled > DIE_MAX) {
            return Err(RuleError::InvalidSnapshot { reason: "roll outside the die range" });
        }

        self.table = table;
        for (side, state) in turns.iter() {
            self.engines[side].restore_state(state.clone());
        }
        self.active = active;
        self.first = first;
        self.status = status;
        self.turn_number = turn_number;
        info!(%active, turn = turn_number, "state restored from snapshot");
        Ok(())
    }

    /// Positions of the dice and coin streams.
    #[must_use]
    pub fn rng_state(&self) -> RngSnapshot {
        RngSnapshot {
            dice: self.dice.state(),
            coins: self.coins.state(),
        }
    }

    /// Rewind or advance the random streams, e.g. to replay a saved local
    /// match from a `snapshot` taken at the same moment.
    pub fn restore_rng(&mut self, state: &RngSnapshot) {
        self.dice = GameRng::from_state(&state.dice);
        self.coins = GameRng::from_state(&state.coins);
    }

    // === Internals ===

    fn ensure_running(&self) -> RuleResult<()> {
        match self.status {
            MatchStatus::NotStarted => Err(RuleError::NotStarted),
            MatchStatus::Over { .. } => Err(RuleError::MatchOver),
            MatchStatus::InProgress | MatchStatus::AwaitingSwitch => Ok(()),
        }
    }

    fn ensure_controller(&self, expected: ControlMode) -> RuleResult<()> {
        if self.engines[self.active].mode() != expected {
            return Err(RuleError::WrongController {
                side: self.active,
                expected,
            });
        }
        Ok(())
    }

    fn roll_active(&mut self) -> RuleResult<u8> {
        let side = self.active;
        let signal = self.engines[side].roll(&self.table, &mut self.dice)?;
        Ok(self.after_roll(side, signal))
    }

    fn after_roll(&mut self, side: Side, signal: TurnSignal) -> u8 {
        let roll = self.engines[side].rolled();
        self.events.push(MatchEvent::Rolled { side, roll });
        if signal != TurnSignal::AwaitSelection {
            debug!(%side, roll, "no legal move for roll");
            self.events.push(MatchEvent::Passed { side });
        }
        self.dispatch(signal);
        roll
    }

    fn apply_selection(&mut self, slot: u8, restart: Option<bool>) -> RuleResult<MoveOutcome> {
        let side = self.active;
        let coins = &mut self.coins;
        let (outcome, signal) = self.engines[side].apply_move(&mut self.table, slot, || {
            restart.unwrap_or_else(|| coins.coin_flip())
        })?;

        self.record_move(&outcome);
        if outcome.effect() == TileEffect::FreezeOpponent {
            let target = side.opponent();
            self.engines[target].freeze();
            self.events.push(MatchEvent::Frozen { side: target });
            debug!(side = %target, "side frozen");
        }
        self.dispatch(signal);
        Ok(outcome)
    }

    fn record_move(&mut self, outcome: &MoveOutcome) {
        let token = outcome.token;
        match outcome.landing {
            Landing::Finished => self.events.push(MatchEvent::TokenFinished { token }),
            Landing::Settled { index, .. } | Landing::KickedBack { index, .. } => {
                self.events.push(MatchEvent::TokenMoved {
                    token,
                    from: outcome.from,
                    to: index,
                });
            }
        }
        if let Some(kicked_back) = outcome.restart_outcome() {
            self.events.push(MatchEvent::RestartResolved { token, kicked_back });
        }
        for &victim in &outcome.evicted {
            self.events.push(MatchEvent::TokenCaptured { token: victim, by: token });
        }
    }

    fn start_turn(&mut self, side: Side) -> TurnSignal {
        self.active = side;
        self.turn_number += 1;
        self.events.push(MatchEvent::TurnStarted {
            side,
            turn: self.turn_number,
        });
        if self.config.dump_occupancy {
            debug!(report = %self.table.board().occupancy_report(), "tile occupancy");
        }

        let signal = self.engines[side].activate(&self.table);
        if signal != TurnSignal::AwaitRoll {
            debug!(%side, "turn skipped");
            self.events.push(MatchEvent::Passed { side });
        }
        signal
    }

    fn switch_to(&mut self, next: Side) -> TurnSignal {
        let previous = self.active;
        self.engines[previous].deactivate();
        self.status = MatchStatus::InProgress;
        self.events.push(MatchEvent::TurnSwitched { active: next });
        info!(from = %previous, to = %next, turn = self.turn_number + 1, "turn switched");
        self.start_turn(next)
    }

    /// Act on engine signals until the match waits for input.
    fn dispatch(&mut self, mut signal: TurnSignal) {
        loop {
            signal = match signal {
                TurnSignal::AwaitRoll | TurnSignal::AwaitSelection | TurnSignal::NoOp => return,
                TurnSignal::Repeat => {
                    let side = self.active;
                    self.events.push(MatchEvent::RepeatGranted { side });
                    debug!(%side, "repeat granted");
                    let signal = self.engines[side].set_repeat(&self.table);
                    if signal != TurnSignal::AwaitRoll {
                        self.events.push(MatchEvent::Passed { side });
                    }
                    signal
                }
                TurnSignal::Ended => {
                    self.events.push(MatchEvent::TurnEnded { side: self.active });
                    match self.config.switch_policy {
                        SwitchPolicy::Immediate => self.switch_to(self.active.opponent()),
                        SwitchPolicy::Deferred => {
                            self.status = MatchStatus::AwaitingSwitch;
                            return;
                        }
                    }
                }
                TurnSignal::GameOver => {
                    let winner = self.active;
                    self.status = MatchStatus::Over { winner };
                    self.events.push(MatchEvent::GameOver { winner });
                    info!(%winner, turns = self.turn_number, "game over");
                    return;
                }
            };
        }
    }
}
