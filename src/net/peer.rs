//! One end of a networked match.
//!
//! The **authority** owns the real match: it picks the turn order, flips
//! restart coins and decides every turn switch. The **replica** mirrors
//! it. A replica's own rolls are provisional; its selections are sent as
//! `TokenSelected` and only take effect when the authority answers with
//! `MoveCommitted`.
//!
//! Outgoing messages queue in an outbox that the transport drains with
//! `take_outbox`. Errors never leave the peer stuck: the authority answers
//! with `FullState`, the replica asks for one with `ResyncRequest`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::{NetError, NetResult};
use super::message::NetMessage;
use crate::board::TileKind;
use crate::core::{ControlMode, MatchConfig, RuleError, Side, SwitchPolicy};
use crate::game::{Match, MatchEvent, MatchStatus};
use crate::tokens::{MoveOutcome, TokenId};
use crate::turn::Phase;

/// Which end of the connection this peer is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Authority,
    Replica,
}

/// A networked participant wrapping a local `Match`.
#[derive(Debug)]
pub struct Peer {
    role: Role,
    config: MatchConfig,
    local_side: Option<Side>,
    game: Option<Match>,
    outbox: Vec<NetMessage>,
    pending_outcomes: VecDeque<bool>,
    events: Vec<MatchEvent>,
}

impl Peer {
    /// Start hosting: create the match, pick the turn order and queue the
    /// proposal for the other peer. The local side is always driven through
    /// `roll`/`select`, whatever the config says.
    pub fn host(config: MatchConfig, local_side: Side) -> NetResult<Self> {
        let mut config = config;
        config.control[local_side] = ControlMode::Human;
        config.control[local_side.opponent()] = ControlMode::RemoteProxy;
        config.switch_policy = SwitchPolicy::Immediate;

        let mut game = Match::new(config.clone())?;
        let proposal = NetMessage::ProposeTurnOrder {
            peer_side: local_side.opponent(),
            first: game.first_side(),
        };
        info!(local = %local_side, first = %game.first_side(), "hosting match");
        game.start()?;

        let mut peer = Self {
            role: Role::Authority,
            config,
            local_side: Some(local_side),
            game: Some(game),
            outbox: vec![proposal],
            pending_outcomes: VecDeque::new(),
            events: Vec::new(),
        };
        peer.collect_events();
        Ok(peer)
    }

    /// Join a hosted match. The match is created once the turn order
    /// arrives.
    pub fn join(config: MatchConfig) -> Self {
        Self {
            role: Role::Replica,
            config,
            local_side: None,
            game: None,
            outbox: Vec::new(),
            pending_outcomes: VecDeque::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Side played on this end, once known.
    #[must_use]
    pub fn local_side(&self) -> Option<Side> {
        self.local_side
    }

    #[must_use]
    pub fn game(&self) -> Option<&Match> {
        self.game.as_ref()
    }

    /// Drain messages waiting to be sent.
    pub fn take_outbox(&mut self) -> Vec<NetMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Drain match events for the presentation layer.
    pub fn take_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    fn game_mut(&mut self) -> NetResult<&mut Match> {
        self.game.as_mut().ok_or(NetError::NoMatch)
    }

    fn remote_side(&self) -> NetResult<Side> {
        self.local_side.map(Side::opponent).ok_or(NetError::NoMatch)
    }

    // === Local input ===

    /// Roll for the local side.
    pub fn roll(&mut self) -> NetResult<u8> {
        let local = self.local_side.ok_or(NetError::NoMatch)?;
        let game = self.game_mut()?;
        if game.active() != local {
            return Err(RuleError::NotActive { side: local }.into());
        }
        let roll = game.roll()?;
        let passed = game.status() == MatchStatus::AwaitingSwitch;

        if self.role == Role::Replica && passed {
            debug!(roll, "local pass, requesting switch");
            self.outbox.push(NetMessage::SwitchTurn { active: local.opponent() });
        }
        self.collect_events();
        Ok(roll)
    }

    /// Select a local token.
    ///
    /// On the authority the move is applied and broadcast. On a replica it
    /// is only validated and sent; `None` is returned until the authority
    /// commits it.
    pub fn select(&mut self, slot: u8) -> NetResult<Option<MoveOutcome>> {
        let local = self.local_side.ok_or(NetError::NoMatch)?;
        match self.role {
            Role::Authority => {
                let outcome = self.game_mut()?.select(slot)?;
                self.broadcast_move(&outcome);
                self.collect_events();
                Ok(Some(outcome))
            }
            Role::Replica => {
                let game = self.game.as_ref().ok_or(NetError::NoMatch)?;
                let engine = game.engine(local);
                if game.active() != local {
                    return Err(RuleError::NotActive { side: local }.into());
                }
                if engine.phase() != Phase::SelectionPending {
                    return Err(RuleError::WrongPhase {
                        side: local,
                        phase: engine.phase(),
                        action: "move",
                    }
                    .into());
                }
                let token = TokenId::new(local, slot);
                let roll = engine.rolled();
                if !engine.is_eligible(game.table(), slot) {
                    return Err(RuleError::IneligibleToken { token, roll }.into());
                }
                self.outbox.push(NetMessage::TokenSelected { token, roll });
                Ok(None)
            }
        }
    }

    // === Incoming ===

    /// Apply one message from the other peer.
    pub fn receive(&mut self, msg: NetMessage) -> NetResult<()> {
        let kind = msg.kind();
        debug!(role = ?self.role, kind, "message received");

        let result = match self.role {
            Role::Authority => self.receive_as_authority(msg),
            Role::Replica => self.receive_as_replica(msg),
        };
        self.collect_events();

        if let Err(err) = &result {
            warn!(role = ?self.role, kind, %err, "message rejected, resynchronizing");
            match self.role {
                Role::Authority => self.push_full_state(),
                Role::Replica => {
                    self.pending_outcomes.clear();
                    self.outbox.push(NetMessage::ResyncRequest);
                }
            }
        }
        result
    }

    fn receive_as_authority(&mut self, msg: NetMessage) -> NetResult<()> {
        let remote = self.remote_side()?;
        match msg {
            NetMessage::TokenSelected { token, roll } => {
                if token.side != remote {
                    return Err(NetError::Desync {
                        reason: format!("replica selected {token}, which it does not own"),
                    });
                }
                let outcome = self
                    .game_mut()?
                    .apply_remote_move(remote, token.slot, roll, None)?;
                self.broadcast_move(&outcome);
                Ok(())
            }
            NetMessage::SwitchTurn { active } => {
                if active != remote.opponent() {
                    return Err(NetError::Desync {
                        reason: format!("replica requested a switch to {active}"),
                    });
                }
                self.game_mut()?.pass_remote(remote)?;
                Ok(())
            }
            NetMessage::ResyncRequest => {
                self.push_full_state();
                Ok(())
            }
            other => Err(NetError::UnexpectedMessage {
                kind: other.kind(),
                role: self.role,
            }),
        }
    }

    fn receive_as_replica(&mut self, msg: NetMessage) -> NetResult<()> {
        match msg {
            NetMessage::ProposeTurnOrder { peer_side, first } => {
                if self.game.is_some() {
                    return Err(NetError::UnexpectedMessage {
                        kind: "ProposeTurnOrder",
                        role: self.role,
                    });
                }
                let mut config = self.config.clone().with_first_side(first);
                config.control[peer_side] = ControlMode::Human;
                config.control[peer_side.opponent()] = ControlMode::RemoteProxy;
                config.switch_policy = SwitchPolicy::Deferred;

                let mut game = Match::new(config)?;
                game.start()?;
                info!(local = %peer_side, %first, "joined match");
                self.local_side = Some(peer_side);
                self.game = Some(game);
                Ok(())
            }
            NetMessage::TileRandomOutcome { kicked_back } => {
                self.pending_outcomes.push_back(kicked_back);
                Ok(())
            }
            NetMessage::MoveCommitted { token, roll } => {
                let game = self.game.as_mut().ok_or(NetError::NoMatch)?;
                let restart = if game.table().landing_kind(token, roll) == Some(TileKind::Restart) {
                    let kicked_back = self
                        .pending_outcomes
                        .pop_front()
                        .ok_or(NetError::MissingOutcome { token })?;
                    Some(kicked_back)
                } else {
                    None
                };
                game.apply_remote_move(token.side, token.slot, roll, restart)?;
                Ok(())
            }
            NetMessage::SwitchTurn { active } => {
                self.game_mut()?.apply_switch(active)?;
                Ok(())
            }
            NetMessage::FullState(snapshot) => {
                self.game_mut()?.restore(*snapshot)?;
                self.pending_outcomes.clear();
                Ok(())
            }
            other => Err(NetError::UnexpectedMessage {
                kind: other.kind(),
                role: self.role,
            }),
        }
    }

    // === Outgoing ===

    fn broadcast_move(&mut self, outcome: &MoveOutcome) {
        if let Some(kicked_back) = outcome.restart_outcome() {
            self.outbox.push(NetMessage::TileRandomOutcome { kicked_back });
        }
        self.outbox.push(NetMessage::MoveCommitted {
            token: outcome.token,
            roll: outcome.roll,
        });
    }

    fn push_full_state(&mut self) {
        if let Some(game) = &self.game {
            self.outbox.push(NetMessage::FullState(Box::new(game.snapshot())));
        }
    }

    /// Move match events into the peer's buffer. On the authority every
    /// turn switch is also broadcast.
    fn collect_events(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        for event in game.take_events() {
            if let (Role::Authority, MatchEvent::TurnSwitched { active }) = (self.role, &event) {
                self.outbox.push(NetMessage::SwitchTurn { active: *active });
            }
            self.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Peer, Peer) {
        let config = MatchConfig::hot_seat().with_first_side(Side::First);
        let mut host = Peer::host(config.clone(), Side::First).unwrap();
        let mut guest = Peer::join(config);
        for msg in host.take_outbox() {
            guest.receive(msg).unwrap();
        }
        (host, guest)
    }

    #[test]
    fn test_turn_order_agreed() {
        let (host, guest) = pair();

        assert_eq!(guest.local_side(), Some(Side::Second));
        let game = guest.game().unwrap();
        assert_eq!(game.first_side(), Side::First);
        assert_eq!(game.engine(Side::First).mode(), ControlMode::RemoteProxy);
        assert_eq!(host.game().unwrap().engine(Side::Second).mode(), ControlMode::RemoteProxy);
    }

    #[test]
    fn test_local_side_driven_by_peer() {
        let config = MatchConfig::default().with_first_side(Side::Second);
        let mut host = Peer::host(config.clone(), Side::Second).unwrap();
        assert_eq!(host.game().unwrap().engine(Side::Second).mode(), ControlMode::Human);
        assert!((1..=3).contains(&host.roll().unwrap()));

        let mut guest = Peer::join(config);
        for msg in host.take_outbox() {
            guest.receive(msg).unwrap();
        }
        assert_eq!(guest.game().unwrap().engine(Side::First).mode(), ControlMode::Human);
    }

    #[test]
    fn test_replica_cannot_roll_out_of_turn() {
        let (_host, mut guest) = pair();
        assert!(matches!(
            guest.roll().unwrap_err(),
            NetError::Rule(RuleError::NotActive { side: Side::Second })
        ));
    }

    #[test]
    fn test_authority_rejects_unexpected_message() {
        let (mut host, _guest) = pair();
        let err = host
            .receive(NetMessage::MoveCommitted {
                token: TokenId::new(Side::First, 0),
                roll: 1,
            })
            .unwrap_err();

        assert!(matches!(err, NetError::UnexpectedMessage { kind: "MoveCommitted", .. }));
        assert!(matches!(host.take_outbox().as_slice(), [NetMessage::FullState(_)]));
    }

    #[test]
    fn test_move_before_turn_order_is_no_match() {
        let mut guest = Peer::join(MatchConfig::hot_seat());
        let err = guest
            .receive(NetMessage::MoveCommitted {
                token: TokenId::new(Side::First, 0),
                roll: 1,
            })
            .unwrap_err();
        assert!(matches!(err, NetError::NoMatch));
    }
}
