//! Wire messages between the authority and the replica.
//!
//! Messages travel over an ordered, reliable channel and are applied in
//! receive order. The transport itself lives outside this crate; these
//! types only fix the contract and the bincode encoding.

use serde::{Deserialize, Serialize};

use super::error::NetResult;
use crate::core::Side;
use crate::game::MatchSnapshot;
use crate::tokens::TokenId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetMessage {
    // Authority → replica
    /// Which side the replica plays, and who moves first.
    ProposeTurnOrder { peer_side: Side, first: Side },
    /// Resolved restart coin for the next committed move.
    TileRandomOutcome { kicked_back: bool },
    /// A move as applied by the authority.
    MoveCommitted { token: TokenId, roll: u8 },
    /// Complete state, answering a resync request or after a rejected move.
    FullState(Box<MatchSnapshot>),

    // Replica → authority
    /// The replica's choice for its own turn.
    TokenSelected { token: TokenId, roll: u8 },
    /// The replica asks for a fresh `FullState`.
    ResyncRequest,

    // Both directions
    /// Replica → authority: request after a local pass.
    /// Authority → replica: the new active side.
    SwitchTurn { active: Side },
}

impl NetMessage {
    /// Short name for logs and errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            NetMessage::ProposeTurnOrder { .. } => "ProposeTurnOrder",
            NetMessage::TileRandomOutcome { .. } => "TileRandomOutcome",
            NetMessage::MoveCommitted { .. } => "MoveCommitted",
            NetMessage::FullState(_) => "FullState",
            NetMessage::TokenSelected { .. } => "TokenSelected",
            NetMessage::ResyncRequest => "ResyncRequest",
            NetMessage::SwitchTurn { .. } => "SwitchTurn",
        }
    }

    pub fn encode(&self) -> NetResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> NetResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
