//! Errors raised by the networked peer.

use super::peer::Role;
use crate::core::{ConfigError, RuleError};
use crate::tokens::TokenId;

/// Errors raised while exchanging or applying network messages.
///
/// All variants are recoverable: the peer answers with a resync and keeps
/// running.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The peers disagree about the game state.
    #[error("peers out of sync: {reason}")]
    Desync { reason: String },

    /// A move landed on a restart tile without its outcome.
    #[error("no restart outcome received for the move of {token}")]
    MissingOutcome { token: TokenId },

    /// A message this role never accepts.
    #[error("{role:?} cannot handle {kind}")]
    UnexpectedMessage { kind: &'static str, role: Role },

    /// Turn order has not been agreed yet.
    #[error("no match in progress")]
    NoMatch,

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("message codec failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for network operations.
pub type NetResult<T> = Result<T, NetError>;
