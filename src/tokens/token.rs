//! Tokens: identity and deployment status.

use serde::{Deserialize, Serialize};

use crate::board::{TileId, TRACK_LEN};
use crate::core::Side;

/// Tokens per side.
pub const TOKENS_PER_SIDE: usize = 7;

/// Track position of a token that is not on the board yet.
pub const UNDEPLOYED: i32 = -1;

/// Identifies a token by owner and start slot.
///
/// The start slot doubles as the token's home position in the undeployed
/// pool; a captured token returns to exactly this slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId {
    pub side: Side,
    pub slot: u8,
}

impl TokenId {
    #[must_use]
    pub const fn new(side: Side, slot: u8) -> Self {
        Self { side, slot }
    }

    /// All token IDs of a side, in slot order.
    pub fn all(side: Side) -> impl Iterator<Item = TokenId> {
        (0..TOKENS_PER_SIDE as u8).map(move |slot| TokenId::new(side, slot))
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.side, self.slot)
    }
}

/// Where a token is in its lifecycle.
///
/// `Undeployed → Deployed → Finished`, with `Deployed → Undeployed` only
/// through a capture or a restart tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenStatus {
    Undeployed,
    Deployed { index: u8 },
    Finished,
}

/// A single game piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    id: TokenId,
    status: TokenStatus,
    tile: Option<TileId>,
}

impl Token {
    pub(crate) fn new(id: TokenId) -> Self {
        Self {
            id,
            status: TokenStatus::Undeployed,
            tile: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> TokenId {
        self.id
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.id.side
    }

    #[must_use]
    pub fn start_slot(&self) -> u8 {
        self.id.slot
    }

    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.status
    }

    /// Tile the token stands on while deployed.
    #[must_use]
    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    #[must_use]
    pub fn is_undeployed(&self) -> bool {
        self.status == TokenStatus::Undeployed
    }

    #[must_use]
    pub fn is_deployed(&self) -> bool {
        matches!(self.status, TokenStatus::Deployed { .. })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == TokenStatus::Finished
    }

    /// Side-relative track position.
    ///
    /// `UNDEPLOYED` (-1) before deployment, the tile index while deployed,
    /// and `TRACK_LEN` once finished.
    #[must_use]
    pub fn position(&self) -> i32 {
        match self.status {
            TokenStatus::Undeployed => UNDEPLOYED,
            TokenStatus::Deployed { index } => index as i32,
            TokenStatus::Finished => TRACK_LEN as i32,
        }
    }

    pub(crate) fn deploy(&mut self, index: u8, tile: TileId) {
        self.status = TokenStatus::Deployed { index };
        self.tile = Some(tile);
    }

    pub(crate) fn finish(&mut self) {
        self.status = TokenStatus::Finished;
        self.tile = None;
    }

    pub(crate) fn kick_back_to_start(&mut self) {
        self.status = TokenStatus::Undeployed;
        self.tile = None;
    }
}
