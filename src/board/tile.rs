//! Tiles and tile kinds.
//!
//! A single `Tile` type carries a `TileKind` tag; behavior that differs by
//! kind is dispatched with a `match` on the tag (see `tokens::movement`).

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Side;
use crate::tokens::TokenId;

/// Tile identifier. Indexes `Board::tiles`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u8);

impl TileId {
    /// Create a new tile ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw index into the board's tile list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

/// Behavioral category of a tile.
///
/// | Kind        | Capacity | Landing effect                           |
/// |-------------|----------|------------------------------------------|
/// | Capacity(n) | n        | none                                     |
/// | Freeze      | 1        | opponent may only deploy on its next roll|
/// | Repeat      | 1        | mover rolls again                        |
/// | Restart     | 1        | coin flip: mover may be sent back home   |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Capacity(u8),
    Freeze,
    Repeat,
    Restart,
}

impl TileKind {
    /// Maximum same-side tokens on a tile of this kind.
    #[must_use]
    pub const fn capacity(self) -> u8 {
        match self {
            TileKind::Capacity(n) => n,
            TileKind::Freeze | TileKind::Repeat | TileKind::Restart => 1,
        }
    }

    /// Hover text for the presentation layer.
    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            TileKind::Capacity(1) => "Holds one piece.",
            TileKind::Capacity(2) => "Two of your pieces can occupy this tile at a time.",
            TileKind::Capacity(_) => "Four of your pieces can occupy this tile at a time.",
            TileKind::Freeze => {
                "Enemy may only deploy new pieces on their next roll. Holds one piece."
            }
            TileKind::Repeat => "This tile grants you another roll. Holds one piece.",
            TileKind::Restart => "You might go back to start with a 50% chance. Holds one piece.",
        }
    }
}

/// A board cell.
///
/// Private tiles have an `owner`; tiles of the shared lane have none and are
/// reachable by both sides at the same side-relative index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    index: u8,
    kind: TileKind,
    owner: Option<Side>,
    /// Insertion order is stack order; the last entry is on top.
    occupants: SmallVec<[TokenId; 4]>,
}

impl Tile {
    pub(crate) fn new(id: TileId, index: u8, kind: TileKind, owner: Option<Side>) -> Self {
        Self {
            id,
            index,
            kind,
            owner,
            occupants: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Side-relative track index of this tile.
    #[must_use]
    pub fn index(&self) -> u8 {
        self.index
    }

    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    #[must_use]
    pub fn capacity(&self) -> u8 {
        self.kind.capacity()
    }

    /// Owning side, or `None` for the shared lane.
    #[must_use]
    pub fn owner(&self) -> Option<Side> {
        self.owner
    }

    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.owner.is_none()
    }

    /// Tokens on this tile, bottom to top.
    #[must_use]
    pub fn occupants(&self) -> &[TokenId] {
        &self.occupants
    }

    /// Token on top of the stack.
    #[must_use]
    pub fn top(&self) -> Option<TokenId> {
        self.occupants.last().copied()
    }

    /// Number of tokens of `side` on this tile.
    #[must_use]
    pub fn count_for(&self, side: Side) -> usize {
        self.occupants.iter().filter(|t| t.side == side).count()
    }

    /// Readable label: `F`/`S` for private tiles, `N` for shared ones.
    #[must_use]
    pub fn label(&self) -> String {
        let prefix = match self.owner {
            Some(Side::First) => 'F',
            Some(Side::Second) => 'S',
            None => 'N',
        };
        format!("{}{}", prefix, self.index)
    }

    pub(crate) fn push(&mut self, token: TokenId) {
        self.occupants.push(token);
    }

    /// Returns true if the token was on this tile.
    pub(crate) fn remove(&mut self, token: TokenId) -> bool {
        if let Some(pos) = self.occupants.iter().position(|&t| t == token) {
            self.occupants.remove(pos);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities() {
        assert_eq!(TileKind::Capacity(1).capacity(), 1);
        assert_eq!(TileKind::Capacity(2).capacity(), 2);
        assert_eq!(TileKind::Capacity(4).capacity(), 4);
        assert_eq!(TileKind::Freeze.capacity(), 1);
        assert_eq!(TileKind::Repeat.capacity(), 1);
        assert_eq!(TileKind::Restart.capacity(), 1);
    }

    #[test]
    fn test_stack_order() {
        let mut tile = Tile::new(TileId::new(0), 8, TileKind::Capacity(4), None);
        let a = TokenId::new(Side::First, 0);
        let b = TokenId::new(Side::Second, 1);
        let c = TokenId::new(Side::First, 2);

        tile.push(a);
        tile.push(b);
        tile.push(c);
        assert_eq!(tile.occupants(), &[a, b, c]);
        assert_eq!(tile.top(), Some(c));
        assert_eq!(tile.count_for(Side::First), 2);

        assert!(tile.remove(b));
        assert!(!tile.remove(b));
        assert_eq!(tile.occupants(), &[a, c]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Tile::new(TileId::new(0), 2, TileKind::Capacity(1), Some(Side::First)).label(), "F2");
        assert_eq!(Tile::new(TileId::new(1), 12, TileKind::Capacity(1), Some(Side::Second)).label(), "S12");
        assert_eq!(Tile::new(TileId::new(2), 7, TileKind::Repeat, None).label(), "N7");
    }
}
