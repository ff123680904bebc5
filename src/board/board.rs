//! Board geometry and stacking queries.
//!
//! ## Geometry
//!
//! Each side walks a 14-tile route. With the default layout:
//!
//! ```text
//! index:   0 1 2 3 | 4 5 6 7 8 9 10 11 | 12 13
//! First:   private | ---- shared ----- | private
//! Second:  private | ---- shared ----- | private
//! ```
//!
//! The shared lane is one set of physical tiles, so a First token at index 6
//! and a Second token at index 6 stand on the same tile. That is where
//! captures happen. Twenty physical tiles exist in total.

use serde::{Deserialize, Serialize};

use super::tile::{Tile, TileId, TileKind};
use crate::core::{ConfigError, RuleError, RuleResult, Side, SideMap};

/// Number of tiles on each side's route.
pub const TRACK_LEN: usize = 14;

/// Last side-relative index. Moving past it finishes a token.
pub const LAST_INDEX: i32 = TRACK_LEN as i32 - 1;

/// Track geometry and per-index tile kinds.
///
/// Kinds are indexed by side-relative index and apply to both sides, so the
/// board is mirror-symmetric.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// First index of the shared lane.
    pub shared_start: u8,
    /// One past the last index of the shared lane.
    pub shared_end: u8,
    /// Tile kind at each side-relative index.
    pub kinds: [TileKind; TRACK_LEN],
}

impl Default for BoardLayout {
    fn default() -> Self {
        use TileKind::*;

        Self {
            shared_start: 4,
            shared_end: 12,
            kinds: [
                Capacity(1),
                Capacity(1),
                Capacity(1),
                Repeat,
                Capacity(2),
                Freeze,
                Capacity(1),
                Repeat,
                Capacity(4),
                Restart,
                Capacity(1),
                Capacity(2),
                Capacity(1),
                Repeat,
            ],
        }
    }
}

impl BoardLayout {
    /// A layout where every tile holds a single token and has no effect.
    pub fn plain() -> Self {
        Self {
            kinds: [TileKind::Capacity(1); TRACK_LEN],
            ..Self::default()
        }
    }

    /// Replace the kind at one index (builder pattern). Indices past the
    /// track are ignored.
    pub fn with_kind(mut self, index: usize, kind: TileKind) -> Self {
        if let Some(slot) = self.kinds.get_mut(index) {
            *slot = kind;
        }
        self
    }

    /// Check capacities and the shared span.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shared_start > self.shared_end || self.shared_end as usize > TRACK_LEN {
            return Err(ConfigError::SharedSpanOutOfRange {
                start: self.shared_start,
                end: self.shared_end,
            });
        }

        for (index, kind) in self.kinds.iter().enumerate() {
            if let TileKind::Capacity(n) = kind {
                if !matches!(n, 1 | 2 | 4) {
                    return Err(ConfigError::InvalidCapacity { index, capacity: *n });
                }
            }
        }

        Ok(())
    }

    /// Whether the side-relative index lies on the shared lane.
    #[must_use]
    pub fn is_shared(&self, index: usize) -> bool {
        (self.shared_start as usize..self.shared_end as usize).contains(&index)
    }
}

/// One line of the occupancy report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyRow {
    pub label: String,
    pub first: usize,
    pub second: usize,
}

/// The physical board: all tiles plus each side's route through them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    layout: BoardLayout,
    tiles: Vec<Tile>,
    routes: SideMap<[TileId; TRACK_LEN]>,
}

impl Board {
    /// Build a board from a validated layout.
    pub fn new(layout: BoardLayout) -> Result<Self, ConfigError> {
        layout.validate()?;

        let mut tiles: Vec<Tile> = Vec::with_capacity(2 * TRACK_LEN);
        let mut routes = SideMap::with_value([TileId::new(0); TRACK_LEN]);

        for side in Side::ALL {
            for index in 0..TRACK_LEN {
                let id = if layout.is_shared(index) && side == Side::Second {
                    // Shared tiles were created while walking First's route
                    routes[Side::First][index]
                } else {
                    let id = TileId::new(tiles.len() as u8);
                    let owner = (!layout.is_shared(index)).then_some(side);
                    tiles.push(Tile::new(id, index as u8, layout.kinds[index], owner));
                    id
                };
                routes[side][index] = id;
            }
        }

        Ok(Self { layout, tiles, routes })
    }

    #[must_use]
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// All physical tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Resolve a side-relative index to the tile ID on that side's route.
    pub fn tile_id_at(&self, index: i32, side: Side) -> RuleResult<TileId> {
        if !(0..=LAST_INDEX).contains(&index) {
            return Err(RuleError::IndexOutOfRange { index });
        }
        Ok(self.routes[side][index as usize])
    }

    /// Resolve a side-relative index to the tile on that side's route.
    pub fn tile_at(&self, index: i32, side: Side) -> RuleResult<&Tile> {
        let id = self.tile_id_at(index, side)?;
        Ok(self.tile(id))
    }

    /// Look up a tile by ID.
    ///
    /// IDs are only handed out by this board, so an unknown ID is a bug.
    #[must_use]
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.index()]
    }

    /// Look up a tile by an ID from outside this board.
    #[must_use]
    pub fn get_tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    /// True when the tiles and routes are exactly those the layout builds.
    /// Checked before adopting a board received from elsewhere.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let Ok(expected) = Board::new(self.layout.clone()) else {
            return false;
        };
        expected.routes == self.routes
            && expected.tiles.len() == self.tiles.len()
            && expected.tiles.iter().zip(&self.tiles).all(|(want, got)| {
                want.id() == got.id()
                    && want.index() == got.index()
                    && want.kind() == got.kind()
                    && want.owner() == got.owner()
            })
    }

    pub(crate) fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.index()]
    }

    /// True when `side` already has `capacity` tokens on the tile.
    #[must_use]
    pub fn is_at_capacity(&self, tile: &Tile, side: Side) -> bool {
        tile.count_for(side) == tile.capacity() as usize
    }

    /// True when no tile holds more same-side tokens than its capacity.
    #[must_use]
    pub fn capacity_respected(&self) -> bool {
        self.tiles.iter().all(|tile| {
            Side::ALL
                .iter()
                .all(|&side| tile.count_for(side) <= tile.capacity() as usize)
        })
    }

    /// Per-tile token counts, in tile ID order.
    #[must_use]
    pub fn occupancy(&self) -> Vec<OccupancyRow> {
        self.tiles
            .iter()
            .map(|tile| OccupancyRow {
                label: tile.label(),
                first: tile.count_for(Side::First),
                second: tile.count_for(Side::Second),
            })
            .collect()
    }

    /// Multi-line occupancy dump for diagnostics.
    #[must_use]
    pub fn occupancy_report(&self) -> String {
        let mut out = String::from("-------Tile Statuses-------\n");
        for row in self.occupancy() {
            out.push_str(&format!(
                "{{TILE {}}}: FPieces: {} SPieces: {}\n",
                row.label, row.first, row.second
            ));
        }
        out.push_str("-----End Tile Statuses-----");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenId;

    #[test]
    fn test_default_board_has_twenty_tiles() {
        let board = Board::new(BoardLayout::default()).unwrap();
        assert_eq!(board.tiles().len(), 20);
        assert_eq!(board.tiles().iter().filter(|t| t.is_shared()).count(), 8);
    }

    #[test]
    fn test_shared_lane_is_same_tile() {
        let board = Board::new(BoardLayout::default()).unwrap();

        for index in 0..TRACK_LEN as i32 {
            let first = board.tile_id_at(index, Side::First).unwrap();
            let second = board.tile_id_at(index, Side::Second).unwrap();
            if (4..12).contains(&index) {
                assert_eq!(first, second, "index {index} should be shared");
            } else {
                assert_ne!(first, second, "index {index} should be private");
            }
        }
    }

    #[test]
    fn test_tile_at_out_of_range() {
        let board = Board::new(BoardLayout::default()).unwrap();

        assert_eq!(
            board.tile_at(14, Side::First).unwrap_err(),
            RuleError::IndexOutOfRange { index: 14 }
        );
        assert_eq!(
            board.tile_at(-1, Side::Second).unwrap_err(),
            RuleError::IndexOutOfRange { index: -1 }
        );
        assert!(board.tile_at(13, Side::Second).is_ok());
    }

    #[test]
    fn test_tile_at_carries_index_and_kind() {
        let board = Board::new(BoardLayout::default()).unwrap();
        let tile = board.tile_at(9, Side::Second).unwrap();

        assert_eq!(tile.index(), 9);
        assert_eq!(tile.kind(), TileKind::Restart);
        assert!(tile.is_shared());
    }

    #[test]
    fn test_is_at_capacity_counts_only_side() {
        let mut board = Board::new(BoardLayout::default()).unwrap();
        let id = board.tile_id_at(4, Side::First).unwrap(); // Capacity(2)

        board.tile_mut(id).push(TokenId::new(Side::First, 0));
        board.tile_mut(id).push(TokenId::new(Side::Second, 0));
        assert!(!board.is_at_capacity(board.tile(id), Side::First));

        board.tile_mut(id).push(TokenId::new(Side::First, 1));
        assert!(board.is_at_capacity(board.tile(id), Side::First));
        assert!(!board.is_at_capacity(board.tile(id), Side::Second));
    }

    #[test]
    fn test_validate_rejects_bad_capacity() {
        let layout = BoardLayout::default().with_kind(6, TileKind::Capacity(3));
        assert_eq!(
            Board::new(layout).unwrap_err(),
            ConfigError::InvalidCapacity { index: 6, capacity: 3 }
        );
    }

    #[test]
    fn test_validate_rejects_bad_span() {
        let layout = BoardLayout {
            shared_start: 10,
            shared_end: 15,
            ..BoardLayout::default()
        };
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::SharedSpanOutOfRange { start: 10, end: 15 })
        ));
    }

    #[test]
    fn test_occupancy_report() {
        let mut board = Board::new(BoardLayout::plain()).unwrap();
        let id = board.tile_id_at(6, Side::First).unwrap();
        board.tile_mut(id).push(TokenId::new(Side::Second, 4));

        let rows = board.occupancy();
        let row = rows.iter().find(|r| r.label == "N6").unwrap();
        assert_eq!((row.first, row.second), (0, 1));

        let report = board.occupancy_report();
        assert!(report.starts_with("-------Tile Statuses-------"));
        assert!(report.contains("{TILE N6}: FPieces: 0 SPieces: 1"));
    }

    #[test]
    fn test_with_kind_ignores_index_past_track() {
        let layout = BoardLayout::plain().with_kind(TRACK_LEN, TileKind::Repeat);
        assert_eq!(layout, BoardLayout::plain());
    }

    #[test]
    fn test_tampered_routes_not_well_formed() {
        let mut board = Board::new(BoardLayout::default()).unwrap();
        assert!(board.is_well_formed());

        board.routes[Side::Second][13] = TileId::new(250);
        assert!(!board.is_well_formed());
        assert!(board.get_tile(TileId::new(250)).is_none());
    }

    #[test]
    fn test_board_serde() {
        let board = Board::new(BoardLayout::default()).unwrap();
        let bytes = bincode::serialize(&board).unwrap();
        let restored: Board = bincode::deserialize(&bytes).unwrap();
        assert_eq!(board, restored);
    }
}
