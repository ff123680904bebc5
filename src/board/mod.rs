//! Board: tiles, tile kinds, and each side's route across them.

mod board;
pub mod tile;

pub use board::{Board, BoardLayout, OccupancyRow, LAST_INDEX, TRACK_LEN};
pub use tile::{Tile, TileId, TileKind};
