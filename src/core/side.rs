//! Side identification and per-side data storage.
//!
//! ## Side
//!
//! The two competing players. A side owns seven tokens and one half of the
//! track (its private tiles plus its view of the shared middle lane).
//!
//! ## SideMap
//!
//! Fixed two-entry storage indexed by `Side`, backed by an array for O(1)
//! access without allocation.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two competing players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Both sides, in index order.
    pub const ALL: [Side; 2] = [Side::First, Side::Second];

    /// Get the raw side index (0 for `First`, 1 for `Second`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    /// The other side.
    ///
    /// ```
    /// use tile_race::core::Side;
    ///
    /// assert_eq!(Side::First.opponent(), Side::Second);
    /// assert_eq!(Side::Second.opponent(), Side::First);
    /// ```
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "First"),
            Side::Second => write!(f, "Second"),
        }
    }
}

/// Per-side data storage.
///
/// ## Example
///
/// ```
/// use tile_race::core::{Side, SideMap};
///
/// let mut finished: SideMap<u8> = SideMap::with_value(0);
/// finished[Side::Second] += 1;
///
/// assert_eq!(finished[Side::First], 0);
/// assert_eq!(finished[Side::Second], 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::First), factory(Side::Second)],
        }
    }

    /// Create a new SideMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a new SideMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().zip(self.data.iter())
    }

    /// Iterate over (Side, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Side, &mut T)> {
        Side::ALL.into_iter().zip(self.data.iter_mut())
    }
}

impl<T: Default> Default for SideMap<T> {
    fn default() -> Self {
        Self::with_default()
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}
