//! Token movement, capture and tile effects.
//!
//! `Table` owns the board and both sides' tokens. Tiles reference tokens by
//! `TokenId`; tokens reference their tile by `TileId`. Every mutation keeps
//! the two views in sync.
//!
//! ## Destination lookup
//!
//! A roll that would carry a token past index 13 wraps the *lookup* to tile
//! 0. Whether the move is a finish is decided separately in `commit_move`
//! by comparing the raw destination with the current position. Tile 0 is
//! private, so the wrapped lookup never exposes enemies.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::token::{Token, TokenId, TokenStatus, TOKENS_PER_SIDE};
use crate::board::{Board, BoardLayout, TileId, TileKind, LAST_INDEX, TRACK_LEN};
use crate::core::{ConfigError, RuleError, RuleResult, Side, SideMap};

/// Score of a finished token in `Table::side_value`.
pub const FINISHED_VALUE: u32 = 15;

/// Tokens affected by a single landing. A tile never holds more than four.
pub type TokenSet = SmallVec<[TokenId; 4]>;

/// Where a committed move ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Landing {
    /// Token left the board.
    Finished,
    /// Token settled on a tile.
    Settled { index: u8, tile: TileId, kind: TileKind },
    /// Token landed on a restart tile and lost the coin flip.
    KickedBack { index: u8, tile: TileId },
}

/// What the landing means for the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEffect {
    /// Turn ends normally.
    EndTurn,
    /// Opponent is frozen for its next roll; turn ends.
    FreezeOpponent,
    /// Mover rolls again.
    Repeat,
    /// Token finished; turn ends (or the game does).
    Finished,
}

/// Result of `Table::commit_move`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub token: TokenId,
    pub roll: u8,
    /// Index before the move, `None` when deploying.
    pub from: Option<u8>,
    pub landing: Landing,
    /// Enemy tokens sent back to start by this landing.
    pub evicted: TokenSet,
}

impl MoveOutcome {
    #[must_use]
    pub fn effect(&self) -> TileEffect {
        match self.landing {
            Landing::Finished => TileEffect::Finished,
            Landing::KickedBack { .. } => TileEffect::EndTurn,
            Landing::Settled { kind, .. } => match kind {
                TileKind::Freeze => TileEffect::FreezeOpponent,
                TileKind::Repeat => TileEffect::Repeat,
                TileKind::Capacity(_) | TileKind::Restart => TileEffect::EndTurn,
            },
        }
    }

    /// Resolved coin flip, when the move landed on a restart tile.
    ///
    /// `Some(true)` means the token was sent back to start.
    #[must_use]
    pub fn restart_outcome(&self) -> Option<bool> {
        match self.landing {
            Landing::KickedBack { .. } => Some(true),
            Landing::Settled { kind: TileKind::Restart, .. } => Some(false),
            _ => None,
        }
    }
}

/// Board plus both sides' tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    board: Board,
    tokens: SideMap<Vec<Token>>,
}

impl Table {
    /// Fresh table: all fourteen tokens undeployed.
    pub fn new(layout: BoardLayout) -> Result<Self, ConfigError> {
        Ok(Self {
            board: Board::new(layout)?,
            tokens: SideMap::new(|side| TokenId::all(side).map(Token::new).collect()),
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Tokens of one side, in slot order.
    #[must_use]
    pub fn tokens(&self, side: Side) -> &[Token] {
        &self.tokens[side]
    }

    /// Look up a token.
    pub fn token(&self, id: TokenId) -> RuleResult<&Token> {
        self.tokens[id.side]
            .get(id.slot as usize)
            .ok_or(RuleError::UnknownToken { side: id.side, slot: id.slot })
    }

    fn token_mut(&mut self, id: TokenId) -> RuleResult<&mut Token> {
        self.tokens[id.side]
            .get_mut(id.slot as usize)
            .ok_or(RuleError::UnknownToken { side: id.side, slot: id.slot })
    }

    // === Queries ===

    /// Destination of a `roll` from an arbitrary position on `side`'s route.
    ///
    /// Returns the wrapped index and its tile. `None` for a zero roll or a
    /// position that is already off the board.
    #[must_use]
    pub fn target_from(&self, side: Side, position: i32, roll: u8) -> Option<(i32, TileId)> {
        if roll == 0 || position >= TRACK_LEN as i32 {
            return None;
        }
        let mut desired = position + roll as i32;
        if desired > LAST_INDEX {
            desired = 0;
        }
        let tile = self.board.tile_id_at(desired, side).ok()?;
        Some((desired, tile))
    }

    /// Tile the token would look up for `roll`.
    ///
    /// `None` for a zero roll, a finished token or an unknown token.
    #[must_use]
    pub fn target_tile(&self, id: TokenId, roll: u8) -> Option<TileId> {
        let token = self.token(id).ok()?;
        self.target_from(id.side, token.position(), roll)
            .map(|(_, tile)| tile)
    }

    /// Whether the token may move by `roll`, ignoring freeze.
    ///
    /// A full target only admits the token when it wraps around, that is
    /// when the target index is behind the token.
    #[must_use]
    pub fn can_move_to(&self, id: TokenId, roll: u8) -> bool {
        let Ok(token) = self.token(id) else {
            return false;
        };
        if token.is_finished() {
            return false;
        }
        let Some((index, tile)) = self.target_from(id.side, token.position(), roll) else {
            return false;
        };

        if !self.board.is_at_capacity(self.board.tile(tile), id.side) {
            return true;
        }
        index < token.position()
    }

    /// True when moving by `roll` takes the token off the board.
    #[must_use]
    pub fn is_finishing_move(&self, id: TokenId, roll: u8) -> bool {
        let Ok(token) = self.token(id) else {
            return false;
        };
        if token.is_finished() || roll == 0 {
            return false;
        }
        let current = token.position();
        match self.target_from(id.side, current, roll) {
            Some((wrapped, _)) => current + roll as i32 > LAST_INDEX || wrapped < current,
            None => false,
        }
    }

    /// Kind of the tile the token would settle on, `None` for finishes.
    #[must_use]
    pub fn landing_kind(&self, id: TokenId, roll: u8) -> Option<TileKind> {
        if self.is_finishing_move(id, roll) {
            return None;
        }
        self.target_tile(id, roll).map(|tile| self.board.tile(tile).kind())
    }

    /// Enemy tokens on a tile, from `side`'s point of view.
    #[must_use]
    pub fn enemies_on(&self, tile: TileId, side: Side) -> TokenSet {
        self.board
            .tile(tile)
            .occupants()
            .iter()
            .copied()
            .filter(|t| t.side != side)
            .collect()
    }

    /// Enemy tokens the move would capture.
    #[must_use]
    pub fn killable_pieces_for_roll(&self, id: TokenId, roll: u8) -> TokenSet {
        match self.target_tile(id, roll) {
            Some(tile) => self.enemies_on(tile, id.side),
            None => TokenSet::new(),
        }
    }

    #[must_use]
    pub fn finished_count(&self, side: Side) -> usize {
        self.tokens[side].iter().filter(|t| t.is_finished()).count()
    }

    #[must_use]
    pub fn all_finished(&self, side: Side) -> bool {
        self.finished_count(side) == TOKENS_PER_SIDE
    }

    #[must_use]
    pub fn has_undeployed(&self, side: Side) -> bool {
        self.tokens[side].iter().any(Token::is_undeployed)
    }

    /// Board value of a side: finished tokens score `FINISHED_VALUE`,
    /// deployed tokens their index, undeployed tokens nothing.
    #[must_use]
    pub fn side_value(&self, side: Side) -> u32 {
        self.tokens[side]
            .iter()
            .map(|token| match token.status() {
                TokenStatus::Finished => FINISHED_VALUE,
                TokenStatus::Deployed { index } => index as u32,
                TokenStatus::Undeployed => 0,
            })
            .sum()
    }

    /// True when the board matches its layout, no tile exceeds its capacity
    /// and every token/tile link agrees in both directions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if !self.board.is_well_formed() || !self.board.capacity_respected() {
            return false;
        }
        let slots_agree = Side::ALL.iter().all(|&side| {
            self.tokens[side].len() == TOKENS_PER_SIDE
                && self.tokens[side]
                    .iter()
                    .zip(TokenId::all(side))
                    .all(|(token, id)| token.id() == id)
        });
        if !slots_agree {
            return false;
        }
        let tokens_agree = Side::ALL.iter().all(|&side| {
            self.tokens[side].iter().all(|token| match (token.status(), token.tile()) {
                (TokenStatus::Deployed { index }, Some(tile)) => {
                    self.board.tile_id_at(index as i32, side) == Ok(tile)
                        && self
                            .board
                            .get_tile(tile)
                            .is_some_and(|t| t.occupants().contains(&token.id()))
                }
                (TokenStatus::Deployed { .. }, None) => false,
                (_, tile) => tile.is_none(),
            })
        });
        let tiles_agree = self.board.tiles().iter().all(|tile| {
            tile.occupants()
                .iter()
                .all(|&id| self.token(id).is_ok_and(|t| t.tile() == Some(tile.id())))
        });
        tokens_agree && tiles_agree
    }

    // === Mutations ===

    /// Move a token by `roll` and apply the landing tile's effect.
    ///
    /// `restart_coin` is consulted only when the token lands on a restart
    /// tile; `true` sends the token back to start.
    pub fn commit_move(
        &mut self,
        id: TokenId,
        roll: u8,
        restart_coin: impl FnOnce() -> bool,
    ) -> RuleResult<MoveOutcome> {
        let token = self.token(id)?;
        if !self.can_move_to(id, roll) {
            return Err(RuleError::IllegalMove { token: id, roll });
        }

        let from = match token.status() {
            TokenStatus::Deployed { index } => Some(index),
            _ => None,
        };
        let old_tile = token.tile();

        if self.is_finishing_move(id, roll) {
            if let Some(tile) = old_tile {
                self.board.tile_mut(tile).remove(id);
            }
            self.token_mut(id)?.finish();
            debug!(token = %id, ?from, "token finished");
            return Ok(MoveOutcome {
                token: id,
                roll,
                from,
                landing: Landing::Finished,
                evicted: TokenSet::new(),
            });
        }

        let current = self.token(id)?.position();
        let (index, tile) = self
            .target_from(id.side, current, roll)
            .ok_or(RuleError::IllegalMove { token: id, roll })?;
        let index = index as u8;
        let kind = self.board.tile(tile).kind();

        if let Some(old) = old_tile {
            self.board.tile_mut(old).remove(id);
        }
        self.board.tile_mut(tile).push(id);
        self.token_mut(id)?.deploy(index, tile);
        debug!(token = %id, ?from, to = index, ?kind, "token moved");

        // A kicked-back lander leaves enemies on the restart tile untouched
        if kind == TileKind::Restart && restart_coin() {
            self.board.tile_mut(tile).remove(id);
            self.token_mut(id)?.kick_back_to_start();
            debug!(token = %id, "restart tile sent token back to start");
            return Ok(MoveOutcome {
                token: id,
                roll,
                from,
                landing: Landing::KickedBack { index, tile },
                evicted: TokenSet::new(),
            });
        }

        let evicted = self.try_evict(tile, id.side);

        Ok(MoveOutcome {
            token: id,
            roll,
            from,
            landing: Landing::Settled { index, tile, kind },
            evicted,
        })
    }

    /// Send every non-`acting_side` token on a mixed tile back to start.
    ///
    /// Does nothing unless the tile holds more than one token.
    pub fn try_evict(&mut self, tile: TileId, acting_side: Side) -> TokenSet {
        if self.board.tile(tile).occupants().len() <= 1 {
            return TokenSet::new();
        }

        let evicted = self.enemies_on(tile, acting_side);
        for &victim in &evicted {
            self.board.tile_mut(tile).remove(victim);
            if let Ok(token) = self.token_mut(victim) {
                token.kick_back_to_start();
            }
            debug!(token = %victim, %tile, "token captured");
        }
        evicted
    }

    /// Place a token directly, bypassing turn rules.
    ///
    /// For setting up positions (puzzles, replays, tests). No eviction or
    /// tile effect happens, but capacity is enforced.
    pub fn set_status(&mut self, id: TokenId, status: TokenStatus) -> RuleResult<()> {
        let old_tile = self.token(id)?.tile();

        let new_tile = match status {
            TokenStatus::Deployed { index } => {
                let tile = self.board.tile_id_at(index as i32, id.side)?;
                if old_tile != Some(tile) && self.board.is_at_capacity(self.board.tile(tile), id.side) {
                    return Err(RuleError::TileFull { tile, side: id.side });
                }
                Some((index, tile))
            }
            _ => None,
        };

        if let Some(old) = old_tile {
            self.board.tile_mut(old).remove(id);
        }
        let token = self.token_mut(id)?;
        match (status, new_tile) {
            (TokenStatus::Finished, _) => token.finish(),
            (_, Some((index, tile))) => {
                token.deploy(index, tile);
                self.board.tile_mut(tile).push(id);
            }
            _ => token.kick_back_to_start(),
        }
        trace!(token = %id, ?status, "token placed");
        Ok(())
    }
}
