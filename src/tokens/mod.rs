//! Tokens and the table they move on.

pub mod movement;
pub mod token;

pub use movement::{Landing, MoveOutcome, Table, TileEffect, TokenSet, FINISHED_VALUE};
pub use token::{Token, TokenId, TokenStatus, TOKENS_PER_SIDE, UNDEPLOYED};
