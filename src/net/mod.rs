//! Networked play: message contract and authority/replica peers.

pub mod error;
pub mod message;
pub mod peer;

pub use error::{NetError, NetResult};
pub use message::NetMessage;
pub use peer::{Peer, Role};
