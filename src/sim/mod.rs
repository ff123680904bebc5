//! Simulation: headless playouts for balancing and testing.

pub mod playout;

pub use playout::{play_out, PlayoutConfig, PlayoutError, PlayoutResult, PlayoutRunner, PlayoutSummary};
