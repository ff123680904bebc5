//! Turn phases and the per-side turn engine.

pub mod engine;

pub use engine::{Phase, TurnEngine, TurnSignal, TurnState};
