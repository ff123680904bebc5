//! Core engine types: sides, RNG, configuration, errors.
//!
//! These are the leaf building blocks every other module depends on.

pub mod side;
pub mod rng;
pub mod config;
pub mod error;

pub use side::{Side, SideMap};
pub use rng::{GameRng, GameRngState, DIE_MAX};
pub use config::{ControlMode, MatchConfig, SwitchPolicy, ViolationPolicy};
pub use error::{ConfigError, RuleError, RuleResult};
