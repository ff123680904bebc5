//! Match orchestration: turn order, side switching and win detection.

pub mod controller;
pub mod events;
pub mod snapshot;
pub mod view;

pub use controller::Match;
pub use events::MatchEvent;
pub use snapshot::{MatchSnapshot, MatchStatus, RngSnapshot};
pub use view::{MatchView, UiInput};
