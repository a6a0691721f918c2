//! Core types: cards, configuration, RNG, persisted state.
//!
//! Everything else in the crate builds on these. None of them carry
//! behavior beyond validation and bookkeeping.

pub mod card;
pub mod config;
pub mod error;
pub mod rng;
pub mod state;

pub use card::{Card, CardId};
pub use config::{
    next_number_range, previous_number_range, DescendingRule, DifficultyLimits, GameConfig,
    Geometry, SortOrder, NUMBER_RANGE_STEPS,
};
pub use error::ConfigError;
pub use rng::GameRng;
pub use state::{Progress, SessionState};
