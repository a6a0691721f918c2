//! Card arrangement: who sits in which slot, and whether that wins.
//!
//! ## Design Philosophy
//!
//! The engine is the single owner of slot assignments. Drag input, combat and
//! persistence all go through it, and it reports every change as a typed
//! event rather than through shared mutable view state.
//!
//! ## Example Usage
//!
//! ```
//! use math_idle::arrangement::ArrangementEngine;
//! use math_idle::core::{Card, SortOrder};
//!
//! let mut engine = ArrangementEngine::new(Card::deal(&[3, 2, 1]), SortOrder::Desc).unwrap();
//!
//! // Already descending: the first check wins, later checks stay quiet.
//! assert!(engine.check_winning_condition());
//! assert!(!engine.is_interactive());
//! ```

mod engine;
mod error;
mod events;
pub mod win;

pub use engine::{ArrangementEngine, DropOutcome, DropResult, EngineState, EventBuffer, IgnoreReason};
pub use error::ArrangementError;
pub use events::{ArrangementEvent, ArrangementObserver, OrderedValues, SubscriptionId};
