//! Game session: one player's cards, progression and enemy, wired to a store.
//!
//! `GameSession` owns every component and runs the full loop:
//!
//! ```text
//! pointer ─▶ DragController ─▶ ArrangementEngine ─▶ win? ─▶ CombatResolver
//!                                     ▲                          │
//!                                     └──── regenerate ◀─ settle ┘
//! ```
//!
//! In-memory state is authoritative. Every mutation that must survive a
//! reload is saved, and a failed save is logged and reported as
//! `saved: false` rather than returned as an error.

mod game;
mod report;

pub use game::GameSession;
pub use report::DropReport;
