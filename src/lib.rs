//! # math-idle
//!
//! Engine for a sorting idle game: numbered cards sit in a row of slots,
//! the player drags them into ascending (or descending) order, and every
//! sorted arrangement deals its card total as damage to a leveled enemy.
//!
//! ## Design Principles
//!
//! 1. **Presentation-Free**: No rendering, no DOM, no timers owned by a UI.
//!    The presentation layer feeds pointer coordinates in and renders the
//!    typed events that come out.
//!
//! 2. **One Owner Per Fact**: The arrangement engine alone assigns slots;
//!    the combat resolver alone touches enemy health. The session wires
//!    them together and nothing else holds mutable game state.
//!
//! 3. **Memory Is Truth**: Persistence is best-effort durability. A failed
//!    save is logged and reported, never allowed to tear in-memory state.
//!
//! ## Architecture
//!
//! - **Explicit Session**: `GameSession` is constructed and passed around;
//!   there is no process-wide game manager.
//!
//! - **Typed Observers**: Swaps, moves, wins and combat are delivered to
//!   `ArrangementObserver` / `CombatObserver` implementations (or plain
//!   closures) instead of a shared event bus.
//!
//! - **Persistent Data Structures**: Saved snapshots hold cards in an
//!   `im::Vector`, so taking one is O(1) and later play cannot alter it.
//!
//! ## Modules
//!
//! - `core`: Cards, configuration, RNG, persisted state
//! - `zones`: Slot geometry and nearest-slot lookup
//! - `drag`: Pointer gestures and snap previews
//! - `arrangement`: Slot assignment, drop resolution, win detection
//! - `combat`: Enemies, the enemy catalog, damage and level-ups
//! - `store`: Session persistence (memory and file backed)
//! - `session`: The orchestrating `GameSession`

pub mod core;
pub mod zones;
pub mod drag;
pub mod arrangement;
pub mod combat;
pub mod store;
pub mod session;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    Card, CardId,
    GameConfig, DifficultyLimits, Geometry, SortOrder, DescendingRule,
    GameRng,
    Progress, SessionState,
    ConfigError,
};

pub use crate::zones::{Point, Slot, SlotGrid};

pub use crate::drag::{DragController, DragGesture, DragUpdate, SnapPreview, DragError};

pub use crate::arrangement::{
    ArrangementEngine, EngineState, DropOutcome, DropResult, IgnoreReason,
    ArrangementEvent, ArrangementObserver, SubscriptionId,
    ArrangementError,
};

pub use crate::combat::{
    EnemySpec, EnemyState, EnemyCatalog, CatalogError,
    CombatResolver, WinOutcome, CombatEvent, CombatObserver,
};

pub use crate::store::{SessionStore, MemorySessionStore, FileSessionStore, StoreFormat, StoreError};

pub use crate::session::{GameSession, DropReport};

pub use crate::error::GameError;
