//! Combat: enemies, the enemy catalog, and turning wins into damage.
//!
//! A win's card values are summed into damage against the current enemy.
//! Defeating it awards its reward in coins, raises the player level and
//! brings in the catalog's enemy for the new level.

mod catalog;
mod enemy;
mod error;
mod events;
mod resolver;

pub use catalog::{enemy_from_filename, scaled_health, scaled_reward, EnemyCatalog};
pub use enemy::{EnemySpec, EnemyState};
pub use error::CatalogError;
pub use events::{CombatEvent, CombatObserver};
pub use resolver::{CombatResolver, WinOutcome};
