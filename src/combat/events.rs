//! Combat events and observers.
//!
//! The presentation layer renders health-bar changes, defeats and new
//! enemies from these. Same shape as the arrangement observers: typed
//! callbacks with no-op defaults, or any `FnMut(&CombatEvent)` closure.

use serde::{Deserialize, Serialize};

use super::enemy::EnemySpec;

/// Something that happened in combat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A win dealt damage to the current enemy.
    EnemyDamaged {
        damage: u64,
        previous_health: u64,
        current_health: u64,
        max_health: u64,
    },

    /// The current enemy ran out of health.
    EnemyDefeated { name: String, level: u32, reward: u64 },

    /// A new enemy took the field.
    EnemySpawned { spec: EnemySpec },
}

/// Receives combat events.
pub trait CombatObserver: Send {
    fn on_damage(&mut self, _damage: u64, _current_health: u64, _max_health: u64) {}

    fn on_defeat(&mut self, _name: &str, _level: u32, _reward: u64) {}

    fn on_spawn(&mut self, _spec: &EnemySpec) {}

    /// Entry point used by the resolver. Routes to the typed callbacks.
    fn on_event(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::EnemyDamaged {
                damage,
                current_health,
                max_health,
                ..
            } => self.on_damage(*damage, *current_health, *max_health),
            CombatEvent::EnemyDefeated { name, level, reward } => self.on_defeat(name, *level, *reward),
            CombatEvent::EnemySpawned { spec } => self.on_spawn(spec),
        }
    }
}

impl<F> CombatObserver for F
where
    F: FnMut(&CombatEvent) + Send,
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event);
    }
}
