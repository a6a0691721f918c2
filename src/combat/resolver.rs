//! Turning wins into damage, defeats and level-ups.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::catalog::EnemyCatalog;
use super::enemy::{EnemySpec, EnemyState};
use super::events::{CombatEvent, CombatObserver};
use crate::arrangement::SubscriptionId;
use crate::core::Progress;

/// What a win did to progression.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinOutcome {
    /// Sum of the winning card values (negative sums deal no damage).
    pub damage: u64,

    /// Health actually removed from the enemy.
    pub damage_dealt: u64,

    /// Did the enemy fall?
    pub enemy_defeated: bool,

    /// Did the player level go up?
    pub level_increased: bool,

    /// Coins awarded by this win.
    pub coins_awarded: u64,

    /// Health of the enemy now on the field, if any.
    pub remaining_health: Option<u64>,

    /// Enemy spawned to replace a defeated one.
    pub new_enemy: Option<EnemySpec>,
}

/// Applies wins to player progression.
///
/// Holds no progression itself: the session owns `Progress` and passes it
/// in, so one resolver can serve any number of sessions.
pub struct CombatResolver {
    catalog: EnemyCatalog,
    observers: Vec<(SubscriptionId, Box<dyn CombatObserver>)>,
    next_subscription: u32,
}

impl CombatResolver {
    /// Create a resolver drawing enemies from `catalog`.
    #[must_use]
    pub fn new(catalog: EnemyCatalog) -> Self {
        Self {
            catalog,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The enemy catalog.
    #[must_use]
    pub fn catalog(&self) -> &EnemyCatalog {
        &self.catalog
    }

    /// Register an observer.
    pub fn subscribe(&mut self, observer: impl CombatObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// A fresh enemy for `level`.
    #[must_use]
    pub fn enemy_for_level(&self, level: u32) -> EnemyState {
        EnemyState::new(self.catalog.by_level(level).clone())
    }

    /// Put the enemy for the current level on the field if there is none.
    ///
    /// Returns true if an enemy was spawned.
    pub fn initialize_enemy(&mut self, progress: &mut Progress) -> bool {
        if progress.enemy.is_some() {
            return false;
        }
        self.spawn(progress);
        true
    }

    /// Replace the current enemy with the one for the current level.
    pub fn respawn(&mut self, progress: &mut Progress) {
        self.spawn(progress);
    }

    /// Apply a win with the given card values (slot order).
    ///
    /// With no enemy on the field nothing changes and the outcome is empty
    /// apart from `damage`.
    pub fn apply_win(&mut self, progress: &mut Progress, values: &[i64]) -> WinOutcome {
        let damage = total_damage(values);
        let mut outcome = WinOutcome {
            damage,
            ..WinOutcome::default()
        };

        let Some(enemy) = progress.enemy.as_mut() else {
            debug!(damage, "win with no enemy on the field");
            return outcome;
        };

        let previous_health = enemy.current_health;
        outcome.damage_dealt = enemy.take_damage(damage);
        let damaged = CombatEvent::EnemyDamaged {
            damage,
            previous_health,
            current_health: enemy.current_health,
            max_health: enemy.enemy_spec.health,
        };
        debug!(
            damage,
            previous_health,
            current_health = enemy.current_health,
            enemy = %enemy.enemy_spec.name,
            "enemy damaged"
        );

        if !enemy.is_defeated() {
            outcome.remaining_health = Some(enemy.current_health);
            self.dispatch(&damaged);
            return outcome;
        }

        let defeated = enemy.enemy_spec.clone();
        progress.coins = progress.coins.saturating_add(defeated.reward);
        progress.level = progress.level.saturating_add(1);
        info!(
            enemy = %defeated.name,
            reward = defeated.reward,
            coins = progress.coins,
            level = progress.level,
            "enemy defeated"
        );

        outcome.enemy_defeated = true;
        outcome.level_increased = true;
        outcome.coins_awarded = defeated.reward;

        self.dispatch(&damaged);
        self.dispatch(&CombatEvent::EnemyDefeated {
            name: defeated.name,
            level: defeated.level,
            reward: defeated.reward,
        });

        let next = self.spawn(progress);
        outcome.remaining_health = Some(next.current_health);
        outcome.new_enemy = Some(next.enemy_spec);
        outcome
    }

    fn spawn(&mut self, progress: &mut Progress) -> EnemyState {
        let enemy = self.enemy_for_level(progress.level);
        info!(level = progress.level, enemy = %enemy.enemy_spec.name, "enemy spawned");
        self.dispatch(&CombatEvent::EnemySpawned {
            spec: enemy.enemy_spec.clone(),
        });
        progress.enemy = Some(enemy.clone());
        enemy
    }

    fn dispatch(&mut self, event: &CombatEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for CombatResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatResolver")
            .field("catalog_len", &self.catalog.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Sum of card values, clamped into `u64`.
fn total_damage(values: &[i64]) -> u64 {
    let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
    u64::try_from(sum.max(0)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn duck_progress() -> Progress {
        Progress {
            coins: 0,
            level: 1,
            enemy: Some(EnemyState::new(EnemySpec::new(1, "Duck", 10, 5))),
        }
    }

    #[test]
    fn test_damage_without_defeat() {
        let mut resolver = CombatResolver::new(EnemyCatalog::standard());
        let mut progress = duck_progress();

        let outcome = resolver.apply_win(&mut progress, &[1, 2, 3]);
        assert_eq!(outcome.damage, 6);
        assert_eq!(outcome.damage_dealt, 6);
        assert!(!outcome.enemy_defeated);
        assert!(!outcome.level_increased);
        assert_eq!(outcome.remaining_health, Some(4));
        assert_eq!(progress.enemy.as_ref().unwrap().current_health, 4);
        assert_eq!(progress.coins, 0);
        assert_eq!(progress.level, 1);
    }

    #[test]
    fn test_defeat_levels_up_and_awards() {
        let mut resolver = CombatResolver::new(EnemyCatalog::standard());
        let mut progress = duck_progress();

        let outcome = resolver.apply_win(&mut progress, &[3, 4, 5]);
        assert_eq!(outcome.damage, 12);
        assert_eq!(outcome.damage_dealt, 10);
        assert!(outcome.enemy_defeated);
        assert!(outcome.level_increased);
        assert_eq!(outcome.coins_awarded, 5);
        assert_eq!(progress.coins, 5);
        assert_eq!(progress.level, 2);

        let enemy = progress.enemy.as_ref().unwrap();
        assert_eq!(enemy.enemy_spec.name, "Slime");
        assert_eq!(enemy.current_health, enemy.enemy_spec.health);
        assert_eq!(outcome.new_enemy.as_ref().map(|e| e.level), Some(2));
    }

    #[test]
    fn test_no_enemy_is_noop() {
        let mut resolver = CombatResolver::new(EnemyCatalog::standard());
        let mut progress = Progress::default();

        let outcome = resolver.apply_win(&mut progress, &[5, 5]);
        assert_eq!(outcome.damage, 10);
        assert!(!outcome.enemy_defeated);
        assert_eq!(outcome.remaining_health, None);
        assert_eq!(progress, Progress::default());
    }

    #[test]
    fn test_negative_sum_deals_nothing() {
        assert_eq!(total_damage(&[-5, 2]), 0);
        assert_eq!(total_damage(&[i64::MAX, i64::MAX]), u64::MAX - 1);
        assert_eq!(total_damage(&[]), 0);
    }

    #[test]
    fn test_initialize_enemy_once() {
        let mut resolver = CombatResolver::new(EnemyCatalog::standard());
        let mut progress = Progress {
            level: 25,
            ..Progress::default()
        };

        assert!(resolver.initialize_enemy(&mut progress));
        assert_eq!(progress.enemy.as_ref().unwrap().enemy_spec.name, "Dragon");
        assert!(!resolver.initialize_enemy(&mut progress));
    }

    #[test]
    fn test_observer_sequence() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut resolver = CombatResolver::new(EnemyCatalog::standard());
        let id = resolver.subscribe(move |event: &CombatEvent| sink.lock().unwrap().push(event.clone()));

        let mut progress = duck_progress();
        resolver.apply_win(&mut progress, &[10]);

        let events = seen.lock().unwrap().clone();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            CombatEvent::EnemyDamaged {
                damage: 10,
                previous_health: 10,
                current_health: 0,
                max_health: 10
            }
        ));
        assert!(matches!(events[1], CombatEvent::EnemyDefeated { reward: 5, .. }));
        assert!(matches!(&events[2], CombatEvent::EnemySpawned { spec } if spec.name == "Slime"));

        assert!(resolver.unsubscribe(id));
        assert!(!resolver.unsubscribe(id));
    }
}
