//! Enemy definitions and live enemy state.

use serde::{Deserialize, Serialize};

/// Static definition of an enemy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Level this enemy is introduced at.
    pub level: u32,

    /// Display name.
    pub name: String,

    /// Portrait path, if any.
    #[serde(rename = "imgsrc", default)]
    pub image: Option<String>,

    /// Full health.
    pub health: u64,

    /// Coins awarded on defeat.
    pub reward: u64,
}

impl EnemySpec {
    /// Create an enemy definition.
    pub fn new(level: u32, name: impl Into<String>, health: u64, reward: u64) -> Self {
        Self {
            level,
            name: name.into(),
            image: None,
            health,
            reward,
        }
    }

    /// Set the portrait path.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Is this a boss (every tenth level)?
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.level % 10 == 0
    }
}

/// The enemy currently being fought.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyState {
    /// Which enemy this is. Browser saves store it under `enemy`.
    #[serde(alias = "enemy")]
    pub enemy_spec: EnemySpec,

    /// Remaining health, `0..=enemy_spec.health`.
    pub current_health: u64,
}

impl EnemyState {
    /// A fresh enemy at full health.
    #[must_use]
    pub fn new(enemy_spec: EnemySpec) -> Self {
        let current_health = enemy_spec.health;
        Self {
            enemy_spec,
            current_health,
        }
    }

    /// Has this enemy run out of health?
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Remaining health as a percentage of full health.
    #[must_use]
    pub fn health_percent(&self) -> f64 {
        if self.enemy_spec.health == 0 {
            return 0.0;
        }
        self.current_health as f64 / self.enemy_spec.health as f64 * 100.0
    }

    /// Subtract `damage`, clamping at zero. Returns the health removed.
    pub fn take_damage(&mut self, damage: u64) -> u64 {
        let before = self.current_health;
        self.current_health = before.saturating_sub(damage);
        before - self.current_health
    }
}
