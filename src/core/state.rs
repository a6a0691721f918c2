//! Session state: the persisted aggregate.
//!
//! ## SessionState
//!
//! Everything that survives a reload:
//! - The card set with slot assignments
//! - Progression (coins, level)
//! - Difficulty (card count, number range)
//! - The current enemy and its remaining health
//!
//! Cards are held in an `im::Vector` so a snapshot handed to the store is an
//! O(1) clone that later play cannot mutate underneath it.
//!
//! ## Progress
//!
//! The subset of the aggregate that regeneration and difficulty changes
//! must carry over untouched.

use std::time::{SystemTime, UNIX_EPOCH};

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::combat::EnemyState;

/// Player progression carried across card regenerations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Coins earned from defeated enemies.
    pub coins: u64,

    /// Player level (starts at 1).
    pub level: u32,

    /// Current enemy. `None` until the first enemy is initialized.
    pub enemy: Option<EnemyState>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            coins: 0,
            level: 1,
            enemy: None,
        }
    }
}

/// The persisted game aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Cards with their slot assignments.
    pub cards: Vector<Card>,

    /// Coins earned. Absent until the first reward in browser saves.
    #[serde(default)]
    pub coins: u64,

    /// Player level.
    pub level: u32,

    /// Cards per arrangement.
    pub card_count: usize,

    /// Values are drawn from `[0, number_range]`.
    pub number_range: i64,

    /// Current enemy.
    #[serde(default)]
    pub enemy: Option<EnemyState>,

    /// Milliseconds since the Unix epoch at the last save.
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl SessionState {
    /// Create a fresh aggregate: level 1, no coins, no enemy yet.
    pub fn new(cards: impl IntoIterator<Item = Card>, card_count: usize, number_range: i64) -> Self {
        Self::from_parts(cards, card_count, number_range, Progress::default())
    }

    /// Assemble an aggregate from cards, difficulty and progression.
    pub fn from_parts(
        cards: impl IntoIterator<Item = Card>,
        card_count: usize,
        number_range: i64,
        progress: Progress,
    ) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            coins: progress.coins,
            level: progress.level,
            card_count,
            number_range,
            enemy: progress.enemy,
            timestamp: None,
        }
    }

    /// Extract the progression part of the aggregate.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            coins: self.coins,
            level: self.level,
            enemy: self.enemy.clone(),
        }
    }

    /// Cards ordered by slot index.
    #[must_use]
    pub fn cards_in_slot_order(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.iter().cloned().collect();
        cards.sort_by_key(|c| c.slot_index);
        cards
    }

    /// Card values ordered by slot index.
    #[must_use]
    pub fn values_in_slot_order(&self) -> Vec<i64> {
        self.cards_in_slot_order().iter().map(|c| c.value).collect()
    }

    /// Copy of this state stamped with the current wall-clock time.
    #[must_use]
    pub fn stamped(&self) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self {
            timestamp: Some(millis),
            ..self.clone()
        }
    }
}
