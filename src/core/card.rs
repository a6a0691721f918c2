//! Card identification and card records.
//!
//! A `Card` is a numbered tile that lives in exactly one slot. Cards are
//! created wholesale when a session starts or regenerates, and the only
//! field that ever changes afterwards is `slot_index`.
//!
//! ## ID Layout
//!
//! IDs follow the `card-N` convention, 1-based, in the order the values were
//! drawn. Persisted sessions use the same strings, so the layout is part of
//! the save format.
//!
//! ```
//! use math_idle::core::{Card, CardId};
//!
//! let card = Card::new(CardId::for_index(0), 7, 0);
//! assert_eq!(card.id.as_str(), "card-1");
//! assert_eq!(card.original_index, 0);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card within a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create a card ID from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the ID for the card drawn at `index` (0-based).
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        Self(format!("card-{}", index + 1))
    }

    /// Get the raw ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A numbered card.
///
/// `id` and `value` are fixed for the card's lifetime. `slot_index` is
/// mutated only by the arrangement engine. `original_index` remembers the
/// slot the card was dealt into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier.
    pub id: CardId,

    /// Face value; also the damage this card contributes on a win.
    pub value: i64,

    /// Slot currently holding this card.
    pub slot_index: usize,

    /// Slot the card was dealt into.
    pub original_index: usize,
}

impl Card {
    /// Create a card dealt into `slot_index`.
    pub fn new(id: CardId, value: i64, slot_index: usize) -> Self {
        Self {
            id,
            value,
            slot_index,
            original_index: slot_index,
        }
    }

    /// Deal a fresh set of cards, one per value, in slot order.
    #[must_use]
    pub fn deal(values: &[i64]) -> Vec<Card> {
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| Card::new(CardId::for_index(index), value, index))
            .collect()
    }

    /// Has this card been moved away from the slot it was dealt into?
    #[must_use]
    pub fn is_displaced(&self) -> bool {
        self.slot_index != self.original_index
    }
}
