//! Arrangement invariant violations.

use thiserror::Error;

use crate::core::CardId;

/// A card set that breaks the occupancy invariant, or a malformed
/// programmatic rearrangement.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArrangementError {
    #[error("arrangement needs at least one slot")]
    NoSlots,

    #[error("{cards} cards do not fit in {slots} slots")]
    TooManyCards { cards: usize, slots: usize },

    #[error("card {0} appears more than once")]
    DuplicateCard(CardId),

    #[error("card {card_id} claims slot {slot_index}, outside 0..{slot_count}")]
    SlotOutOfRange {
        card_id: CardId,
        slot_index: usize,
        slot_count: usize,
    },

    #[error("cards {first} and {second} both claim slot {slot_index}")]
    SlotConflict {
        slot_index: usize,
        first: CardId,
        second: CardId,
    },

    #[error("slot table disagrees with card {0}")]
    SlotTableMismatch(CardId),

    #[error("rearrangement must list every card exactly once")]
    NotAPermutation,

    #[error("expected {expected} cards, found {found}")]
    CardCountMismatch { expected: usize, found: usize },
}
