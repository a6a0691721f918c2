//! Arrangement engine: card-to-slot mapping, drop resolution, win detection.
//!
//! ## State machine
//!
//! ```text
//!            resolve_drop
//! Steady ───────────────▶ Resolving ──┬──▶ Steady   (not sorted)
//!   ▲                                 └──▶ Won      (sorted, fires ContainerWon once)
//!   │  replace_cards / revoked win            │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! While `Won`, cards are locked: drops are ignored until the card set is
//! replaced. A programmatic `rearrange` can still unsort a won arrangement,
//! which revokes the win and unlocks the cards.
//!
//! ## Occupancy invariant
//!
//! No two cards share a slot and every card sits in `0..slot_count`. The
//! engine keeps a slot table next to the cards for O(1) occupant lookup;
//! both are updated together inside a single call, so no caller can see a
//! half-applied swap. `check_invariants` re-derives the table from the cards
//! and is asserted after every transition in debug builds.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::error::ArrangementError;
use super::events::{ArrangementEvent, ArrangementObserver, ObserverList, OrderedValues, SubscriptionId};
use super::win;
use crate::core::{Card, CardId, DescendingRule, SortOrder};

/// Engine lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    /// Accepting drops.
    #[default]
    Steady,
    /// Applying a drop. Nested drops are rejected.
    Resolving,
    /// Sorted. Cards are locked until the set is replaced.
    Won,
}

/// Why a drop was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// No card with that ID.
    UnknownCard,
    /// Target slot outside `0..slot_count`.
    UnknownSlot,
    /// The arrangement has won; cards are not interactive.
    Locked,
    /// Another drop is still being applied.
    Busy,
}

/// What a drop did to the arrangement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped onto its own slot. Nothing moved.
    SnapBack,
    /// Exchanged slots with the card that occupied the target.
    Swapped { occupant: CardId },
    /// Moved into a vacant slot.
    Moved { from_slot: usize, to_slot: usize },
    /// Not applied.
    Ignored(IgnoreReason),
}

/// Events emitted by a single call. Rarely more than a move plus a win.
pub type EventBuffer = SmallVec<[ArrangementEvent; 2]>;

/// Result of `resolve_drop`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropResult {
    /// What happened to the dropped card.
    pub outcome: DropOutcome,

    /// Events emitted, in order. Already delivered to observers.
    pub events: EventBuffer,
}

impl DropResult {
    fn ignored(reason: IgnoreReason) -> Self {
        Self {
            outcome: DropOutcome::Ignored(reason),
            events: EventBuffer::new(),
        }
    }

    /// Did this drop change any slot assignment?
    #[must_use]
    pub fn changed_arrangement(&self) -> bool {
        matches!(
            self.outcome,
            DropOutcome::Swapped { .. } | DropOutcome::Moved { .. }
        )
    }

    /// Ordered values if this drop won the arrangement.
    #[must_use]
    pub fn won(&self) -> Option<&OrderedValues> {
        self.events.iter().find_map(|event| match event {
            ArrangementEvent::ContainerWon { values, .. } => Some(values),
            _ => None,
        })
    }
}

/// Owns the cards and their slot assignments.
///
/// ```
/// use math_idle::arrangement::{ArrangementEngine, DropOutcome, EngineState};
/// use math_idle::core::{Card, CardId, SortOrder};
///
/// // Values 2, 1, 3 in slots 0, 1, 2.
/// let mut engine = ArrangementEngine::new(Card::deal(&[2, 1, 3]), SortOrder::Asc).unwrap();
///
/// // Drag card-1 (value 2) onto slot 1: it swaps with card-2 (value 1).
/// let result = engine.resolve_drop(&CardId::from("card-1"), 1);
/// assert!(matches!(result.outcome, DropOutcome::Swapped { .. }));
///
/// // Now 1, 2, 3: the arrangement won and the cards are locked.
/// assert!(result.won().is_some());
/// assert_eq!(engine.state(), EngineState::Won);
/// ```
#[derive(Debug)]
pub struct ArrangementEngine {
    cards: Vec<Card>,

    /// Card ID -> position in `cards`.
    index: FxHashMap<CardId, usize>,

    /// Slot index -> position in `cards` of its occupant.
    slots: Vec<Option<usize>>,

    sort_order: SortOrder,
    descending_rule: DescendingRule,
    state: EngineState,
    observers: ObserverList,
}

impl ArrangementEngine {
    /// Create an engine with one slot per card.
    pub fn new(cards: Vec<Card>, sort_order: SortOrder) -> Result<Self, ArrangementError> {
        let slot_count = cards.len();
        Self::with_slots(cards, slot_count, sort_order)
    }

    /// Create an engine with `slot_count` slots, some of which may be empty.
    pub fn with_slots(
        cards: Vec<Card>,
        slot_count: usize,
        sort_order: SortOrder,
    ) -> Result<Self, ArrangementError> {
        let (index, slots) = Self::build_tables(&cards, slot_count)?;
        Ok(Self {
            cards,
            index,
            slots,
            sort_order,
            descending_rule: DescendingRule::default(),
            state: EngineState::Steady,
            observers: ObserverList::default(),
        })
    }

    /// Set how descending wins are judged.
    #[must_use]
    pub fn with_descending_rule(mut self, rule: DescendingRule) -> Self {
        self.descending_rule = rule;
        self
    }

    /// Validate `cards` against `slot_count` and build the lookup tables.
    fn build_tables(
        cards: &[Card],
        slot_count: usize,
    ) -> Result<(FxHashMap<CardId, usize>, Vec<Option<usize>>), ArrangementError> {
        if slot_count == 0 {
            return Err(ArrangementError::NoSlots);
        }
        if cards.len() > slot_count {
            return Err(ArrangementError::TooManyCards {
                cards: cards.len(),
                slots: slot_count,
            });
        }

        let mut index = FxHashMap::default();
        index.reserve(cards.len());
        let mut slots: Vec<Option<usize>> = vec![None; slot_count];

        for (pos, card) in cards.iter().enumerate() {
            if index.insert(card.id.clone(), pos).is_some() {
                return Err(ArrangementError::DuplicateCard(card.id.clone()));
            }
            if card.slot_index >= slot_count {
                return Err(ArrangementError::SlotOutOfRange {
                    card_id: card.id.clone(),
                    slot_index: card.slot_index,
                    slot_count,
                });
            }
            if let Some(other) = slots[card.slot_index] {
                return Err(ArrangementError::SlotConflict {
                    slot_index: card.slot_index,
                    first: cards[other].id.clone(),
                    second: card.id.clone(),
                });
            }
            slots[card.slot_index] = Some(pos);
        }

        Ok((index, slots))
    }

    // === Observers ===

    /// Register an observer for arrangement events.
    pub fn subscribe(&mut self, observer: impl ArrangementObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // === Queries ===

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Can cards be dragged right now?
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.state != EngineState::Won
    }

    /// Direction the cards must be sorted in.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Rule used for descending wins.
    #[must_use]
    pub fn descending_rule(&self) -> DescendingRule {
        self.descending_rule
    }

    /// Number of slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// All cards, in deal order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.index.get(id).map(|&pos| &self.cards[pos])
    }

    /// Slot currently holding a card.
    #[must_use]
    pub fn slot_of(&self, id: &CardId) -> Option<usize> {
        self.card(id).map(|card| card.slot_index)
    }

    /// Card in a slot, if any.
    #[must_use]
    pub fn occupant(&self, slot_index: usize) -> Option<&Card> {
        self.slots
            .get(slot_index)
            .copied()
            .flatten()
            .map(|pos| &self.cards[pos])
    }

    /// Cards ordered by slot index.
    #[must_use]
    pub fn cards_in_slot_order(&self) -> Vec<&Card> {
        self.slots
            .iter()
            .filter_map(|entry| entry.map(|pos| &self.cards[pos]))
            .collect()
    }

    /// Card values ordered by slot index.
    #[must_use]
    pub fn values_in_slot_order(&self) -> OrderedValues {
        self.slots
            .iter()
            .filter_map(|entry| entry.map(|pos| self.cards[pos].value))
            .collect()
    }

    /// Does the current arrangement satisfy the sort order?
    ///
    /// Pure query; no state change, no events.
    #[must_use]
    pub fn is_winning(&self) -> bool {
        win::is_winning(&self.values_in_slot_order(), self.sort_order, self.descending_rule)
    }

    /// Check the occupancy invariant.
    pub fn check_invariants(&self) -> Result<(), ArrangementError> {
        Self::build_tables(&self.cards, self.slots.len())?;

        for (pos, card) in self.cards.iter().enumerate() {
            if self.slots[card.slot_index] != Some(pos) || self.index.get(&card.id) != Some(&pos) {
                return Err(ArrangementError::SlotTableMismatch(card.id.clone()));
            }
        }
        for (slot_index, entry) in self.slots.iter().enumerate() {
            if let Some(pos) = *entry {
                if self.cards[pos].slot_index != slot_index {
                    return Err(ArrangementError::SlotTableMismatch(self.cards[pos].id.clone()));
                }
            }
        }

        Ok(())
    }

    // === Transitions ===

    /// Drop `card_id` onto `target_slot`.
    ///
    /// Swaps with the target's occupant, moves into a vacant target, or
    /// snaps back when the target is the card's own slot. The win check runs
    /// after every applied drop, including a snap-back. Unknown cards or
    /// slots, and drops while won, are ignored.
    pub fn resolve_drop(&mut self, card_id: &CardId, target_slot: usize) -> DropResult {
        match self.state {
            EngineState::Resolving => return DropResult::ignored(IgnoreReason::Busy),
            EngineState::Won => return DropResult::ignored(IgnoreReason::Locked),
            EngineState::Steady => {}
        }
        let Some(&pos) = self.index.get(card_id) else {
            return DropResult::ignored(IgnoreReason::UnknownCard);
        };
        if target_slot >= self.slots.len() {
            return DropResult::ignored(IgnoreReason::UnknownSlot);
        }

        self.state = EngineState::Resolving;
        let mut events = EventBuffer::new();
        let current_slot = self.cards[pos].slot_index;

        let outcome = if current_slot == target_slot {
            DropOutcome::SnapBack
        } else if let Some(other) = self.slots[target_slot] {
            self.cards[pos].slot_index = target_slot;
            self.cards[other].slot_index = current_slot;
            self.slots[target_slot] = Some(pos);
            self.slots[current_slot] = Some(other);

            let occupant = self.cards[other].id.clone();
            debug!(card = %card_id, occupant = %occupant, "cards swapped");
            events.push(ArrangementEvent::CardSwapped {
                card1_id: card_id.clone(),
                card2_id: occupant.clone(),
            });
            DropOutcome::Swapped { occupant }
        } else {
            self.cards[pos].slot_index = target_slot;
            self.slots[target_slot] = Some(pos);
            self.slots[current_slot] = None;

            debug!(card = %card_id, from = current_slot, to = target_slot, "card moved");
            events.push(ArrangementEvent::CardMoved {
                card_id: card_id.clone(),
                from_slot: current_slot,
                to_slot: target_slot,
            });
            DropOutcome::Moved {
                from_slot: current_slot,
                to_slot: target_slot,
            }
        };

        debug_assert!(
            self.check_invariants().is_ok(),
            "occupancy invariant broken by drop of {card_id} onto {target_slot}"
        );

        self.state = EngineState::Steady;
        self.evaluate_win(&mut events);
        self.observers.dispatch(&events);

        DropResult { outcome, events }
    }

    /// Evaluate the win predicate and apply the resulting transition.
    ///
    /// Enters `Won` (firing `ContainerWon`) only on the first sorted check;
    /// repeated checks while still sorted emit nothing. A won arrangement
    /// that is no longer sorted returns to `Steady`. Returns the predicate.
    pub fn check_winning_condition(&mut self) -> bool {
        let mut events = EventBuffer::new();
        let winning = self.evaluate_win(&mut events);
        self.observers.dispatch(&events);
        winning
    }

    fn evaluate_win(&mut self, events: &mut EventBuffer) -> bool {
        let values = self.values_in_slot_order();
        let winning = win::is_winning(&values, self.sort_order, self.descending_rule);

        match self.state {
            EngineState::Won if !winning => {
                info!("arrangement no longer sorted, unlocking cards");
                self.state = EngineState::Steady;
                events.push(ArrangementEvent::WinRevoked);
            }
            EngineState::Steady | EngineState::Resolving if winning => {
                info!(values = ?values.as_slice(), order = %self.sort_order, "arrangement won");
                self.state = EngineState::Won;
                events.push(ArrangementEvent::ContainerWon {
                    values,
                    sort_order: self.sort_order,
                });
            }
            _ => {}
        }

        winning
    }

    /// Place cards programmatically: `order[i]` goes into slot `i`.
    ///
    /// `order` must list every card exactly once. This bypasses the drag
    /// lock, so it can unsort a won arrangement (revoking the win).
    pub fn rearrange(&mut self, order: &[CardId]) -> Result<(), ArrangementError> {
        if order.len() != self.cards.len() {
            return Err(ArrangementError::NotAPermutation);
        }

        let mut seen = vec![false; self.cards.len()];
        let mut positions = Vec::with_capacity(order.len());
        for id in order {
            let pos = *self.index.get(id).ok_or(ArrangementError::NotAPermutation)?;
            if std::mem::replace(&mut seen[pos], true) {
                return Err(ArrangementError::NotAPermutation);
            }
            positions.push(pos);
        }

        self.slots.iter_mut().for_each(|entry| *entry = None);
        for (slot_index, pos) in positions.into_iter().enumerate() {
            self.cards[pos].slot_index = slot_index;
            self.slots[slot_index] = Some(pos);
        }
        debug_assert!(self.check_invariants().is_ok());

        let mut events = EventBuffer::new();
        events.push(ArrangementEvent::Rearranged);
        self.evaluate_win(&mut events);
        self.observers.dispatch(&events);

        Ok(())
    }

    /// Replace the whole card set and return to `Steady`.
    ///
    /// Observers stay registered. On error the engine is left untouched.
    pub fn replace_cards(&mut self, cards: Vec<Card>, slot_count: usize) -> Result<(), ArrangementError> {
        let (index, slots) = Self::build_tables(&cards, slot_count)?;

        self.cards = cards;
        self.index = index;
        self.slots = slots;
        self.state = EngineState::Steady;

        let mut events = EventBuffer::new();
        events.push(ArrangementEvent::CardsReplaced {
            card_count: self.cards.len(),
        });
        self.observers.dispatch(&events);

        Ok(())
    }
}
