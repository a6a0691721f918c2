//! Arrangement events and observers.
//!
//! The engine reports every state change as an `ArrangementEvent`. The
//! presentation layer (or anything else) subscribes with an
//! `ArrangementObserver` instead of listening on a shared event bus.
//!
//! ## Observers
//!
//! Implement only the callbacks you care about; the rest default to no-ops.
//! Any `FnMut(&ArrangementEvent)` closure is also an observer:
//!
//! ```
//! use math_idle::arrangement::{ArrangementEngine, ArrangementEvent};
//! use math_idle::core::{Card, SortOrder};
//!
//! let mut engine = ArrangementEngine::new(Card::deal(&[2, 1]), SortOrder::Asc).unwrap();
//! engine.subscribe(|event: &ArrangementEvent| println!("{event:?}"));
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CardId, SortOrder};

/// Card values in slot order, as carried by a win.
pub type OrderedValues = SmallVec<[i64; 8]>;

/// Something that happened to the arrangement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrangementEvent {
    /// Two cards exchanged slots.
    CardSwapped { card1_id: CardId, card2_id: CardId },

    /// A card moved into a vacant slot.
    CardMoved {
        card_id: CardId,
        from_slot: usize,
        to_slot: usize,
    },

    /// The arrangement became sorted. Cards are locked until regeneration.
    ContainerWon {
        values: OrderedValues,
        sort_order: SortOrder,
    },

    /// A won arrangement stopped being sorted; cards are unlocked again.
    WinRevoked,

    /// Cards were placed programmatically, bypassing drag and drop.
    Rearranged,

    /// The whole card set was replaced.
    CardsReplaced { card_count: usize },
}

impl ArrangementEvent {
    /// Is this a win event?
    #[must_use]
    pub fn is_win(&self) -> bool {
        matches!(self, ArrangementEvent::ContainerWon { .. })
    }
}

/// Receives arrangement events.
pub trait ArrangementObserver: Send {
    /// Two cards swapped slots.
    fn on_swap(&mut self, _card1: &CardId, _card2: &CardId) {}

    /// A card moved into an empty slot.
    fn on_move(&mut self, _card: &CardId, _from_slot: usize, _to_slot: usize) {}

    /// The arrangement won.
    fn on_win(&mut self, _values: &[i64], _sort_order: SortOrder) {}

    /// A win was revoked.
    fn on_win_revoked(&mut self) {}

    /// Cards were rearranged or replaced wholesale; re-render everything.
    fn on_reset(&mut self) {}

    /// Entry point used by the engine. Routes to the typed callbacks.
    fn on_event(&mut self, event: &ArrangementEvent) {
        match event {
            ArrangementEvent::CardSwapped { card1_id, card2_id } => self.on_swap(card1_id, card2_id),
            ArrangementEvent::CardMoved {
                card_id,
                from_slot,
                to_slot,
            } => self.on_move(card_id, *from_slot, *to_slot),
            ArrangementEvent::ContainerWon { values, sort_order } => self.on_win(values, *sort_order),
            ArrangementEvent::WinRevoked => self.on_win_revoked(),
            ArrangementEvent::Rearranged | ArrangementEvent::CardsReplaced { .. } => self.on_reset(),
        }
    }
}

impl<F> ArrangementObserver for F
where
    F: FnMut(&ArrangementEvent) + Send,
{
    fn on_event(&mut self, event: &ArrangementEvent) {
        self(event);
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// Ordered list of observers.
#[derive(Default)]
pub(crate) struct ObserverList {
    observers: Vec<(SubscriptionId, Box<dyn ArrangementObserver>)>,
    next_id: u32,
}

impl ObserverList {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn ArrangementObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn dispatch(&mut self, events: &[ArrangementEvent]) {
        for event in events {
            for (_, observer) in &mut self.observers {
                observer.on_event(event);
            }
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("count", &self.observers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
