//! Drag controller: pointer gestures to drop requests.
//!
//! One gesture per card, each `Idle -> Dragging -> Idle`. While dragging,
//! the card follows the pointer at the offset it was grabbed with, and each
//! update reports a snap preview when the card's center is within the snap
//! threshold of a slot center. Releasing always resolves a drop onto the
//! nearest slot; there is no cancel path that leaves a card floating.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::DragError;
use crate::arrangement::{ArrangementEngine, DropResult};
use crate::core::CardId;
use crate::zones::{Point, SlotGrid};

/// Slot a dragged card would snap into if released now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapPreview {
    /// Slot under the card.
    pub slot_index: usize,

    /// Card that would be swapped out, if the slot is held by another card.
    pub swap_target: Option<CardId>,
}

/// An in-progress drag.
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    /// Card being dragged.
    pub card_id: CardId,

    /// Slot the card was in when the drag began.
    pub origin_slot: usize,

    /// Pointer position minus card center at grab time.
    pub offset: Point,

    /// Last reported pointer position.
    pub last_pointer: Point,

    /// Current card center.
    pub position: Point,

    /// Current snap preview.
    pub preview: Option<SnapPreview>,
}

/// Result of moving the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct DragUpdate {
    /// New card center.
    pub position: Point,

    /// Snap preview, `None` when no slot is within the threshold.
    pub preview: Option<SnapPreview>,

    /// Did the preview change since the previous update?
    pub preview_changed: bool,
}

/// Tracks pointer-driven drags over a slot grid.
#[derive(Clone, Debug)]
pub struct DragController {
    grid: SlotGrid,
    snap_threshold: f64,
    gestures: FxHashMap<CardId, DragGesture>,
}

impl DragController {
    /// Create a controller over `grid`.
    #[must_use]
    pub fn new(grid: SlotGrid, snap_threshold: f64) -> Self {
        Self {
            grid,
            snap_threshold,
            gestures: FxHashMap::default(),
        }
    }

    /// Slot grid used for nearest-slot queries.
    #[must_use]
    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Snap threshold.
    #[must_use]
    pub fn snap_threshold(&self) -> f64 {
        self.snap_threshold
    }

    /// Swap in a new grid (difficulty change). Active gestures are dropped.
    pub fn set_grid(&mut self, grid: SlotGrid) {
        self.reset();
        self.grid = grid;
    }

    /// Is this card being dragged?
    #[must_use]
    pub fn is_dragging(&self, card_id: &CardId) -> bool {
        self.gestures.contains_key(card_id)
    }

    /// Number of active gestures.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.gestures.len()
    }

    /// Look up an active gesture.
    #[must_use]
    pub fn gesture(&self, card_id: &CardId) -> Option<&DragGesture> {
        self.gestures.get(card_id)
    }

    /// Where a card is drawn when it is not being dragged.
    #[must_use]
    pub fn rest_position(&self, engine: &ArrangementEngine, card_id: &CardId) -> Option<Point> {
        let slot = engine.slot_of(card_id)?;
        self.grid.slot(slot).map(|s| s.position)
    }

    /// Start dragging `card_id`, grabbed at `pointer`.
    pub fn begin_drag(
        &mut self,
        engine: &ArrangementEngine,
        card_id: &CardId,
        pointer: Point,
    ) -> Result<&DragGesture, DragError> {
        if !engine.is_interactive() {
            return Err(DragError::Locked);
        }
        if self.gestures.contains_key(card_id) {
            return Err(DragError::AlreadyDragging(card_id.clone()));
        }
        let origin_slot = engine
            .slot_of(card_id)
            .ok_or_else(|| DragError::UnknownCard(card_id.clone()))?;
        let rest = self
            .grid
            .slot(origin_slot)
            .map(|s| s.position)
            .ok_or_else(|| DragError::UnknownCard(card_id.clone()))?;

        debug!(card = %card_id, slot = origin_slot, "drag started");

        let gesture = DragGesture {
            card_id: card_id.clone(),
            origin_slot,
            offset: pointer - rest,
            last_pointer: pointer,
            position: rest,
            preview: None,
        };
        Ok(self.gestures.entry(card_id.clone()).or_insert(gesture))
    }

    /// Follow the pointer and recompute the snap preview.
    pub fn update_drag(
        &mut self,
        engine: &ArrangementEngine,
        card_id: &CardId,
        pointer: Point,
    ) -> Result<DragUpdate, DragError> {
        let gesture = self
            .gestures
            .get_mut(card_id)
            .ok_or_else(|| DragError::NotDragging(card_id.clone()))?;

        gesture.last_pointer = pointer;
        gesture.position = pointer - gesture.offset;

        let nearest = self.grid.nearest_slot(gesture.position);
        let within = self
            .grid
            .distance_to_slot(nearest, gesture.position)
            .is_some_and(|d| d < self.snap_threshold);

        let preview = within.then(|| SnapPreview {
            slot_index: nearest,
            swap_target: engine
                .occupant(nearest)
                .filter(|occupant| occupant.id != *card_id)
                .map(|occupant| occupant.id.clone()),
        });

        let preview_changed = preview != gesture.preview;
        if preview_changed {
            trace!(card = %card_id, preview = ?preview, "snap preview changed");
        }
        gesture.preview = preview.clone();

        Ok(DragUpdate {
            position: gesture.position,
            preview,
            preview_changed,
        })
    }

    /// Release the card at `pointer` and resolve the drop.
    ///
    /// The gesture ends whatever the engine decides; an ignored drop still
    /// returns the card to idle.
    pub fn end_drag(
        &mut self,
        engine: &mut ArrangementEngine,
        card_id: &CardId,
        pointer: Point,
    ) -> Result<DropResult, DragError> {
        let gesture = self
            .gestures
            .remove(card_id)
            .ok_or_else(|| DragError::NotDragging(card_id.clone()))?;

        let center = pointer - gesture.offset;
        let target = self.grid.nearest_slot(center);
        debug!(card = %card_id, from = gesture.origin_slot, to = target, "drag released");

        Ok(engine.resolve_drop(card_id, target))
    }

    /// The gesture was interrupted; release at the last known pointer.
    pub fn cancel_drag(
        &mut self,
        engine: &mut ArrangementEngine,
        card_id: &CardId,
    ) -> Result<DropResult, DragError> {
        let pointer = self
            .gestures
            .get(card_id)
            .map(|g| g.last_pointer)
            .ok_or_else(|| DragError::NotDragging(card_id.clone()))?;
        self.end_drag(engine, card_id, pointer)
    }

    /// Interrupt every active gesture, releasing each at its last pointer.
    ///
    /// Gestures are released in card-ID order so the result is deterministic.
    pub fn cancel_all(&mut self, engine: &mut ArrangementEngine) -> Vec<(CardId, DropResult)> {
        let mut ids: Vec<CardId> = self.gestures.keys().cloned().collect();
        ids.sort();

        ids.into_iter()
            .filter_map(|id| {
                self.cancel_drag(engine, &id)
                    .ok()
                    .map(|result| (id, result))
            })
            .collect()
    }

    /// Forget every gesture without resolving. Used when the cards they
    /// refer to have been replaced.
    pub fn reset(&mut self) {
        if !self.gestures.is_empty() {
            debug!(count = self.gestures.len(), "discarding drags for replaced cards");
        }
        self.gestures.clear();
    }
}
