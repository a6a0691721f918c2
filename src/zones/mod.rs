//! Slot geometry.
//!
//! A fixed row of slots, each holding at most one card. The grid knows
//! nothing about which card sits where; the arrangement engine owns that.

mod grid;

pub use grid::{Point, Slot, SlotGrid};
