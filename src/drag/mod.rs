//! Pointer-driven drag and drop.
//!
//! The presentation layer forwards raw pointer coordinates here; the
//! controller turns them into card positions, snap previews and, on
//! release, a drop request for the arrangement engine.

mod controller;
mod error;

pub use controller::{DragController, DragGesture, DragUpdate, SnapPreview};
pub use error::DragError;
