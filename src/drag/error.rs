//! Drag gesture errors.

use thiserror::Error;

use crate::core::CardId;

/// Why a drag call was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("no card with id {0}")]
    UnknownCard(CardId),

    #[error("card {0} is already being dragged")]
    AlreadyDragging(CardId),

    #[error("card {0} is not being dragged")]
    NotDragging(CardId),

    #[error("cards are locked until the next deal")]
    Locked,
}
