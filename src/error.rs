//! Top-level error type.

use thiserror::Error;

use crate::arrangement::ArrangementError;
use crate::combat::CatalogError;
use crate::core::ConfigError;
use crate::drag::DragError;
use crate::store::StoreError;

/// Any error a `GameSession` call can return.
///
/// Store errors only surface from operations whose whole point is storage;
/// gameplay calls log save failures and report them as `saved: false`.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Arrangement(#[from] ArrangementError),

    #[error(transparent)]
    Drag(#[from] DragError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, GameError>;
