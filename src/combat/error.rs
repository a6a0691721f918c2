//! Enemy catalog errors.

use thiserror::Error;

/// Why a catalog could not be built.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("enemy catalog has no entries")]
    Empty,

    #[error("invalid enemy catalog JSON: {0}")]
    Json(String),
}
