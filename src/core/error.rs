//! Configuration errors.

use thiserror::Error;

/// Errors raised while validating a `GameConfig` or a difficulty change.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("card count {card_count} outside {min}..={max}")]
    CardCountOutOfRange {
        card_count: usize,
        min: usize,
        max: usize,
    },

    #[error("number range {number_range} outside 0..={max}")]
    NumberRangeOutOfRange { number_range: i64, max: i64 },

    #[error("invalid difficulty limits: {0}")]
    InvalidLimits(String),

    #[error("snap threshold must be a positive finite number, got {0}")]
    InvalidSnapThreshold(f64),

    #[error("slot geometry must be finite with positive slot size")]
    InvalidGeometry,
}
