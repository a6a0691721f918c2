//! Game configuration types.
//!
//! Sessions are configured at construction by providing:
//! - `GameConfig`: difficulty, win direction, drag tuning, timing
//! - `DifficultyLimits`: the bounds a difficulty change may use
//! - `Geometry`: how slots are laid out for nearest-slot queries
//!
//! Everything is validated once by `GameConfig::validate`, so the engine
//! never parses or second-guesses numeric settings at runtime.

use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Number-range steps offered by the difficulty picker, smallest first.
pub const NUMBER_RANGE_STEPS: [i64; 8] = [10, 50, 100, 500, 1000, 1500, 5000, 10000];

/// Next larger number-range step, or `None` at the top of the ladder.
///
/// Values between steps move to the next step above them.
#[must_use]
pub fn next_number_range(current: i64) -> Option<i64> {
    NUMBER_RANGE_STEPS.iter().copied().find(|&step| step > current)
}

/// Next smaller number-range step, or `None` at the bottom of the ladder.
#[must_use]
pub fn previous_number_range(current: i64) -> Option<i64> {
    NUMBER_RANGE_STEPS.iter().rev().copied().find(|&step| step < current)
}

/// Direction the cards must be sorted in to win.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Smallest value in slot 0.
    #[default]
    Asc,
    /// Largest value in slot 0.
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("ASC"),
            SortOrder::Desc => f.write_str("DESC"),
        }
    }
}

/// How a descending win is judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescendingRule {
    /// Every value is `<=` the one before it.
    #[default]
    NonIncreasing,
    /// Any arrangement that is not ascending counts. Matches saves and
    /// clients from before the descending check was tightened.
    NotAscending,
}

/// Bounds a difficulty change must respect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyLimits {
    /// Allowed card counts. The lower bound is never below 1.
    pub card_count: RangeInclusive<usize>,

    /// Largest allowed number range. Values are drawn from `[0, number_range]`.
    pub max_number_range: i64,
}

impl Default for DifficultyLimits {
    fn default() -> Self {
        Self {
            card_count: 2..=10,
            max_number_range: NUMBER_RANGE_STEPS[NUMBER_RANGE_STEPS.len() - 1],
        }
    }
}

impl DifficultyLimits {
    /// Check a card count / number range pair against these limits.
    pub fn check(&self, card_count: usize, number_range: i64) -> Result<(), ConfigError> {
        if card_count == 0 || !self.card_count.contains(&card_count) {
            return Err(ConfigError::CardCountOutOfRange {
                card_count,
                min: *self.card_count.start(),
                max: *self.card_count.end(),
            });
        }
        if number_range < 0 || number_range > self.max_number_range {
            return Err(ConfigError::NumberRangeOutOfRange {
                number_range,
                max: self.max_number_range,
            });
        }
        Ok(())
    }
}

/// Slot layout, in presentation units.
///
/// Slots sit in a single row starting at `origin`, `slot_width + gap` apart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub slot_width: f64,
    pub slot_height: f64,
    pub gap: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            slot_width: 64.0,
            slot_height: 110.0,
            gap: 16.0,
        }
    }
}

impl Geometry {
    /// Distance between neighbouring slot centers.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.slot_width + self.gap
    }
}

/// Complete session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of cards (and slots) per arrangement.
    pub card_count: usize,

    /// Card values are drawn uniformly from `[0, number_range]`.
    pub number_range: i64,

    /// Direction the cards must be sorted in.
    pub sort_order: SortOrder,

    /// How `SortOrder::Desc` is judged.
    pub descending_rule: DescendingRule,

    /// Bounds for difficulty changes.
    pub limits: DifficultyLimits,

    /// Slot layout used for nearest-slot queries.
    pub geometry: Geometry,

    /// A dragged card previews a snap when its center is closer than this
    /// to the nearest slot center.
    pub snap_threshold: f64,

    /// Pause between a win and card regeneration.
    pub settle_delay: Duration,

    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            card_count: 5,
            number_range: 10,
            sort_order: SortOrder::Asc,
            descending_rule: DescendingRule::NonIncreasing,
            limits: DifficultyLimits::default(),
            geometry: Geometry::default(),
            snap_threshold: 50.0,
            settle_delay: Duration::from_millis(400),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the card count.
    #[must_use]
    pub fn with_card_count(mut self, card_count: usize) -> Self {
        self.card_count = card_count;
        self
    }

    /// Set the number range.
    #[must_use]
    pub fn with_number_range(mut self, number_range: i64) -> Self {
        self.number_range = number_range;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Set the descending rule.
    #[must_use]
    pub fn with_descending_rule(mut self, rule: DescendingRule) -> Self {
        self.descending_rule = rule;
        self
    }

    /// Set the difficulty limits.
    #[must_use]
    pub fn with_limits(mut self, limits: DifficultyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the slot geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the snap threshold.
    #[must_use]
    pub fn with_snap_threshold(mut self, threshold: f64) -> Self {
        self.snap_threshold = threshold;
        self
    }

    /// Set the settle delay before regeneration.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Use a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if *self.limits.card_count.start() == 0
            || self.limits.card_count.start() > self.limits.card_count.end()
        {
            return Err(ConfigError::InvalidLimits(format!(
                "card count bounds {:?}",
                self.limits.card_count
            )));
        }
        if self.limits.max_number_range < 0 {
            return Err(ConfigError::InvalidLimits(format!(
                "max number range {}",
                self.limits.max_number_range
            )));
        }

        self.limits.check(self.card_count, self.number_range)?;

        if !(self.snap_threshold.is_finite() && self.snap_threshold > 0.0) {
            return Err(ConfigError::InvalidSnapThreshold(self.snap_threshold));
        }

        let g = &self.geometry;
        let finite = [g.origin_x, g.origin_y, g.slot_width, g.slot_height, g.gap]
            .iter()
            .all(|v| v.is_finite());
        if !finite || g.slot_width <= 0.0 || g.slot_height <= 0.0 || g.gap < 0.0 {
            return Err(ConfigError::InvalidGeometry);
        }

        Ok(())
    }
}
