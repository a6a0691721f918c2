//! Slot grid: fixed slot geometry and nearest-slot lookup.
//!
//! The grid is computed data. Slot centers come from `Geometry`, never from
//! whatever a renderer last drew, so a drop resolves the same way no matter
//! how the presentation layer styles things.

use serde::{Deserialize, Serialize};

use crate::core::config::Geometry;

/// A point in presentation units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A positional container for at most one card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Position in the row, `0..len`.
    pub index: usize,

    /// Center of the slot.
    pub position: Point,
}

/// Ordered, fixed set of slots.
///
/// ```
/// use math_idle::core::Geometry;
/// use math_idle::zones::{Point, SlotGrid};
///
/// let grid = SlotGrid::new(3, &Geometry::default());
///
/// // Slots are 80 units apart; 100 is closest to slot 1 (center x = 112).
/// assert_eq!(grid.nearest_slot(Point::new(100.0, 55.0)), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SlotGrid {
    slots: Vec<Slot>,
}

impl SlotGrid {
    /// Lay out `count` slots in a row.
    ///
    /// Panics if `count` is zero; configs are validated before a grid is built.
    #[must_use]
    pub fn new(count: usize, geometry: &Geometry) -> Self {
        assert!(count > 0, "Slot grid needs at least one slot");

        let slots = (0..count)
            .map(|index| Slot {
                index,
                position: Point::new(
                    geometry.origin_x + index as f64 * geometry.pitch() + geometry.slot_width / 2.0,
                    geometry.origin_y + geometry.slot_height / 2.0,
                ),
            })
            .collect();

        Self { slots }
    }

    /// Build a grid from explicit slot centers, indexed in order.
    ///
    /// Panics if `centers` is empty.
    #[must_use]
    pub fn from_centers(centers: impl IntoIterator<Item = Point>) -> Self {
        let slots: Vec<Slot> = centers
            .into_iter()
            .enumerate()
            .map(|(index, position)| Slot { index, position })
            .collect();
        assert!(!slots.is_empty(), "Slot grid needs at least one slot");
        Self { slots }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; a grid is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get a slot by index.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Iterate over slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter()
    }

    /// Index of the slot whose center is closest to `point`.
    ///
    /// Ties go to the lowest index.
    #[must_use]
    pub fn nearest_slot(&self, point: Point) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;

        for slot in &self.slots {
            let distance = slot.position.distance(point);
            // Strict comparison keeps the first (lowest) index on ties.
            if distance < best_distance {
                best = slot.index;
                best_distance = distance;
            }
        }

        best
    }

    /// Distance from `point` to the center of slot `index`.
    #[must_use]
    pub fn distance_to_slot(&self, index: usize, point: Point) -> Option<f64> {
        self.slot(index).map(|slot| slot.position.distance(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> SlotGrid {
        SlotGrid::new(count, &Geometry::default())
    }

    #[test]
    fn test_layout() {
        let grid = grid(3);
        assert_eq!(grid.len(), 3);
        assert!(!grid.is_empty());

        let centers: Vec<_> = grid.slots().map(|s| s.position).collect();
        assert_eq!(centers[0], Point::new(32.0, 55.0));
        assert_eq!(centers[1], Point::new(112.0, 55.0));
        assert_eq!(centers[2], Point::new(192.0, 55.0));
    }

    #[test]
    fn test_nearest_slot() {
        let grid = grid(5);
        assert_eq!(grid.nearest_slot(Point::new(-500.0, 0.0)), 0);
        assert_eq!(grid.nearest_slot(Point::new(190.0, 300.0)), 2);
        assert_eq!(grid.nearest_slot(Point::new(10_000.0, 55.0)), 4);
    }

    #[test]
    fn test_nearest_slot_tie_prefers_lowest_index() {
        let grid = grid(3);
        // Exactly halfway between slot 0 (32) and slot 1 (112).
        assert_eq!(grid.nearest_slot(Point::new(72.0, 55.0)), 0);

        let stacked = SlotGrid::from_centers([Point::new(0.0, 0.0), Point::new(0.0, 0.0)]);
        assert_eq!(stacked.nearest_slot(Point::new(1.0, 1.0)), 0);
    }

    #[test]
    fn test_single_slot() {
        let grid = grid(1);
        assert_eq!(grid.nearest_slot(Point::new(1e9, -1e9)), 0);
    }

    #[test]
    fn test_distance_to_slot() {
        let grid = grid(2);
        assert_eq!(grid.distance_to_slot(0, Point::new(32.0, 58.0)), Some(3.0));
        assert_eq!(grid.distance_to_slot(7, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_point_ops() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.distance(Point::default()), 5.0);
        assert_eq!(a - Point::new(1.0, 1.0), Point::new(2.0, 3.0));
        assert_eq!(a + Point::new(1.0, 1.0), Point::new(4.0, 5.0));
    }

    #[test]
    #[should_panic(expected = "Slot grid needs at least one slot")]
    fn test_empty_grid_panics() {
        let _ = SlotGrid::new(0, &Geometry::default());
    }
}
