//! Win predicate.

use crate::core::{DescendingRule, SortOrder};

/// Is every value `>=` the one before it?
#[must_use]
pub fn is_ascending(values: &[i64]) -> bool {
    values.windows(2).all(|pair| pair[1] >= pair[0])
}

/// Is every value `<=` the one before it?
#[must_use]
pub fn is_descending(values: &[i64]) -> bool {
    values.windows(2).all(|pair| pair[1] <= pair[0])
}

/// Do `values` (in slot order) satisfy `sort_order`?
///
/// Equal neighbours never break an ordering, so `[1, 1, 2]` is ascending
/// and `[2, 2]` wins in both directions under `NonIncreasing`.
#[must_use]
pub fn is_winning(values: &[i64], sort_order: SortOrder, rule: DescendingRule) -> bool {
    match (sort_order, rule) {
        (SortOrder::Asc, _) => is_ascending(values),
        (SortOrder::Desc, DescendingRule::NonIncreasing) => is_descending(values),
        (SortOrder::Desc, DescendingRule::NotAscending) => !is_ascending(values),
    }
}
