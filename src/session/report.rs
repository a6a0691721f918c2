//! Results returned by session operations.

use crate::arrangement::DropResult;
use crate::combat::WinOutcome;

/// What releasing a card did, end to end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropReport {
    /// The arrangement engine's view of the drop.
    pub drop: DropResult,

    /// Combat outcome, if the drop won the arrangement. By the time the
    /// report is returned the card set has already been regenerated.
    pub win: Option<WinOutcome>,

    /// Did every save triggered by this drop succeed?
    pub saved: bool,
}

impl DropReport {
    /// Did this drop win the arrangement?
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.win.is_some()
    }
}
