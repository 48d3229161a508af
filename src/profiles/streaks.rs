//! Daily activity streaks.

use chrono::NaiveDate;
use serde::Serialize;

/// Consecutive active days of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: i64,
    pub longest: i64,
    pub last_active: Option<NaiveDate>,
}

impl Streak {
    /// Record activity on `today`.
    ///
    /// Same day leaves the streak unchanged, the following day extends it,
    /// and any gap restarts it at one. A date before the last active day
    /// (clock skew) is ignored.
    pub fn advance(self, today: NaiveDate) -> Streak {
        let current = match self.last_active {
            Some(last) if last >= today => return self,
            Some(last) if last.succ_opt() == Some(today) => self.current + 1,
            _ => 1,
        };

        Streak {
            current,
            longest: self.longest.max(current),
            last_active: Some(today),
        }
    }

    /// The streak as seen on `today`.
    ///
    /// The stored count only moves when the partner is active, so a streak
    /// whose last active day is before yesterday has lapsed and reads as 0.
    pub fn current_as_of(&self, today: NaiveDate) -> i64 {
        match self.last_active {
            Some(last) if last >= today || last.succ_opt() == Some(today) => self.current,
            _ => 0,
        }
    }
}
