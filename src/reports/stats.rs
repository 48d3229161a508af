//! Aggregate dashboard counters.

use chrono::NaiveDate;
use serde::Serialize;

use crate::goals::Goal;
use crate::profiles::UserProfile;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// XP of both partners combined
    pub total_xp: i64,
    /// Best live streak among the partners
    pub streak: i64,
    /// Goals at 100%
    pub goals_completed: i64,
    pub total_logs: i64,
}

pub fn compute_stats(
    profiles: &[UserProfile],
    goals: &[Goal],
    total_logs: i64,
    today: NaiveDate,
) -> DashboardStats {
    DashboardStats {
        total_xp: profiles.iter().map(|p| p.xp).sum(),
        streak: profiles.iter().map(|p| p.streak_as_of(today)).max().unwrap_or(0),
        goals_completed: goals.iter().filter(|g| g.is_complete()).count() as i64,
        total_logs,
    }
}
