//! Trailing 30-day rollup.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::goals::GoalCategory;
use crate::tracking::CategorizedLog;

pub const ROLLUP_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Positive deltas on savings goals
    pub savings_added: i64,
    /// Positive deltas across every category
    pub total_added: i64,
    pub by_category: BTreeMap<GoalCategory, i64>,
    /// Logs in the window, including negative corrections
    pub log_count: usize,
    /// Distinct UTC days with at least one log
    pub active_days: usize,
}

/// Summarise the logs of the trailing 30 days.
pub fn thirty_day_rollup(logs: &[CategorizedLog], now: DateTime<Utc>) -> Rollup {
    let window_start = now - Duration::days(ROLLUP_DAYS);
    let mut by_category: BTreeMap<GoalCategory, i64> =
        GoalCategory::ALL.into_iter().map(|c| (c, 0)).collect();
    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut log_count = 0;

    for entry in logs
        .iter()
        .filter(|l| l.log.created_at >= window_start && l.log.created_at <= now)
    {
        log_count += 1;
        days.insert(entry.log.created_at.date_naive());
        if entry.log.value > 0 {
            *by_category.entry(entry.category).or_default() += entry.log.value;
        }
    }

    Rollup {
        window_start,
        window_end: now,
        savings_added: by_category
            .get(&GoalCategory::Savings)
            .copied()
            .unwrap_or(0),
        total_added: by_category.values().sum(),
        by_category,
        log_count,
        active_days: days.len(),
    }
}
