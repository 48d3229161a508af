//! Period reset engine.
//!
//! Goals with a weekly or monthly cadence are rolled over lazily, whenever
//! they are read or logged against. Each fully elapsed period is closed with
//! a [`PeriodSnapshot`]; the next period starts exactly where the previous
//! one ended.

use chrono::{DateTime, Duration, Months, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

use super::types::{Goal, ResetPeriod};
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::{column_parsed, column_timestamp, column_uuid, to_timestamp};

/// A closed period of a resetting goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSnapshot {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub period_type: ResetPeriod,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub final_value: i64,
    pub target_value: Option<i64>,
}

/// A snapshot annotated with its change against the previous period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub snapshot: PeriodSnapshot,
    /// `final_value` minus the preceding snapshot's; `None` for the oldest
    pub trend: Option<i64>,
}

/// End of the period starting at `start`, or `None` for non-resetting goals
/// and unrepresentable dates.
pub fn period_end(period: ResetPeriod, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match period {
        ResetPeriod::None => None,
        ResetPeriod::Weekly => start.checked_add_signed(Duration::days(7)),
        ResetPeriod::Monthly => start.checked_add_months(Months::new(1)),
    }
}

/// Close every fully elapsed period of `goal` as of `now`.
///
/// Mutates the goal in memory (value reset, period start advanced) and
/// returns the snapshots oldest-first. Persisting both is up to the caller.
/// Checklist and roadmap goals have their leaves unchecked on reset.
pub fn roll_over(goal: &mut Goal, now: DateTime<Utc>) -> DashboardResult<Vec<PeriodSnapshot>> {
    if goal.reset_period == ResetPeriod::None {
        return Ok(Vec::new());
    }

    let mut start = goal.period_start_date.ok_or_else(|| {
        DashboardError::Integrity(format!(
            "goal {} resets {} but has no period start date",
            goal.id,
            goal.reset_period.as_str()
        ))
    })?;

    let mut snapshots = Vec::new();
    loop {
        let end = period_end(goal.reset_period, start).ok_or_else(|| {
            DashboardError::Integrity(format!(
                "goal {} period starting {} has no representable end",
                goal.id, start
            ))
        })?;

        if end > now {
            break;
        }

        snapshots.push(PeriodSnapshot {
            id: Uuid::new_v4(),
            goal_id: goal.id,
            period_type: goal.reset_period,
            period_start: start,
            period_end: end,
            final_value: goal.current_value,
            target_value: goal.target_value,
        });

        goal.kind.reset_leaves();
        goal.current_value = 0;
        goal.sync_leaf_counts();
        start = end;
    }

    if !snapshots.is_empty() {
        goal.period_start_date = Some(start);
        goal.updated_at = now;
    }

    Ok(snapshots)
}

/// Annotate newest-first snapshots with their trend.
pub fn annotate_trend(snapshots: Vec<PeriodSnapshot>) -> Vec<HistoryEntry> {
    let previous: Vec<Option<i64>> = snapshots
        .iter()
        .skip(1)
        .map(|s| Some(s.final_value))
        .chain(std::iter::once(None))
        .collect();

    snapshots
        .into_iter()
        .zip(previous)
        .map(|(snapshot, prev)| HistoryEntry {
            trend: prev.map(|p| snapshot.final_value - p),
            snapshot,
        })
        .collect()
}

/// Storage for period snapshots.
pub struct PeriodStore<'a> {
    conn: &'a Connection,
}

impl<'a> PeriodStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append a snapshot.
    pub fn insert(&self, snapshot: &PeriodSnapshot) -> DashboardResult<()> {
        self.conn.execute(
            "INSERT INTO period_history
             (id, goal_id, period_type, period_start, period_end, final_value, target_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                snapshot.id.to_string(),
                snapshot.goal_id.to_string(),
                snapshot.period_type.as_str(),
                to_timestamp(&snapshot.period_start),
                to_timestamp(&snapshot.period_end),
                snapshot.final_value,
                snapshot.target_value,
            ],
        )?;
        Ok(())
    }

    /// Snapshots of a goal, newest first.
    pub fn list_for_goal(&self, goal_id: Uuid) -> DashboardResult<Vec<PeriodSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, goal_id, period_type, period_start, period_end, final_value, target_value
             FROM period_history
             WHERE goal_id = ?1
             ORDER BY period_end DESC",
        )?;

        let rows = stmt.query_map(params![goal_id.to_string()], |row| {
            Ok(PeriodSnapshot {
                id: column_uuid(row, 0)?,
                goal_id: column_uuid(row, 1)?,
                period_type: column_parsed(row, 2)?,
                period_start: column_timestamp(row, 3)?,
                period_end: column_timestamp(row, 4)?,
                final_value: row.get(5)?,
                target_value: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }

    /// History of a goal with trends, newest first.
    pub fn history(&self, goal_id: Uuid) -> DashboardResult<Vec<HistoryEntry>> {
        Ok(annotate_trend(self.list_for_goal(goal_id)?))
    }
}
