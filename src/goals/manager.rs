//! Goal management.
//!
//! CRUD over the `goals` table. Reads apply the lazy period rollover and
//! persist its result; leaf mutations rewrite the derived counters in the
//! same statement that stores the new metadata.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::period::{self, PeriodStore};
use super::progress::{self, LeafChange, LeafOp};
use super::types::{Goal, GoalCategory, GoalKind, GoalMetadata, GoalType, ResetPeriod};
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::{
    column_opt_timestamp, column_parsed, column_timestamp, column_uuid, to_timestamp,
};

const GOAL_COLUMNS: &str = "id, title, description, category, goal_type, current_value, target_value,
     unit, metadata_json, reset_period, period_start_date, target_date, auto_calculated,
     created_at, updated_at";

/// Partial update of a goal. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<GoalCategory>,
    pub current_value: Option<i64>,
    pub target_value: Option<Option<i64>>,
    pub unit: Option<Option<String>>,
    pub metadata: Option<GoalMetadata>,
    pub reset_period: Option<ResetPeriod>,
    pub period_start_date: Option<Option<DateTime<Utc>>>,
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub auto_calculated: Option<bool>,
}

/// Manager for goals.
pub struct GoalManager<'a> {
    conn: &'a Connection,
}

impl<'a> GoalManager<'a> {
    /// Create a new goal manager with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new goal.
    pub fn create(&self, goal: &Goal) -> DashboardResult<()> {
        validate_reset(goal)?;

        self.conn.execute(
            &format!(
                "INSERT INTO goals ({GOAL_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                goal.id.to_string(),
                goal.title,
                goal.description,
                goal.category.as_str(),
                goal.goal_type().as_str(),
                goal.current_value,
                goal.target_value,
                goal.unit,
                metadata_json(&goal.kind)?,
                goal.reset_period.as_str(),
                goal.period_start_date.as_ref().map(to_timestamp),
                goal.target_date.as_ref().map(to_timestamp),
                goal.auto_calculated,
                to_timestamp(&goal.created_at),
                to_timestamp(&goal.updated_at),
            ],
        )?;

        tracing::debug!(goal_id = %goal.id, "Created goal '{}'", goal.title);
        Ok(())
    }

    /// Get a goal by ID exactly as stored, without period rollover.
    pub fn get(&self, id: Uuid) -> DashboardResult<Option<Goal>> {
        self.conn
            .query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
                params![id.to_string()],
                parse_goal_row,
            )
            .optional()?
            .map(GoalRow::into_goal)
            .transpose()
    }

    /// Get a goal with its period rolled over to `now`.
    pub fn find(&self, id: Uuid, now: DateTime<Utc>) -> DashboardResult<Goal> {
        let mut goal = self
            .get(id)?
            .ok_or_else(|| DashboardError::not_found("Goal", id))?;
        self.settle_period(&mut goal, now)?;
        Ok(goal)
    }

    /// All goals in creation order, with periods rolled over to `now`.
    pub fn list(&self, now: DateTime<Utc>) -> DashboardResult<Vec<Goal>> {
        let mut goals = self.list_stored()?;
        for goal in goals.iter_mut() {
            self.settle_period(goal, now)?;
        }
        Ok(goals)
    }

    /// All goals exactly as stored.
    pub fn list_stored(&self) -> DashboardResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals ORDER BY created_at ASC, rowid ASC"
        ))?;

        let rows = stmt.query_map([], parse_goal_row)?;

        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(GoalRow::into_goal)
            .collect()
    }

    /// Persist every mutable field of a goal.
    pub fn update(&self, goal: &Goal) -> DashboardResult<()> {
        let updated = self.conn.execute(
            "UPDATE goals SET
             title = ?1, description = ?2, category = ?3, goal_type = ?4,
             current_value = ?5, target_value = ?6, unit = ?7, metadata_json = ?8,
             reset_period = ?9, period_start_date = ?10, target_date = ?11,
             auto_calculated = ?12, updated_at = ?13
             WHERE id = ?14",
            params![
                goal.title,
                goal.description,
                goal.category.as_str(),
                goal.goal_type().as_str(),
                goal.current_value,
                goal.target_value,
                goal.unit,
                metadata_json(&goal.kind)?,
                goal.reset_period.as_str(),
                goal.period_start_date.as_ref().map(to_timestamp),
                goal.target_date.as_ref().map(to_timestamp),
                goal.auto_calculated,
                to_timestamp(&goal.updated_at),
                goal.id.to_string(),
            ],
        )?;

        if updated == 0 {
            return Err(DashboardError::not_found("Goal", goal.id));
        }
        Ok(())
    }

    /// Apply a partial update.
    ///
    /// Counters of checklist and roadmap goals are derived and cannot be
    /// patched directly; replacing their metadata recomputes them.
    pub fn apply_patch(&self, id: Uuid, patch: GoalPatch, now: DateTime<Utc>) -> DashboardResult<Goal> {
        let mut goal = self.find(id, now)?;

        if goal.kind.is_leaf_based() {
            if patch.current_value.is_some() {
                return Err(DashboardError::validation(
                    "currentValue",
                    "is derived from the goal's items for room and roadmap goals",
                ));
            }
            if patch.target_value.is_some() {
                return Err(DashboardError::validation(
                    "targetValue",
                    "is derived from the goal's items for room and roadmap goals",
                ));
            }
        }

        if let Some(title) = patch.title {
            goal.title = title;
        }
        if let Some(description) = patch.description {
            goal.description = description;
        }
        if let Some(category) = patch.category {
            goal.category = category;
        }
        if let Some(current_value) = patch.current_value {
            goal.current_value = current_value;
        }
        if let Some(target_value) = patch.target_value {
            goal.target_value = target_value;
        }
        if let Some(unit) = patch.unit {
            goal.unit = unit;
        }
        if let Some(metadata) = patch.metadata {
            goal.kind = GoalKind::from_parts(goal.goal_type(), Some(metadata))?;
        }
        if let Some(reset_period) = patch.reset_period {
            goal.reset_period = reset_period;
        }
        if let Some(period_start_date) = patch.period_start_date {
            goal.period_start_date = period_start_date;
        }
        if let Some(target_date) = patch.target_date {
            goal.target_date = target_date;
        }
        if let Some(auto_calculated) = patch.auto_calculated {
            goal.auto_calculated = auto_calculated;
        }

        validate_reset(&goal)?;
        goal.sync_leaf_counts();
        goal.updated_at = now;
        self.update(&goal)?;

        Ok(goal)
    }

    /// Atomically add a signed delta to a goal's running value.
    ///
    /// Returns the value after the increment.
    pub fn add_value(&self, id: Uuid, delta: i64, now: DateTime<Utc>) -> DashboardResult<i64> {
        self.conn
            .query_row(
                "UPDATE goals SET current_value = current_value + ?1, updated_at = ?2
                 WHERE id = ?3
                 RETURNING current_value",
                params![delta, to_timestamp(&now), id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DashboardError::not_found("Goal", id))
    }

    /// Apply a leaf mutation and store the resynced goal.
    ///
    /// A failing mutation leaves the stored goal untouched.
    pub fn apply_leaf_op(
        &self,
        id: Uuid,
        op: LeafOp,
        now: DateTime<Utc>,
    ) -> DashboardResult<(Goal, LeafChange)> {
        let mut goal = self.find(id, now)?;

        let change = progress::apply_leaf_op(&mut goal.kind, op)?;
        goal.sync_leaf_counts();
        goal.updated_at = now;
        self.update(&goal)?;

        Ok((goal, change))
    }

    /// Delete a goal.
    ///
    /// Logs, notes, photos and period history cascade; activity entries stay.
    pub fn delete(&self, id: Uuid) -> DashboardResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    /// Number of goals at 100% of a positive target.
    pub fn count_completed(&self) -> DashboardResult<i64> {
        let goals = self.list_stored()?;
        Ok(goals.iter().filter(|goal| goal.is_complete()).count() as i64)
    }

    /// Ensure a goal exists.
    pub fn require_exists(&self, id: Uuid) -> DashboardResult<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM goals WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        if exists {
            Ok(())
        } else {
            Err(DashboardError::not_found("Goal", id))
        }
    }

    /// Roll a goal's period over and persist snapshots plus the reset goal.
    /// Returns the number of periods closed.
    ///
    /// A goal whose reset settings are inconsistent is left as-is and reported.
    pub fn settle_period(&self, goal: &mut Goal, now: DateTime<Utc>) -> DashboardResult<usize> {
        let snapshots = match period::roll_over(goal, now) {
            Ok(snapshots) => snapshots,
            Err(DashboardError::Integrity(reason)) => {
                tracing::warn!(goal_id = %goal.id, "Skipping period rollover: {}", reason);
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        if snapshots.is_empty() {
            return Ok(0);
        }

        let store = PeriodStore::new(self.conn);
        for snapshot in &snapshots {
            store.insert(snapshot)?;
        }
        self.update(goal)?;

        tracing::info!(
            goal_id = %goal.id,
            "Closed {} {} period(s) for '{}'",
            snapshots.len(),
            goal.reset_period.as_str(),
            goal.title
        );
        Ok(snapshots.len())
    }
}

fn validate_reset(goal: &Goal) -> DashboardResult<()> {
    if goal.reset_period != ResetPeriod::None && goal.period_start_date.is_none() {
        return Err(DashboardError::validation(
            "periodStartDate",
            "is required when resetPeriod is weekly or monthly",
        ));
    }
    Ok(())
}

fn metadata_json(kind: &GoalKind) -> DashboardResult<Option<String>> {
    kind.metadata()
        .map(|m| serde_json::to_string(&m))
        .transpose()
        .map_err(DashboardError::from)
}

/// Raw goal row; metadata is decoded after the row is read so JSON errors
/// surface as serialization errors rather than SQLite conversion failures.
struct GoalRow {
    goal: Goal,
    goal_type: GoalType,
    metadata_json: Option<String>,
}

impl GoalRow {
    fn into_goal(self) -> DashboardResult<Goal> {
        let metadata = self
            .metadata_json
            .as_deref()
            .map(serde_json::from_str::<GoalMetadata>)
            .transpose()?;

        let mut goal = self.goal;
        goal.kind = GoalKind::from_parts(self.goal_type, metadata).map_err(|e| {
            DashboardError::Integrity(format!("goal {} has unreadable metadata: {}", goal.id, e))
        })?;
        Ok(goal)
    }
}

/// Parse a database row into a goal row.
fn parse_goal_row(row: &rusqlite::Row) -> rusqlite::Result<GoalRow> {
    let goal_type: GoalType = column_parsed(row, 4)?;

    Ok(GoalRow {
        goal: Goal {
            id: column_uuid(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: column_parsed(row, 3)?,
            kind: GoalKind::empty(goal_type),
            current_value: row.get(5)?,
            target_value: row.get(6)?,
            unit: row.get(7)?,
            reset_period: column_parsed(row, 9)?,
            period_start_date: column_opt_timestamp(row, 10)?,
            target_date: column_opt_timestamp(row, 11)?,
            auto_calculated: row.get(12)?,
            created_at: column_timestamp(row, 13)?,
            updated_at: column_timestamp(row, 14)?,
        },
        goal_type,
        metadata_json: row.get(8)?,
    })
}
