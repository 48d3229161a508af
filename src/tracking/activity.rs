//! Activity feed storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::types::Activity;
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::{
    column_opt_uuid, column_parsed, column_timestamp, column_uuid, to_timestamp,
};

/// Append-only feed of partner actions.
pub struct ActivityFeed<'a> {
    conn: &'a Connection,
}

impl<'a> ActivityFeed<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append an entry.
    pub fn append(&self, activity: &Activity) -> DashboardResult<()> {
        self.conn.execute(
            "INSERT INTO activities (id, user_id, goal_id, action, description, xp_earned, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                activity.id.to_string(),
                activity.user_id.to_string(),
                activity.goal_id.map(|id| id.to_string()),
                activity.action.as_str(),
                activity.description,
                activity.xp_earned,
                to_timestamp(&activity.created_at),
            ],
        )?;
        Ok(())
    }

    /// Whether an XP-earning entry with this description was already written
    /// for the goal, optionally only counting entries from `since` on.
    pub fn has_rewarded(
        &self,
        goal_id: Uuid,
        description: &str,
        since: Option<DateTime<Utc>>,
    ) -> DashboardResult<bool> {
        let since = since.map(|at| to_timestamp(&at)).unwrap_or_default();
        let found = self.conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM activities
                 WHERE goal_id = ?1 AND description = ?2 AND xp_earned > 0 AND created_at >= ?3
             )",
            params![goal_id.to_string(), description, since],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// The latest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> DashboardResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, goal_id, action, description, xp_earned, created_at
             FROM activities
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Activity {
                id: column_uuid(row, 0)?,
                user_id: column_uuid(row, 1)?,
                goal_id: column_opt_uuid(row, 2)?,
                action: column_parsed(row, 3)?,
                description: row.get(4)?,
                xp_earned: row.get(5)?,
                created_at: column_timestamp(row, 6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }
}
