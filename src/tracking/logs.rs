//! Log storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::types::{CategorizedLog, Log};
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::{column_parsed, column_timestamp, column_uuid, to_timestamp};

/// Append-only store for progress logs.
pub struct LogStore<'a> {
    conn: &'a Connection,
}

impl<'a> LogStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append a log.
    pub fn insert(&self, log: &Log) -> DashboardResult<()> {
        self.conn.execute(
            "INSERT INTO logs (id, goal_id, user_id, value, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.id.to_string(),
                log.goal_id.to_string(),
                log.user_id.to_string(),
                log.value,
                log.note,
                to_timestamp(&log.created_at),
            ],
        )?;
        Ok(())
    }

    /// Logs of one goal, newest first.
    pub fn list_for_goal(&self, goal_id: Uuid) -> DashboardResult<Vec<Log>> {
        self.query(
            "SELECT id, goal_id, user_id, value, note, created_at
             FROM logs
             WHERE goal_id = ?1
             ORDER BY created_at DESC, rowid DESC",
            params![goal_id.to_string()],
        )
    }

    /// The most recent logs across all goals, newest first.
    pub fn recent(&self, limit: usize) -> DashboardResult<Vec<Log>> {
        self.query(
            "SELECT id, goal_id, user_id, value, note, created_at
             FROM logs
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
            params![limit as i64],
        )
    }

    /// Logs recorded at or after `since`, oldest first, with their goal's category.
    pub fn categorized_since(&self, since: Option<DateTime<Utc>>) -> DashboardResult<Vec<CategorizedLog>> {
        let since = since
            .as_ref()
            .map(to_timestamp)
            .unwrap_or_default();

        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.goal_id, l.user_id, l.value, l.note, l.created_at, g.category
             FROM logs l
             JOIN goals g ON g.id = l.goal_id
             WHERE l.created_at >= ?1
             ORDER BY l.created_at ASC, l.rowid ASC",
        )?;

        let rows = stmt.query_map(params![since], |row| {
            Ok(CategorizedLog {
                log: parse_log_row(row)?,
                category: column_parsed(row, 6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }

    pub fn count(&self) -> DashboardResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?)
    }

    pub fn count_for_user(&self, user_id: Uuid) -> DashboardResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM logs WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?)
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> DashboardResult<Vec<Log>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, parse_log_row)?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }
}

fn parse_log_row(row: &rusqlite::Row) -> rusqlite::Result<Log> {
    Ok(Log {
        id: column_uuid(row, 0)?,
        goal_id: column_uuid(row, 1)?,
        user_id: column_uuid(row, 2)?,
        value: row.get(3)?,
        note: row.get(4)?,
        created_at: column_timestamp(row, 5)?,
    })
}
