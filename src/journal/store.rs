//! Note and photo storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::types::{GoalNote, MilestonePhoto};
use crate::error::{DashboardError, DashboardResult};
use crate::goals::GoalManager;
use crate::profiles::ProfileManager;
use crate::storage::database::{column_timestamp, column_uuid, to_timestamp};
use crate::tracking::{Activity, ActivityAction, ActivityFeed};

/// Store for goal notes and milestone photos.
pub struct JournalStore<'a> {
    conn: &'a Connection,
}

impl<'a> JournalStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Notes ==========

    pub fn insert_note(&self, note: &GoalNote) -> DashboardResult<()> {
        self.conn.execute(
            "INSERT INTO goal_notes (id, goal_id, user_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                note.id.to_string(),
                note.goal_id.to_string(),
                note.user_id.to_string(),
                note.content,
                to_timestamp(&note.created_at),
            ],
        )?;
        Ok(())
    }

    /// Notes of a goal, newest first.
    pub fn notes_for_goal(&self, goal_id: Uuid) -> DashboardResult<Vec<GoalNote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, goal_id, user_id, content, created_at
             FROM goal_notes
             WHERE goal_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![goal_id.to_string()], |row| {
            Ok(GoalNote {
                id: column_uuid(row, 0)?,
                goal_id: column_uuid(row, 1)?,
                user_id: column_uuid(row, 2)?,
                content: row.get(3)?,
                created_at: column_timestamp(row, 4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }

    /// Delete a note. Returns whether it existed.
    pub fn delete_note(&self, id: Uuid) -> DashboardResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM goal_notes WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    // ========== Photos ==========

    pub fn insert_photo(&self, photo: &MilestonePhoto) -> DashboardResult<()> {
        self.conn.execute(
            "INSERT INTO milestone_photos (id, goal_id, user_id, image_url, caption, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                photo.id.to_string(),
                photo.goal_id.to_string(),
                photo.user_id.to_string(),
                photo.image_url,
                photo.caption,
                to_timestamp(&photo.created_at),
            ],
        )?;
        Ok(())
    }

    /// Photos of a goal, newest first.
    pub fn photos_for_goal(&self, goal_id: Uuid) -> DashboardResult<Vec<MilestonePhoto>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, goal_id, user_id, image_url, caption, created_at
             FROM milestone_photos
             WHERE goal_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![goal_id.to_string()], |row| {
            Ok(MilestonePhoto {
                id: column_uuid(row, 0)?,
                goal_id: column_uuid(row, 1)?,
                user_id: column_uuid(row, 2)?,
                image_url: row.get(3)?,
                caption: row.get(4)?,
                created_at: column_timestamp(row, 5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DashboardError::from)
    }

    /// Delete a photo. Returns whether it existed.
    pub fn delete_photo(&self, id: Uuid) -> DashboardResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM milestone_photos WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }
}

/// Post a note on a goal and announce it in the feed.
pub fn post_note(
    conn: &mut Connection,
    goal_id: Uuid,
    user_id: Uuid,
    content: &str,
    now: DateTime<Utc>,
) -> DashboardResult<GoalNote> {
    let tx = conn.transaction()?;

    let note = {
        let goal = GoalManager::new(&tx)
            .get(goal_id)?
            .ok_or_else(|| DashboardError::not_found("Goal", goal_id))?;
        ProfileManager::new(&tx).require(user_id)?;

        let note = GoalNote::new(goal.id, user_id, content, now)?;
        JournalStore::new(&tx).insert_note(&note)?;
        ActivityFeed::new(&tx).append(&Activity::new(
            user_id,
            Some(goal.id),
            ActivityAction::Note,
            format!("Left a note on \"{}\"", goal.title),
            0,
            now,
        ))?;
        note
    };

    tx.commit()?;
    Ok(note)
}

/// Attach a photo to a goal and announce it in the feed.
pub fn post_photo(
    conn: &mut Connection,
    goal_id: Uuid,
    user_id: Uuid,
    image_url: &str,
    caption: Option<&str>,
    now: DateTime<Utc>,
) -> DashboardResult<MilestonePhoto> {
    let tx = conn.transaction()?;

    let photo = {
        let goal = GoalManager::new(&tx)
            .get(goal_id)?
            .ok_or_else(|| DashboardError::not_found("Goal", goal_id))?;
        ProfileManager::new(&tx).require(user_id)?;

        let photo = MilestonePhoto::new(goal.id, user_id, image_url, caption, now)?;
        JournalStore::new(&tx).insert_photo(&photo)?;
        ActivityFeed::new(&tx).append(&Activity::new(
            user_id,
            Some(goal.id),
            ActivityAction::Photo,
            format!("Added a photo to \"{}\"", goal.title),
            0,
            now,
        ))?;
        photo
    };

    tx.commit()?;
    Ok(photo)
}
