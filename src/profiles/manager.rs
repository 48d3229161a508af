//! Profile management.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::streaks::Streak;
use super::types::{ProfilePatch, UserProfile};
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::{column_opt_date, column_timestamp, column_uuid, to_timestamp};

const PROFILE_COLUMNS: &str = "id, name, avatar, xp, current_streak, longest_streak,
     last_active_date, badges_json, created_at, updated_at";

pub const MAX_NAME_LEN: usize = 50;

/// Manager for partner profiles.
pub struct ProfileManager<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileManager<'a> {
    /// Create a new profile manager with a database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new profile.
    pub fn create(&self, profile: &UserProfile) -> DashboardResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO profiles ({PROFILE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                profile.id.to_string(),
                profile.name,
                profile.avatar,
                profile.xp,
                profile.current_streak,
                profile.longest_streak,
                profile.last_active_date.map(|d| d.format("%Y-%m-%d").to_string()),
                serde_json::to_string(&profile.badges)?,
                to_timestamp(&profile.created_at),
                to_timestamp(&profile.updated_at),
            ],
        )?;

        tracing::debug!(user_id = %profile.id, "Created profile '{}'", profile.name);
        Ok(())
    }

    /// Get a profile by ID.
    pub fn get(&self, id: Uuid) -> DashboardResult<Option<UserProfile>> {
        self.conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id.to_string()],
                parse_profile_row,
            )
            .optional()?
            .map(ProfileRow::into_profile)
            .transpose()
    }

    /// Get a profile by ID, failing if it does not exist.
    pub fn require(&self, id: Uuid) -> DashboardResult<UserProfile> {
        self.get(id)?
            .ok_or_else(|| DashboardError::not_found("User", id))
    }

    /// All profiles in creation order.
    pub fn list(&self) -> DashboardResult<Vec<UserProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at ASC, rowid ASC"
        ))?;

        let rows = stmt.query_map([], parse_profile_row)?;

        rows.collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(ProfileRow::into_profile)
            .collect()
    }

    pub fn count(&self) -> DashboardResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?)
    }

    /// Resolve the profile credited for a mutation.
    ///
    /// An explicit id must exist. Otherwise the profile named
    /// `preferred_name` is used, falling back to the earliest profile.
    pub fn acting_user(
        &self,
        requested: Option<Uuid>,
        preferred_name: Option<&str>,
    ) -> DashboardResult<UserProfile> {
        if let Some(id) = requested {
            return self.require(id);
        }

        let profiles = self.list()?;
        let preferred = preferred_name.and_then(|name| profiles.iter().position(|p| p.name == name));

        match preferred {
            Some(index) => Ok(profiles[index].clone()),
            None => profiles
                .into_iter()
                .next()
                .ok_or_else(|| DashboardError::validation("userId", "no profiles exist")),
        }
    }

    /// Apply a name/avatar update.
    pub fn apply_patch(
        &self,
        id: Uuid,
        patch: ProfilePatch,
        now: DateTime<Utc>,
    ) -> DashboardResult<UserProfile> {
        let mut profile = self.require(id)?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DashboardError::validation("name", "must not be empty"));
            }
            if name.chars().count() > MAX_NAME_LEN {
                return Err(DashboardError::validation(
                    "name",
                    format!("must be at most {MAX_NAME_LEN} characters"),
                ));
            }
            profile.name = name.to_string();
        }
        if let Some(avatar) = patch.avatar {
            profile.avatar = avatar.filter(|a| !a.trim().is_empty());
        }
        profile.updated_at = now;

        self.conn.execute(
            "UPDATE profiles SET name = ?1, avatar = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                profile.name,
                profile.avatar,
                to_timestamp(&profile.updated_at),
                profile.id.to_string()
            ],
        )?;

        Ok(profile)
    }

    /// Atomically add XP. Returns the new total.
    pub fn award_xp(&self, id: Uuid, amount: i64, now: DateTime<Utc>) -> DashboardResult<i64> {
        self.conn
            .query_row(
                "UPDATE profiles SET xp = xp + ?1, updated_at = ?2
                 WHERE id = ?3
                 RETURNING xp",
                params![amount, to_timestamp(&now), id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DashboardError::not_found("User", id))
    }

    /// Count `today` as an active day and store the resulting streak.
    pub fn record_active_day(
        &self,
        id: Uuid,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> DashboardResult<Streak> {
        let profile = self.require(id)?;
        let streak = profile.streak().advance(today);

        if streak != profile.streak() {
            self.conn.execute(
                "UPDATE profiles SET current_streak = ?1, longest_streak = ?2,
                 last_active_date = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    streak.current,
                    streak.longest,
                    streak.last_active.map(|d| d.format("%Y-%m-%d").to_string()),
                    to_timestamp(&now),
                    id.to_string()
                ],
            )?;
        }

        Ok(streak)
    }

    /// Add badge ids to a profile. Returns the full set.
    pub fn add_badges(
        &self,
        id: Uuid,
        badges: &[&str],
        now: DateTime<Utc>,
    ) -> DashboardResult<BTreeSet<String>> {
        let mut profile = self.require(id)?;
        let before = profile.badges.len();
        profile
            .badges
            .extend(badges.iter().map(|badge| badge.to_string()));

        if profile.badges.len() != before {
            self.conn.execute(
                "UPDATE profiles SET badges_json = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    serde_json::to_string(&profile.badges)?,
                    to_timestamp(&now),
                    id.to_string()
                ],
            )?;
        }

        Ok(profile.badges)
    }
}

struct ProfileRow {
    profile: UserProfile,
    badges_json: String,
}

impl ProfileRow {
    fn into_profile(self) -> DashboardResult<UserProfile> {
        let mut profile = self.profile;
        profile.badges = serde_json::from_str(&self.badges_json)?;
        Ok(profile)
    }
}

fn parse_profile_row(row: &rusqlite::Row) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        profile: UserProfile {
            id: column_uuid(row, 0)?,
            name: row.get(1)?,
            avatar: row.get(2)?,
            xp: row.get(3)?,
            current_streak: row.get(4)?,
            longest_streak: row.get(5)?,
            last_active_date: column_opt_date(row, 6)?,
            badges: BTreeSet::new(),
            created_at: column_timestamp(row, 8)?,
            updated_at: column_timestamp(row, 9)?,
        },
        badges_json: row.get(7)?,
    })
}
