//! Core types for partner profiles.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::levels::{compute_level, Level};
use super::streaks::Streak;

/// A partner's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    /// Emoji, URL or data URI
    pub avatar: Option<String>,
    pub xp: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: Option<NaiveDate>,
    /// Ids of earned badges
    pub badges: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create a new profile with no progress.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: None,
            xp: 0,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            badges: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn level(&self) -> Level {
        compute_level(self.xp)
    }

    pub fn streak(&self) -> Streak {
        Streak {
            current: self.current_streak,
            longest: self.longest_streak,
            last_active: self.last_active_date,
        }
    }

    /// Current streak on `today`, 0 once it has lapsed.
    pub fn streak_as_of(&self, today: NaiveDate) -> i64 {
        self.streak().current_as_of(today)
    }
}

/// Partial update of a profile. `Some(None)` clears the avatar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar: Option<Option<String>>,
}
