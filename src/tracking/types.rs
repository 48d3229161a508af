//! Log and activity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::goals::GoalCategory;
use crate::storage::database::UnknownVariant;

/// An immutable signed delta against a goal's running value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub value: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Log {
    pub fn new(goal_id: Uuid, user_id: Uuid, value: i64, note: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            user_id,
            value,
            note,
            created_at: now,
        }
    }
}

/// A log together with the category of its goal.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedLog {
    pub log: Log,
    pub category: GoalCategory,
}

/// What an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Log,
    Complete,
    Add,
    StepComplete,
    Note,
    Photo,
    Reset,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Log => "log",
            ActivityAction::Complete => "complete",
            ActivityAction::Add => "add",
            ActivityAction::StepComplete => "step_complete",
            ActivityAction::Note => "note",
            ActivityAction::Photo => "photo",
            ActivityAction::Reset => "reset",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(ActivityAction::Log),
            "complete" => Ok(ActivityAction::Complete),
            "add" => Ok(ActivityAction::Add),
            "step_complete" => Ok(ActivityAction::StepComplete),
            "note" => Ok(ActivityAction::Note),
            "photo" => Ok(ActivityAction::Photo),
            "reset" => Ok(ActivityAction::Reset),
            other => Err(UnknownVariant {
                kind: "activity action",
                value: other.to_string(),
            }),
        }
    }
}

/// A human-readable feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    /// May reference a goal that has since been deleted
    pub goal_id: Option<Uuid>,
    pub action: ActivityAction,
    pub description: String,
    pub xp_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(
        user_id: Uuid,
        goal_id: Option<Uuid>,
        action: ActivityAction,
        description: impl Into<String>,
        xp_earned: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            goal_id,
            action,
            description: description.into(),
            xp_earned,
            created_at: now,
        }
    }
}
