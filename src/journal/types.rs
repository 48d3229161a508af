//! Journal entry types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DashboardError, DashboardResult};

pub const MAX_NOTE_LEN: usize = 2000;
pub const MAX_CAPTION_LEN: usize = 280;

/// A free-text note on a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalNote {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl GoalNote {
    /// Build a note, trimming and validating its content.
    pub fn new(goal_id: Uuid, user_id: Uuid, content: &str, now: DateTime<Utc>) -> DashboardResult<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DashboardError::validation("content", "must not be empty"));
        }
        if content.chars().count() > MAX_NOTE_LEN {
            return Err(DashboardError::validation(
                "content",
                format!("must be at most {MAX_NOTE_LEN} characters"),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            goal_id,
            user_id,
            content: content.to_string(),
            created_at: now,
        })
    }
}

/// A photo attached to a milestone, stored by URL or data URI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePhoto {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MilestonePhoto {
    /// Build a photo entry. Only `http(s)` URLs and `data:image/` URIs are accepted.
    pub fn new(
        goal_id: Uuid,
        user_id: Uuid,
        image_url: &str,
        caption: Option<&str>,
        now: DateTime<Utc>,
    ) -> DashboardResult<Self> {
        let image_url = image_url.trim();
        let accepted = ["https://", "http://", "data:image/"]
            .iter()
            .any(|prefix| image_url.starts_with(prefix));
        if !accepted {
            return Err(DashboardError::validation(
                "imageUrl",
                "must be an http(s) URL or a data:image/ URI",
            ));
        }

        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        if caption.is_some_and(|c| c.chars().count() > MAX_CAPTION_LEN) {
            return Err(DashboardError::validation(
                "caption",
                format!("must be at most {MAX_CAPTION_LEN} characters"),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            goal_id,
            user_id,
            image_url: image_url.to_string(),
            caption: caption.map(str::to_string),
            created_at: now,
        })
    }
}
