//! Profile endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::extract::{double_option, parse_body, parse_id, require_text, Validate};
use super::SharedState;
use crate::profiles::manager::MAX_NAME_LEN;
use crate::profiles::{ProfileManager, ProfilePatch, UserProfile};

pub const MAX_AVATAR_LEN: usize = 512 * 1024;

/// A profile with its derived level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub xp: i64,
    pub level: u32,
    pub level_progress: f64,
    pub next_level_xp: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: Option<NaiveDate>,
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProfileView {
    /// Render a profile as seen on `today`; a lapsed streak shows as 0.
    pub fn new(profile: UserProfile, today: NaiveDate) -> Self {
        let level = profile.level();
        let current_streak = profile.streak_as_of(today);
        Self {
            id: profile.id,
            name: profile.name,
            avatar: profile.avatar,
            xp: profile.xp,
            level: level.level,
            level_progress: level.progress,
            next_level_xp: level.next_threshold,
            current_streak,
            longest_streak: profile.longest_streak,
            last_active_date: profile.last_active_date,
            badges: profile.badges.into_iter().collect(),
            created_at: profile.created_at,
        }
    }
}

/// PATCH /api/users/:id body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub avatar: Option<Option<String>>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> ApiResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name, MAX_NAME_LEN)?;
        }
        if let Some(Some(avatar)) = &self.avatar {
            if avatar.len() > MAX_AVATAR_LEN {
                return Err(ApiError::bad_request("avatar", "is too large"));
            }
        }
        Ok(())
    }
}

/// GET /api/users
pub async fn list_users(State(state): State<SharedState>) -> ApiResult<Json<Vec<ProfileView>>> {
    let db = state.db.lock().await;
    let profiles = ProfileManager::new(db.connection()).list()?;
    let today = Utc::now().date_naive();
    Ok(Json(
        profiles
            .into_iter()
            .map(|profile| ProfileView::new(profile, today))
            .collect(),
    ))
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<ProfileView>> {
    let id = parse_id(&id, "id")?;
    let request = parse_body(payload)?;
    let patch = ProfilePatch {
        name: request.name,
        avatar: request.avatar,
    };

    let now = Utc::now();
    let profile = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| ProfileManager::new(conn).apply_patch(id, patch, now))?
    };

    Ok(Json(ProfileView::new(profile, now.date_naive())))
}
