//! Note and photo endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::extract::{parse_body, parse_id, require_text, Validate};
use super::SharedState;
use crate::error::DashboardError;
use crate::goals::GoalManager;
use crate::journal::types::MAX_NOTE_LEN;
use crate::journal::{post_note, post_photo, GoalNote, JournalStore, MilestonePhoto};
use crate::profiles::ProfileManager;

/// POST /api/goals/:id/notes body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub content: String,
    pub user_id: Option<Uuid>,
}

impl Validate for CreateNoteRequest {
    fn validate(&self) -> ApiResult<()> {
        require_text("content", &self.content, MAX_NOTE_LEN)
    }
}

/// POST /api/goals/:id/photos body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhotoRequest {
    pub image_url: String,
    pub caption: Option<String>,
    pub user_id: Option<Uuid>,
}

impl Validate for CreatePhotoRequest {
    fn validate(&self) -> ApiResult<()> {
        // Scheme and caption length are checked when the photo is built
        if self.image_url.trim().is_empty() {
            return Err(ApiError::bad_request("imageUrl", "must not be empty"));
        }
        Ok(())
    }
}

/// GET /api/goals/:id/notes
pub async fn list_notes(
    State(state): State<SharedState>,
    Path(goal_id): Path<String>,
) -> ApiResult<Json<Vec<GoalNote>>> {
    let goal_id = parse_id(&goal_id, "goalId")?;
    let db = state.db.lock().await;
    GoalManager::new(db.connection()).require_exists(goal_id)?;
    let notes = JournalStore::new(db.connection()).notes_for_goal(goal_id)?;
    Ok(Json(notes))
}

/// POST /api/goals/:id/notes
pub async fn create_note(
    State(state): State<SharedState>,
    Path(goal_id): Path<String>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GoalNote>)> {
    let goal_id = parse_id(&goal_id, "goalId")?;
    let request = parse_body(payload)?;

    let note = {
        let mut db = state.db.lock().await;
        let user = ProfileManager::new(db.connection()).acting_user(request.user_id, state.primary_name())?;
        post_note(db.connection_mut(), goal_id, user.id, &request.content, Utc::now())?
    };

    Ok((StatusCode::CREATED, Json(note)))
}

/// DELETE /api/notes/:id
pub async fn delete_note(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    let db = state.db.lock().await;
    if !JournalStore::new(db.connection()).delete_note(id)? {
        return Err(DashboardError::not_found("Note", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/goals/:id/photos
pub async fn list_photos(
    State(state): State<SharedState>,
    Path(goal_id): Path<String>,
) -> ApiResult<Json<Vec<MilestonePhoto>>> {
    let goal_id = parse_id(&goal_id, "goalId")?;
    let db = state.db.lock().await;
    GoalManager::new(db.connection()).require_exists(goal_id)?;
    let photos = JournalStore::new(db.connection()).photos_for_goal(goal_id)?;
    Ok(Json(photos))
}

/// POST /api/goals/:id/photos
pub async fn create_photo(
    State(state): State<SharedState>,
    Path(goal_id): Path<String>,
    payload: Result<Json<CreatePhotoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MilestonePhoto>)> {
    let goal_id = parse_id(&goal_id, "goalId")?;
    let request = parse_body(payload)?;

    let photo = {
        let mut db = state.db.lock().await;
        let user = ProfileManager::new(db.connection()).acting_user(request.user_id, state.primary_name())?;
        post_photo(
            db.connection_mut(),
            goal_id,
            user.id,
            &request.image_url,
            request.caption.as_deref(),
            Utc::now(),
        )?
    };

    Ok((StatusCode::CREATED, Json(photo)))
}

/// DELETE /api/photos/:id
pub async fn delete_photo(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    let db = state.db.lock().await;
    if !JournalStore::new(db.connection()).delete_photo(id)? {
        return Err(DashboardError::not_found("Photo", id).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
