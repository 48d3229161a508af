//! Log endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::extract::{parse_body, parse_id, Validate};
use super::SharedState;
use crate::profiles::ProfileManager;
use crate::tracking::{record_log, Log, LogRequest, LogStore};

pub const MAX_NOTE_LEN: usize = 500;
pub const MAX_RECENT_LOGS: usize = 200;

/// POST /api/logs body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogRequest {
    pub goal_id: Uuid,
    /// Defaults to the primary profile
    pub user_id: Option<Uuid>,
    pub value: i64,
    pub note: Option<String>,
}

impl Validate for CreateLogRequest {
    fn validate(&self) -> ApiResult<()> {
        if self
            .note
            .as_ref()
            .is_some_and(|note| note.chars().count() > MAX_NOTE_LEN)
        {
            return Err(ApiError::bad_request(
                "note",
                format!("must be at most {MAX_NOTE_LEN} characters"),
            ));
        }
        Ok(())
    }
}

/// The recorded log plus what it earned.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    #[serde(flatten)]
    pub log: Log,
    pub xp_earned: i64,
    pub goal_completed: bool,
    pub new_badges: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// POST /api/logs
pub async fn create_log(
    State(state): State<SharedState>,
    payload: Result<Json<CreateLogRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LogResponse>)> {
    let request = parse_body(payload)?;
    let now = Utc::now();

    let receipt = {
        let mut db = state.db.lock().await;
        let user = ProfileManager::new(db.connection()).acting_user(request.user_id, state.primary_name())?;
        let log_request = LogRequest {
            goal_id: request.goal_id,
            user_id: user.id,
            value: request.value,
            note: request.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };
        record_log(db.connection_mut(), &log_request, &state.config.xp, now)?
    };

    Ok((
        StatusCode::CREATED,
        Json(LogResponse {
            log: receipt.log,
            xp_earned: receipt.xp_earned,
            goal_completed: receipt.completed_goal,
            new_badges: receipt.new_badges,
        }),
    ))
}

/// GET /api/logs/:goal_id
pub async fn goal_logs(
    State(state): State<SharedState>,
    Path(goal_id): Path<String>,
) -> ApiResult<Json<Vec<Log>>> {
    let goal_id = parse_id(&goal_id, "goalId")?;
    let db = state.db.lock().await;
    let logs = LogStore::new(db.connection()).list_for_goal(goal_id)?;
    Ok(Json(logs))
}

/// GET /api/logs
pub async fn recent_logs(
    State(state): State<SharedState>,
    query: Option<Query<LimitQuery>>,
) -> ApiResult<Json<Vec<Log>>> {
    let limit = query
        .and_then(|Query(q)| q.limit)
        .unwrap_or(state.config.feed.log_limit)
        .clamp(1, MAX_RECENT_LOGS);

    let db = state.db.lock().await;
    let logs = LogStore::new(db.connection()).recent(limit)?;
    Ok(Json(logs))
}
