//! Goal endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::extract::{double_option, parse_actor, parse_body, parse_id, require_text, ActorQuery, Validate};
use super::SharedState;
use crate::error::{DashboardError, DashboardResult};
use crate::goals::progress::{
    auto_calculated_value, checklist_progress, compute_percentage, roadmap_leaf_progress,
    roadmap_progress,
};
use crate::goals::{
    Goal, GoalCategory, GoalKind, GoalManager, GoalMetadata, GoalPatch, GoalType, HistoryEntry,
    LeafOp, LeafProgress, PeriodStore, ResetPeriod,
};
use crate::profiles::ProfileManager;
use crate::storage::AppConfig;
use crate::tracking::apply_leaf_change;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A goal as returned by the API, with its derived progress.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: GoalCategory,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub current_value: i64,
    pub target_value: Option<i64>,
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GoalMetadata>,
    pub reset_period: ResetPeriod,
    pub period_start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
    pub auto_calculated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub progress: ProgressView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub percentage: f64,
    /// Value to show on the card; days elapsed for auto-calculated goals
    pub display_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_completion_ratio: Option<LeafProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_completion_ratio: Option<LeafProgress>,
}

impl GoalView {
    pub fn new(goal: &Goal, config: &AppConfig, now: DateTime<Utc>) -> Self {
        let display_value = match config.couple.together_since {
            Some(since) if goal.auto_calculated => auto_calculated_value(since, now),
            _ => goal.current_value,
        };

        let (step_completion_ratio, leaf_completion_ratio) = match &goal.kind {
            GoalKind::Roadmap { steps } => {
                (Some(roadmap_progress(steps)), Some(roadmap_leaf_progress(steps)))
            }
            GoalKind::Room { items } => (None, Some(checklist_progress(items))),
            GoalKind::Counter | GoalKind::Progress | GoalKind::Boolean => (None, None),
        };

        Self {
            id: goal.id,
            title: goal.title.clone(),
            description: goal.description.clone(),
            category: goal.category,
            goal_type: goal.goal_type(),
            current_value: goal.current_value,
            target_value: goal.target_value,
            unit: goal.unit.clone(),
            metadata: goal.kind.metadata(),
            reset_period: goal.reset_period,
            period_start_date: goal.period_start_date,
            target_date: goal.target_date,
            auto_calculated: goal.auto_calculated,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
            progress: ProgressView {
                percentage: compute_percentage(display_value, goal.target_value),
                display_value,
                step_completion_ratio,
                leaf_completion_ratio,
            },
        }
    }
}

/// POST /api/goals body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: GoalCategory,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub current_value: Option<i64>,
    pub target_value: Option<i64>,
    pub unit: Option<String>,
    pub metadata: Option<GoalMetadata>,
    #[serde(default)]
    pub reset_period: ResetPeriod,
    pub period_start_date: Option<DateTime<Utc>>,
    pub target_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_calculated: bool,
}

impl Validate for CreateGoalRequest {
    fn validate(&self) -> ApiResult<()> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        let leaf_based = matches!(self.goal_type, GoalType::Room | GoalType::Roadmap);
        if leaf_based && self.current_value.is_some() {
            return Err(ApiError::bad_request(
                "currentValue",
                "is derived from the goal's items for room and roadmap goals",
            ));
        }
        if leaf_based && self.target_value.is_some() {
            return Err(ApiError::bad_request(
                "targetValue",
                "is derived from the goal's items for room and roadmap goals",
            ));
        }
        validate_target(self.target_value)?;

        if self.reset_period != ResetPeriod::None && self.period_start_date.is_none() {
            return Err(ApiError::bad_request(
                "periodStartDate",
                "is required when resetPeriod is weekly or monthly",
            ));
        }
        Ok(())
    }
}

impl CreateGoalRequest {
    fn into_goal(self, now: DateTime<Utc>) -> Result<Goal, DashboardError> {
        let kind = GoalKind::from_parts(self.goal_type, self.metadata)?;
        let mut goal = Goal::new(self.title.trim(), self.category, kind);
        goal.description = self.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        goal.unit = self.unit.filter(|u| !u.trim().is_empty());
        goal.reset_period = self.reset_period;
        goal.period_start_date = self.period_start_date;
        goal.target_date = self.target_date;
        goal.auto_calculated = self.auto_calculated;
        goal.created_at = now;
        goal.updated_at = now;
        if !goal.kind.is_leaf_based() {
            goal.current_value = self.current_value.unwrap_or(0);
            goal.target_value = self.target_value;
        }
        Ok(goal)
    }
}

/// PATCH /api/goals/:id body. `null` clears optional fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub description: Option<Option<String>>,
    pub category: Option<GoalCategory>,
    pub current_value: Option<i64>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub target_value: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub unit: Option<Option<String>>,
    pub metadata: Option<GoalMetadata>,
    pub reset_period: Option<ResetPeriod>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub period_start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub target_date: Option<Option<DateTime<Utc>>>,
    pub auto_calculated: Option<bool>,
}

impl Validate for UpdateGoalRequest {
    fn validate(&self) -> ApiResult<()> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TITLE_LEN)?;
        }
        if let Some(Some(description)) = &self.description {
            validate_description(description)?;
        }
        if let Some(target) = self.target_value {
            validate_target(target)?;
        }
        Ok(())
    }
}

impl From<UpdateGoalRequest> for GoalPatch {
    fn from(req: UpdateGoalRequest) -> Self {
        GoalPatch {
            title: req.title.map(|t| t.trim().to_string()),
            description: req.description,
            category: req.category,
            current_value: req.current_value,
            target_value: req.target_value,
            unit: req.unit,
            metadata: req.metadata,
            reset_period: req.reset_period,
            period_start_date: req.period_start_date,
            target_date: req.target_date,
            auto_calculated: req.auto_calculated,
        }
    }
}

/// Body naming a new item, step or substep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafTitleRequest {
    pub title: String,
    pub user_id: Option<Uuid>,
}

impl Validate for LeafTitleRequest {
    fn validate(&self) -> ApiResult<()> {
        require_text("title", &self.title, MAX_TITLE_LEN)
    }
}

fn validate_description(description: &str) -> ApiResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::bad_request(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        ));
    }
    Ok(())
}

fn validate_target(target: Option<i64>) -> ApiResult<()> {
    if target.is_some_and(|t| t < 0) {
        return Err(ApiError::bad_request("targetValue", "must not be negative"));
    }
    Ok(())
}

fn parse_index(raw: &str, field: &str) -> ApiResult<usize> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(field, format!("'{raw}' is not a valid index")))
}

/// GET /api/goals
pub async fn list_goals(State(state): State<SharedState>) -> ApiResult<Json<Vec<GoalView>>> {
    let now = Utc::now();
    let goals = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| GoalManager::new(conn).list(now))?
    };

    Ok(Json(
        goals
            .iter()
            .map(|goal| GoalView::new(goal, &state.config, now))
            .collect(),
    ))
}

/// GET /api/goals/:id
pub async fn get_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let now = Utc::now();
    let goal = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| GoalManager::new(conn).find(id, now))?
    };

    Ok(Json(GoalView::new(&goal, &state.config, now)))
}

/// POST /api/goals
pub async fn create_goal(
    State(state): State<SharedState>,
    payload: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GoalView>)> {
    let request = parse_body(payload)?;
    let now = Utc::now();
    let goal = request.into_goal(now)?;

    {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| GoalManager::new(conn).create(&goal))?;
    }

    tracing::info!(goal_id = %goal.id, "Created {} goal '{}'", goal.category, goal.title);
    Ok((StatusCode::CREATED, Json(GoalView::new(&goal, &state.config, now))))
}

/// PATCH /api/goals/:id
pub async fn update_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateGoalRequest>, JsonRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let patch = GoalPatch::from(parse_body(payload)?);
    let now = Utc::now();

    let goal = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| GoalManager::new(conn).apply_patch(id, patch, now))?
    };

    Ok(Json(GoalView::new(&goal, &state.config, now)))
}

/// DELETE /api/goals/:id
pub async fn delete_goal(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "id")?;
    let deleted = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| GoalManager::new(conn).delete(id))?
    };

    if !deleted {
        return Err(DashboardError::not_found("Goal", id).into());
    }
    tracing::info!(goal_id = %id, "Deleted goal");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/goals/:id/history
///
/// Unknown goals have an empty history.
pub async fn goal_history(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let id = parse_id(&id, "id")?;
    let now = Utc::now();

    let history = {
        let mut db = state.db.lock().await;
        db.with_transaction(|conn| -> DashboardResult<Vec<HistoryEntry>> {
            let goals = GoalManager::new(conn);
            if goals.get(id)?.is_none() {
                return Ok(Vec::new());
            }
            // Close any elapsed period so it shows up in the history
            goals.find(id, now)?;
            PeriodStore::new(conn).history(id)
        })?
    };

    Ok(Json(history))
}

/// Run a leaf mutation for the acting user.
async fn run_leaf_op(
    state: &SharedState,
    goal_id: Uuid,
    requested_user: Option<Uuid>,
    op: LeafOp,
) -> ApiResult<Json<GoalView>> {
    let now = Utc::now();
    let receipt = {
        let mut db = state.db.lock().await;
        let user = ProfileManager::new(db.connection()).acting_user(requested_user, state.primary_name())?;
        apply_leaf_change(db.connection_mut(), goal_id, user.id, op, &state.config.xp, now)?
    };

    Ok(Json(GoalView::new(&receipt.goal, &state.config, now)))
}

/// POST /api/goals/:id/items
pub async fn add_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<LeafTitleRequest>, JsonRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let request = parse_body(payload)?;
    run_leaf_op(&state, id, request.user_id, LeafOp::Add { title: request.title }).await
}

/// POST /api/goals/:id/items/:index/toggle
pub async fn toggle_item(
    State(state): State<SharedState>,
    Path((id, index)): Path<(String, String)>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let index = parse_index(&index, "index")?;
    let user = parse_actor(query)?;
    run_leaf_op(&state, id, user, LeafOp::Toggle { index }).await
}

/// DELETE /api/goals/:id/items/:index
pub async fn remove_item(
    State(state): State<SharedState>,
    Path((id, index)): Path<(String, String)>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let index = parse_index(&index, "index")?;
    let user = parse_actor(query)?;
    run_leaf_op(&state, id, user, LeafOp::Remove { index }).await
}

/// POST /api/goals/:id/items/:index/substeps
pub async fn add_substep(
    State(state): State<SharedState>,
    Path((id, index)): Path<(String, String)>,
    payload: Result<Json<LeafTitleRequest>, JsonRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let step = parse_index(&index, "index")?;
    let request = parse_body(payload)?;
    run_leaf_op(
        &state,
        id,
        request.user_id,
        LeafOp::AddSubstep {
            step,
            title: request.title,
        },
    )
    .await
}

/// POST /api/goals/:id/items/:index/substeps/:sub/toggle
pub async fn toggle_substep(
    State(state): State<SharedState>,
    Path((id, index, sub)): Path<(String, String, String)>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let step = parse_index(&index, "index")?;
    let substep = parse_index(&sub, "index")?;
    let user = parse_actor(query)?;
    run_leaf_op(&state, id, user, LeafOp::ToggleSubstep { step, substep }).await
}

/// DELETE /api/goals/:id/items/:index/substeps/:sub
pub async fn remove_substep(
    State(state): State<SharedState>,
    Path((id, index, sub)): Path<(String, String, String)>,
    query: Result<Query<ActorQuery>, QueryRejection>,
) -> ApiResult<Json<GoalView>> {
    let id = parse_id(&id, "id")?;
    let step = parse_index(&index, "index")?;
    let substep = parse_index(&sub, "index")?;
    let user = parse_actor(query)?;
    run_leaf_op(&state, id, user, LeafOp::RemoveSubstep { step, substep }).await
}
