//! REST API.
//!
//! JSON over HTTP with axum. Handlers hold the database lock only for the
//! synchronous store calls and never await while holding it.

pub mod error;
pub mod extract;
pub mod feed;
pub mod goals;
pub mod journal;
pub mod logs;
pub mod reports;
pub mod users;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::storage::{AppConfig, Database};

pub use error::{ApiError, ApiResult};

/// State shared across handlers.
pub struct AppState {
    pub db: Mutex<Database>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db: Mutex::new(db),
            config,
        }
    }

    /// Name of the profile credited when a request names no user.
    pub fn primary_name(&self) -> Option<&str> {
        self.config.couple.primary.as_deref()
    }
}

pub type SharedState = Arc<AppState>;

/// Create the API router.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Goals
        .route("/api/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/api/goals/:id",
            get(goals::get_goal)
                .patch(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route("/api/goals/:id/items", post(goals::add_item))
        .route("/api/goals/:id/items/:index", delete(goals::remove_item))
        .route("/api/goals/:id/items/:index/toggle", post(goals::toggle_item))
        .route("/api/goals/:id/items/:index/substeps", post(goals::add_substep))
        .route(
            "/api/goals/:id/items/:index/substeps/:sub",
            delete(goals::remove_substep),
        )
        .route(
            "/api/goals/:id/items/:index/substeps/:sub/toggle",
            post(goals::toggle_substep),
        )
        .route("/api/goals/:id/history", get(goals::goal_history))
        // Journal
        .route(
            "/api/goals/:id/notes",
            get(journal::list_notes).post(journal::create_note),
        )
        .route("/api/notes/:id", delete(journal::delete_note))
        .route(
            "/api/goals/:id/photos",
            get(journal::list_photos).post(journal::create_photo),
        )
        .route("/api/photos/:id", delete(journal::delete_photo))
        // Logs
        .route("/api/logs", get(logs::recent_logs).post(logs::create_log))
        .route("/api/logs/:goal_id", get(logs::goal_logs))
        // Profiles
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", axum::routing::patch(users::update_user))
        // Feed
        .route("/api/activity", get(feed::activity))
        .route("/api/stats", get(feed::stats))
        // Reports
        .route("/api/reports/savings", get(reports::savings))
        .route("/api/reports/rollup", get(reports::rollup))
        .route("/api/reports/reminders", get(reports::reminders))
        .route("/api/reports/monthly", get(reports::monthly))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
