//! Activity feed and headline stats.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::error::ApiResult;
use super::logs::LimitQuery;
use super::SharedState;
use crate::goals::GoalManager;
use crate::profiles::ProfileManager;
use crate::reports::{compute_stats, DashboardStats};
use crate::storage::FeedSettings;
use crate::tracking::{Activity, ActivityFeed, LogStore};

/// GET /api/activity
pub async fn activity(
    State(state): State<SharedState>,
    query: Option<Query<LimitQuery>>,
) -> ApiResult<Json<Vec<Activity>>> {
    let limit = query
        .and_then(|Query(q)| q.limit)
        .map(|limit| limit.clamp(1, FeedSettings::MAX_ACTIVITY))
        .unwrap_or_else(|| state.config.feed.activity_window());

    let db = state.db.lock().await;
    let entries = ActivityFeed::new(db.connection()).recent(limit)?;
    Ok(Json(entries))
}

/// GET /api/stats
pub async fn stats(State(state): State<SharedState>) -> ApiResult<Json<DashboardStats>> {
    let now = Utc::now();
    let mut db = state.db.lock().await;

    let stats = db.with_transaction(|conn| {
        let goals = GoalManager::new(conn).list(now)?;
        let profiles = ProfileManager::new(conn).list()?;
        let total_logs = LogStore::new(conn).count()?;
        Ok::<_, crate::error::DashboardError>(compute_stats(&profiles, &goals, total_logs, now.date_naive()))
    })?;

    Ok(Json(stats))
}
