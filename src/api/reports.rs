//! Report endpoints.

use axum::{extract::State, Json};
use chrono::{Duration, Utc};

use super::error::ApiResult;
use super::SharedState;
use crate::error::DashboardError;
use crate::goals::GoalManager;
use crate::reports::rollup::ROLLUP_DAYS;
use crate::reports::{
    generate_reminders, monthly_report, savings_forecast, thirty_day_rollup, MonthlyReport,
    Reminder, Rollup, SavingsForecast,
};
use crate::tracking::LogStore;

/// GET /api/reports/savings
pub async fn savings(State(state): State<SharedState>) -> ApiResult<Json<SavingsForecast>> {
    let now = Utc::now();
    let mut db = state.db.lock().await;

    let forecast = db.with_transaction(|conn| {
        let goals = GoalManager::new(conn).list(now)?;
        let logs = LogStore::new(conn).categorized_since(None)?;
        Ok::<_, DashboardError>(savings_forecast(&goals, &logs, now))
    })?;

    Ok(Json(forecast))
}

/// GET /api/reports/rollup
pub async fn rollup(State(state): State<SharedState>) -> ApiResult<Json<Rollup>> {
    let now = Utc::now();
    let db = state.db.lock().await;
    let logs = LogStore::new(db.connection()).categorized_since(Some(now - Duration::days(ROLLUP_DAYS)))?;
    Ok(Json(thirty_day_rollup(&logs, now)))
}

/// GET /api/reports/reminders
pub async fn reminders(State(state): State<SharedState>) -> ApiResult<Json<Vec<Reminder>>> {
    let now = Utc::now();
    let mut db = state.db.lock().await;
    let goals = db.with_transaction(|conn| GoalManager::new(conn).list(now))?;
    Ok(Json(generate_reminders(&goals, now)))
}

/// GET /api/reports/monthly
pub async fn monthly(State(state): State<SharedState>) -> ApiResult<Json<MonthlyReport>> {
    let now = Utc::now();
    let mut db = state.db.lock().await;
    let goals = db.with_transaction(|conn| GoalManager::new(conn).list(now))?;
    Ok(Json(monthly_report(&goals, now)))
}
