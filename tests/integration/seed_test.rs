//! Integration tests for a seeded first run served over the API.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use duodash::storage::{seed_if_empty, Database};
use duodash::{create_router, AppState};

use super::common::{get, test_config};

#[tokio::test]
async fn test_starter_goals_are_served() {
    let mut config = test_config();
    config.seed.starter_goals = true;
    config.couple.together_since = Some((Utc::now() - Duration::days(100)).date_naive());

    let mut db = Database::open_in_memory().unwrap();
    let report = seed_if_empty(db.connection_mut(), &config, Utc::now()).unwrap();
    assert_eq!(report.profiles, 2);
    assert_eq!(report.goals, 6);

    let app = create_router(Arc::new(AppState::new(db, config)));
    let (status, goals) = get(&app, "/api/goals").await;
    assert_eq!(status, StatusCode::OK);

    let goals = goals.as_array().unwrap();
    assert_eq!(goals.len(), 6);
    assert_eq!(goals[0]["title"], "Workouts this week");
    assert_eq!(goals[0]["resetPeriod"], "weekly");

    let roadmap = goals.iter().find(|g| g["type"] == "roadmap").unwrap();
    assert_eq!(roadmap["targetValue"], 3);
    assert_eq!(
        roadmap["progress"]["leafCompletionRatio"],
        serde_json::json!({ "completed": 0, "total": 4 })
    );

    let days = goals.iter().find(|g| g["autoCalculated"] == true).unwrap();
    assert_eq!(days["currentValue"], 0);
    assert_eq!(days["progress"]["displayValue"], 100);
}

#[tokio::test]
async fn test_seeding_twice_keeps_existing_profiles() {
    let config = test_config();
    let mut db = Database::open_in_memory().unwrap();
    seed_if_empty(db.connection_mut(), &config, Utc::now()).unwrap();
    let second = seed_if_empty(db.connection_mut(), &config, Utc::now()).unwrap();
    assert_eq!(second.profiles, 0);

    let app = create_router(Arc::new(AppState::new(db, config)));
    let (_, users) = get(&app, "/api/users").await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}
