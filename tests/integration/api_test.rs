//! Integration tests for the REST API.
//!
//! Each test drives a fresh router over an in-memory database seeded with
//! two partners (Ana, then Ben).

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use duodash::ProfileManager;

use super::common::{app_over, create_goal, get, post, send, test_app, test_db};

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_counter_goal_progress_from_logs() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Date nights", "category": "fun", "type": "counter", "targetValue": 4 }),
    )
    .await;

    for note in ["first", "second", "third"] {
        let (status, log) = post(&app, "/api/logs", json!({ "goalId": id, "value": 1, "note": note })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(log["note"], note);
        assert_eq!(log["xpEarned"], 10);
    }

    let (status, goal) = get(&app, &format!("/api/goals/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["currentValue"], 3);
    assert_eq!(goal["progress"]["percentage"].as_f64(), Some(75.0));
    assert!(goal["progress"].get("leafCompletionRatio").is_none());

    let (status, logs) = get(&app, &format!("/api/logs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let notes: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["note"].as_str().unwrap())
        .collect();
    assert_eq!(notes, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_reaching_target_reports_completion() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Move in", "category": "milestones", "type": "boolean", "targetValue": 1 }),
    )
    .await;

    let (_, log) = post(&app, "/api/logs", json!({ "goalId": id, "value": 1 })).await;
    assert_eq!(log["goalCompleted"], true);
    assert_eq!(log["xpEarned"], 60);

    let (_, goal) = get(&app, &format!("/api/goals/{id}")).await;
    assert_eq!(goal["progress"]["percentage"].as_f64(), Some(100.0));
}

#[tokio::test]
async fn test_correction_keeps_both_logs() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Savings", "category": "savings", "type": "progress", "targetValue": 1000, "unit": "€" }),
    )
    .await;

    post(&app, "/api/logs", json!({ "goalId": id, "value": 5 })).await;
    post(&app, "/api/logs", json!({ "goalId": id, "value": -5 })).await;

    let (_, goal) = get(&app, &format!("/api/goals/{id}")).await;
    assert_eq!(goal["currentValue"], 0);

    let (_, logs) = get(&app, &format!("/api/logs/{id}")).await;
    let values: Vec<i64> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["value"].as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![-5, 5]);
}

#[tokio::test]
async fn test_room_checklist_drives_counters() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({
            "title": "Living room",
            "category": "casa",
            "type": "room",
            "metadata": { "items": [{ "title": "Paint walls" }, { "title": "New sofa" }] }
        }),
    )
    .await;

    let (status, goal) = post(&app, &format!("/api/goals/{id}/items"), json!({ "title": "  Lamp  " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["targetValue"], 3);
    assert_eq!(goal["metadata"]["items"][2]["title"], "Lamp");

    let (status, goal) = send(&app, Method::POST, &format!("/api/goals/{id}/items/0/toggle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["currentValue"], 1);
    assert_eq!(goal["targetValue"], 3);
    assert_eq!(goal["progress"]["leafCompletionRatio"], json!({ "completed": 1, "total": 3 }));
    assert!(goal["progress"].get("stepCompletionRatio").is_none());

    let (status, goal) = send(&app, Method::DELETE, &format!("/api/goals/{id}/items/2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["targetValue"], 2);
    assert_eq!(goal["currentValue"], 1);

    let (status, err) = send(&app, Method::POST, &format!("/api/goals/{id}/items/9/toggle"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "index");
}

#[tokio::test]
async fn test_roadmap_single_step_completes_goal() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({
            "title": "Open the shop",
            "category": "business",
            "type": "roadmap",
            "metadata": { "steps": [{ "title": "Register company" }] }
        }),
    )
    .await;

    let (status, goal) = send(&app, Method::POST, &format!("/api/goals/{id}/items/0/toggle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["progress"]["percentage"].as_f64(), Some(100.0));
    assert_eq!(goal["progress"]["stepCompletionRatio"], json!({ "completed": 1, "total": 1 }));
}

#[tokio::test]
async fn test_substeps_auto_complete_step() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({
            "title": "Launch",
            "category": "business",
            "type": "roadmap",
            "metadata": { "steps": [{ "title": "Website" }, { "title": "Marketing" }] }
        }),
    )
    .await;

    post(&app, &format!("/api/goals/{id}/items/0/substeps"), json!({ "title": "Domain" })).await;
    let (_, goal) = send(
        &app,
        Method::POST,
        &format!("/api/goals/{id}/items/0/substeps/0/toggle"),
        None,
    )
    .await;

    assert_eq!(goal["metadata"]["steps"][0]["completed"], true);
    assert_eq!(goal["currentValue"], 1);
    assert_eq!(goal["progress"]["percentage"].as_f64(), Some(50.0));

    // Unchecking the substep leaves the step completed
    let (_, goal) = send(
        &app,
        Method::POST,
        &format!("/api/goals/{id}/items/0/substeps/0/toggle"),
        None,
    )
    .await;
    assert_eq!(goal["metadata"]["steps"][0]["completed"], true);
    assert_eq!(goal["metadata"]["steps"][0]["substeps"][0]["completed"], false);
}

#[tokio::test]
async fn test_logs_rejected_on_checklist_goals() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Kitchen", "category": "casa", "type": "room" }),
    )
    .await;

    let (status, err) = post(&app, "/api/logs", json!({ "goalId": id, "value": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "goalId");
}

#[tokio::test]
async fn test_validation_errors_name_the_field() {
    let app = test_app();

    let (status, err) = post(
        &app,
        "/api/goals",
        json!({ "title": "   ", "category": "fun", "type": "counter" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "title");

    let (status, err) = post(
        &app,
        "/api/goals",
        json!({ "title": "Run", "category": "fun", "type": "counter", "targetValue": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "targetValue");

    let (status, err) = post(
        &app,
        "/api/goals",
        json!({ "title": "Gym", "category": "lifestyle", "type": "counter", "resetPeriod": "weekly" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "periodStartDate");

    let (status, err) = get(&app, "/api/goals/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "id");
}

#[tokio::test]
async fn test_malformed_values_name_the_field() {
    let app = test_app();

    let (status, err) = post(
        &app,
        "/api/goals",
        json!({ "title": "Dig", "category": "garden", "type": "counter" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "category");

    let (status, err) = post(
        &app,
        "/api/goals",
        json!({ "title": "Read", "category": "fun", "type": "counter", "targetValue": "ten" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "targetValue");

    let id = create_goal(&app, json!({ "title": "Run", "category": "lifestyle", "type": "counter" })).await;
    let (status, err) = post(&app, "/api/logs", json!({ "goalId": id, "value": "five" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "value");

    let (status, err) = post(&app, "/api/logs", json!({ "goalId": "nope", "value": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "goalId");

    let (status, err) = post(&app, "/api/logs", json!({ "goalId": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "value");
}

#[tokio::test]
async fn test_unknown_goal_is_not_found() {
    let app = test_app();
    let missing = uuid::Uuid::new_v4();

    let (status, err) = get(&app, &format!("/api/goals/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err["error"]["message"].as_str().unwrap().contains("Goal not found"));

    let (status, _) = post(&app, "/api/logs", json!({ "goalId": missing, "value": 1 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, history) = get(&app, &format!("/api/goals/{missing}/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_patch_and_delete_goal() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Read", "category": "fun", "type": "counter", "unit": "books", "targetValue": 12 }),
    )
    .await;

    let (status, goal) = send(
        &app,
        Method::PATCH,
        &format!("/api/goals/{id}"),
        Some(json!({ "title": "Read together", "unit": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["title"], "Read together");
    assert!(goal["unit"].is_null());
    assert_eq!(goal["targetValue"], 12);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/goals/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/goals/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/goals/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logs_credit_the_named_partner() {
    let app = test_app();
    let id = create_goal(&app, json!({ "title": "Run", "category": "lifestyle", "type": "counter" })).await;

    let (_, users) = get(&app, "/api/users").await;
    let users = users.as_array().unwrap().clone();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "Ana");
    let ben = users[1]["id"].as_str().unwrap();

    let (_, log) = post(&app, "/api/logs", json!({ "goalId": id, "userId": ben, "value": 3 })).await;
    assert_eq!(log["userId"], ben);
    assert_eq!(log["newBadges"], json!(["first_log"]));

    let (_, users) = get(&app, "/api/users").await;
    assert_eq!(users[0]["xp"], 0);
    assert_eq!(users[1]["xp"], 10);
    assert_eq!(users[1]["currentStreak"], 1);
    assert_eq!(users[1]["level"], 1);
    assert_eq!(users[1]["badges"], json!(["first_log"]));

    let (status, stats) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalLogs"], 1);
    assert_eq!(stats["totalXp"], 10);
    assert_eq!(stats["streak"], 1);

    let (_, feed) = get(&app, "/api/activity").await;
    assert_eq!(feed[0]["action"], "log");
    assert_eq!(feed[0]["userId"], ben);
}

#[tokio::test]
async fn test_lapsed_streak_reads_as_zero() {
    let db = test_db();
    let today = Utc::now().date_naive();
    {
        let profiles = ProfileManager::new(db.connection());
        let ana = profiles.list().unwrap().remove(0);
        for days_ago in (56..61).rev() {
            profiles
                .record_active_day(ana.id, today - Duration::days(days_ago), Utc::now())
                .unwrap();
        }
    }
    let app = app_over(db);

    let (_, users) = get(&app, "/api/users").await;
    assert_eq!(users[0]["name"], "Ana");
    assert_eq!(users[0]["currentStreak"], 0);
    assert_eq!(users[0]["longestStreak"], 5);

    let (_, stats) = get(&app, "/api/stats").await;
    assert_eq!(stats["streak"], 0);
}

#[tokio::test]
async fn test_update_user_profile() {
    let app = test_app();
    let (_, users) = get(&app, "/api/users").await;
    let ana = users[0]["id"].as_str().unwrap().to_string();

    let (status, user) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{ana}"),
        Some(json!({ "name": " Anna ", "avatar": "🌻" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Anna");
    assert_eq!(user["avatar"], "🌻");

    let (status, err) = send(
        &app,
        Method::PATCH,
        &format!("/api/users/{ana}"),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "name");
}

#[tokio::test]
async fn test_notes_and_photos() {
    let app = test_app();
    let id = create_goal(&app, json!({ "title": "Trip", "category": "fun", "type": "boolean" })).await;

    let (status, note) = post(&app, &format!("/api/goals/{id}/notes"), json!({ "content": "Book flights" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let note_id = note["id"].as_str().unwrap().to_string();

    let (_, notes) = get(&app, &format!("/api/goals/{id}/notes")).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["content"], "Book flights");

    let (status, err) = post(
        &app,
        &format!("/api/goals/{id}/photos"),
        json!({ "imageUrl": "ftp://example.com/beach.jpg" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["field"], "imageUrl");

    let (status, photo) = post(
        &app,
        &format!("/api/goals/{id}/photos"),
        json!({ "imageUrl": "https://example.com/beach.jpg", "caption": "Day one" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(photo["caption"], "Day one");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/notes/{note_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/notes/{note_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = post(&app, &format!("/api/goals/{missing}/notes"), json!({ "content": "Hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reports_respond() {
    let app = test_app();
    let id = create_goal(
        &app,
        json!({ "title": "Emergency fund", "category": "savings", "type": "progress", "targetValue": 3000, "unit": "€" }),
    )
    .await;
    post(&app, "/api/logs", json!({ "goalId": id, "value": 300 })).await;

    let (status, rollup) = get(&app, "/api/reports/rollup").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rollup["savingsAdded"], 300);
    assert_eq!(rollup["logCount"], 1);

    let (status, forecast) = get(&app, "/api/reports/savings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(forecast["goals"].is_array());

    let (status, reminders) = get(&app, "/api/reports/reminders").await;
    assert_eq!(status, StatusCode::OK);
    assert!(reminders.is_array());

    let (status, monthly) = get(&app, "/api/reports/monthly").await;
    assert_eq!(status, StatusCode::OK);
    assert!(monthly["categories"].is_array());
}
