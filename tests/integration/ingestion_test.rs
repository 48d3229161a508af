//! Integration tests for the log ingestion pipeline.
//!
//! Drives `record_log` and `apply_leaf_change` against a real database and
//! checks how XP, streaks, badges and the activity feed evolve together.

use chrono::{Duration, TimeZone, Utc};

use duodash::goals::{Goal, GoalCategory, GoalKind, GoalManager, LeafOp, ResetPeriod, RoomItem};
use duodash::profiles::{ProfileManager, UserProfile};
use duodash::storage::{Database, XpRewards};
use duodash::tracking::{apply_leaf_change, record_log, ActivityAction, ActivityFeed, LogRequest, LogStore};

fn setup(goal: &Goal) -> (Database, UserProfile) {
    let db = Database::open_in_memory().unwrap();
    let user = UserProfile::new("Ana");
    ProfileManager::new(db.connection()).create(&user).unwrap();
    GoalManager::new(db.connection()).create(goal).unwrap();
    (db, user)
}

fn request(goal: &Goal, user: &UserProfile, value: i64) -> LogRequest {
    LogRequest {
        goal_id: goal.id,
        user_id: user.id,
        value,
        note: None,
    }
}

#[test]
fn test_streak_follows_active_days() {
    let goal = Goal::new("Walks", GoalCategory::Lifestyle, GoalKind::Counter);
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();
    let day = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    for offset in [0, 0, 1, 2, 4] {
        let now = day + Duration::days(offset);
        record_log(db.connection_mut(), &request(&goal, &user, 1), &rewards, now).unwrap();
    }

    let profile = ProfileManager::new(db.connection()).require(user.id).unwrap();
    assert_eq!(profile.current_streak, 1);
    assert_eq!(profile.longest_streak, 3);
    assert_eq!(profile.last_active_date, Some((day + Duration::days(4)).date_naive()));
    assert_eq!(profile.xp, 50);
}

#[test]
fn test_ten_logs_level_up_and_badges() {
    let goal = Goal::new("Pages read", GoalCategory::Fun, GoalKind::Counter);
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();
    let now = Utc::now();

    let mut earned = Vec::new();
    for _ in 0..10 {
        let receipt = record_log(db.connection_mut(), &request(&goal, &user, 20), &rewards, now).unwrap();
        earned.extend(receipt.new_badges);
    }

    assert_eq!(earned, vec!["first_log", "ten_logs"]);

    let profile = ProfileManager::new(db.connection()).require(user.id).unwrap();
    assert_eq!(profile.xp, 100);
    assert_eq!(profile.level().level, 2);
    assert!(profile.badges.contains("ten_logs"));

    let goal = GoalManager::new(db.connection()).find(goal.id, now).unwrap();
    assert_eq!(goal.current_value, 200);
    assert_eq!(LogStore::new(db.connection()).count_for_user(user.id).unwrap(), 10);
}

#[test]
fn test_negative_log_does_not_uncomplete_bonus() {
    let goal = Goal::new("Savings", GoalCategory::Savings, GoalKind::Progress)
        .with_target(100)
        .with_unit("€");
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();
    let now = Utc::now();

    let first = record_log(db.connection_mut(), &request(&goal, &user, 100), &rewards, now).unwrap();
    assert!(first.completed_goal);

    let correction = record_log(db.connection_mut(), &request(&goal, &user, -30), &rewards, now).unwrap();
    assert!(!correction.completed_goal);
    assert_eq!(correction.goal.current_value, 70);
    assert_eq!(correction.xp_earned, rewards.log_reward);

    let feed = ActivityFeed::new(db.connection()).recent(10).unwrap();
    let completions = feed
        .iter()
        .filter(|a| a.action == ActivityAction::Complete)
        .count();
    assert_eq!(completions, 1);
    assert_eq!(feed[0].description, "Logged -30 € on \"Savings\"");
}

#[test]
fn test_checklist_completion_earns_leaf_reward() {
    let items = ["Paint", "Shelves"]
        .into_iter()
        .map(|title| RoomItem {
            title: title.to_string(),
            completed: false,
            notes: None,
        })
        .collect();
    let goal = Goal::new("Study", GoalCategory::Casa, GoalKind::Room { items });
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();
    let now = Utc::now();

    let receipt = apply_leaf_change(
        db.connection_mut(),
        goal.id,
        user.id,
        LeafOp::Toggle { index: 1 },
        &rewards,
        now,
    )
    .unwrap();
    assert_eq!(receipt.xp_earned, rewards.leaf_reward);
    assert_eq!(receipt.goal.current_value, 1);

    let added = apply_leaf_change(
        db.connection_mut(),
        goal.id,
        user.id,
        LeafOp::Add {
            title: "Rug".to_string(),
        },
        &rewards,
        now,
    )
    .unwrap();
    assert_eq!(added.xp_earned, 0);
    assert_eq!(added.goal.target_value, Some(3));

    let profile = ProfileManager::new(db.connection()).require(user.id).unwrap();
    assert_eq!(profile.xp, rewards.leaf_reward);
    assert_eq!(profile.current_streak, 1);

    let feed = ActivityFeed::new(db.connection()).recent(10).unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].action, ActivityAction::Add);
    assert_eq!(feed[1].action, ActivityAction::Complete);
}

fn room(titles: &[&str]) -> GoalKind {
    GoalKind::Room {
        items: titles
            .iter()
            .map(|title| RoomItem {
                title: title.to_string(),
                completed: false,
                notes: None,
            })
            .collect(),
    }
}

#[test]
fn test_retoggling_a_leaf_pays_once() {
    let goal = Goal::new("Kitchen", GoalCategory::Casa, room(&["Tiles"]));
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();
    let now = Utc::now();

    let mut earned = Vec::new();
    for minute in 0..5 {
        let receipt = apply_leaf_change(
            db.connection_mut(),
            goal.id,
            user.id,
            LeafOp::Toggle { index: 0 },
            &rewards,
            now + Duration::minutes(minute),
        )
        .unwrap();
        earned.push(receipt.xp_earned);
    }
    assert_eq!(earned, vec![rewards.leaf_reward, 0, 0, 0, 0]);

    let profile = ProfileManager::new(db.connection()).require(user.id).unwrap();
    assert_eq!(profile.xp, rewards.leaf_reward);

    let feed = ActivityFeed::new(db.connection()).recent(10).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].description, "Completed item \"Tiles\" in \"Kitchen\"");
}

#[test]
fn test_leaf_pays_again_in_a_new_period() {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    let goal = Goal::new("Chores", GoalCategory::Casa, room(&["Laundry"]))
        .with_reset(ResetPeriod::Weekly, start);
    let (mut db, user) = setup(&goal);
    let rewards = XpRewards::default();

    let mut toggle = |at| {
        apply_leaf_change(
            db.connection_mut(),
            goal.id,
            user.id,
            LeafOp::Toggle { index: 0 },
            &rewards,
            at,
        )
        .unwrap()
        .xp_earned
    };

    assert_eq!(toggle(start + Duration::days(1)), rewards.leaf_reward);
    assert_eq!(toggle(start + Duration::days(2)), 0);
    assert_eq!(toggle(start + Duration::days(3)), 0);
    // The rollover clears the item, so this completes it in the new week
    assert_eq!(toggle(start + Duration::days(8)), rewards.leaf_reward);
}
