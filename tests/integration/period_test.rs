//! Integration tests for the period reset engine.
//!
//! Periods are closed lazily on read and on log, so these tests move the
//! clock by passing explicit timestamps.

use chrono::{Duration, TimeZone, Utc};

use duodash::goals::{Goal, GoalCategory, GoalKind, GoalManager, PeriodStore, ResetPeriod, RoomItem};
use duodash::profiles::{ProfileManager, UserProfile};
use duodash::storage::{Database, XpRewards};
use duodash::tracking::{record_log, ActivityAction, ActivityFeed, LogRequest};

#[test]
fn test_missed_weeks_are_closed_on_read() {
    let db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
    let goal = Goal::new("Gym sessions", GoalCategory::Lifestyle, GoalKind::Counter)
        .with_target(3)
        .with_reset(ResetPeriod::Weekly, start);

    let goals = GoalManager::new(db.connection());
    goals.create(&goal).unwrap();
    goals.add_value(goal.id, 2, start + Duration::days(1)).unwrap();

    let now = start + Duration::days(22);
    let live = goals.find(goal.id, now).unwrap();
    assert_eq!(live.current_value, 0);
    assert_eq!(live.period_start_date, Some(start + Duration::days(21)));

    let snapshots = PeriodStore::new(db.connection()).list_for_goal(goal.id).unwrap();
    assert_eq!(snapshots.len(), 3);

    // Reading again inside the live period changes nothing
    let again = goals.find(goal.id, now + Duration::hours(1)).unwrap();
    assert_eq!(again.period_start_date, live.period_start_date);
    assert_eq!(PeriodStore::new(db.connection()).list_for_goal(goal.id).unwrap().len(), 3);
}

#[test]
fn test_logs_land_in_the_live_period() {
    let mut db = Database::open_in_memory().unwrap();
    let user = UserProfile::new("Ben");
    let start = Utc.with_ymd_and_hms(2026, 2, 2, 8, 0, 0).unwrap();
    let goal = Goal::new("Runs", GoalCategory::Lifestyle, GoalKind::Counter)
        .with_target(4)
        .with_reset(ResetPeriod::Weekly, start);
    ProfileManager::new(db.connection()).create(&user).unwrap();
    GoalManager::new(db.connection()).create(&goal).unwrap();

    let rewards = XpRewards::default();
    let log = |value| LogRequest {
        goal_id: goal.id,
        user_id: user.id,
        value,
        note: None,
    };

    record_log(db.connection_mut(), &log(3), &rewards, start + Duration::days(1)).unwrap();
    let receipt = record_log(db.connection_mut(), &log(5), &rewards, start + Duration::days(8)).unwrap();
    assert_eq!(receipt.goal.current_value, 5);
    assert!(receipt.completed_goal);

    let resets: Vec<String> = ActivityFeed::new(db.connection())
        .recent(20)
        .unwrap()
        .into_iter()
        .filter(|a| a.action == ActivityAction::Reset)
        .map(|a| a.description)
        .collect();
    assert_eq!(resets, vec!["Started a new weekly period for \"Runs\"".to_string()]);

    let now = start + Duration::days(22);
    let history = {
        let tx = db.transaction().unwrap();
        GoalManager::new(&tx).find(goal.id, now).unwrap();
        let history = PeriodStore::new(&tx).history(goal.id).unwrap();
        tx.commit().unwrap();
        history
    };

    let finals: Vec<i64> = history.iter().map(|h| h.snapshot.final_value).collect();
    assert_eq!(finals, vec![0, 5, 3]);
    let trends: Vec<Option<i64>> = history.iter().map(|h| h.trend).collect();
    assert_eq!(trends, vec![Some(-5), Some(2), None]);
    assert_eq!(history[2].snapshot.period_start, start);
    assert_eq!(history[0].snapshot.period_end, start + Duration::days(21));
}

#[test]
fn test_monthly_periods_follow_calendar() {
    let db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
    let goal = Goal::new("Savings", GoalCategory::Savings, GoalKind::Progress)
        .with_target(500)
        .with_reset(ResetPeriod::Monthly, start);

    let goals = GoalManager::new(db.connection());
    goals.create(&goal).unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
    let live = goals.find(goal.id, now).unwrap();
    assert_eq!(
        live.period_start_date,
        Some(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap())
    );

    let snapshots = PeriodStore::new(db.connection()).list_for_goal(goal.id).unwrap();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(|s| s.period_type == ResetPeriod::Monthly));
}

#[test]
fn test_checklist_reset_unchecks_items() {
    let db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2026, 4, 6, 0, 0, 0).unwrap();
    let items = vec![
        RoomItem {
            title: "Laundry".to_string(),
            completed: true,
            notes: None,
        },
        RoomItem {
            title: "Groceries".to_string(),
            completed: false,
            notes: None,
        },
    ];
    let goal = Goal::new("Chores", GoalCategory::Casa, GoalKind::Room { items })
        .with_reset(ResetPeriod::Weekly, start);

    let goals = GoalManager::new(db.connection());
    goals.create(&goal).unwrap();

    let live = goals.find(goal.id, start + Duration::days(7)).unwrap();
    assert_eq!(live.current_value, 0);
    assert_eq!(live.target_value, Some(2));
    match &live.kind {
        GoalKind::Room { items } => assert!(items.iter().all(|item| !item.completed)),
        other => panic!("unexpected kind {other:?}"),
    }

    let snapshots = PeriodStore::new(db.connection()).list_for_goal(goal.id).unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].final_value, 1);
    assert_eq!(snapshots[0].target_value, Some(2));
}
