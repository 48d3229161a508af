//! Unit tests for levels, streaks and badges.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use duodash::profiles::badges::{find_badge, newly_earned};
use duodash::profiles::levels::level_threshold;
use duodash::profiles::{compute_level, BadgeStats, Streak, BADGES};

#[test]
fn test_level_is_monotonic_in_xp() {
    let mut previous = compute_level(0);
    assert_eq!(previous.level, 1);

    for xp in (0..=5_000).step_by(25) {
        let level = compute_level(xp);
        assert!(level.level >= previous.level, "level dropped at {xp} XP");
        assert!((0.0..100.0).contains(&level.progress));
        assert!(level.current_threshold <= xp && xp < level.next_threshold);
        previous = level;
    }
}

#[test]
fn test_level_boundaries() {
    for level in 1..=10 {
        let start = level_threshold(level);
        assert_eq!(compute_level(start).level, level);
        if start > 0 {
            assert_eq!(compute_level(start - 1).level, level - 1);
        }
    }
    assert_eq!(compute_level(-40).level, 1);
}

#[test]
fn test_streak_over_a_month() {
    let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    let mut streak = Streak::default();

    for offset in 0..10 {
        streak = streak.advance(start + Duration::days(offset));
    }
    assert_eq!(streak.current, 10);

    // Two idle days restart the streak but keep the record
    streak = streak.advance(start + Duration::days(12));
    assert_eq!(streak.current, 1);
    assert_eq!(streak.longest, 10);

    // Activity dated before the last active day changes nothing
    let skewed = streak.advance(start + Duration::days(3));
    assert_eq!(skewed, streak);
}

#[test]
fn test_badges_are_earned_once() {
    let stats = BadgeStats {
        logs_recorded: 12,
        streak_days: 7,
        level: 2,
        goals_completed: 0,
    };

    let first: Vec<&str> = newly_earned(&stats, &BTreeSet::new())
        .into_iter()
        .map(|badge| badge.id)
        .collect();
    assert_eq!(first, vec!["first_log", "ten_logs", "streak_7"]);

    let owned: BTreeSet<String> = first.iter().map(|id| id.to_string()).collect();
    assert!(newly_earned(&stats, &owned).is_empty());
}

#[test]
fn test_badge_catalog_is_consistent() {
    let ids: BTreeSet<&str> = BADGES.iter().map(|badge| badge.id).collect();
    assert_eq!(ids.len(), BADGES.len());
    for badge in BADGES {
        assert_eq!(find_badge(badge.id), Some(badge));
        assert!(!badge.name.is_empty());
    }
    assert!(find_badge("unknown").is_none());
}
