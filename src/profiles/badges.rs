//! Badge rules.
//!
//! Badges are fixed rules evaluated after each log; a profile keeps the ids
//! of the badges it has earned and never loses one.

use serde::Serialize;
use std::collections::BTreeSet;

/// What a badge requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum BadgeCriterion {
    /// Logs recorded by the profile
    LogsRecorded(i64),
    /// Current daily streak
    StreakDays(i64),
    /// Level reached
    LevelReached(u32),
    /// Shared goals at 100%
    GoalsCompleted(i64),
}

/// A badge definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeRule {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub criterion: BadgeCriterion,
}

/// Every badge that can be earned.
pub const BADGES: &[BadgeRule] = &[
    BadgeRule {
        id: "first_log",
        name: "First Step",
        description: "Record your first log",
        criterion: BadgeCriterion::LogsRecorded(1),
    },
    BadgeRule {
        id: "ten_logs",
        name: "Getting Going",
        description: "Record ten logs",
        criterion: BadgeCriterion::LogsRecorded(10),
    },
    BadgeRule {
        id: "streak_7",
        name: "One Week Strong",
        description: "Stay active seven days in a row",
        criterion: BadgeCriterion::StreakDays(7),
    },
    BadgeRule {
        id: "streak_30",
        name: "Habit Formed",
        description: "Stay active thirty days in a row",
        criterion: BadgeCriterion::StreakDays(30),
    },
    BadgeRule {
        id: "level_5",
        name: "Level Five",
        description: "Reach level 5",
        criterion: BadgeCriterion::LevelReached(5),
    },
    BadgeRule {
        id: "goal_getter",
        name: "Goal Getter",
        description: "Complete a shared goal",
        criterion: BadgeCriterion::GoalsCompleted(1),
    },
];

/// Inputs the badge rules are checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeStats {
    pub logs_recorded: i64,
    pub streak_days: i64,
    pub level: u32,
    pub goals_completed: i64,
}

impl BadgeCriterion {
    pub fn is_met(&self, stats: &BadgeStats) -> bool {
        match *self {
            BadgeCriterion::LogsRecorded(n) => stats.logs_recorded >= n,
            BadgeCriterion::StreakDays(n) => stats.streak_days >= n,
            BadgeCriterion::LevelReached(n) => stats.level >= n,
            BadgeCriterion::GoalsCompleted(n) => stats.goals_completed >= n,
        }
    }
}

/// Look up a badge by id.
pub fn find_badge(id: &str) -> Option<&'static BadgeRule> {
    BADGES.iter().find(|badge| badge.id == id)
}

/// Badges whose criteria are met and that are not yet earned.
pub fn newly_earned(stats: &BadgeStats, earned: &BTreeSet<String>) -> Vec<&'static BadgeRule> {
    BADGES
        .iter()
        .filter(|badge| !earned.contains(badge.id))
        .filter(|badge| badge.criterion.is_met(stats))
        .collect()
}
