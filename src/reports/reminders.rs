//! Reminder classification.
//!
//! Reminders are recomputed from goal state on every read and never stored.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::goals::period::period_end;
use crate::goals::{Goal, GoalCategory, GoalKind, ResetPeriod};

/// Lifestyle goals below this percentage of their target get a warning.
pub const LOW_PROGRESS_PERCENT: f64 = 30.0;
pub const DUE_SOON_DAYS: i64 = 14;
pub const PERIOD_ENDING_DAYS: i64 = 2;

/// Ordered most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Urgent,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    LowProgress,
    Overdue,
    DueSoon,
    PeriodEnding,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub goal_id: Uuid,
    pub goal_title: String,
    pub severity: Severity,
    pub kind: ReminderKind,
    pub message: String,
}

/// Classify goals into reminders, most severe first.
pub fn generate_reminders(goals: &[Goal], now: DateTime<Utc>) -> Vec<Reminder> {
    let mut reminders: Vec<Reminder> = goals.iter().flat_map(|goal| goal_reminders(goal, now)).collect();
    reminders.sort_by_key(|r| r.severity);
    reminders
}

fn goal_reminders(goal: &Goal, now: DateTime<Utc>) -> Vec<Reminder> {
    let mut out = Vec::new();
    let mut push = |severity, kind, message: String| {
        out.push(Reminder {
            goal_id: goal.id,
            goal_title: goal.title.clone(),
            severity,
            kind,
            message,
        })
    };

    let has_target = goal.target_value.is_some_and(|t| t > 0);
    let percentage = goal.percentage();
    let complete = goal.is_complete();

    if goal.category == GoalCategory::Lifestyle && has_target && percentage < LOW_PROGRESS_PERCENT {
        push(
            Severity::Warning,
            ReminderKind::LowProgress,
            format!("\"{}\" is at {:.0}% of its target", goal.title, percentage),
        );
    }

    if let Some(due) = goal.target_date {
        if !complete {
            if due < now {
                push(
                    Severity::Urgent,
                    ReminderKind::Overdue,
                    format!("\"{}\" was due {}", goal.title, due.format("%Y-%m-%d")),
                );
            } else if due - now <= Duration::days(DUE_SOON_DAYS) {
                let days = (due - now).num_days();
                push(
                    Severity::Warning,
                    ReminderKind::DueSoon,
                    format!("\"{}\" is due in {} day(s)", goal.title, days),
                );
            }
        }
    }

    if goal.reset_period != ResetPeriod::None && has_target && !complete {
        let end = goal
            .period_start_date
            .and_then(|start| period_end(goal.reset_period, start));
        if let Some(end) = end {
            if end > now && end - now <= Duration::days(PERIOD_ENDING_DAYS) {
                push(
                    Severity::Info,
                    ReminderKind::PeriodEnding,
                    format!(
                        "The {} period of \"{}\" ends soon at {} of {}",
                        goal.reset_period.as_str(),
                        goal.title,
                        goal.current_value,
                        goal.target_value.unwrap_or_default()
                    ),
                );
            }
        }
    }

    if let GoalKind::Roadmap { steps } = &goal.kind {
        for step in steps.iter().filter(|s| s.blocked && !s.completed) {
            push(
                Severity::Info,
                ReminderKind::Blocked,
                format!("Step \"{}\" of \"{}\" is blocked", step.title, goal.title),
            );
        }
    }

    out
}
