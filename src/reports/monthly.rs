//! Per-category monthly report.
//!
//! Unlike the stored goal counters, roadmap substeps count here as leaves of
//! their own, so a business roadmap's percentage can differ from the one
//! shown on its card.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::goals::progress::{checklist_progress, compute_percentage, roadmap_leaf_progress, LeafProgress};
use crate::goals::{Goal, GoalCategory, GoalKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: GoalCategory,
    pub goal_count: usize,
    pub completed: i64,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub generated_at: DateTime<Utc>,
    pub categories: Vec<CategoryReport>,
    /// Mean completion of the goals that have any units, each goal weighted
    /// equally so a large savings target does not drown out the checklists
    pub overall_percentage: f64,
}

/// Completion units a goal contributes to its category.
///
/// Counter-like goals contribute their value capped at the target; goals
/// without a positive target contribute nothing.
pub fn goal_units(goal: &Goal) -> LeafProgress {
    match &goal.kind {
        GoalKind::Room { items } => checklist_progress(items),
        GoalKind::Roadmap { steps } => roadmap_leaf_progress(steps),
        GoalKind::Counter | GoalKind::Progress | GoalKind::Boolean => match goal.target_value {
            Some(target) if target > 0 => LeafProgress {
                completed: goal.current_value.clamp(0, target),
                total: target,
            },
            _ => LeafProgress {
                completed: 0,
                total: 0,
            },
        },
    }
}

pub fn monthly_report(goals: &[Goal], now: DateTime<Utc>) -> MonthlyReport {
    let categories: Vec<CategoryReport> = GoalCategory::ALL
        .into_iter()
        .map(|category| {
            let mut report = CategoryReport {
                category,
                goal_count: 0,
                completed: 0,
                total: 0,
                percentage: 0.0,
            };
            for goal in goals.iter().filter(|g| g.category == category) {
                let units = goal_units(goal);
                report.goal_count += 1;
                report.completed += units.completed;
                report.total += units.total;
            }
            report.percentage = compute_percentage(report.completed, Some(report.total));
            report
        })
        .collect();

    let per_goal: Vec<f64> = goals
        .iter()
        .map(goal_units)
        .filter(|units| units.total > 0)
        .map(|units| compute_percentage(units.completed, Some(units.total)))
        .collect();
    let overall_percentage = if per_goal.is_empty() {
        0.0
    } else {
        per_goal.iter().sum::<f64>() / per_goal.len() as f64
    };

    MonthlyReport {
        generated_at: now,
        overall_percentage,
        categories,
    }
}
