//! Savings trajectory projection.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::goals::{Goal, GoalCategory};
use crate::tracking::CategorizedLog;

/// Average month length used to turn elapsed days into months.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// Forecast for every savings goal, sharing one monthly rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsForecast {
    /// Positive savings deposits per month since the first deposit
    pub monthly_rate: f64,
    pub first_deposit_at: Option<DateTime<Utc>>,
    pub goals: Vec<GoalForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalForecast {
    pub goal_id: Uuid,
    pub title: String,
    pub current_value: i64,
    pub target_value: Option<i64>,
    pub remaining: Option<i64>,
    /// `None` when the goal has no target or nothing is being saved
    pub months_to_target: Option<i64>,
    pub projected_completion: Option<DateTime<Utc>>,
}

/// Monthly savings rate and the time of the first positive savings log.
pub fn monthly_savings_rate(logs: &[CategorizedLog], now: DateTime<Utc>) -> (f64, Option<DateTime<Utc>>) {
    let deposits = logs
        .iter()
        .filter(|l| l.category == GoalCategory::Savings && l.log.value > 0);

    let mut total = 0i64;
    let mut first: Option<DateTime<Utc>> = None;
    for deposit in deposits {
        total += deposit.log.value;
        first = Some(first.map_or(deposit.log.created_at, |f| f.min(deposit.log.created_at)));
    }

    let Some(first) = first else {
        return (0.0, None);
    };

    let elapsed_days = ((now - first).num_seconds() as f64 / 86_400.0).max(1.0);
    let elapsed_months = elapsed_days / DAYS_PER_MONTH;

    (total as f64 / elapsed_months, Some(first))
}

/// Project when each savings goal reaches its target at the current rate.
pub fn savings_forecast(goals: &[Goal], logs: &[CategorizedLog], now: DateTime<Utc>) -> SavingsForecast {
    let (monthly_rate, first_deposit_at) = monthly_savings_rate(logs, now);

    let goals = goals
        .iter()
        .filter(|g| g.category == GoalCategory::Savings)
        .map(|goal| {
            let remaining = goal.target_value.map(|target| target - goal.current_value);
            let months_to_target = match remaining {
                Some(r) if r <= 0 => Some(0),
                Some(r) if monthly_rate > 0.0 => Some((r as f64 / monthly_rate).ceil() as i64),
                _ => None,
            };
            let projected_completion = months_to_target.and_then(|months| {
                u32::try_from(months)
                    .ok()
                    .and_then(|m| now.checked_add_months(Months::new(m)))
            });

            GoalForecast {
                goal_id: goal.id,
                title: goal.title.clone(),
                current_value: goal.current_value,
                target_value: goal.target_value,
                remaining,
                months_to_target,
                projected_completion,
            }
        })
        .collect();

    SavingsForecast {
        monthly_rate,
        first_deposit_at,
        goals,
    }
}
