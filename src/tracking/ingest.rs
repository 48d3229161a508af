//! Log ingestion pipeline.
//!
//! Every write that credits a partner goes through here so that the goal,
//! the partner's XP and streak, badges and the activity feed move together
//! inside one SQLite transaction.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use super::activity::ActivityFeed;
use super::logs::LogStore;
use super::types::{Activity, ActivityAction, Log};
use crate::error::{DashboardError, DashboardResult};
use crate::goals::{Goal, GoalManager, LeafChange, LeafKind, LeafOp, ResetPeriod};
use crate::profiles::badges::{self, BadgeStats};
use crate::profiles::{compute_level, ProfileManager};
use crate::storage::config::XpRewards;

/// A progress event to record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRequest {
    pub goal_id: Uuid,
    pub user_id: Uuid,
    pub value: i64,
    pub note: Option<String>,
}

/// What recording a log produced.
#[derive(Debug, Clone)]
pub struct LogReceipt {
    pub log: Log,
    /// The goal after the increment
    pub goal: Goal,
    pub xp_earned: i64,
    /// The log carried the goal across its target
    pub completed_goal: bool,
    pub new_badges: Vec<&'static str>,
}

/// What a leaf mutation produced.
#[derive(Debug, Clone)]
pub struct LeafReceipt {
    pub goal: Goal,
    pub change: LeafChange,
    pub xp_earned: i64,
}

/// Record a log against a goal.
///
/// The goal's period is rolled over first so the delta lands in the live
/// period. Checklist and roadmap goals progress through their leaves and do
/// not accept logs.
pub fn record_log(
    conn: &mut Connection,
    request: &LogRequest,
    rewards: &XpRewards,
    now: DateTime<Utc>,
) -> DashboardResult<LogReceipt> {
    let tx = conn.transaction()?;

    let receipt = {
        let goals = GoalManager::new(&tx);
        let profiles = ProfileManager::new(&tx);
        let feed = ActivityFeed::new(&tx);

        let mut goal = goals
            .get(request.goal_id)?
            .ok_or_else(|| DashboardError::not_found("Goal", request.goal_id))?;
        let closed_periods = goals.settle_period(&mut goal, now)?;
        let user = profiles.require(request.user_id)?;

        if goal.kind.is_leaf_based() {
            return Err(DashboardError::validation(
                "goalId",
                "room and roadmap goals progress through their items, not logs",
            ));
        }

        if closed_periods > 0 {
            feed.append(&Activity::new(
                user.id,
                Some(goal.id),
                ActivityAction::Reset,
                format!("Started a new {} period for \"{}\"", goal.reset_period.as_str(), goal.title),
                0,
                now,
            ))?;
        }

        let was_complete = goal.is_complete();

        let log = Log::new(goal.id, user.id, request.value, request.note.clone(), now);
        LogStore::new(&tx).insert(&log)?;

        goal.current_value = goals.add_value(goal.id, request.value, now)?;
        goal.updated_at = now;

        let mut xp_earned = rewards.log_reward;
        profiles.award_xp(user.id, rewards.log_reward, now)?;
        profiles.record_active_day(user.id, now.date_naive(), now)?;

        feed.append(&Activity::new(
            user.id,
            Some(goal.id),
            ActivityAction::Log,
            describe_log(&goal, request.value),
            rewards.log_reward,
            now,
        ))?;

        let completed_goal = !was_complete && goal.is_complete();
        if completed_goal {
            xp_earned += rewards.goal_complete_bonus;
            profiles.award_xp(user.id, rewards.goal_complete_bonus, now)?;
            feed.append(&Activity::new(
                user.id,
                Some(goal.id),
                ActivityAction::Complete,
                format!("Completed \"{}\"", goal.title),
                rewards.goal_complete_bonus,
                now,
            ))?;
            tracing::info!(goal_id = %goal.id, "Goal '{}' reached its target", goal.title);
        }

        let new_badges = award_badges(&tx, user.id, now)?;

        LogReceipt {
            log,
            goal,
            xp_earned,
            completed_goal,
            new_badges,
        }
    };

    tx.commit()?;

    tracing::debug!(
        goal_id = %receipt.goal.id,
        value = receipt.log.value,
        "Recorded log, goal now at {}",
        receipt.goal.current_value
    );
    Ok(receipt)
}

/// Apply a leaf mutation and credit the acting partner.
///
/// Completing an item, step or substep earns the leaf reward; a step
/// auto-completed by its last substep earns it again. Un-completing earns
/// nothing and takes nothing back. A leaf pays out once per period (once
/// ever on goals that never reset), so toggling it off and on again neither
/// earns XP nor adds to the feed.
pub fn apply_leaf_change(
    conn: &mut Connection,
    goal_id: Uuid,
    user_id: Uuid,
    op: LeafOp,
    rewards: &XpRewards,
    now: DateTime<Utc>,
) -> DashboardResult<LeafReceipt> {
    let tx = conn.transaction()?;

    let receipt = {
        let profiles = ProfileManager::new(&tx);
        let feed = ActivityFeed::new(&tx);

        let user = profiles.require(user_id)?;
        let (goal, change) = GoalManager::new(&tx).apply_leaf_op(goal_id, op, now)?;

        let mut entries = Vec::new();
        match &change {
            LeafChange::Added { leaf, title } => entries.push((
                ActivityAction::Add,
                format!("Added {} \"{}\" to \"{}\"", leaf_label(*leaf), title, goal.title),
                0,
            )),
            LeafChange::Toggled(outcome) if outcome.completed => {
                let action = match outcome.leaf {
                    LeafKind::Item => ActivityAction::Complete,
                    LeafKind::Step | LeafKind::Substep => ActivityAction::StepComplete,
                };
                entries.push((
                    action,
                    format!(
                        "Completed {} \"{}\" in \"{}\"",
                        leaf_label(outcome.leaf),
                        outcome.title,
                        goal.title
                    ),
                    rewards.leaf_reward,
                ));
                if let Some(parent) = &outcome.completed_parent {
                    entries.push((
                        ActivityAction::StepComplete,
                        format!("Completed step \"{}\" in \"{}\"", parent, goal.title),
                        rewards.leaf_reward,
                    ));
                }
            }
            LeafChange::Toggled(_) | LeafChange::Removed { .. } => {}
        }

        // Only the live period counts for goals that reset
        let window = match goal.reset_period {
            ResetPeriod::None => None,
            ResetPeriod::Weekly | ResetPeriod::Monthly => goal.period_start_date,
        };

        let mut xp_earned = 0;
        for (action, description, xp) in entries {
            if xp > 0 && feed.has_rewarded(goal.id, &description, window)? {
                tracing::debug!(goal_id = %goal.id, "Skipping repeat reward: {}", description);
                continue;
            }
            feed.append(&Activity::new(user.id, Some(goal.id), action, description, xp, now))?;
            xp_earned += xp;
        }

        if xp_earned > 0 {
            profiles.award_xp(user.id, xp_earned, now)?;
            profiles.record_active_day(user.id, now.date_naive(), now)?;
            award_badges(&tx, user.id, now)?;
        }

        LeafReceipt {
            goal,
            change,
            xp_earned,
        }
    };

    tx.commit()?;
    Ok(receipt)
}

/// Evaluate the badge rules for a partner and store new badges.
fn award_badges(conn: &Connection, user_id: Uuid, now: DateTime<Utc>) -> DashboardResult<Vec<&'static str>> {
    let profiles = ProfileManager::new(conn);
    let profile = profiles.require(user_id)?;

    let stats = BadgeStats {
        logs_recorded: LogStore::new(conn).count_for_user(user_id)?,
        streak_days: profile.current_streak,
        level: compute_level(profile.xp).level,
        goals_completed: GoalManager::new(conn).count_completed()?,
    };

    let earned: Vec<&'static str> = badges::newly_earned(&stats, &profile.badges)
        .into_iter()
        .map(|badge| badge.id)
        .collect();

    if !earned.is_empty() {
        profiles.add_badges(user_id, &earned, now)?;
        tracing::info!(user_id = %user_id, "Earned badges: {}", earned.join(", "));
    }

    Ok(earned)
}

/// Feed text for a log, e.g. `Logged +5 km on "Run"`.
fn describe_log(goal: &Goal, value: i64) -> String {
    match goal.unit.as_deref() {
        Some(unit) if !unit.is_empty() => {
            format!("Logged {:+} {} on \"{}\"", value, unit, goal.title)
        }
        _ => format!("Logged {:+} on \"{}\"", value, goal.title),
    }
}

fn leaf_label(leaf: LeafKind) -> &'static str {
    match leaf {
        LeafKind::Item => "item",
        LeafKind::Step => "step",
        LeafKind::Substep => "substep",
    }
}
