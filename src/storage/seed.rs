//! First-run seeding.

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use super::config::AppConfig;
use crate::error::DashboardResult;
use crate::goals::{
    Goal, GoalCategory, GoalKind, GoalManager, ResetPeriod, RoadmapStep, RoadmapSubstep, RoomItem,
};
use crate::profiles::{ProfileManager, UserProfile};

/// What seeding inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub profiles: usize,
    pub goals: usize,
}

/// Insert the configured profiles and, optionally, starter goals into an
/// empty database. A database that already has profiles is left alone.
pub fn seed_if_empty(
    conn: &mut Connection,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> DashboardResult<SeedReport> {
    let tx = conn.transaction()?;

    let report = {
        let profiles = ProfileManager::new(&tx);
        if profiles.count()? > 0 {
            return Ok(SeedReport::default());
        }

        let mut report = SeedReport::default();
        for (offset, name) in config.couple.partners.iter().enumerate() {
            let mut profile = UserProfile::new(name.trim());
            // Creation order decides the fallback acting user
            profile.created_at = now + Duration::microseconds(offset as i64);
            profile.updated_at = profile.created_at;
            profiles.create(&profile)?;
            report.profiles += 1;
        }

        if config.seed.starter_goals {
            let goals = GoalManager::new(&tx);
            for (offset, mut goal) in starter_goals(config, now).into_iter().enumerate() {
                goal.created_at = now + Duration::microseconds(offset as i64);
                goal.updated_at = goal.created_at;
                goals.create(&goal)?;
                report.goals += 1;
            }
        }
        report
    };

    tx.commit()?;

    tracing::info!(
        "Seeded {} profile(s) and {} starter goal(s)",
        report.profiles,
        report.goals
    );
    Ok(report)
}

fn starter_goals(config: &AppConfig, now: DateTime<Utc>) -> Vec<Goal> {
    let item = |title: &str| RoomItem {
        title: title.to_string(),
        completed: false,
        notes: None,
    };
    let substep = |title: &str| RoadmapSubstep {
        title: title.to_string(),
        completed: false,
        notes: None,
    };

    let mut goals = vec![
        Goal::new("Workouts this week", GoalCategory::Lifestyle, GoalKind::Counter)
            .with_target(4)
            .with_unit("sessions")
            .with_reset(ResetPeriod::Weekly, now),
        Goal::new("Emergency fund", GoalCategory::Savings, GoalKind::Progress)
            .with_target(10_000)
            .with_unit("€"),
        Goal::new(
            "Side business",
            GoalCategory::Business,
            GoalKind::Roadmap {
                steps: vec![
                    RoadmapStep {
                        title: "Validate the idea".to_string(),
                        completed: false,
                        notes: None,
                        blocked: false,
                        substeps: vec![substep("Talk to ten customers"), substep("Price check")],
                    },
                    RoadmapStep {
                        title: "Register the company".to_string(),
                        completed: false,
                        notes: None,
                        blocked: false,
                        substeps: Vec::new(),
                    },
                    RoadmapStep {
                        title: "Launch".to_string(),
                        completed: false,
                        notes: None,
                        blocked: false,
                        substeps: Vec::new(),
                    },
                ],
            },
        ),
        Goal::new(
            "Kitchen",
            GoalCategory::Casa,
            GoalKind::Room {
                items: vec![item("Paint walls"), item("New shelves"), item("Replace lights")],
            },
        ),
        Goal::new("Move in together", GoalCategory::Milestones, GoalKind::Boolean).with_target(1),
    ];

    if config.couple.together_since.is_some() {
        let mut days = Goal::new("Days together", GoalCategory::Fun, GoalKind::Counter).with_unit("days");
        days.auto_calculated = true;
        goals.push(days);
    }

    goals
}
