//! Goal type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::progress::{self, LeafProgress};
use crate::error::{DashboardError, DashboardResult};
use crate::storage::database::UnknownVariant;

/// A shared goal tracked by the couple.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// Unique identifier
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Dashboard section the goal belongs to
    pub category: GoalCategory,
    /// Progress representation, including any nested checklist or roadmap
    pub kind: GoalKind,
    /// Running value
    pub current_value: i64,
    /// Value at which the goal counts as done
    pub target_value: Option<i64>,
    /// Display unit ("km", "€", ...)
    pub unit: Option<String>,
    /// Cadence after which the counter is snapshotted and reset
    pub reset_period: ResetPeriod,
    /// Start of the live period, required when `reset_period` is not `None`
    pub period_start_date: Option<DateTime<Utc>>,
    /// Optional deadline
    pub target_date: Option<DateTime<Utc>>,
    /// Displayed value is derived from elapsed days rather than stored
    pub auto_calculated: bool,
    /// When the goal was created
    pub created_at: DateTime<Utc>,
    /// When the goal was last updated
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create a new goal. Checklist and roadmap goals start with their
    /// counters synced to the collection.
    pub fn new(title: impl Into<String>, category: GoalCategory, kind: GoalKind) -> Self {
        let now = Utc::now();
        let mut goal = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            category,
            kind,
            current_value: 0,
            target_value: None,
            unit: None,
            reset_period: ResetPeriod::None,
            period_start_date: None,
            target_date: None,
            auto_calculated: false,
            created_at: now,
            updated_at: now,
        };
        goal.sync_leaf_counts();
        goal
    }

    /// Builder-style target.
    pub fn with_target(mut self, target: i64) -> Self {
        if !self.kind.is_leaf_based() {
            self.target_value = Some(target);
        }
        self
    }

    /// Builder-style unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Builder-style reset cadence.
    pub fn with_reset(mut self, period: ResetPeriod, start: DateTime<Utc>) -> Self {
        self.reset_period = period;
        self.period_start_date = Some(start);
        self
    }

    pub fn goal_type(&self) -> GoalType {
        self.kind.goal_type()
    }

    /// Rewrite `current_value`/`target_value` from the nested collection.
    ///
    /// No-op for counter, progress and boolean goals.
    pub fn sync_leaf_counts(&mut self) {
        if let Some(leaves) = self.kind.leaf_progress() {
            self.current_value = leaves.completed;
            self.target_value = Some(leaves.total);
        }
    }

    /// Completion percentage in `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        progress::compute_percentage(self.current_value, self.target_value)
    }

    /// Whether the goal has reached a positive target.
    pub fn is_complete(&self) -> bool {
        matches!(self.target_value, Some(target) if target > 0 && self.current_value >= target)
    }
}

/// Dashboard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Lifestyle,
    Savings,
    Business,
    Casa,
    Milestones,
    Fun,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 6] = [
        GoalCategory::Lifestyle,
        GoalCategory::Savings,
        GoalCategory::Business,
        GoalCategory::Casa,
        GoalCategory::Milestones,
        GoalCategory::Fun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Lifestyle => "lifestyle",
            GoalCategory::Savings => "savings",
            GoalCategory::Business => "business",
            GoalCategory::Casa => "casa",
            GoalCategory::Milestones => "milestones",
            GoalCategory::Fun => "fun",
        }
    }
}

impl FromStr for GoalCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire/storage name of a goal's progress representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Free-running counter
    Counter,
    /// Counter towards a target (savings, distances)
    Progress,
    /// Done / not done
    Boolean,
    /// Checklist of room items
    Room,
    /// Ordered steps with optional substeps
    Roadmap,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Counter => "counter",
            GoalType::Progress => "progress",
            GoalType::Boolean => "boolean",
            GoalType::Room => "room",
            GoalType::Roadmap => "roadmap",
        }
    }
}

impl FromStr for GoalType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(GoalType::Counter),
            "progress" => Ok(GoalType::Progress),
            "boolean" => Ok(GoalType::Boolean),
            "room" => Ok(GoalType::Room),
            "roadmap" => Ok(GoalType::Roadmap),
            other => Err(UnknownVariant {
                kind: "goal type",
                value: other.to_string(),
            }),
        }
    }
}

/// Progress representation of a goal.
///
/// Checklist and roadmap goals own their leaves here; there is no separate
/// metadata blob to get out of sync with the type.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalKind {
    Counter,
    Progress,
    Boolean,
    Room { items: Vec<RoomItem> },
    Roadmap { steps: Vec<RoadmapStep> },
}

impl GoalKind {
    /// An empty representation of the given type.
    pub fn empty(goal_type: GoalType) -> Self {
        match goal_type {
            GoalType::Counter => GoalKind::Counter,
            GoalType::Progress => GoalKind::Progress,
            GoalType::Boolean => GoalKind::Boolean,
            GoalType::Room => GoalKind::Room { items: Vec::new() },
            GoalType::Roadmap => GoalKind::Roadmap { steps: Vec::new() },
        }
    }

    /// Combine a type with its wire/storage metadata.
    ///
    /// Metadata on counter-like goals is ignored; metadata of the wrong shape
    /// for a checklist or roadmap is a validation error.
    pub fn from_parts(goal_type: GoalType, metadata: Option<GoalMetadata>) -> DashboardResult<Self> {
        match (goal_type, metadata) {
            (GoalType::Room, Some(GoalMetadata::Room { items })) => Ok(GoalKind::Room { items }),
            (GoalType::Roadmap, Some(GoalMetadata::Roadmap { steps })) => {
                Ok(GoalKind::Roadmap { steps })
            }
            (GoalType::Room, Some(GoalMetadata::Roadmap { .. })) => Err(
                DashboardError::validation("metadata", "room goals take `items`, not `steps`"),
            ),
            (GoalType::Roadmap, Some(GoalMetadata::Room { .. })) => Err(
                DashboardError::validation("metadata", "roadmap goals take `steps`, not `items`"),
            ),
            (goal_type, _) => Ok(Self::empty(goal_type)),
        }
    }

    pub fn goal_type(&self) -> GoalType {
        match self {
            GoalKind::Counter => GoalType::Counter,
            GoalKind::Progress => GoalType::Progress,
            GoalKind::Boolean => GoalType::Boolean,
            GoalKind::Room { .. } => GoalType::Room,
            GoalKind::Roadmap { .. } => GoalType::Roadmap,
        }
    }

    /// Whether the counters are derived from nested leaves.
    pub fn is_leaf_based(&self) -> bool {
        matches!(self, GoalKind::Room { .. } | GoalKind::Roadmap { .. })
    }

    /// Metadata for the wire and for storage.
    pub fn metadata(&self) -> Option<GoalMetadata> {
        match self {
            GoalKind::Room { items } => Some(GoalMetadata::Room {
                items: items.clone(),
            }),
            GoalKind::Roadmap { steps } => Some(GoalMetadata::Roadmap {
                steps: steps.clone(),
            }),
            GoalKind::Counter | GoalKind::Progress | GoalKind::Boolean => None,
        }
    }

    /// Stored progress: checklist items, or roadmap steps counted once each.
    pub fn leaf_progress(&self) -> Option<LeafProgress> {
        match self {
            GoalKind::Room { items } => Some(progress::checklist_progress(items)),
            GoalKind::Roadmap { steps } => Some(progress::roadmap_progress(steps)),
            GoalKind::Counter | GoalKind::Progress | GoalKind::Boolean => None,
        }
    }

    /// Clear every completion flag. Used when a checklist period rolls over.
    pub fn reset_leaves(&mut self) {
        match self {
            GoalKind::Room { items } => items.iter_mut().for_each(|item| item.completed = false),
            GoalKind::Roadmap { steps } => {
                for step in steps.iter_mut() {
                    step.completed = false;
                    step.substeps.iter_mut().for_each(|sub| sub.completed = false);
                }
            }
            GoalKind::Counter | GoalKind::Progress | GoalKind::Boolean => {}
        }
    }
}

/// Loosely-shaped metadata as it appears in JSON bodies and the `metadata_json` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalMetadata {
    Room { items: Vec<RoomItem> },
    Roadmap { steps: Vec<RoadmapStep> },
}

/// A checklist item of a room goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomItem {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A step of a roadmap goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substeps: Vec<RoadmapSubstep>,
}

/// A substep of a roadmap step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapSubstep {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Reset cadence of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPeriod {
    #[default]
    None,
    Weekly,
    Monthly,
}

impl ResetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetPeriod::None => "none",
            ResetPeriod::Weekly => "weekly",
            ResetPeriod::Monthly => "monthly",
        }
    }
}

impl FromStr for ResetPeriod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ResetPeriod::None),
            "weekly" => Ok(ResetPeriod::Weekly),
            "monthly" => Ok(ResetPeriod::Monthly),
            other => Err(UnknownVariant {
                kind: "reset period",
                value: other.to_string(),
            }),
        }
    }
}
