//! Progress aggregation.
//!
//! Pure functions deriving completion figures from a goal's raw fields and
//! its nested checklist or roadmap. The only write-back is done by callers:
//! after a leaf mutation they resync `current_value`/`target_value` through
//! [`Goal::sync_leaf_counts`](super::types::Goal::sync_leaf_counts).
//!
//! Roadmaps have two distinct completion metrics:
//! - step completion ([`roadmap_progress`]): each step counts once. This is
//!   what the goal's stored counters hold.
//! - leaf completion ([`roadmap_leaf_progress`]): every substep is its own
//!   unit. Used by the monthly report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::types::{GoalKind, RoadmapStep, RoadmapSubstep, RoomItem};
use crate::error::{DashboardError, DashboardResult};

/// Completed/total leaf counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafProgress {
    pub completed: i64,
    pub total: i64,
}

impl LeafProgress {
    pub fn percentage(&self) -> f64 {
        compute_percentage(self.completed, Some(self.total))
    }
}

/// Errors from leaf mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    /// The index does not address an existing leaf.
    #[error("Index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Percentage of `current` towards `target`, clamped to `[0, 100]`.
///
/// A missing or non-positive target yields 0.
pub fn compute_percentage(current: i64, target: Option<i64>) -> f64 {
    match target {
        Some(target) if target > 0 => {
            let ratio = current as f64 / target as f64 * 100.0;
            ratio.clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Checklist progress: completed items over all items.
pub fn checklist_progress(items: &[RoomItem]) -> LeafProgress {
    LeafProgress {
        completed: items.iter().filter(|item| item.completed).count() as i64,
        total: items.len() as i64,
    }
}

/// Step completion: each step counts once regardless of its substeps.
pub fn roadmap_progress(steps: &[RoadmapStep]) -> LeafProgress {
    LeafProgress {
        completed: steps.iter().filter(|step| step.completed).count() as i64,
        total: steps.len() as i64,
    }
}

/// Leaf completion: substeps count individually, a step without substeps
/// counts as one leaf.
pub fn roadmap_leaf_progress(steps: &[RoadmapStep]) -> LeafProgress {
    steps.iter().fold(
        LeafProgress {
            completed: 0,
            total: 0,
        },
        |acc, step| {
            if step.substeps.is_empty() {
                LeafProgress {
                    completed: acc.completed + i64::from(step.completed),
                    total: acc.total + 1,
                }
            } else {
                LeafProgress {
                    completed: acc.completed
                        + step.substeps.iter().filter(|s| s.completed).count() as i64,
                    total: acc.total + step.substeps.len() as i64,
                }
            }
        },
    )
}

/// Which kind of leaf a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Item,
    Step,
    Substep,
}

/// Result of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub leaf: LeafKind,
    /// Title of the toggled leaf
    pub title: String,
    /// State of the toggled leaf after the flip
    pub completed: bool,
    /// Title of a parent step that the toggle auto-completed
    pub completed_parent: Option<String>,
}

/// Flip a checklist item.
pub fn toggle_room_item(items: &mut [RoomItem], index: usize) -> Result<ToggleOutcome, ProgressError> {
    let len = items.len();
    let item = items
        .get_mut(index)
        .ok_or(ProgressError::OutOfRange { index, len })?;
    item.completed = !item.completed;

    Ok(ToggleOutcome {
        leaf: LeafKind::Item,
        title: item.title.clone(),
        completed: item.completed,
        completed_parent: None,
    })
}

/// Flip a roadmap step, or one of its substeps.
///
/// When every substep of the step ends up completed the step is forced to
/// completed. Unchecking a substep never reopens the step.
pub fn toggle_roadmap_step(
    steps: &mut [RoadmapStep],
    step_index: usize,
    substep_index: Option<usize>,
) -> Result<ToggleOutcome, ProgressError> {
    let len = steps.len();
    let step = steps.get_mut(step_index).ok_or(ProgressError::OutOfRange {
        index: step_index,
        len,
    })?;

    let Some(substep_index) = substep_index else {
        step.completed = !step.completed;
        return Ok(ToggleOutcome {
            leaf: LeafKind::Step,
            title: step.title.clone(),
            completed: step.completed,
            completed_parent: None,
        });
    };

    let sub_len = step.substeps.len();
    let substep = step
        .substeps
        .get_mut(substep_index)
        .ok_or(ProgressError::OutOfRange {
            index: substep_index,
            len: sub_len,
        })?;
    substep.completed = !substep.completed;
    let title = substep.title.clone();
    let completed = substep.completed;

    let mut completed_parent = None;
    if !step.completed && step.substeps.iter().all(|s| s.completed) {
        step.completed = true;
        completed_parent = Some(step.title.clone());
    }

    Ok(ToggleOutcome {
        leaf: LeafKind::Substep,
        title,
        completed,
        completed_parent,
    })
}

/// A completable unit inside goal metadata.
pub trait Leaf {
    fn from_title(title: String) -> Self;
    fn title(&self) -> &str;
}

impl Leaf for RoomItem {
    fn from_title(title: String) -> Self {
        RoomItem {
            title,
            completed: false,
            notes: None,
        }
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Leaf for RoadmapStep {
    fn from_title(title: String) -> Self {
        RoadmapStep {
            title,
            completed: false,
            notes: None,
            blocked: false,
            substeps: Vec::new(),
        }
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Leaf for RoadmapSubstep {
    fn from_title(title: String) -> Self {
        RoadmapSubstep {
            title,
            completed: false,
            notes: None,
        }
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Append an uncompleted leaf with a trimmed title.
///
/// Returns `false` and leaves the collection untouched when the trimmed
/// title is empty.
pub fn add_leaf<L: Leaf>(collection: &mut Vec<L>, title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() {
        return false;
    }
    collection.push(L::from_title(title.to_string()));
    true
}

/// Remove the leaf at `index`.
pub fn remove_leaf<L>(collection: &mut Vec<L>, index: usize) -> Result<L, ProgressError> {
    if index >= collection.len() {
        return Err(ProgressError::OutOfRange {
            index,
            len: collection.len(),
        });
    }
    Ok(collection.remove(index))
}

/// Whole days elapsed from `reference` to `now`, never negative.
pub fn auto_calculated_value(reference: NaiveDate, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - reference).num_days().max(0)
}

/// A mutation of a goal's nested leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafOp {
    /// Append a checklist item or roadmap step
    Add { title: String },
    /// Flip a checklist item or roadmap step
    Toggle { index: usize },
    /// Remove a checklist item or roadmap step
    Remove { index: usize },
    AddSubstep { step: usize, title: String },
    ToggleSubstep { step: usize, substep: usize },
    RemoveSubstep { step: usize, substep: usize },
}

/// What a [`LeafOp`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafChange {
    Added { leaf: LeafKind, title: String },
    Removed { leaf: LeafKind, title: String },
    Toggled(ToggleOutcome),
}

/// Apply a leaf mutation to a goal's representation.
///
/// Fails without modifying `kind` when the goal has no leaves of the
/// requested kind, the title is blank, or an index is stale.
pub fn apply_leaf_op(kind: &mut GoalKind, op: LeafOp) -> DashboardResult<LeafChange> {
    match (kind, op) {
        (GoalKind::Room { items }, LeafOp::Add { title }) => {
            add_checked(items, &title)?;
            Ok(LeafChange::Added {
                leaf: LeafKind::Item,
                title: title.trim().to_string(),
            })
        }
        (GoalKind::Room { items }, LeafOp::Toggle { index }) => {
            Ok(LeafChange::Toggled(toggle_room_item(items, index)?))
        }
        (GoalKind::Room { items }, LeafOp::Remove { index }) => {
            let removed = remove_leaf(items, index)?;
            Ok(LeafChange::Removed {
                leaf: LeafKind::Item,
                title: removed.title,
            })
        }
        (GoalKind::Roadmap { steps }, LeafOp::Add { title }) => {
            add_checked(steps, &title)?;
            Ok(LeafChange::Added {
                leaf: LeafKind::Step,
                title: title.trim().to_string(),
            })
        }
        (GoalKind::Roadmap { steps }, LeafOp::Toggle { index }) => {
            Ok(LeafChange::Toggled(toggle_roadmap_step(steps, index, None)?))
        }
        (GoalKind::Roadmap { steps }, LeafOp::Remove { index }) => {
            let removed = remove_leaf(steps, index)?;
            Ok(LeafChange::Removed {
                leaf: LeafKind::Step,
                title: removed.title,
            })
        }
        (GoalKind::Roadmap { steps }, LeafOp::AddSubstep { step, title }) => {
            let step = step_mut(steps, step)?;
            add_checked(&mut step.substeps, &title)?;
            Ok(LeafChange::Added {
                leaf: LeafKind::Substep,
                title: title.trim().to_string(),
            })
        }
        (GoalKind::Roadmap { steps }, LeafOp::ToggleSubstep { step, substep }) => Ok(
            LeafChange::Toggled(toggle_roadmap_step(steps, step, Some(substep))?),
        ),
        (GoalKind::Roadmap { steps }, LeafOp::RemoveSubstep { step, substep }) => {
            let step = step_mut(steps, step)?;
            let removed = remove_leaf(&mut step.substeps, substep)?;
            Ok(LeafChange::Removed {
                leaf: LeafKind::Substep,
                title: removed.title,
            })
        }
        (GoalKind::Room { .. }, _) => Err(DashboardError::validation(
            "type",
            "room goals have no substeps",
        )),
        (kind, _) => Err(DashboardError::validation(
            "type",
            format!("{} goals have no items", kind.goal_type().as_str()),
        )),
    }
}

fn add_checked<L: Leaf>(collection: &mut Vec<L>, title: &str) -> DashboardResult<()> {
    if add_leaf(collection, title) {
        Ok(())
    } else {
        Err(DashboardError::validation("title", "must not be empty"))
    }
}

fn step_mut(steps: &mut [RoadmapStep], index: usize) -> Result<&mut RoadmapStep, ProgressError> {
    let len = steps.len();
    steps
        .get_mut(index)
        .ok_or(ProgressError::OutOfRange { index, len })
}
