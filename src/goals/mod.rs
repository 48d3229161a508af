//! Shared goals module.
//!
//! Covers the couple's goals across all dashboard sections:
//! - Counter, progress and boolean goals with a running value
//! - Room checklists and business roadmaps whose counters are derived
//! - Weekly and monthly reset cadences with period history

pub mod manager;
pub mod period;
pub mod progress;
pub mod types;

// Re-exports for convenience
pub use manager::{GoalManager, GoalPatch};
pub use period::{HistoryEntry, PeriodSnapshot, PeriodStore};
pub use progress::{LeafChange, LeafKind, LeafOp, LeafProgress, ProgressError, ToggleOutcome};
pub use types::{
    Goal, GoalCategory, GoalKind, GoalMetadata, GoalType, ResetPeriod, RoadmapStep,
    RoadmapSubstep, RoomItem,
};
