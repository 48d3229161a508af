//! DuoDash - Shared Goals Dashboard for Two
//!
//! A self-hosted dashboard where two partners track shared goals: counters,
//! savings targets, checklists and roadmaps. Logs feed progress, XP, streaks
//! and badges; periodic goals roll over into history; reports forecast
//! savings and flag goals that need attention.

pub mod api;
pub mod error;
pub mod goals;
pub mod journal;
pub mod profiles;
pub mod reports;
pub mod storage;
pub mod tracking;

// Re-export commonly used types
pub use api::{create_router, AppState};
pub use error::{DashboardError, DashboardResult};
pub use goals::{Goal, GoalManager};
pub use profiles::{ProfileManager, UserProfile};
pub use storage::{AppConfig, Database};
pub use tracking::{record_log, LogStore};
