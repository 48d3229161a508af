//! Progress tracking.
//!
//! Logs, the activity feed and the ingestion pipeline that ties them to
//! goals and profiles.

pub mod activity;
pub mod ingest;
pub mod logs;
pub mod types;

pub use activity::ActivityFeed;
pub use ingest::{apply_leaf_change, record_log, LeafReceipt, LogReceipt, LogRequest};
pub use logs::LogStore;
pub use types::{Activity, ActivityAction, CategorizedLog, Log};
