//! Goal notes and milestone photos.

pub mod store;
pub mod types;

pub use store::{post_note, post_photo, JournalStore};
pub use types::{GoalNote, MilestonePhoto};
