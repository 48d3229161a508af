//! Partner profiles.
//!
//! Profiles carry the gamification state: XP with its derived level,
//! daily streaks and earned badges.

pub mod badges;
pub mod levels;
pub mod manager;
pub mod streaks;
pub mod types;

pub use badges::{BadgeCriterion, BadgeRule, BadgeStats, BADGES};
pub use levels::{compute_level, Level};
pub use manager::ProfileManager;
pub use streaks::Streak;
pub use types::{ProfilePatch, UserProfile};
