//! Read-only derived views.
//!
//! Everything here is a pure function over goals, profiles and logs that
//! were already loaded; nothing is stored.

pub mod forecast;
pub mod monthly;
pub mod reminders;
pub mod rollup;
pub mod stats;

pub use forecast::{savings_forecast, GoalForecast, SavingsForecast};
pub use monthly::{monthly_report, CategoryReport, MonthlyReport};
pub use reminders::{generate_reminders, Reminder, ReminderKind, Severity};
pub use rollup::{thirty_day_rollup, Rollup};
pub use stats::{compute_stats, DashboardStats};
