//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod schema;
pub mod seed;

pub use config::{AppConfig, ConfigError, CoupleSettings, FeedSettings, XpRewards};
pub use database::{Database, DatabaseError};
pub use seed::{seed_if_empty, SeedReport};
