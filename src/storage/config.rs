//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory, or from an
//! explicit path. Every section has defaults so a partial file is valid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// HTTP server settings
    pub server: ServerSettings,
    /// Database settings
    pub database: DatabaseSettings,
    /// Read limits for feeds
    pub feed: FeedSettings,
    /// Experience point rewards
    pub xp: XpRewards,
    /// The couple using this dashboard
    pub couple: CoupleSettings,
    /// First-run seeding
    pub seed: SeedSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            feed: FeedSettings::default(),
            xp: XpRewards::default(),
            couple: CoupleSettings::default(),
            seed: SeedSettings::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the SQLite file path.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("duodash.db"))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Explicit database file; defaults to `<data_dir>/duodash.db`
    pub path: Option<PathBuf>,
}

/// Bounds for the "recent" reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Entries returned by the activity feed (capped at 50)
    pub activity_limit: usize,
    /// Entries returned by the recent-logs read
    pub log_limit: usize,
}

impl FeedSettings {
    pub const MAX_ACTIVITY: usize = 50;

    /// Activity limit clamped to the supported window.
    pub fn activity_window(&self) -> usize {
        self.activity_limit.clamp(1, Self::MAX_ACTIVITY)
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            activity_limit: 30,
            log_limit: 50,
        }
    }
}

/// Experience awarded per action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XpRewards {
    /// Awarded for every recorded log
    pub log_reward: i64,
    /// Awarded when a checklist item, roadmap step or substep is completed
    pub leaf_reward: i64,
    /// Awarded when a log carries a goal across its target
    pub goal_complete_bonus: i64,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            log_reward: 10,
            leaf_reward: 5,
            goal_complete_bonus: 50,
        }
    }
}

/// Who uses the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoupleSettings {
    /// Profiles created on first run
    pub partners: Vec<String>,
    /// Profile credited when a request names no user
    pub primary: Option<String>,
    /// Reference date for auto-calculated goals
    pub together_since: Option<NaiveDate>,
}

impl Default for CoupleSettings {
    fn default() -> Self {
        Self {
            partners: vec!["Partner A".to_string(), "Partner B".to_string()],
            primary: None,
            together_since: None,
        }
    }
}

/// First-run seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    /// Insert a starter goal set into an empty database
    pub starter_goals: bool,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            starter_goals: true,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "duodash", "DuoDash")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from a specific file.
///
/// A missing file yields the defaults. The data directory is the file's
/// parent directory.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        tracing::info!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
