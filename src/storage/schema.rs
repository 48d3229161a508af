//! Database schema definitions for DuoDash.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Partner profiles
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    avatar TEXT,
    xp INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_active_date TEXT,
    badges_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Goals table
CREATE TABLE IF NOT EXISTS goals (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    category TEXT NOT NULL,
    goal_type TEXT NOT NULL,
    current_value INTEGER NOT NULL DEFAULT 0,
    target_value INTEGER,
    unit TEXT,
    metadata_json TEXT,
    reset_period TEXT NOT NULL DEFAULT 'none',
    period_start_date TEXT,
    target_date TEXT,
    auto_calculated INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goals_category ON goals(category);

-- Progress logs (append-only)
CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    value INTEGER NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_goal_id ON logs(goal_id);
CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs(created_at);

-- Activity feed (append-only, goal_id may dangle after goal deletion)
CREATE TABLE IF NOT EXISTS activities (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    goal_id TEXT,
    action TEXT NOT NULL,
    description TEXT NOT NULL,
    xp_earned INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activities_created_at ON activities(created_at);

-- Goal notes
CREATE TABLE IF NOT EXISTS goal_notes (
    id TEXT PRIMARY KEY,
    goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_goal_notes_goal_id ON goal_notes(goal_id);

-- Milestone photos
CREATE TABLE IF NOT EXISTS milestone_photos (
    id TEXT PRIMARY KEY,
    goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES profiles(id),
    image_url TEXT NOT NULL,
    caption TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_milestone_photos_goal_id ON milestone_photos(goal_id);

-- Closed reset periods (append-only)
CREATE TABLE IF NOT EXISTS period_history (
    id TEXT PRIMARY KEY,
    goal_id TEXT NOT NULL REFERENCES goals(id) ON DELETE CASCADE,
    period_type TEXT NOT NULL,
    period_start TEXT NOT NULL,
    period_end TEXT NOT NULL,
    final_value INTEGER NOT NULL,
    target_value INTEGER
);

CREATE INDEX IF NOT EXISTS idx_period_history_goal ON period_history(goal_id, period_end);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
