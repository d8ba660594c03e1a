//! `SQLite` schema definitions for liftlog.
//!
//! Timestamps are stored as RFC 3339 text in UTC with second precision
//! (`2024-05-01T10:00:00Z`), so lexical order matches chronological order and
//! `SQLite`'s `date()` can bucket them by day.

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'client')),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
";

/// SQL statement to create the sessions table.
///
/// `token_hash` holds the BLAKE3 digest of the bearer token, never the token.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    expires_at TEXT NOT NULL
)
";

/// SQL statement to create the exercises table.
pub const CREATE_EXERCISES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS exercises (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)
";

/// SQL statement to create the workouts table.
pub const CREATE_WORKOUTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS workouts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the workout sets table.
pub const CREATE_WORKOUT_SETS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS workout_sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
    reps INTEGER NOT NULL,
    weight REAL NOT NULL
)
";

/// Index for listing a user's workouts and windowing them by time.
pub const CREATE_WORKOUTS_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_workouts_user ON workouts(user_id, created_at)
";

/// Index for loading the sets of a workout.
pub const CREATE_SETS_WORKOUT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_workout_sets_workout ON workout_sets(workout_id)
";

/// Index for per-exercise records and the in-use check on delete.
pub const CREATE_SETS_EXERCISE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_workout_sets_exercise ON workout_sets(exercise_id)
";

/// Index for pruning expired sessions.
pub const CREATE_SESSIONS_EXPIRY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_EXERCISES_TABLE,
    CREATE_WORKOUTS_TABLE,
    CREATE_WORKOUT_SETS_TABLE,
    CREATE_WORKOUTS_USER_INDEX,
    CREATE_SETS_WORKOUT_INDEX,
    CREATE_SETS_EXERCISE_INDEX,
    CREATE_SESSIONS_EXPIRY_INDEX,
    CREATE_METADATA_TABLE,
];
