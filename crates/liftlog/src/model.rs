//! Core domain types for liftlog.
//!
//! These types are shared by the storage layer, the REST server and the
//! API client, so the JSON shape on the wire is defined exactly once.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages exercises and users.
    Admin,
    /// Regular account that logs workouts.
    #[default]
    Client,
}

impl Role {
    /// The role's lower-case name, as stored and sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }

    /// Whether this role grants access to the admin surface.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

/// A registered account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Database id.
    pub id: i64,
    /// Login email, unique.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// First name.
    pub name: String,
    /// Last name.
    pub surname: String,
}

impl User {
    /// Full display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// An exercise from the shared catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Database id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// A workout as listed, without its sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// Database id.
    pub id: i64,
    /// When the workout was created.
    pub created_at: DateTime<Utc>,
}

/// A workout with all of its sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Database id.
    pub id: i64,
    /// When the workout was created.
    pub created_at: DateTime<Utc>,
    /// Sets in insertion order.
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

/// One set of an exercise inside a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// Database id.
    pub id: i64,
    /// Owning workout.
    pub workout_id: i64,
    /// Performed exercise.
    pub exercise_id: i64,
    /// Name of the performed exercise.
    pub exercise_name: String,
    /// Repetitions.
    pub reps: i64,
    /// Load in kilograms.
    pub weight: f64,
}

impl WorkoutSet {
    /// Volume of this set (reps times weight).
    #[must_use]
    pub fn volume(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let reps = self.reps as f64;
        reps * self.weight
    }
}

/// Training volume for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVolume {
    /// UTC calendar day.
    pub day: NaiveDate,
    /// Sum of reps times weight over every set of that day.
    pub volume: f64,
}

/// Best marks for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    /// Exercise id.
    pub exercise_id: i64,
    /// Exercise name.
    pub exercise_name: String,
    /// Heaviest weight in any set.
    pub max_weight: f64,
    /// Most reps in any set.
    pub max_reps: i64,
    /// Largest reps times weight in a single set.
    pub max_volume: f64,
}

/// Response to a successful login or signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated account.
    pub user: User,
}

/// Response body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    /// The authenticated account.
    pub user: User,
}

/// Body of `POST /login`.
///
/// Fields are optional so that missing values can be reported with a
/// specific message instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Body of `POST /signup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// First name.
    pub name: Option<String>,
    /// Last name.
    pub surname: Option<String>,
}

/// Body of `POST /admin/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// First name.
    pub name: Option<String>,
    /// Last name.
    pub surname: Option<String>,
    /// Role name, `admin` or `client`.
    pub role: Option<String>,
}

/// Body of `POST /exercises` and `PUT /exercises/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseRequest {
    /// Exercise name.
    pub name: Option<String>,
}

/// Body of `POST /workouts/{id}/sets` and `PUT /workouts/{id}/sets/{set_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    /// Exercise performed. Required when adding, optional when updating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<i64>,
    /// Repetitions.
    pub reps: Option<i64>,
    /// Load in kilograms.
    pub weight: Option<f64>,
}

/// Error body returned by the server for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Client.to_string(), "client");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        let err = "root".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("root"));
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn test_role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Client.is_admin());
        assert_eq!(Role::default(), Role::Client);
    }

    #[test]
    fn test_user_display_name() {
        let user = User {
            id: 1,
            email: "ana@example.com".to_string(),
            role: Role::Client,
            name: "Ana".to_string(),
            surname: "Silva".to_string(),
        };
        assert_eq!(user.display_name(), "Ana Silva");
    }

    #[test]
    fn test_set_volume() {
        let set = WorkoutSet {
            id: 1,
            workout_id: 1,
            exercise_id: 1,
            exercise_name: "Squat".to_string(),
            reps: 5,
            weight: 100.0,
        };
        assert!((set.volume() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_workout_without_sets_field_deserializes() {
        let json = r#"{"id": 3, "created_at": "2024-05-01T10:00:00Z"}"#;
        let workout: Workout = serde_json::from_str(json).unwrap();
        assert_eq!(workout.id, 3);
        assert!(workout.sets.is_empty());
    }

    #[test]
    fn test_daily_volume_day_format() {
        let volume = DailyVolume {
            day: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            volume: 1200.5,
        };
        let json = serde_json::to_string(&volume).unwrap();
        assert!(json.contains("\"2024-05-01\""));
    }

    #[test]
    fn test_set_request_omits_missing_exercise() {
        let req = SetRequest {
            exercise_id: None,
            reps: Some(8),
            weight: Some(60.0),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("exercise_id"));
    }

    #[test]
    fn test_login_request_missing_fields_parse() {
        let req: LoginRequest = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.c"));
        assert!(req.password.is_none());
    }
}
