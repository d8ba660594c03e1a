//! Workouts and the sets inside them.
//!
//! Workouts belong to a single user and every lookup is scoped by owner.
//! Set operations take a workout id whose ownership the caller has already
//! checked with [`Storage::owns_workout`].

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{format_timestamp, is_constraint_violation, timestamp_column, truncate_to_secs, Storage};
use crate::error::{Error, Result};
use crate::model::{Workout, WorkoutSet, WorkoutSummary};

/// New values for a set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetChange {
    /// Replacement exercise; `None` keeps the current one on update.
    pub exercise_id: Option<i64>,
    /// Repetitions.
    pub reps: i64,
    /// Load in kilograms.
    pub weight: f64,
}

const SET_COLUMNS: &str = r"
    SELECT s.id, s.workout_id, s.exercise_id, e.name, s.reps, s.weight
    FROM workout_sets s JOIN exercises e ON e.id = s.exercise_id
";

fn map_set_constraint(err: rusqlite::Error) -> Error {
    if is_constraint_violation(&err) {
        Error::conflict("exercise not found")
    } else {
        err.into()
    }
}

impl Storage {
    fn row_to_set(row: &rusqlite::Row) -> rusqlite::Result<WorkoutSet> {
        Ok(WorkoutSet {
            id: row.get(0)?,
            workout_id: row.get(1)?,
            exercise_id: row.get(2)?,
            exercise_name: row.get(3)?,
            reps: row.get(4)?,
            weight: row.get(5)?,
        })
    }

    /// Start a workout for `user_id`, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_workout(&self, user_id: i64) -> Result<WorkoutSummary> {
        self.create_workout_at(user_id, Utc::now())
    }

    /// Start a workout for `user_id` with an explicit timestamp.
    ///
    /// The timestamp is stored with second precision.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_workout_at(&self, user_id: i64, created_at: DateTime<Utc>) -> Result<WorkoutSummary> {
        let created_at = truncate_to_secs(created_at);
        self.conn.execute(
            "INSERT INTO workouts (user_id, created_at) VALUES (?1, ?2)",
            params![user_id, format_timestamp(created_at)],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(workout_id = id, user_id, "Created workout");
        Ok(WorkoutSummary { id, created_at })
    }

    /// List a user's workouts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_workouts(&self, user_id: i64) -> Result<Vec<WorkoutSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at FROM workouts WHERE user_id = ?1 ORDER BY id DESC",
        )?;
        let workouts = stmt
            .query_map([user_id], |row| {
                Ok(WorkoutSummary {
                    id: row.get(0)?,
                    created_at: timestamp_column(row, 1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    /// Whether `workout_id` exists and belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn owns_workout(&self, user_id: i64, workout_id: i64) -> Result<bool> {
        let owned: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM workouts WHERE id = ?1 AND user_id = ?2)",
            params![workout_id, user_id],
            |row| row.get(0),
        )?;
        Ok(owned)
    }

    /// Get a user's workout with its sets in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_workout(&self, user_id: i64, workout_id: i64) -> Result<Option<Workout>> {
        let created_at = self
            .conn
            .query_row(
                "SELECT created_at FROM workouts WHERE id = ?1 AND user_id = ?2",
                params![workout_id, user_id],
                |row| timestamp_column(row, 0),
            )
            .optional()?;

        let Some(created_at) = created_at else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(&format!("{SET_COLUMNS} WHERE s.workout_id = ?1 ORDER BY s.id"))?;
        let sets = stmt
            .query_map([workout_id], Self::row_to_set)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(Workout {
            id: workout_id,
            created_at,
            sets,
        }))
    }

    /// Delete a user's workout together with its sets.
    ///
    /// Returns `true` if a workout was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_workout(&self, user_id: i64, workout_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM workouts WHERE id = ?1 AND user_id = ?2",
            params![workout_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Add a set to a workout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] without an exercise id,
    /// [`Error::Conflict`] if the exercise does not exist, or an error if the
    /// database operation fails.
    pub fn add_set(&self, workout_id: i64, set: &SetChange) -> Result<WorkoutSet> {
        let exercise_id = set
            .exercise_id
            .ok_or_else(|| Error::invalid_input("exercise_id is required"))?;

        self.conn
            .execute(
                r"
                INSERT INTO workout_sets (workout_id, exercise_id, reps, weight)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![workout_id, exercise_id, set.reps, set.weight],
            )
            .map_err(map_set_constraint)?;

        let id = self.conn.last_insert_rowid();
        debug!(set_id = id, workout_id, "Added set");
        self.get_set(workout_id, id)?
            .ok_or_else(|| Error::internal(format!("set {id} vanished after insert")))
    }

    /// Get a set of a workout.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_set(&self, workout_id: i64, set_id: i64) -> Result<Option<WorkoutSet>> {
        let set = self
            .conn
            .query_row(
                &format!("{SET_COLUMNS} WHERE s.id = ?1 AND s.workout_id = ?2"),
                params![set_id, workout_id],
                Self::row_to_set,
            )
            .optional()?;
        Ok(set)
    }

    /// Update a set's reps and weight, and its exercise when one is given.
    ///
    /// Returns `None` if the set does not exist in this workout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the new exercise does not exist, or an
    /// error if the database operation fails.
    pub fn update_set(&self, workout_id: i64, set_id: i64, change: &SetChange) -> Result<Option<WorkoutSet>> {
        let affected = self
            .conn
            .execute(
                r"
                UPDATE workout_sets
                SET reps = ?1, weight = ?2, exercise_id = COALESCE(?3, exercise_id)
                WHERE id = ?4 AND workout_id = ?5
                ",
                params![change.reps, change.weight, change.exercise_id, set_id, workout_id],
            )
            .map_err(map_set_constraint)?;

        if affected == 0 {
            return Ok(None);
        }
        self.get_set(workout_id, set_id)
    }

    /// Delete a set from a workout.
    ///
    /// Returns `true` if a set was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_set(&self, workout_id: i64, set_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM workout_sets WHERE id = ?1 AND workout_id = ?2",
            params![set_id, workout_id],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::storage::test_support;
    use chrono::TimeZone;

    fn set(exercise_id: i64, reps: i64, weight: f64) -> SetChange {
        SetChange {
            exercise_id: Some(exercise_id),
            reps,
            weight,
        }
    }

    #[test]
    fn test_create_and_list_workouts_newest_first() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        let first = storage.create_workout(user.id).unwrap();
        let second = storage.create_workout(user.id).unwrap();

        let listed = storage.list_workouts(user.id).unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[test]
    fn test_workouts_are_scoped_to_owner() {
        let storage = test_support::storage();
        let ana = test_support::user(&storage, "ana@example.com", Role::Client);
        let bob = test_support::user(&storage, "bob@example.com", Role::Client);

        let workout = storage.create_workout(ana.id).unwrap();

        assert!(storage.list_workouts(bob.id).unwrap().is_empty());
        assert!(storage.owns_workout(ana.id, workout.id).unwrap());
        assert!(!storage.owns_workout(bob.id, workout.id).unwrap());
        assert!(storage.get_workout(bob.id, workout.id).unwrap().is_none());
        assert!(!storage.delete_workout(bob.id, workout.id).unwrap());
        assert!(storage.get_workout(ana.id, workout.id).unwrap().is_some());
    }

    #[test]
    fn test_create_workout_at_roundtrips_timestamp() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 18, 45, 12).unwrap();

        let created = storage.create_workout_at(user.id, ts).unwrap();
        assert_eq!(created.created_at, ts);

        let workout = storage.get_workout(user.id, created.id).unwrap().unwrap();
        assert_eq!(workout.created_at, ts);
        assert!(workout.sets.is_empty());
    }

    #[test]
    fn test_sets_in_insertion_order_with_names() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let squat = storage.create_exercise("Squat").unwrap();
        let bench = storage.create_exercise("Bench").unwrap();
        let workout = storage.create_workout(user.id).unwrap();

        let a = storage.add_set(workout.id, &set(squat.id, 5, 100.0)).unwrap();
        let b = storage.add_set(workout.id, &set(bench.id, 8, 60.0)).unwrap();
        assert_eq!(a.exercise_name, "Squat");
        assert_eq!(b.workout_id, workout.id);

        let loaded = storage.get_workout(user.id, workout.id).unwrap().unwrap();
        assert_eq!(loaded.sets, vec![a, b]);
    }

    #[test]
    fn test_add_set_requires_existing_exercise() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let workout = storage.create_workout(user.id).unwrap();

        let err = storage.add_set(workout.id, &set(42, 5, 100.0)).unwrap_err();
        assert!(err.is_conflict());

        let err = storage
            .add_set(
                workout.id,
                &SetChange {
                    exercise_id: None,
                    reps: 5,
                    weight: 100.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_update_set_keeps_exercise_when_absent() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let squat = storage.create_exercise("Squat").unwrap();
        let bench = storage.create_exercise("Bench").unwrap();
        let workout = storage.create_workout(user.id).unwrap();
        let added = storage.add_set(workout.id, &set(squat.id, 5, 100.0)).unwrap();

        let updated = storage
            .update_set(
                workout.id,
                added.id,
                &SetChange {
                    exercise_id: None,
                    reps: 6,
                    weight: 102.5,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.exercise_id, squat.id);
        assert_eq!(updated.reps, 6);
        assert!((updated.weight - 102.5).abs() < f64::EPSILON);

        let moved = storage
            .update_set(workout.id, added.id, &set(bench.id, 6, 102.5))
            .unwrap()
            .unwrap();
        assert_eq!(moved.exercise_name, "Bench");
    }

    #[test]
    fn test_update_and_delete_missing_set() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let squat = storage.create_exercise("Squat").unwrap();
        let w1 = storage.create_workout(user.id).unwrap();
        let w2 = storage.create_workout(user.id).unwrap();
        let added = storage.add_set(w1.id, &set(squat.id, 5, 100.0)).unwrap();

        // A set is only reachable through its own workout
        assert!(storage.update_set(w2.id, added.id, &set(squat.id, 1, 1.0)).unwrap().is_none());
        assert!(!storage.delete_set(w2.id, added.id).unwrap());

        assert!(storage.delete_set(w1.id, added.id).unwrap());
        assert!(storage.get_set(w1.id, added.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_workout_cascades_to_sets() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        let squat = storage.create_exercise("Squat").unwrap();
        let workout = storage.create_workout(user.id).unwrap();
        let added = storage.add_set(workout.id, &set(squat.id, 5, 100.0)).unwrap();

        assert!(storage.delete_workout(user.id, workout.id).unwrap());
        assert!(storage.get_set(workout.id, added.id).unwrap().is_none());

        // The exercise is free to delete once no sets reference it
        assert!(storage.delete_exercise(squat.id).unwrap());
    }
}
