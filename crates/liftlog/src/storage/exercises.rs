//! The shared exercise catalogue.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{is_constraint_violation, Storage};
use crate::error::{Error, Result};
use crate::model::Exercise;

impl Storage {
    fn row_to_exercise(row: &rusqlite::Row) -> rusqlite::Result<Exercise> {
        Ok(Exercise {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    /// List every exercise ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM exercises ORDER BY id")?;
        let exercises = stmt
            .query_map([], Self::row_to_exercise)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    /// Get an exercise by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_exercise(&self, id: i64) -> Result<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                "SELECT id, name FROM exercises WHERE id = ?1",
                [id],
                Self::row_to_exercise,
            )
            .optional()?;
        Ok(exercise)
    }

    /// Whether an exercise with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn exercise_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM exercises WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Add an exercise to the catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_exercise(&self, name: &str) -> Result<Exercise> {
        self.conn
            .execute("INSERT INTO exercises (name) VALUES (?1)", [name])?;
        let id = self.conn.last_insert_rowid();
        debug!(exercise_id = id, "Created exercise");
        Ok(Exercise {
            id,
            name: name.to_string(),
        })
    }

    /// Rename an exercise.
    ///
    /// Returns `None` if no exercise has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn rename_exercise(&self, id: i64, name: &str) -> Result<Option<Exercise>> {
        let affected = self
            .conn
            .execute("UPDATE exercises SET name = ?1 WHERE id = ?2", params![name, id])?;
        if affected == 0 {
            return Ok(None);
        }
        Ok(Some(Exercise {
            id,
            name: name.to_string(),
        }))
    }

    /// Delete an exercise.
    ///
    /// Returns `true` if an exercise was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] while sets still reference the exercise, or
    /// an error if the database operation fails.
    pub fn delete_exercise(&self, id: i64) -> Result<bool> {
        match self.conn.execute("DELETE FROM exercises WHERE id = ?1", [id]) {
            Ok(affected) => Ok(affected > 0),
            Err(e) if is_constraint_violation(&e) => {
                Err(Error::conflict("exercise is used by existing sets"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
