//! Aggregate queries behind the stats endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use rusqlite::types::Type;

use super::{format_timestamp, Storage};
use crate::error::Result;
use crate::model::{DailyVolume, PersonalRecord};

impl Storage {
    /// Training volume per UTC day over a user's workouts created at or
    /// after `since`, ordered by day.
    ///
    /// Workouts without sets still produce a row with zero volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn volume_by_day(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<DailyVolume>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT date(w.created_at) AS day,
                   COALESCE(SUM(s.reps * s.weight), 0.0) AS volume
            FROM workouts w
            LEFT JOIN workout_sets s ON s.workout_id = w.id
            WHERE w.user_id = ?1 AND w.created_at >= ?2
            GROUP BY day
            ORDER BY day
            ",
        )?;

        let rows = stmt
            .query_map(params![user_id, format_timestamp(since)], |row| {
                let day: String = row.get(0)?;
                let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok(DailyVolume {
                    day,
                    volume: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Best weight, reps and single-set volume per exercise for a user.
    ///
    /// Every catalogue exercise appears, ordered by id; exercises the user
    /// never performed report zeros.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn personal_records(&self, user_id: i64) -> Result<Vec<PersonalRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT e.id, e.name,
                   COALESCE(MAX(s.weight), 0.0),
                   COALESCE(MAX(s.reps), 0),
                   COALESCE(MAX(s.reps * s.weight), 0.0)
            FROM exercises e
            LEFT JOIN workout_sets s
                ON s.exercise_id = e.id
               AND s.workout_id IN (SELECT id FROM workouts WHERE user_id = ?1)
            GROUP BY e.id
            ORDER BY e.id
            ",
        )?;

        let records = stmt
            .query_map([user_id], |row| {
                Ok(PersonalRecord {
                    exercise_id: row.get(0)?,
                    exercise_name: row.get(1)?,
                    max_weight: row.get(2)?,
                    max_reps: row.get(3)?,
                    max_volume: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
