//! Plain-text views of API responses.
//!
//! Each function renders one response into the text printed by the CLI.
//! Empty lists render a fixed message instead of an empty table.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Result;
use crate::model::{
    DailyVolume, Exercise, PersonalRecord, User, Workout, WorkoutSet, WorkoutSummary,
};

/// Shown for an empty exercise list.
pub const NO_EXERCISES: &str = "No exercises found.";
/// Shown for an empty user list.
pub const NO_USERS: &str = "No users found.";
/// Shown for an empty workout list.
pub const NO_WORKOUTS: &str = "No workouts found.";
/// Shown for a workout without sets.
pub const NO_SETS: &str = "No sets.";
/// Shown when no workouts fall inside the volume window.
pub const NO_VOLUME: &str = "No training volume in this period.";

/// Lay out rows under a header with left-aligned, space-padded columns.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(ToString::to_string).collect();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Format a weight or volume without trailing zeros (`100`, `62.5`).
fn number(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Pretty-printed JSON of any response.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// The logged-in account: name and role.
#[must_use]
pub fn render_user_header(user: &User) -> String {
    format!("{} [{}] <{}>\n", user.display_name(), user.role, user.email)
}

/// Exercise catalogue as a table.
#[must_use]
pub fn render_exercises(exercises: &[Exercise]) -> String {
    if exercises.is_empty() {
        return format!("{NO_EXERCISES}\n");
    }
    let rows: Vec<Vec<String>> = exercises
        .iter()
        .map(|e| vec![e.id.to_string(), e.name.clone()])
        .collect();
    table(&["ID", "Name"], &rows)
}

/// Accounts as a table.
#[must_use]
pub fn render_users(users: &[User]) -> String {
    if users.is_empty() {
        return format!("{NO_USERS}\n");
    }
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.to_string(),
                u.email.clone(),
                u.name.clone(),
                u.surname.clone(),
                u.role.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Email", "Name", "Surname", "Role"], &rows)
}

/// A user's workouts, one line each.
#[must_use]
pub fn render_workouts(workouts: &[WorkoutSummary]) -> String {
    if workouts.is_empty() {
        return format!("{NO_WORKOUTS}\n");
    }
    let mut out = String::new();
    for w in workouts {
        let _ = writeln!(out, "Workout #{}  {}", w.id, w.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    out
}

fn set_rows(sets: &[WorkoutSet]) -> Vec<Vec<String>> {
    sets.iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.exercise_name.clone(),
                s.reps.to_string(),
                number(s.weight),
            ]
        })
        .collect()
}

/// One workout with its sets.
#[must_use]
pub fn render_workout(workout: &Workout) -> String {
    let mut out = format!(
        "Workout #{}  {}\n",
        workout.id,
        workout.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if workout.sets.is_empty() {
        out.push_str(NO_SETS);
        out.push('\n');
    } else {
        out.push_str(&table(
            &["Set ID", "Exercise", "Reps", "Weight (kg)"],
            &set_rows(&workout.sets),
        ));
        let total: f64 = workout.sets.iter().map(WorkoutSet::volume).sum();
        let _ = writeln!(out, "Total volume: {} kg", number(total));
    }
    out
}

/// A single set, as returned by add or update.
#[must_use]
pub fn render_set(set: &WorkoutSet) -> String {
    table(
        &["Set ID", "Exercise", "Reps", "Weight (kg)"],
        &set_rows(std::slice::from_ref(set)),
    )
}

/// Volume per day.
#[must_use]
pub fn render_volume(volume: &[DailyVolume]) -> String {
    if volume.is_empty() {
        return format!("{NO_VOLUME}\n");
    }
    let rows: Vec<Vec<String>> = volume
        .iter()
        .map(|v| vec![v.day.to_string(), number(v.volume)])
        .collect();
    table(&["Day", "Volume (kg)"], &rows)
}

/// Personal records per exercise.
#[must_use]
pub fn render_prs(records: &[PersonalRecord]) -> String {
    if records.is_empty() {
        return format!("{NO_EXERCISES}\n");
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.exercise_id.to_string(),
                r.exercise_name.clone(),
                number(r.max_weight),
                r.max_reps.to_string(),
                number(r.max_volume),
            ]
        })
        .collect();
    table(
        &["ID", "Exercise", "Max weight", "Max reps", "Best set volume"],
        &rows,
    )
}

/// The dashboard: account header, exercise catalogue and workouts.
#[must_use]
pub fn render_dashboard(user: &User, exercises: &[Exercise], workouts: &[WorkoutSummary]) -> String {
    format!(
        "{}\nExercises\n{}\nWorkouts\n{}",
        render_user_header(user),
        render_exercises(exercises),
        render_workouts(workouts)
    )
}
