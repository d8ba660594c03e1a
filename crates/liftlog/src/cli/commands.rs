//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::Role;

/// Server command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Account email
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,
}

/// Signup command arguments.
#[derive(Debug, Args)]
pub struct SignupCommand {
    /// Account email
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,

    /// First name
    #[arg(short, long)]
    pub name: String,

    /// Last name
    #[arg(short, long)]
    pub surname: String,
}

/// Exercise catalogue commands.
#[derive(Debug, Subcommand)]
pub enum ExerciseCommand {
    /// List all exercises
    List,

    /// Show one exercise
    Show {
        /// Exercise ID
        id: i64,
    },

    /// Add an exercise (admin)
    Create {
        /// Exercise name
        name: String,
    },

    /// Rename an exercise (admin)
    Update {
        /// Exercise ID
        id: i64,
        /// New name
        name: String,
    },

    /// Delete an exercise (admin)
    Delete {
        /// Exercise ID
        id: i64,
    },
}

/// Workout commands.
#[derive(Debug, Subcommand)]
pub enum WorkoutCommand {
    /// List your workouts, newest first
    List,

    /// Start a new workout
    Create,

    /// Show a workout with its sets
    Show {
        /// Workout ID
        id: i64,
    },

    /// Delete a workout and its sets
    Delete {
        /// Workout ID
        id: i64,
    },
}

/// Set commands.
#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Add a set to a workout
    Add {
        /// Workout ID
        workout_id: i64,

        /// Exercise ID
        #[arg(short, long)]
        exercise: i64,

        /// Repetitions
        #[arg(short, long)]
        reps: i64,

        /// Weight in kilograms
        #[arg(short, long)]
        weight: f64,
    },

    /// Change a set's reps and weight, and optionally its exercise
    Update {
        /// Workout ID
        workout_id: i64,

        /// Set ID
        set_id: i64,

        /// New exercise ID
        #[arg(short, long)]
        exercise: Option<i64>,

        /// Repetitions
        #[arg(short, long)]
        reps: i64,

        /// Weight in kilograms
        #[arg(short, long)]
        weight: f64,
    },

    /// Delete a set
    Delete {
        /// Workout ID
        workout_id: i64,

        /// Set ID
        set_id: i64,
    },
}

/// Stats commands.
#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Training volume per day
    Volume {
        /// Window length in days (server default is 7)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Personal records per exercise
    Prs,
}

/// Account management commands (admin).
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all accounts
    List,

    /// Create an account
    Create {
        /// Account email
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(short, long)]
        name: String,

        /// Last name
        #[arg(short, long)]
        surname: String,

        /// Account role
        #[arg(short, long, value_enum, default_value = "client")]
        role: RoleArg,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Role argument for account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Administrator
    Admin,
    /// Regular account
    Client,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Client => Self::Client,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}
