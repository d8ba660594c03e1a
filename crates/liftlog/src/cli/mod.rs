//! Command-line interface for liftlog.
//!
//! This module provides the CLI structure for the `liftlog` binary, which
//! both runs the server and acts as its terminal client.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

pub use commands::{
    ConfigCommand, ExerciseCommand, LoginCommand, OutputFormat, RoleArg, ServeCommand,
    SetCommand, SignupCommand, StatsCommand, UserCommand, WorkoutCommand,
};

/// liftlog - Track workouts, sets and personal records
///
/// Runs the liftlog REST server, or talks to one as a terminal client.
#[derive(Debug, Parser)]
#[command(name = "liftlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Server base URL (overrides `client.base_url`)
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Output format for data views
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the REST server
    Serve(ServeCommand),

    /// Check that the server is up
    Health,

    /// Log in and store the session token
    Login(LoginCommand),

    /// Create an account and log in
    Signup(SignupCommand),

    /// End the session and forget the token
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Show your account, the exercise catalogue and your workouts
    Dashboard,

    /// Browse or manage exercises
    #[command(subcommand)]
    Exercises(ExerciseCommand),

    /// Manage your workouts
    #[command(subcommand)]
    Workouts(WorkoutCommand),

    /// Manage the sets of a workout
    #[command(subcommand)]
    Sets(SetCommand),

    /// Volume and personal records
    #[command(subcommand)]
    Stats(StatsCommand),

    /// Manage accounts (admin)
    #[command(subcommand)]
    Users(UserCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Presence check for an exercise name: non-empty after trimming.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a blank name.
pub fn require_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_input("exercise name is required"));
    }
    Ok(name.to_string())
}

/// Presence check for an id: a positive integer.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming `what` when `id` is not positive.
pub fn require_id(what: &str, id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(Error::invalid_input(format!("invalid {what} id: {id}")));
    }
    Ok(id)
}

/// Presence check for account fields: all non-empty after trimming, except
/// the password which must only be non-empty.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if any field is missing.
pub fn require_fields(email: &str, password: &str, name: &str, surname: &str) -> Result<()> {
    if email.trim().is_empty()
        || password.is_empty()
        || name.trim().is_empty()
        || surname.trim().is_empty()
    {
        return Err(Error::invalid_input(
            "email, password, name and surname are all required",
        ));
    }
    Ok(())
}
