//! `liftlog` - A workout tracker with a REST server and a terminal client
//!
//! This library provides the server half (SQLite storage, sessions, password
//! hashing, workouts, sets and stats behind an axum router) and the client
//! half (a typed API client, token storage and plain-text views).

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod password;
pub mod server;
pub mod storage;
pub mod views;

pub use client::{ApiClient, Session, TokenStore};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Exercise, Role, User, Workout, WorkoutSet, WorkoutSummary};
pub use storage::Storage;
