//! `liftlog` - CLI for the liftlog workout tracker
//!
//! This binary runs the REST server (`liftlog serve`) and is also its
//! terminal client: login, the dashboard, workouts and sets, stats, and the
//! admin commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use liftlog::cli::{
    self, Cli, Command, ConfigCommand, ExerciseCommand, OutputFormat, SetCommand, StatsCommand,
    UserCommand, WorkoutCommand,
};
use liftlog::model::{NewUserRequest, SetRequest, SignupRequest};
use liftlog::{init_logging, server, views, Config, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config commands load (or skip loading) the file themselves
    if let Command::Config(cmd) = cli.command {
        return handle_config(cli.config, cmd);
    }

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(server) = &cli.server {
        config.client.base_url.clone_from(server);
        config.validate()?;
    }

    let out = Output { format: cli.format };
    match cli.command {
        Command::Serve(cmd) => {
            if let Some(bind) = cmd.bind {
                config.server.bind = bind;
                config.validate()?;
            }
            server::serve(&config).await?;
        }
        Command::Config(_) => unreachable!("handled above"),
        command => {
            let mut session = Session::from_config(&config)?;
            handle_client(&mut session, out, command).await?;
        }
    }
    Ok(())
}

/// Where command results go: text views or pretty JSON on stdout.
#[derive(Debug, Clone, Copy)]
struct Output {
    format: OutputFormat,
}

impl Output {
    fn show<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => print!("{}", views::render_json(value)?),
            OutputFormat::Table => print!("{}", text(value)),
        }
        Ok(())
    }

    fn message(self, message: &str) {
        if self.format == OutputFormat::Table {
            println!("{message}");
        }
    }
}

async fn handle_client(session: &mut Session, out: Output, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Health => {
            let health = session.api().health().await?;
            out.show(&health, |_| format!("Server at {} is up.\n", session.api().base_url()))?;
        }
        Command::Login(cmd) => {
            let auth = session.login(&cmd.email, &cmd.password).await?;
            out.show(&auth.user, |u| {
                format!("Logged in as {} [{}].\n", u.display_name(), u.role)
            })?;
        }
        Command::Signup(cmd) => {
            cli::require_fields(&cmd.email, &cmd.password, &cmd.name, &cmd.surname)?;
            let req = SignupRequest {
                email: Some(cmd.email.trim().to_string()),
                password: Some(cmd.password),
                name: Some(cmd.name.trim().to_string()),
                surname: Some(cmd.surname.trim().to_string()),
            };
            let auth = session.signup(&req).await?;
            out.show(&auth.user, |u| {
                format!("Account created. Logged in as {} [{}].\n", u.display_name(), u.role)
            })?;
        }
        Command::Logout => {
            if let Err(e) = session.logout().await {
                debug!(error = %e, "Logout finished with a server error");
            }
            out.message("Logged out.");
        }
        Command::Whoami => {
            let user = session.ensure_user().await?;
            out.show(&user, views::render_user_header)?;
        }
        Command::Dashboard => handle_dashboard(session, out).await?,
        Command::Exercises(cmd) => handle_exercises(session, out, cmd).await?,
        Command::Workouts(cmd) => handle_workouts(session, out, cmd).await?,
        Command::Sets(cmd) => handle_sets(session, out, cmd).await?,
        Command::Stats(cmd) => handle_stats(session, out, cmd).await?,
        Command::Users(cmd) => handle_users(session, out, cmd).await?,
        Command::Serve(_) | Command::Config(_) => unreachable!("handled in main"),
    }
    Ok(())
}

async fn handle_dashboard(session: &mut Session, out: Output) -> anyhow::Result<()> {
    let user = session.ensure_user().await?;
    let exercises = session.api().list_exercises().await?;
    let workouts = session.api().list_workouts().await?;

    match out.format {
        OutputFormat::Json => {
            let dashboard = json!({ "user": user, "exercises": exercises, "workouts": workouts });
            print!("{}", views::render_json(&dashboard)?);
        }
        OutputFormat::Table => {
            print!("{}", views::render_dashboard(&user, &exercises, &workouts));
        }
    }
    Ok(())
}

async fn handle_exercises(session: &mut Session, out: Output, cmd: ExerciseCommand) -> anyhow::Result<()> {
    match cmd {
        ExerciseCommand::List => {}
        ExerciseCommand::Show { id } => {
            let id = cli::require_id("exercise", id)?;
            let exercise = session.api().get_exercise(id).await?;
            return out.show(&exercise, |e| format!("#{} {}\n", e.id, e.name));
        }
        ExerciseCommand::Create { name } => {
            let name = cli::require_name(&name)?;
            session.ensure_admin().await?;
            let created = session.api().create_exercise(&name).await?;
            out.message(views::render_json(&created)?.trim_end());
        }
        ExerciseCommand::Update { id, name } => {
            let id = cli::require_id("exercise", id)?;
            let name = cli::require_name(&name)?;
            session.ensure_admin().await?;
            let updated = session.api().update_exercise(id, &name).await?;
            out.message(views::render_json(&updated)?.trim_end());
        }
        ExerciseCommand::Delete { id } => {
            let id = cli::require_id("exercise", id)?;
            session.ensure_admin().await?;
            session.api().delete_exercise(id).await?;
            out.message(&format!("Exercise #{id} deleted."));
        }
    }

    // Re-render the catalogue after every change, as the admin page does
    let exercises = session.api().list_exercises().await?;
    out.show(exercises.as_slice(), views::render_exercises)
}

async fn handle_workouts(session: &mut Session, out: Output, cmd: WorkoutCommand) -> anyhow::Result<()> {
    session.ensure_user().await?;
    match cmd {
        WorkoutCommand::List => {}
        WorkoutCommand::Create => {
            let workout = session.api().create_workout().await?;
            out.message(&format!("Workout created with id: {}", workout.id));
        }
        WorkoutCommand::Show { id } => {
            let id = cli::require_id("workout", id)?;
            let workout = session.api().get_workout(id).await?;
            return out.show(&workout, views::render_workout);
        }
        WorkoutCommand::Delete { id } => {
            let id = cli::require_id("workout", id)?;
            session.api().delete_workout(id).await?;
            out.message(&format!("Workout #{id} deleted."));
        }
    }

    let workouts = session.api().list_workouts().await?;
    out.show(workouts.as_slice(), views::render_workouts)
}

async fn handle_sets(session: &mut Session, out: Output, cmd: SetCommand) -> anyhow::Result<()> {
    session.ensure_user().await?;
    let workout_id = match cmd {
        SetCommand::Add {
            workout_id,
            exercise,
            reps,
            weight,
        } => {
            let workout_id = cli::require_id("workout", workout_id)?;
            let req = SetRequest {
                exercise_id: Some(cli::require_id("exercise", exercise)?),
                reps: Some(reps),
                weight: Some(weight),
            };
            let set = session.api().add_set(workout_id, &req).await?;
            out.message("Set added.");
            out.message(views::render_set(&set).trim_end());
            workout_id
        }
        SetCommand::Update {
            workout_id,
            set_id,
            exercise,
            reps,
            weight,
        } => {
            let workout_id = cli::require_id("workout", workout_id)?;
            let set_id = cli::require_id("set", set_id)?;
            let req = SetRequest {
                exercise_id: exercise.map(|id| cli::require_id("exercise", id)).transpose()?,
                reps: Some(reps),
                weight: Some(weight),
            };
            let set = session.api().update_set(workout_id, set_id, &req).await?;
            out.message("Set updated.");
            out.message(views::render_set(&set).trim_end());
            workout_id
        }
        SetCommand::Delete { workout_id, set_id } => {
            let workout_id = cli::require_id("workout", workout_id)?;
            let set_id = cli::require_id("set", set_id)?;
            session.api().delete_set(workout_id, set_id).await?;
            out.message(&format!("Set #{set_id} deleted."));
            workout_id
        }
    };

    // Show the workout again with its current sets
    let workout = session.api().get_workout(workout_id).await?;
    out.show(&workout, views::render_workout)
}

async fn handle_stats(session: &mut Session, out: Output, cmd: StatsCommand) -> anyhow::Result<()> {
    session.ensure_user().await?;
    match cmd {
        StatsCommand::Volume { days } => {
            let volume = session.api().volume(days).await?;
            out.show(volume.as_slice(), views::render_volume)
        }
        StatsCommand::Prs => {
            let records = session.api().personal_records().await?;
            out.show(records.as_slice(), views::render_prs)
        }
    }
}

async fn handle_users(session: &mut Session, out: Output, cmd: UserCommand) -> anyhow::Result<()> {
    session.ensure_admin().await?;
    if let UserCommand::Create {
        email,
        password,
        name,
        surname,
        role,
    } = cmd
    {
        cli::require_fields(&email, &password, &name, &surname)?;
        let req = NewUserRequest {
            email: Some(email.trim().to_string()),
            password: Some(password),
            name: Some(name.trim().to_string()),
            surname: Some(surname.trim().to_string()),
            role: Some(liftlog::Role::from(role).to_string()),
        };
        let created = session.api().create_user(&req).await?;
        out.message(views::render_json(&created)?.trim_end());
    }

    let users = session.api().list_users().await?;
    out.show(users.as_slice(), views::render_users)
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind);
                println!("  Max body bytes:     {}", config.server.max_body_bytes);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Auth]");
                println!("  Session TTL (days): {}", config.auth.session_ttl_days);
                println!("  PBKDF2 iterations:  {}", config.auth.pbkdf2_iterations);
                println!("  Seed admin:         {}", config.auth.seed_admin);
                println!("  Admin email:        {}", config.auth.admin_email);
                println!();
                println!("[Client]");
                println!("  Base URL:           {}", config.client.base_url);
                println!("  Token path:         {}", config.token_path().display());
                println!("  Timeout (secs):     {}", config.client.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration error")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
