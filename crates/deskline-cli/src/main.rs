//! `deskline` — WFH scheduling from the terminal.
//!
//! Reads `deskline.toml` (or the path given with `--config`), overlaid
//! with `DESKLINE_*` environment variables, signs in against the hosted
//! service, and persists the session between invocations.
//!
//! # Usage
//!
//! ```
//! deskline login --email alice@example.com
//! deskline save --days 2,4
//! deskline week
//! deskline vacation set --from 2025-06-09 --to 2025-06-13
//! ```

mod commands;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use deskline_backend_rest::{RestBackend, RestConfig};
use deskline_client::{ScheduleService, SessionManager};
use deskline_core::auth::{AuthBackend as _, Session};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "deskline", about = "WFH scheduling from the terminal")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "deskline.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Sign in with email and password, persisting the session.
  Login {
    /// Email to sign in with (falls back to the config file).
    #[arg(long, env = "DESKLINE_EMAIL")]
    email: Option<String>,
  },
  /// Invalidate and drop the persisted session.
  Logout,
  /// Show the signed-in user and their profile.
  Whoami,
  /// Print the team's attendance table for a week.
  Week {
    /// Any date inside the week (defaults to today). Normalised to its
    /// Monday.
    #[arg(long)]
    start: Option<NaiveDate>,
  },
  /// Save the caller's WFH days for a week.
  Save {
    /// Weekday numbers, 1=Monday..5=Friday (e.g. --days 2,4).
    #[arg(long, value_delimiter = ',')]
    days: Vec<u8>,

    /// Any date inside the target week (defaults to today).
    #[arg(long)]
    start: Option<NaiveDate>,
  },
  /// Manage the caller's vacations.
  #[command(subcommand)]
  Vacation(VacationCommand),
  /// Who is in the office on a given date.
  Attendance {
    /// Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Probe backend connectivity.
  Ping,
}

#[derive(Subcommand)]
enum VacationCommand {
  /// Show the active or next upcoming vacation.
  Show,
  /// Record a vacation interval (inclusive on both ends).
  Set {
    #[arg(long)]
    from:  NaiveDate,
    #[arg(long)]
    to:    NaiveDate,
    #[arg(long)]
    notes: Option<String>,
  },
  /// Remove current and future vacations. Past intervals are kept.
  Clear,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the TOML config file and the `DESKLINE_*` environment.
#[derive(Debug, Clone, Deserialize)]
struct Settings {
  base_url: String,
  /// The project's public API key.
  anon_key: String,
  #[serde(default)]
  email:    Option<String>,
  /// Where session tokens are persisted between invocations.
  #[serde(default)]
  session_file: Option<PathBuf>,
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Everything a command needs: the services plus the raw backend for
/// session persistence.
struct App {
  backend:      Arc<RestBackend>,
  session:      Arc<SessionManager<RestBackend, RestBackend>>,
  schedule:     ScheduleService<RestBackend, RestBackend>,
  email:        Option<String>,
  session_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("DESKLINE"))
    .build()
    .context("failed to read configuration")?;
  let settings: Settings = settings
    .try_deserialize()
    .context("missing configuration (base_url and anon_key are required)")?;

  let backend = Arc::new(RestBackend::new(RestConfig {
    base_url: settings.base_url.clone(),
    anon_key: settings.anon_key.clone(),
  })?);

  let session_file = settings
    .session_file
    .clone()
    .map(|p| expand_tilde(&p))
    .unwrap_or_else(default_session_file);
  if let Some(session) = load_session(&session_file) {
    backend.restore_session(session);
  }

  let session =
    Arc::new(SessionManager::new(Arc::clone(&backend), Arc::clone(&backend)));
  let schedule =
    ScheduleService::new(Arc::clone(&session), Arc::clone(&backend));

  let app = App {
    backend,
    session,
    schedule,
    email: settings.email,
    session_file,
  };

  let result = match cli.command {
    Command::Login { email } => commands::login(&app, email).await,
    Command::Logout => commands::logout(&app).await,
    Command::Whoami => commands::whoami(&app).await,
    Command::Week { start } => commands::week(&app, start).await,
    Command::Save { days, start } => commands::save(&app, &days, start).await,
    Command::Vacation(VacationCommand::Show) => {
      commands::vacation_show(&app).await
    }
    Command::Vacation(VacationCommand::Set { from, to, notes }) => {
      commands::vacation_set(&app, from, to, notes).await
    }
    Command::Vacation(VacationCommand::Clear) => {
      commands::vacation_clear(&app).await
    }
    Command::Attendance { date } => commands::attendance(&app, date).await,
    Command::Ping => commands::ping(&app).await,
  };

  // Persist whatever session the backend now holds (refreshes rotate
  // tokens mid-command).
  match app.backend.current_session().await? {
    Some(session) => persist_session(&app.session_file, &session)?,
    None => drop_session_file(&app.session_file),
  }

  result
}

// ─── Session persistence ──────────────────────────────────────────────────────

fn default_session_file() -> PathBuf {
  expand_tilde(Path::new("~/.config/deskline/session.json"))
}

fn load_session(path: &Path) -> Option<Session> {
  let raw = std::fs::read_to_string(path).ok()?;
  match serde_json::from_str(&raw) {
    Ok(session) => Some(session),
    Err(err) => {
      tracing::warn!(error = %err, ?path, "ignoring unreadable session file");
      None
    }
  }
}

fn persist_session(path: &Path, session: &Session) -> Result<()> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let raw = serde_json::to_string_pretty(session)?;
  std::fs::write(path, raw)
    .with_context(|| format!("writing session file {}", path.display()))
}

fn drop_session_file(path: &Path) {
  std::fs::remove_file(path).ok();
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
