//! `locker`: command-line front end for Lyric Locker.
//!
//! State lives in one SQLite file (see `store_path` in `locker.toml`), so the
//! login session carries over between invocations.
//!
//! # Gate password hashes
//!
//! To generate an argon2 PHC string for `admin_gate_hash`, `post_gate_hash`
//! or `seed_admin_password_hash`:
//!
//! ```
//! locker hash-password
//! ```

mod app;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use locker_core::CredentialHasher;
use locker_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{app::App, settings::LockerConfig};

#[derive(Parser)]
#[command(name = "locker", author, version, about = "Lyric Locker: post and share song lyrics")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "locker.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  #[command(flatten)]
  Store(StoreCommand),
}

/// Commands that open the store.
#[derive(Subcommand)]
enum StoreCommand {
  /// Create an account and log in as it. Reads the password from stdin.
  Register {
    username:     String,
    email:        String,
    #[arg(long, default_value = "")]
    display_name: String,
  },
  /// Log in. Reads the password from stdin.
  Login { username: String },
  Logout,
  /// Show the logged-in user.
  Whoami,
  /// List lyrics, newest first.
  List,
  /// Add a lyric, owned by the logged-in user (or anonymous).
  Post {
    #[arg(long)]
    title:   String,
    #[arg(long)]
    content: String,
    /// Attribution used when no display name or username is available.
    #[arg(long)]
    author:  Option<String>,
  },
  /// Delete a lyric you own, or any lyric as an admin. Requires a login.
  Delete { id: String },
  /// Unlock the admin panel with the admin gate password.
  UnlockAdmin,
  /// List all users (admin panel).
  Users,
  /// Make a user an admin (admin panel).
  Grant { id: String },
  /// Remove a user's admin status (admin panel).
  Revoke { id: String },
  /// Flip a user's admin status (admin panel).
  ToggleAdmin { id: String },
  /// Delete a user and their credential (admin panel).
  DeleteUser { id: String },
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let command = match cli.command {
    Command::HashPassword => {
      let password = app::read_password("Password: ")?;
      println!("{}", CredentialHasher::default().hash(&password)?);
      return Ok(());
    }
    Command::Store(command) => command,
  };

  let cfg = LockerConfig::load(&cli.config)?;

  if let Some(parent) = cfg.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&cfg.store_path)
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let app = App::open(&cfg, store)?;
  dispatch(&app, command)
}

fn dispatch(app: &App, command: StoreCommand) -> anyhow::Result<()> {
  match command {
    StoreCommand::Register { username, email, display_name } => {
      app.register(&username, &display_name, &email)
    }
    StoreCommand::Login { username } => app.login(&username),
    StoreCommand::Logout => app.logout(),
    StoreCommand::Whoami => app.whoami(),
    StoreCommand::List => app.list(),
    StoreCommand::Post { title, content, author } => {
      app.post(&title, &content, author.as_deref())
    }
    StoreCommand::Delete { id } => app.delete(&id),
    StoreCommand::UnlockAdmin => app.unlock_admin(),
    StoreCommand::Users => app.users(),
    StoreCommand::Grant { id } => app.set_admin(&id, Some(true)),
    StoreCommand::Revoke { id } => app.set_admin(&id, Some(false)),
    StoreCommand::ToggleAdmin { id } => app.set_admin(&id, None),
    StoreCommand::DeleteUser { id } => app.delete_user(&id),
  }
}
