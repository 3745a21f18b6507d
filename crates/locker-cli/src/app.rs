//! Command handlers. Each one calls into the stores and prints the result.
//! The only rules here are the admin-panel check and requiring a session to
//! delete lyrics.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use locker_core::{
  Actor, AuthorFields, CredentialHasher, GatePassword, Lyric, LyricId, LyricStore,
  NewLyric, User, UserId, UserStore,
};
use locker_store_sqlite::SqliteStore;
use tracing::warn;

use crate::settings::{
  DEFAULT_ADMIN_GATE_PASSWORD, DEFAULT_POST_GATE_PASSWORD, LockerConfig,
};

/// Both stores over one shared substrate.
pub struct App {
  users:  UserStore<SqliteStore>,
  lyrics: LyricStore<SqliteStore>,
}

impl App {
  /// Build the stores from `cfg` and run the one-time bootstrap.
  pub fn open(cfg: &LockerConfig, kv: SqliteStore) -> Result<Self> {
    let kv = Arc::new(kv);
    let hasher = CredentialHasher::default();

    let admin_gate = gate_hash(
      &hasher,
      cfg.admin_gate_hash.as_deref(),
      DEFAULT_ADMIN_GATE_PASSWORD,
      "admin",
    )?;
    let post_gate = gate_hash(
      &hasher,
      cfg.post_gate_hash.as_deref(),
      DEFAULT_POST_GATE_PASSWORD,
      "post",
    )?;

    let mut users =
      UserStore::new(kv.clone(), hasher.clone(), GatePassword::admin(admin_gate));
    if let Some(phc) = &cfg.seed_admin_password_hash {
      users = users.with_seed_credential(phc.clone());
    }
    let lyrics = LyricStore::new(kv, hasher, GatePassword::post(post_gate));

    users.bootstrap().context("bootstrap failed")?;
    Ok(Self { users, lyrics })
  }

  // ── Account ───────────────────────────────────────────────────────────────

  pub fn register(&self, username: &str, display_name: &str, email: &str) -> Result<()> {
    let password = read_password("Password: ")?;
    let user = self.users.register(username, display_name, email, &password)?;
    println!("Registered and logged in as {}.", user.label());
    Ok(())
  }

  pub fn login(&self, username: &str) -> Result<()> {
    let password = read_password("Password: ")?;
    let user = self.users.login(username, &password)?;
    println!("Welcome back, {}.", user.label());
    Ok(())
  }

  pub fn logout(&self) -> Result<()> {
    self.users.logout()?;
    self.lyrics.lock_post_gate()?;
    println!("Logged out.");
    Ok(())
  }

  pub fn whoami(&self) -> Result<()> {
    match self.users.refresh_session()? {
      Some(user) => println!("{}", describe_user(&user)),
      None => println!("Not logged in."),
    }
    Ok(())
  }

  // ── Lyrics ────────────────────────────────────────────────────────────────

  pub fn list(&self) -> Result<()> {
    let lyrics = self.lyrics.list()?;
    if lyrics.is_empty() {
      println!("No lyrics yet.");
    }
    for lyric in &lyrics {
      print_lyric(lyric);
    }
    Ok(())
  }

  pub fn post(&self, title: &str, content: &str, author: Option<&str>) -> Result<()> {
    if !self.lyrics.is_post_password_verified()? {
      let password = read_password("Site password: ")?;
      if !self.lyrics.validate_post_password(&password)? {
        bail!("incorrect site password");
      }
    }

    let user = self.users.current_user()?;
    let author_fields = match (&user, author) {
      (_, Some(text)) => AuthorFields {
        free_text: Some(text.to_owned()),
        ..user.as_ref().map(AuthorFields::from_user).unwrap_or_default()
      },
      (Some(user), None) => AuthorFields::from_user(user),
      (None, None) => AuthorFields::default(),
    };
    let owner = user.as_ref().map_or_else(UserId::anonymous, |u| u.id.clone());

    let lyric = self
      .lyrics
      .create(NewLyric::new(title, content, author_fields), &owner)?;
    println!("Added {} ({}).", lyric.title, lyric.id);
    Ok(())
  }

  /// Lyrics posted without a session belong to `anonymous`, so a caller with
  /// no session is refused here rather than matched against them.
  pub fn delete(&self, id: &str) -> Result<()> {
    let Some(user) = self.users.current_user()? else {
      bail!("log in to delete lyrics");
    };
    self.lyrics.delete(&LyricId::new(id), &Actor::from(&user))?;
    println!("Deleted {id}.");
    Ok(())
  }

  // ── Admin panel ───────────────────────────────────────────────────────────

  pub fn unlock_admin(&self) -> Result<()> {
    let password = read_password("Admin password: ")?;
    if !self.users.validate_admin_password(&password)? {
      bail!("incorrect admin password");
    }
    println!("Admin panel unlocked.");
    Ok(())
  }

  pub fn users(&self) -> Result<()> {
    self.require_admin_panel()?;
    for user in self.users.list_users()? {
      println!("{}", describe_user(&user));
    }
    Ok(())
  }

  pub fn set_admin(&self, id: &str, granted: Option<bool>) -> Result<()> {
    self.require_admin_panel()?;
    let id = UserId::new(id);
    let user = match granted {
      Some(granted) => self.users.set_admin(&id, granted)?,
      None => self.users.toggle_admin(&id)?,
    };

    let is_self = self.users.current_user()?.is_some_and(|u| u.id == user.id);
    match (is_self, user.is_admin) {
      (true, true) => println!("You now have admin privileges."),
      (true, false) => println!("Your admin privileges have been removed."),
      (false, _) => println!("{}", describe_user(&user)),
    }
    Ok(())
  }

  pub fn delete_user(&self, id: &str) -> Result<()> {
    self.require_admin_panel()?;
    self.users.delete_user(&UserId::new(id))?;
    println!("Deleted user {id}.");
    Ok(())
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn require_admin_panel(&self) -> Result<()> {
    if !self.users.can_access_admin_panel()? {
      bail!("admin access required: log in as an admin or run `locker unlock-admin`");
    }
    Ok(())
  }
}

fn gate_hash(
  hasher: &CredentialHasher,
  configured: Option<&str>,
  default_password: &str,
  gate: &str,
) -> Result<String> {
  if let Some(phc) = configured {
    return Ok(phc.to_owned());
  }
  warn!(gate, "no gate hash configured, using the built-in default password");
  Ok(hasher.hash(default_password)?)
}

fn describe_user(user: &User) -> String {
  let badge = if user.is_admin { " [admin]" } else { "" };
  format!("{}  {} <{}>  {}{badge}", user.id, user.username, user.email, user.label())
}

fn print_lyric(lyric: &Lyric) {
  println!("── {} ({})", lyric.title, lyric.id);
  println!("By: {}  ·  {}", lyric.byline(), lyric.created_at.format("%Y-%m-%d %H:%M"));
  println!("{}\n", lyric.content);
}

/// Read a password from stdin (no echo suppression).
pub fn read_password(prompt: &str) -> Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("{prompt}");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hasher() -> CredentialHasher { CredentialHasher::with_params(8, 1, 1).unwrap() }

  fn app() -> App {
    let h = hasher();
    let cfg = LockerConfig {
      store_path:               ":memory:".into(),
      admin_gate_hash:          Some(h.hash(DEFAULT_ADMIN_GATE_PASSWORD).unwrap()),
      post_gate_hash:           Some(h.hash(DEFAULT_POST_GATE_PASSWORD).unwrap()),
      seed_admin_password_hash: None,
    };
    App::open(&cfg, SqliteStore::open_in_memory().unwrap()).unwrap()
  }

  fn anonymous_lyric(app: &App) -> Lyric {
    app
      .lyrics
      .create(NewLyric::new("T", "C", AuthorFields::default()), &UserId::anonymous())
      .unwrap()
  }

  #[test]
  fn logged_out_delete_is_refused() {
    let app = app();
    let lyric = anonymous_lyric(&app);

    assert!(app.delete(lyric.id.as_str()).is_err());
    assert_eq!(app.lyrics.list().unwrap(), vec![lyric]);
  }

  #[test]
  fn logged_in_non_owner_cannot_delete_anonymous_lyric() {
    let app = app();
    let lyric = anonymous_lyric(&app);
    app.users.register("alice", "Alice", "a@x.com", "pw1").unwrap();

    assert!(app.delete(lyric.id.as_str()).is_err());
    assert!(app.lyrics.get(&lyric.id).unwrap().is_some());
  }

  #[test]
  fn owner_deletes_own_lyric() {
    let app = app();
    let alice = app.users.register("alice", "Alice", "a@x.com", "pw1").unwrap();
    let lyric = app
      .lyrics
      .create(NewLyric::new("T", "C", AuthorFields::from_user(&alice)), &alice.id)
      .unwrap();

    app.delete(lyric.id.as_str()).unwrap();
    assert!(app.lyrics.list().unwrap().is_empty());
  }

  #[test]
  fn logout_relocks_both_gates() {
    let app = app();
    app.users.validate_admin_password(DEFAULT_ADMIN_GATE_PASSWORD).unwrap();
    app.lyrics.validate_post_password(DEFAULT_POST_GATE_PASSWORD).unwrap();

    app.logout().unwrap();
    assert!(!app.users.is_admin_gate_unlocked().unwrap());
    assert!(!app.lyrics.is_post_password_verified().unwrap());
  }

  #[test]
  fn admin_commands_need_the_panel() {
    let app = app();
    app.users.register("alice", "Alice", "a@x.com", "pw1").unwrap();
    assert!(app.users().is_err());

    app.users.validate_admin_password(DEFAULT_ADMIN_GATE_PASSWORD).unwrap();
    app.users().unwrap();
  }
}
