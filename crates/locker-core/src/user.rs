//! User records and the session pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

// ─── Seed admin ──────────────────────────────────────────────────────────────

pub const SEED_ADMIN_ID: &str = "admin-1";
pub const SEED_ADMIN_USERNAME: &str = "admin";
pub const SEED_ADMIN_DISPLAY_NAME: &str = "Administrator";
pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";

// ─── User ────────────────────────────────────────────────────────────────────

/// A directory entry. Holds no secret; credentials live under their own keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:           UserId,
  /// Login key. Unique and case-sensitive.
  pub username:     String,
  /// Shown in place of `username` when non-blank.
  pub display_name: String,
  /// Unique across the directory.
  pub email:        String,
  pub is_admin:     bool,
  pub created_at:   DateTime<Utc>,
}

impl User {
  /// The administrator inserted by [`UserStore::bootstrap`](crate::UserStore::bootstrap).
  pub fn seed_admin() -> Self {
    Self {
      id:           UserId::new(SEED_ADMIN_ID),
      username:     SEED_ADMIN_USERNAME.to_owned(),
      display_name: SEED_ADMIN_DISPLAY_NAME.to_owned(),
      email:        SEED_ADMIN_EMAIL.to_owned(),
      is_admin:     true,
      created_at:   Utc::now(),
    }
  }

  /// Name to show for this user: the display name, else the username.
  pub fn label(&self) -> &str {
    let display = self.display_name.trim();
    if display.is_empty() { self.username.as_str() } else { display }
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Who is logged in. Exactly one per substrate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
  #[default]
  LoggedOut,
  LoggedIn(User),
}

impl Session {
  pub fn user(&self) -> Option<&User> {
    match self {
      Self::LoggedOut => None,
      Self::LoggedIn(user) => Some(user),
    }
  }

  pub fn is_logged_in(&self) -> bool { matches!(self, Self::LoggedIn(_)) }
}

impl From<Option<User>> for Session {
  fn from(user: Option<User>) -> Self {
    user.map_or(Self::LoggedOut, Self::LoggedIn)
  }
}
