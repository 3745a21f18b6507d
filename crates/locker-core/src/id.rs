//! String identifiers for users and lyrics.
//!
//! Ids are opaque strings rather than [`Uuid`]s because persisted tables
//! contain non-UUID ids: the seed admin is `admin-1`, and lyrics posted
//! without a session carry the `anonymous` owner.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner id stamped on lyrics created without a session.
pub const ANONYMOUS: &str = "anonymous";

/// Identifies a [`User`](crate::user::User), or the anonymous owner of a
/// [`Lyric`](crate::lyric::Lyric).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh random id.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn anonymous() -> Self { Self(ANONYMOUS.to_owned()) }

  pub fn is_anonymous(&self) -> bool { self.0 == ANONYMOUS }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for UserId {
  fn default() -> Self { Self::anonymous() }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for UserId {
  fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for UserId {
  fn from(s: String) -> Self { Self(s) }
}

/// Identifies a [`Lyric`](crate::lyric::Lyric).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LyricId(String);

impl LyricId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for LyricId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for LyricId {
  fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for LyricId {
  fn from(s: String) -> Self { Self(s) }
}
