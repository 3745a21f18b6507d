//! Lyric records and author attribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  id::{LyricId, UserId},
  user::User,
};

/// Attribution used when no other author source is available.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

// ─── Lyric ───────────────────────────────────────────────────────────────────

/// A posted record. Immutable after creation; only deletion is possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyric {
  pub id:                  LyricId,
  pub title:               String,
  pub content:             String,
  /// Attribution string resolved at creation time.
  pub author:              String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author_display_name: Option<String>,
  /// Owning identity. Records written before ownership was tracked have no
  /// `userId` and load as anonymous.
  #[serde(default)]
  pub user_id:             UserId,
  pub created_at:          DateTime<Utc>,
}

impl Lyric {
  /// The name to render: `author_display_name` if set, else `author`.
  pub fn byline(&self) -> &str {
    self
      .author_display_name
      .as_deref()
      .filter(|name| !name.trim().is_empty())
      .unwrap_or(&self.author)
  }
}

// ─── NewLyric ────────────────────────────────────────────────────────────────

/// Input to [`LyricStore::create`](crate::LyricStore::create).
/// `id`, `created_at` and `user_id` are always set by the store.
#[derive(Debug, Clone, Default)]
pub struct NewLyric {
  pub title:   String,
  pub content: String,
  pub author:  AuthorFields,
}

impl NewLyric {
  pub fn new(
    title: impl Into<String>,
    content: impl Into<String>,
    author: AuthorFields,
  ) -> Self {
    Self { title: title.into(), content: content.into(), author }
  }
}

// ─── Author resolution ───────────────────────────────────────────────────────

/// Candidate sources for a lyric's `author` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFields {
  pub display_name: Option<String>,
  pub username:     Option<String>,
  /// Typed by the poster, e.g. when no one is logged in.
  pub free_text:    Option<String>,
}

impl AuthorFields {
  /// Author fields for a logged-in poster.
  pub fn from_user(user: &User) -> Self {
    Self {
      display_name: Some(user.display_name.clone()),
      username:     Some(user.username.clone()),
      free_text:    None,
    }
  }

  /// Author fields for a poster with no session.
  pub fn free_text(text: impl Into<String>) -> Self {
    Self { free_text: Some(text.into()), ..Self::default() }
  }

  pub fn display_name(&self) -> Option<&str> { non_blank(&self.display_name) }
}

/// Resolve the attribution string, first non-blank wins:
///
/// 1. `display_name`
/// 2. `username`
/// 3. `free_text`
/// 4. [`ANONYMOUS_AUTHOR`]
pub fn resolve_author(fields: &AuthorFields) -> String {
  [&fields.display_name, &fields.username, &fields.free_text]
    .into_iter()
    .find_map(non_blank)
    .unwrap_or(ANONYMOUS_AUTHOR)
    .to_owned()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields(
    display_name: Option<&str>,
    username: Option<&str>,
    free_text: Option<&str>,
  ) -> AuthorFields {
    AuthorFields {
      display_name: display_name.map(Into::into),
      username:     username.map(Into::into),
      free_text:    free_text.map(Into::into),
    }
  }

  #[test]
  fn resolution_precedence() {
    assert_eq!(resolve_author(&fields(Some("Alice"), Some("alice"), Some("A"))), "Alice");
    assert_eq!(resolve_author(&fields(None, Some("alice"), Some("A"))), "alice");
    assert_eq!(resolve_author(&fields(None, None, Some("A"))), "A");
    assert_eq!(resolve_author(&fields(None, None, None)), ANONYMOUS_AUTHOR);
  }

  #[test]
  fn blank_candidates_are_skipped() {
    assert_eq!(resolve_author(&fields(Some(""), Some("  "), Some("Bob"))), "Bob");
    assert_eq!(resolve_author(&fields(Some(" "), None, Some(""))), ANONYMOUS_AUTHOR);
  }

  #[test]
  fn resolved_author_is_trimmed() {
    assert_eq!(resolve_author(&AuthorFields::free_text("  Carol ")), "Carol");
  }

  #[test]
  fn legacy_record_without_user_id_is_anonymous() {
    let raw = r#"{
      "id": "1700000000000",
      "title": "T",
      "content": "C",
      "author": "Someone",
      "createdAt": "2024-01-01T00:00:00.000Z"
    }"#;
    let lyric: Lyric = serde_json::from_str(raw).unwrap();
    assert!(lyric.user_id.is_anonymous());
    assert_eq!(lyric.author_display_name, None);
    assert_eq!(lyric.byline(), "Someone");
  }

  #[test]
  fn byline_prefers_display_name() {
    let raw = r#"{
      "id": "1",
      "title": "T",
      "content": "C",
      "author": "alice",
      "authorDisplayName": "Alice L.",
      "userId": "u-1",
      "createdAt": "2024-01-01T00:00:00Z"
    }"#;
    let lyric: Lyric = serde_json::from_str(raw).unwrap();
    assert_eq!(lyric.byline(), "Alice L.");
  }
}
