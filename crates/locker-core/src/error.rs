//! Error types for `locker-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("username already taken: {0}")]
  DuplicateUsername(String),

  #[error("email already in use: {0}")]
  DuplicateEmail(String),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("incorrect password")]
  BadPassword,

  /// Delete or update of an id that is not in its table.
  #[error("not found: {0}")]
  NotFound(String),

  /// The acting identity may not perform this operation.
  #[error("forbidden")]
  Forbidden,

  #[error("password hashing error: {0}")]
  Hash(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
