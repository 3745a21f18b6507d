//! Error type for `locker-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// A thread panicked while holding the connection.
  #[error("connection mutex poisoned")]
  Poisoned,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
