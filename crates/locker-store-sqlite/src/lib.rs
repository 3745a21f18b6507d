//! SQLite backend for the Lyric Locker key-value substrate.
//!
//! One file holds every key, the way one browser origin holds its local
//! storage. Several processes may open the same file; each write is a single
//! atomic upsert.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
