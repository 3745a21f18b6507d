//! Core types and stores for Lyric Locker.
//!
//! Two stores share one key-value substrate: [`UserStore`] owns the user
//! directory, credentials, and the session pointer; [`LyricStore`] owns the
//! lyric table and enforces who may delete what. Neither store reads the
//! other. Callers pass identity into [`LyricStore`] as a plain [`Actor`].
//!
//! This crate is free of database dependencies. Durable backends implement
//! [`KeyValueStore`]; [`MemoryStore`] is the in-process one.

mod codec;

pub mod credential;
pub mod error;
pub mod gate;
pub mod id;
pub mod keys;
pub mod kv;
pub mod lyric;
pub mod lyric_store;
pub mod policy;
pub mod user;
pub mod user_store;

pub use credential::CredentialHasher;
pub use error::{Error, Result};
pub use gate::GatePassword;
pub use id::{LyricId, UserId};
pub use kv::{KeyValueStore, MemoryStore};
pub use lyric::{AuthorFields, Lyric, NewLyric, resolve_author};
pub use lyric_store::LyricStore;
pub use policy::{Actor, can_access_admin_panel, can_delete};
pub use user::{Session, User};
pub use user_store::UserStore;
