//! Runtime configuration, read from `locker.toml` and `LOCKER_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Gate passwords used when the config provides no hash.
pub const DEFAULT_ADMIN_GATE_PASSWORD: &str = "admin123";
pub const DEFAULT_POST_GATE_PASSWORD: &str = "music123";

const DEFAULT_STORE_PATH: &str = "~/.local/share/lyric-locker/locker.db";

#[derive(Debug, Clone, Deserialize)]
pub struct LockerConfig {
  /// SQLite file holding every table. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:               PathBuf,
  /// argon2 PHC string of the admin gate password.
  #[serde(default)]
  pub admin_gate_hash:          Option<String>,
  /// argon2 PHC string of the post gate password.
  #[serde(default)]
  pub post_gate_hash:           Option<String>,
  /// Credential given to the seed admin when the directory is first created.
  #[serde(default)]
  pub seed_admin_password_hash: Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

impl LockerConfig {
  /// Layer `LOCKER_`-prefixed environment variables over the optional file
  /// at `path`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LOCKER"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise LockerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
