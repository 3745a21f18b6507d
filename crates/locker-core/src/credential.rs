//! Password hashing for user credentials and gate passwords.
//!
//! Secrets are stored only as argon2id PHC strings
//! (`$argon2id$v=19$m=…,t=…,p=…$salt$hash`). Verification reads the cost
//! parameters from the stored string, so hashes made with one parameter set
//! verify under any [`CredentialHasher`].

use argon2::{
  Algorithm, Argon2, Params, Version,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;
use tracing::warn;

use crate::{Error, Result};

/// Hashes and verifies passwords with argon2id.
#[derive(Clone, Default)]
pub struct CredentialHasher {
  argon2: Argon2<'static>,
}

impl CredentialHasher {
  /// Build a hasher with explicit argon2 cost parameters.
  ///
  /// `m_cost` is in KiB and must be at least `8 * p_cost`.
  pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
    let params = Params::new(m_cost, t_cost, p_cost, None)
      .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(Self {
      argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
    })
  }

  /// Hash `password` with a fresh random salt and return the PHC string.
  pub fn hash(&self, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(
      self
        .argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Hash(e.to_string()))?
        .to_string(),
    )
  }

  /// Check `password` against a stored PHC string.
  ///
  /// A stored value that is not a PHC string never verifies.
  pub fn verify(&self, password: &str, phc: &str) -> bool {
    let parsed = match PasswordHash::new(phc) {
      Ok(parsed) => parsed,
      Err(err) => {
        warn!(error = %err, "stored credential is not a PHC string");
        return false;
      }
    };
    self
      .argon2
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}

impl std::fmt::Debug for CredentialHasher {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CredentialHasher").finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hasher() -> CredentialHasher {
    CredentialHasher::with_params(8, 1, 1).unwrap()
  }

  #[test]
  fn hash_then_verify() {
    let h = hasher();
    let phc = h.hash("pw1").unwrap();
    assert!(phc.starts_with("$argon2id$"));
    assert!(h.verify("pw1", &phc));
    assert!(!h.verify("pw2", &phc));
  }

  #[test]
  fn salts_differ() {
    let h = hasher();
    assert_ne!(h.hash("same").unwrap(), h.hash("same").unwrap());
  }

  #[test]
  fn plaintext_never_verifies() {
    assert!(!hasher().verify("pw1", "pw1"));
  }

  #[test]
  fn verify_uses_stored_params() {
    let cheap = hasher().hash("pw1").unwrap();
    let other = CredentialHasher::with_params(16, 2, 1).unwrap();
    assert!(other.verify("pw1", &cheap));
  }

  #[test]
  fn rejects_invalid_params() {
    assert!(matches!(
      CredentialHasher::with_params(1, 1, 1),
      Err(Error::Hash(_))
    ));
  }
}
