//! Pluggable credential hashing and verification.

use std::sync::OnceLock;

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Turns a provided credential into a stored form and checks one against the
/// other. The store never interprets the stored form.
pub trait CredentialScheme: Send + Sync {
  /// Produce the stored form for a new credential.
  fn hash(&self, provided: &str) -> Result<String>;

  /// `true` iff `provided` matches `stored`. A malformed `stored` value
  /// verifies as `false`.
  fn verify(&self, stored: &str, provided: &str) -> bool;

  /// A well-formed stored value that no real credential maps to. Checked
  /// against when the email is unknown, so that path costs one `verify`
  /// like a wrong credential does.
  fn decoy_hash(&self) -> &str;
}

const DECOY_CREDENTIAL: &str = "tandem-decoy-credential";

/// Salted argon2id, stored as a PHC string (`$argon2id$v=19$…`).
#[derive(Debug, Clone)]
pub struct Argon2Scheme {
  params: Params,
  decoy:  OnceLock<String>,
}

impl Argon2Scheme {
  pub fn new(params: Params) -> Self { Self { params, decoy: OnceLock::new() } }

  /// Build from raw cost parameters: memory in KiB, iterations, lanes.
  pub fn with_costs(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
    let params = Params::new(memory_kib, iterations, parallelism, None)
      .map_err(|e| Error::Credential(e.to_string()))?;
    let scheme = Self::new(params);
    let _ = scheme.decoy_hash();
    Ok(scheme)
  }

  fn hasher(&self) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
  }
}

impl Default for Argon2Scheme {
  fn default() -> Self { Self::new(Params::default()) }
}

impl CredentialScheme for Argon2Scheme {
  fn hash(&self, provided: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = self
      .hasher()
      .hash_password(provided.as_bytes(), &salt)
      .map_err(|e| Error::Credential(e.to_string()))?;
    Ok(hash.to_string())
  }

  fn verify(&self, stored: &str, provided: &str) -> bool {
    // Cost parameters are read back from the PHC string, so hashes made
    // under older settings still verify.
    let Ok(parsed) = PasswordHash::new(stored) else {
      return false;
    };
    self
      .hasher()
      .verify_password(provided.as_bytes(), &parsed)
      .is_ok()
  }

  fn decoy_hash(&self) -> &str {
    // Hashed under this scheme's own costs. A hashing failure leaves an
    // empty decoy, which verifies as `false` without work.
    self
      .decoy
      .get_or_init(|| self.hash(DECOY_CREDENTIAL).unwrap_or_default())
  }
}
