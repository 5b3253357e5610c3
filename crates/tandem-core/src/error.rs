//! Error types for `tandem-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::account::Side;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a {0} with this email is already registered")]
  DuplicateEmail(Side),

  /// Returned for an unknown email and for a wrong credential alike.
  #[error("invalid credentials")]
  InvalidCredential,

  #[error("{side} not found: {id}")]
  NotFound { side: Side, id: Uuid },

  #[error("credential hashing failed: {0}")]
  Credential(String),

  /// The backing store failed. Retryable from the caller's point of view.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
