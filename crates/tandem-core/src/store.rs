//! Storage traits: the identity store and the decision ledger.
//!
//! Implemented by storage backends (e.g. `tandem-store-sqlite`). The selector,
//! the engine and the [`Matchmaker`](crate::Matchmaker) only ever see these
//! traits.

use std::{collections::HashSet, future::Future};

use uuid::Uuid;

use crate::{
  account::{NewProfile, Profile, ProfileEdit, Side, Viewer},
  decision::{MatchInsert, MatchRecord},
};

// ─── Supporting types ────────────────────────────────────────────────────────

/// Result of [`IdentityStore::insert_account`].
#[derive(Debug, Clone)]
pub enum AccountInsert {
  Created(Profile),
  /// Another account of the same side already uses this email.
  EmailTaken,
}

/// The stored credential for an email, as needed by authentication.
#[derive(Debug, Clone)]
pub struct StoredCredential {
  pub account_id:      Uuid,
  /// Opaque to the store; produced and checked by a
  /// [`CredentialScheme`](crate::credential::CredentialScheme).
  pub credential_hash: String,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Shared error type for a storage backend that implements both
/// [`IdentityStore`] and [`DecisionLedger`].
///
/// All futures are `Send` so backends can be shared across a multi-threaded
/// runtime (e.g. tokio with `axum`).
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

/// Persistence for candidate and organization accounts.
pub trait IdentityStore: Backend {
  /// Persist a new account with its already-hashed credential.
  ///
  /// Must report [`AccountInsert::EmailTaken`] rather than fail when the
  /// email is in use by another account of the same side.
  fn insert_account(
    &self,
    input: NewProfile,
    credential_hash: String,
  ) -> impl Future<Output = Result<AccountInsert, Self::Error>> + Send + '_;

  /// Look up the credential registered for `email` on `side`.
  fn find_credential(
    &self,
    side: Side,
    email: String,
  ) -> impl Future<Output = Result<Option<StoredCredential>, Self::Error>> + Send + '_;

  /// Retrieve one account. Returns `None` if not found.
  fn get_account(
    &self,
    side: Side,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// All accounts of `side` in registration order.
  fn list_accounts(
    &self,
    side: Side,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Apply an owner edit and return the updated profile, or `None` if the
  /// account does not exist.
  fn update_account(
    &self,
    side: Side,
    id: Uuid,
    edit: ProfileEdit,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;
}

/// Append-only skip and match facts.
pub trait DecisionLedger: Backend {
  /// Record that `viewer` skipped `subject_id`. Repeating a skip is a no-op.
  fn record_skip(
    &self,
    viewer: Viewer,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert the pair unless it already exists, atomically with respect to
  /// the pair. A uniqueness conflict is reported as
  /// [`MatchInsert::AlreadyExists`], never as an error.
  fn record_match_if_absent(
    &self,
    candidate_id: Uuid,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<MatchInsert, Self::Error>> + Send + '_;

  /// Ids of every subject `viewer` has skipped.
  fn skipped_subjects_of(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<HashSet<Uuid>, Self::Error>> + Send + '_;

  /// Ids of every counterpart `viewer` is matched with.
  fn matched_counterparts_of(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<HashSet<Uuid>, Self::Error>> + Send + '_;

  /// `viewer`'s matches, oldest first.
  fn matches_of(
    &self,
    viewer: Viewer,
  ) -> impl Future<Output = Result<Vec<MatchRecord>, Self::Error>> + Send + '_;
}
