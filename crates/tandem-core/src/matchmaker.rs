//! [`Matchmaker`]: the operations the request layer calls.

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{NewProfile, Profile, ProfileEdit, Side, Viewer},
  credential::CredentialScheme,
  decision::{Action, MatchRecord},
  engine::{MatchEngine, Outcome, SessionState},
  identity,
  store::{DecisionLedger, IdentityStore},
};

/// Result of [`Matchmaker::decide`]: what happened, and who is next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
  #[serde(flatten)]
  pub outcome: Outcome,
  pub next:    SessionState,
}

/// A store plus a credential scheme. Holds no per-viewer state; every call
/// takes the viewer explicitly.
#[derive(Debug, Clone)]
pub struct Matchmaker<S, C> {
  store:  S,
  scheme: C,
}

impl<S, C> Matchmaker<S, C>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  pub fn new(store: S, scheme: C) -> Self { Self { store, scheme } }

  pub fn store(&self) -> &S { &self.store }

  pub fn scheme(&self) -> &C { &self.scheme }

  // ── Identity ──────────────────────────────────────────────────────────────

  pub async fn register(&self, input: NewProfile, credential: &str) -> Result<Profile> {
    identity::register(&self.store, &self.scheme, input, credential).await
  }

  pub async fn authenticate(&self, side: Side, email: &str, credential: &str) -> Result<Uuid> {
    identity::authenticate(&self.store, &self.scheme, side, email, credential).await
  }

  pub async fn load(&self, side: Side, id: Uuid) -> Result<Profile> {
    identity::load(&self.store, side, id).await
  }

  pub async fn edit_profile(&self, side: Side, id: Uuid, edit: ProfileEdit) -> Result<Profile> {
    identity::update_profile(&self.store, side, id, edit).await
  }

  // ── Matching ──────────────────────────────────────────────────────────────

  /// Fails with [`Error::NotFound`] when `viewer` names no account.
  async fn ensure_viewer(&self, viewer: Viewer) -> Result<()> {
    self.load(viewer.side, viewer.account_id).await.map(drop)
  }

  /// Who `viewer` should see now: `Presenting` or `Exhausted`.
  pub async fn next_counterpart(&self, viewer: Viewer) -> Result<SessionState> {
    self.ensure_viewer(viewer).await?;
    let mut engine = MatchEngine::new(&self.store, viewer);
    engine.enter().await.map_err(Error::storage)?;
    Ok(engine.into_state())
  }

  /// Apply `viewer`'s decision about `counterpart_id`.
  ///
  /// Fails with [`Error::NotFound`] if the viewer's account is gone or no
  /// account with `counterpart_id` exists on the viewer's opposite side.
  #[instrument(skip(self, viewer), fields(side = %viewer.side, viewer_id = %viewer.account_id))]
  pub async fn decide(
    &self,
    viewer: Viewer,
    counterpart_id: Uuid,
    action: Action,
  ) -> Result<Decision> {
    self.ensure_viewer(viewer).await?;
    let counterpart = self.load(viewer.side.opposite(), counterpart_id).await?;

    let mut engine = MatchEngine::new(&self.store, viewer);
    let outcome = engine
      .decide(&counterpart, action)
      .await
      .map_err(Error::storage)?;

    Ok(Decision { outcome, next: engine.into_state() })
  }

  /// `viewer`'s matches, oldest first.
  pub async fn matches(&self, viewer: Viewer) -> Result<Vec<MatchRecord>> {
    self.ensure_viewer(viewer).await?;
    self.store.matches_of(viewer).await.map_err(Error::storage)
  }
}
