//! The match engine: applies a viewer's decision and moves to the next
//! counterpart.
//!
//! ```text
//!   Idle ──select──▶ Presenting(c) ──skip/accept──▶ Presenting(c') | Exhausted
//!     └──select──▶ Exhausted ──select──▶ …
//! ```
//!
//! Nothing here is persisted. An engine is built per interaction from the
//! viewer identity alone, and every transition re-reads the ledger, so an
//! exhausted viewer sees newly registered counterparts on the next entry.

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
  account::{Profile, Side, Viewer},
  decision::{Action, MatchInsert, MatchRecord},
  selector,
  store::{DecisionLedger, IdentityStore},
};

// ─── States & outcomes ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "counterpart", rename_all = "snake_case")]
pub enum SessionState {
  /// Nothing selected yet.
  Idle,
  Presenting(Profile),
  /// Every counterpart is skipped or matched. Re-checked on each entry.
  Exhausted,
}

impl SessionState {
  pub fn from_selection(next: Option<Profile>) -> Self {
    match next {
      Some(p) => Self::Presenting(p),
      None => Self::Exhausted,
    }
  }

  pub fn presented(&self) -> Option<&Profile> {
    match self {
      Self::Presenting(p) => Some(p),
      Self::Idle | Self::Exhausted => None,
    }
  }

  pub fn is_exhausted(&self) -> bool { matches!(self, Self::Exhausted) }
}

/// What a decision did to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "match", rename_all = "snake_case")]
pub enum Outcome {
  MatchCreated(MatchRecord),
  /// Not an error: the pair was already matched, possibly by the other side.
  AlreadyMatched(MatchRecord),
  Skipped,
}

impl From<MatchInsert> for Outcome {
  fn from(insert: MatchInsert) -> Self {
    match insert {
      MatchInsert::Created(r) => Self::MatchCreated(r),
      MatchInsert::AlreadyExists(r) => Self::AlreadyMatched(r),
    }
  }
}

/// `(candidate_id, organization_id)` for a viewer deciding on `counterpart_id`.
pub fn pair_for(viewer: Viewer, counterpart_id: Uuid) -> (Uuid, Uuid) {
  match viewer.side {
    Side::Candidate => (viewer.account_id, counterpart_id),
    Side::Organization => (counterpart_id, viewer.account_id),
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct MatchEngine<'a, S> {
  store:  &'a S,
  viewer: Viewer,
  state:  SessionState,
}

impl<'a, S> MatchEngine<'a, S>
where
  S: IdentityStore + DecisionLedger,
{
  pub fn new(store: &'a S, viewer: Viewer) -> Self {
    Self { store, viewer, state: SessionState::Idle }
  }

  pub fn viewer(&self) -> Viewer { self.viewer }

  pub fn state(&self) -> &SessionState { &self.state }

  pub fn into_state(self) -> SessionState { self.state }

  /// Enter (or re-enter) the flow: ask the selector and move to
  /// `Presenting` or `Exhausted`. Calling this repeatedly without a decision
  /// in between presents the same counterpart.
  pub async fn enter(&mut self) -> Result<&SessionState, S::Error> {
    let next = selector::next_for(self.store, self.viewer).await?;
    self.state = SessionState::from_selection(next);
    Ok(&self.state)
  }

  /// Apply `action` to `counterpart`, then select again.
  ///
  /// `counterpart` must belong to the viewer's opposite side. The decision is
  /// recorded even if `counterpart` is not the one currently presented; the
  /// ledger facts are idempotent either way.
  #[instrument(
    skip(self, counterpart),
    fields(
      side = %self.viewer.side,
      viewer_id = %self.viewer.account_id,
      counterpart_id = %counterpart.id(),
    )
  )]
  pub async fn decide(
    &mut self,
    counterpart: &Profile,
    action: Action,
  ) -> Result<Outcome, S::Error> {
    debug_assert_eq!(counterpart.side(), self.viewer.side.opposite());

    if self.state.presented().is_some_and(|p| p.id() != counterpart.id()) {
      tracing::debug!("decision targets a counterpart other than the presented one");
    }

    let outcome = match action {
      Action::Skip => {
        self.store.record_skip(self.viewer, counterpart.id()).await?;
        tracing::info!("skipped");
        Outcome::Skipped
      }
      Action::Accept => {
        let (candidate_id, organization_id) = pair_for(self.viewer, counterpart.id());
        let insert = self
          .store
          .record_match_if_absent(candidate_id, organization_id)
          .await?;
        if insert.is_created() {
          tracing::info!(match_id = %insert.record().match_id, "match created");
        } else {
          tracing::info!(match_id = %insert.record().match_id, "already matched");
        }
        Outcome::from(insert)
      }
    };

    self.enter().await?;
    Ok(outcome)
  }
}
