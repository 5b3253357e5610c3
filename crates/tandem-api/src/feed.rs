//! Handlers for the review feed.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/{side}/next` | `{"state":"presenting","counterpart":…}` or `{"state":"exhausted"}` |
//! | `POST` | `/{side}/decisions` | Body: [`DecisionBody`]; returns outcome + next state |
//! | `GET`  | `/{side}/matches` | The viewer's matches, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
};
use serde::Deserialize;
use tandem_core::{
  Decision, Matchmaker,
  credential::CredentialScheme,
  decision::{Action, MatchRecord},
  engine::SessionState,
  store::{DecisionLedger, IdentityStore},
};
use uuid::Uuid;

use crate::{auth::AuthViewer, error::ApiError};

/// `GET /{side}/next`
pub async fn next<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  AuthViewer(viewer): AuthViewer,
) -> Result<Json<SessionState>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  Ok(Json(mm.next_counterpart(viewer).await?))
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub counterpart_id: Uuid,
  pub action:         Action,
}

/// `POST /{side}/decisions`, body: `{"counterpart_id":"…","action":"accept"|"skip"}`
pub async fn decide<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  AuthViewer(viewer): AuthViewer,
  Json(body): Json<DecisionBody>,
) -> Result<Json<Decision>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  let decision = mm.decide(viewer, body.counterpart_id, body.action).await?;
  Ok(Json(decision))
}

/// `GET /{side}/matches`
pub async fn matches<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  AuthViewer(viewer): AuthViewer,
) -> Result<Json<Vec<MatchRecord>>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  Ok(Json(mm.matches(viewer).await?))
}
