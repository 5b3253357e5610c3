//! Handlers for account endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/{side}/register` | Body: [`RegisterBody`]; 201 + profile, 409 on duplicate email |
//! | `POST`  | `/{side}/login` | Body: [`LoginBody`]; 200 + account id, 401 otherwise |
//! | `GET`   | `/{side}/me` | Basic auth |
//! | `PATCH` | `/{side}/me` | Basic auth; body: [`EditBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use tandem_core::{
  Matchmaker,
  account::{Profile, Side},
  credential::CredentialScheme,
  store::{DecisionLedger, IdentityStore},
};
use uuid::Uuid;

use crate::{
  auth::AuthViewer,
  error::ApiError,
  validate::{EditBody, LoginBody, RegisterBody, SidePath},
};

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /{side}/register`
pub async fn register<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  SidePath(side): SidePath,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  let (input, password) = body.validate(side)?;
  let profile = mm.register(input, &password).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub side:       Side,
  pub account_id: Uuid,
}

/// `POST /{side}/login`: checks credentials without establishing any
/// server-side session; later calls send Basic auth.
pub async fn login<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  SidePath(side): SidePath,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  let (email, password) = body.validate()?;
  let account_id = mm.authenticate(side, &email, &password).await?;
  Ok(Json(LoginResponse { side, account_id }))
}

// ─── Own profile ─────────────────────────────────────────────────────────────

/// `GET /{side}/me`
pub async fn me<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  AuthViewer(viewer): AuthViewer,
) -> Result<Json<Profile>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  Ok(Json(mm.load(viewer.side, viewer.account_id).await?))
}

/// `PATCH /{side}/me`
pub async fn edit<S, C>(
  State(mm): State<Arc<Matchmaker<S, C>>>,
  AuthViewer(viewer): AuthViewer,
  Json(body): Json<EditBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: IdentityStore + DecisionLedger,
  C: CredentialScheme,
{
  let edit = body.validate()?;
  let profile = mm.edit_profile(viewer.side, viewer.account_id, edit).await?;
  Ok(Json(profile))
}
