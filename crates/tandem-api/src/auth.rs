//! HTTP Basic-auth viewer extractor.
//!
//! Credentials are `email:password`. The account kind comes from the route's
//! `{side}` segment, so the same email may sign in once per side.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use tandem_core::{
  Matchmaker,
  account::Viewer,
  credential::CredentialScheme,
  store::{DecisionLedger, IdentityStore},
};

use crate::{error::ApiError, validate::SidePath};

/// An authenticated viewer. Present in a handler means the request carried
/// valid credentials for an account on the route's side.
#[derive(Debug, Clone, Copy)]
pub struct AuthViewer(pub Viewer);

/// Pull `(email, password)` out of an `Authorization: Basic …` header. The
/// email is trimmed the same way login trims it; the password is not.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.trim().to_owned(), password.to_owned()))
}

impl<S, C> FromRequestParts<Arc<Matchmaker<S, C>>> for AuthViewer
where
  S: IdentityStore + DecisionLedger + 'static,
  C: CredentialScheme + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<Matchmaker<S, C>>,
  ) -> Result<Self, Self::Rejection> {
    let SidePath(side) = SidePath::from_request_parts(parts, state).await?;

    let (email, password) = basic_credentials(&parts.headers)?;
    let account_id = state.authenticate(side, &email, &password).await?;
    Ok(AuthViewer(Viewer::new(side, account_id)))
  }
}
