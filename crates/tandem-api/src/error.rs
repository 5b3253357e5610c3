//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  /// Storage failed; the client may retry.
  #[error("service unavailable: {0}")]
  Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<tandem_core::Error> for ApiError {
  fn from(e: tandem_core::Error) -> Self {
    use tandem_core::Error as Core;
    let message = e.to_string();
    match e {
      Core::DuplicateEmail(_) => ApiError::Conflict(message),
      Core::InvalidCredential => ApiError::Unauthorized,
      Core::NotFound { .. } => ApiError::NotFound(message),
      Core::Credential(m) => ApiError::Internal(m),
      Core::StorageUnavailable(source) => ApiError::Unavailable(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, retryable) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone(), false),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone(), false),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone(), false),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), false),
      ApiError::Unavailable(e) => {
        tracing::error!(error = %e, "storage unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable".to_owned(), true)
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned(), false)
      }
    };

    let mut res = if retryable {
      (status, Json(json!({ "error": message, "retryable": true }))).into_response()
    } else {
      (status, Json(json!({ "error": message }))).into_response()
    };
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tandem\""),
      );
    }
    res
  }
}
