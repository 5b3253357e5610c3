//! Request bodies and their validation into typed core inputs.
//!
//! The core trusts its inputs; everything a client sends is trimmed and
//! checked here first.

use axum::{
  extract::{FromRequestParts, Path},
  http::request::Parts,
};
use serde::Deserialize;
use tandem_core::account::{NewCandidate, NewOrganization, NewProfile, ProfileEdit, Side};

use crate::error::ApiError;

/// The `{side}` path segment. Anything other than `candidate` or
/// `organization` is a 404 on every route.
#[derive(Debug, Clone, Copy)]
pub struct SidePath(pub Side);

impl<St> FromRequestParts<St> for SidePath
where
  St: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
    let Path(side) = Path::<Side>::from_request_parts(parts, state)
      .await
      .map_err(|e| ApiError::NotFound(e.body_text()))?;
    Ok(SidePath(side))
  }
}

/// `POST /{side}/register`. `skills` is required for candidates,
/// `description` for organizations.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:        String,
  pub email:       String,
  pub phone:       String,
  pub password:    String,
  pub skills:      Option<String>,
  pub description: Option<String>,
}

/// `POST /{side}/login`.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `PATCH /{side}/me`.
#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub name:  Option<String>,
  /// Skills for a candidate, description for an organization.
  pub about: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ApiError::BadRequest(format!("{field} is required")));
  }
  Ok(trimmed.to_owned())
}

/// Loose shape check: one `@`, something on both sides, a dot in the domain.
pub fn email(value: &str) -> Result<String, ApiError> {
  let email = required("email", value)?;
  let valid = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
    }
    None => false,
  };
  if !valid {
    return Err(ApiError::BadRequest(format!("{email:?} is not a valid email address")));
  }
  Ok(email)
}

impl RegisterBody {
  /// Validate for `side`, returning the profile input and the raw password.
  pub fn validate(self, side: Side) -> Result<(NewProfile, String), ApiError> {
    let name  = required("name", &self.name)?;
    let email = email(&self.email)?;
    let phone = required("phone", &self.phone)?;
    if self.password.is_empty() {
      return Err(ApiError::BadRequest("password is required".into()));
    }

    let profile = match side {
      Side::Candidate => NewProfile::Candidate(NewCandidate {
        name,
        email,
        phone,
        skills: required("skills", self.skills.as_deref().unwrap_or_default())?,
      }),
      Side::Organization => NewProfile::Organization(NewOrganization {
        name,
        email,
        phone,
        description: required("description", self.description.as_deref().unwrap_or_default())?,
      }),
    };
    Ok((profile, self.password))
  }
}

impl LoginBody {
  pub fn validate(self) -> Result<(String, String), ApiError> {
    let email = email(&self.email)?;
    if self.password.is_empty() {
      return Err(ApiError::BadRequest("password is required".into()));
    }
    Ok((email, self.password))
  }
}

impl EditBody {
  pub fn validate(self) -> Result<ProfileEdit, ApiError> {
    Ok(ProfileEdit {
      name:  self.name.as_deref().map(|n| required("name", n)).transpose()?,
      about: self.about.as_deref().map(|a| required("about", a)).transpose()?,
    })
  }
}
