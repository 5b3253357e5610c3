//! JSON REST API for Tandem.
//!
//! Exposes an axum [`Router`] backed by a [`Matchmaker`] over any store that
//! implements both [`IdentityStore`] and [`DecisionLedger`]. Every route is
//! nested under `/{side}`, where `side` is `candidate` or `organization`.
//! The server is stateless between requests: apart from `register` and
//! `login`, each call carries HTTP Basic credentials.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let mm = Arc::new(Matchmaker::new(store, Argon2Scheme::default()));
//! let app = Router::new().merge(tandem_api::api_router(mm));
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod feed;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tandem_core::{
  Matchmaker,
  credential::CredentialScheme,
  store::{DecisionLedger, IdentityStore},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `mm`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(mm: Arc<Matchmaker<S, C>>) -> Router<()>
where
  S: IdentityStore + DecisionLedger + 'static,
  C: CredentialScheme + 'static,
{
  Router::new()
    // Accounts
    .route("/{side}/register", post(accounts::register::<S, C>))
    .route("/{side}/login", post(accounts::login::<S, C>))
    .route("/{side}/me", get(accounts::me::<S, C>).patch(accounts::edit::<S, C>))
    // Feed
    .route("/{side}/next", get(feed::next::<S, C>))
    .route("/{side}/decisions", post(feed::decide::<S, C>))
    .route("/{side}/matches", get(feed::matches::<S, C>))
    .with_state(mm)
}
