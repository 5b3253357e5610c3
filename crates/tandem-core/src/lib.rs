//! Core types, traits and matching rules for Tandem.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend plugs in through [`store::IdentityStore`] and
//! [`store::DecisionLedger`]; credential hashing through
//! [`credential::CredentialScheme`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod credential;
pub mod decision;
pub mod engine;
pub mod error;
pub mod identity;
pub mod matchmaker;
pub mod selector;
pub mod store;

pub use error::{Error, Result};
pub use matchmaker::{Decision, Matchmaker};

#[cfg(test)]
mod tests;
