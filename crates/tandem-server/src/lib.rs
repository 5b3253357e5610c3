//! Configuration and application assembly for the Tandem server binary.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use serde::Deserialize;
use tandem_core::{
  Matchmaker,
  credential::{Argon2Scheme, CredentialScheme},
  store::{DecisionLedger, IdentityStore},
};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TANDEM_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  #[serde(default)]
  pub credentials: CredentialConfig,
}

/// Argon2id cost parameters for newly stored credentials. Existing hashes
/// keep verifying after these change.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CredentialConfig {
  pub memory_kib:  u32,
  pub iterations:  u32,
  pub parallelism: u32,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/tandem/tandem.db") }

impl Default for CredentialConfig {
  fn default() -> Self {
    Self { memory_kib: 19 * 1024, iterations: 2, parallelism: 1 }
  }
}

impl CredentialConfig {
  pub fn scheme(&self) -> tandem_core::Result<Argon2Scheme> {
    Argon2Scheme::with_costs(self.memory_kib, self.iterations, self.parallelism)
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `TANDEM_*` environment
  /// variables. Nested keys use a double underscore:
  /// `TANDEM_CREDENTIALS__MEMORY_KIB`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TANDEM")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router wrapped in a per-request tracing layer.
pub fn app<S, C>(mm: Arc<Matchmaker<S, C>>) -> Router
where
  S: IdentityStore + DecisionLedger + 'static,
  C: CredentialScheme + 'static,
{
  tandem_api::api_router(mm).layer(TraceLayer::new_for_http())
}
