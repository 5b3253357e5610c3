//! Decision ledger facts.
//!
//! Skips and matches are append-only. A skip excludes one subject from one
//! viewer's feed; a match pairs one candidate with one organization and exists
//! at most once per pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Side;

/// What a viewer decided about the counterpart in front of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Accept,
  Skip,
}

/// A one-way exclusion: `viewer_id` (on `viewer_side`) will not be shown
/// `subject_id` again. `(viewer_side, viewer_id, subject_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
  pub viewer_side: Side,
  pub viewer_id:   Uuid,
  pub subject_id:  Uuid,
  pub recorded_at: DateTime<Utc>,
}

/// A pairing between a candidate and an organization. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
  pub match_id:        Uuid,
  pub candidate_id:    Uuid,
  pub organization_id: Uuid,
  pub created_at:      DateTime<Utc>,
}

impl MatchRecord {
  /// The id of the other party from `side`'s point of view.
  pub fn counterpart_of(&self, side: Side) -> Uuid {
    match side {
      Side::Candidate => self.organization_id,
      Side::Organization => self.candidate_id,
    }
  }
}

/// Result of [`crate::store::DecisionLedger::record_match_if_absent`]. Both
/// variants carry the row that is now in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchInsert {
  Created(MatchRecord),
  AlreadyExists(MatchRecord),
}

impl MatchInsert {
  pub fn record(&self) -> &MatchRecord {
    match self {
      Self::Created(r) | Self::AlreadyExists(r) => r,
    }
  }

  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }
}
