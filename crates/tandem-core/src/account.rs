//! Account types for the two populations that review each other.
//!
//! Candidates and organizations are stored in separate tables and never
//! deleted. Only the owner may edit a profile, and only its display name and
//! its free-text "about" field (skills for a candidate, description for an
//! organization).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Side ────────────────────────────────────────────────────────────────────

/// Which population an account belongs to. A viewer's side determines which
/// population it is shown: candidates review organizations and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  Candidate,
  Organization,
}

impl Side {
  /// The population this side reviews.
  pub fn opposite(self) -> Self {
    match self {
      Self::Candidate => Self::Organization,
      Self::Organization => Self::Candidate,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Candidate => "candidate",
      Self::Organization => "organization",
    }
  }
}

impl std::fmt::Display for Side {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Persisted accounts ──────────────────────────────────────────────────────

/// A registered candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  pub candidate_id: Uuid,
  pub created_at:   DateTime<Utc>,
  pub name:         String,
  pub email:        String,
  pub phone:        String,
  /// Free-text skill set.
  pub skills:       String,
}

/// A registered organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub organization_id: Uuid,
  pub created_at:      DateTime<Utc>,
  pub name:            String,
  pub email:           String,
  pub phone:           String,
  pub description:     String,
}

/// Either kind of account. This is also the view handed to the opposite side
/// when the account is presented as a counterpart; credentials never live
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "side", rename_all = "lowercase")]
pub enum Profile {
  Candidate(Candidate),
  Organization(Organization),
}

impl Profile {
  pub fn id(&self) -> Uuid {
    match self {
      Self::Candidate(c) => c.candidate_id,
      Self::Organization(o) => o.organization_id,
    }
  }

  pub fn side(&self) -> Side {
    match self {
      Self::Candidate(_) => Side::Candidate,
      Self::Organization(_) => Side::Organization,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Self::Candidate(c) => &c.name,
      Self::Organization(o) => &o.name,
    }
  }

  pub fn email(&self) -> &str {
    match self {
      Self::Candidate(c) => &c.email,
      Self::Organization(o) => &o.email,
    }
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    match self {
      Self::Candidate(c) => c.created_at,
      Self::Organization(o) => o.created_at,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Registration fields for a candidate, already validated by the request
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCandidate {
  pub name:   String,
  pub email:  String,
  pub phone:  String,
  pub skills: String,
}

/// Registration fields for an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
  pub name:        String,
  pub email:       String,
  pub phone:       String,
  pub description: String,
}

/// Input to [`crate::store::IdentityStore::insert_account`]. The variant
/// decides which table the account lands in.
#[derive(Debug, Clone)]
pub enum NewProfile {
  Candidate(NewCandidate),
  Organization(NewOrganization),
}

impl NewProfile {
  pub fn side(&self) -> Side {
    match self {
      Self::Candidate(_) => Side::Candidate,
      Self::Organization(_) => Side::Organization,
    }
  }

  pub fn email(&self) -> &str {
    match self {
      Self::Candidate(c) => &c.email,
      Self::Organization(o) => &o.email,
    }
  }
}

/// Owner-initiated profile edit. `None` leaves the field unchanged.
///
/// `about` is the skill set for a candidate and the description for an
/// organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileEdit {
  pub name:  Option<String>,
  pub about: Option<String>,
}

impl ProfileEdit {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.about.is_none() }

  /// Apply the edit to an in-memory profile.
  #[cfg(test)]
  pub(crate) fn apply(&self, profile: &mut Profile) {
    let (name, about) = match profile {
      Profile::Candidate(c) => (&mut c.name, &mut c.skills),
      Profile::Organization(o) => (&mut o.name, &mut o.description),
    };
    if let Some(n) = &self.name {
      n.clone_into(name);
    }
    if let Some(a) = &self.about {
      a.clone_into(about);
    }
  }
}

// ─── Viewer ──────────────────────────────────────────────────────────────────

/// The authenticated account currently being shown counterparts. Passed
/// explicitly into every core call; the core keeps no session of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
  pub side:       Side,
  pub account_id: Uuid,
}

impl Viewer {
  pub fn new(side: Side, account_id: Uuid) -> Self { Self { side, account_id } }
}
