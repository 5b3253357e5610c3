//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings and
//! sides are their lowercase names.

use chrono::{DateTime, Utc};
use tandem_core::{
  account::{Candidate, Organization, Profile, Side},
  decision::MatchRecord,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Side ────────────────────────────────────────────────────────────────────

pub fn encode_side(side: Side) -> &'static str { side.as_str() }

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Column names that differ between the two account tables.
pub struct AccountTable {
  pub name:  &'static str,
  pub id:    &'static str,
  /// Skills for candidates, description for organizations.
  pub about: &'static str,
}

const CANDIDATES: AccountTable = AccountTable {
  name:  "candidates",
  id:    "candidate_id",
  about: "skills",
};

const ORGANIZATIONS: AccountTable = AccountTable {
  name:  "organizations",
  id:    "organization_id",
  about: "description",
};

pub fn account_table(side: Side) -> &'static AccountTable {
  match side {
    Side::Candidate => &CANDIDATES,
    Side::Organization => &ORGANIZATIONS,
  }
}

/// The `matches` column holding `side`'s own id.
pub fn match_column(side: Side) -> &'static str { account_table(side).id }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `candidates` or `organizations` row.
pub struct RawAccount {
  pub side:       Side,
  pub id:         String,
  pub created_at: String,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub about:      String,
}

impl RawAccount {
  /// Column list matching [`RawAccount::from_row`].
  pub fn columns(side: Side) -> String {
    let t = account_table(side);
    format!("{}, created_at, name, email, phone, {}", t.id, t.about)
  }

  pub fn from_row(side: Side, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAccount {
      side,
      id:         row.get(0)?,
      created_at: row.get(1)?,
      name:       row.get(2)?,
      email:      row.get(3)?,
      phone:      row.get(4)?,
      about:      row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    let id = decode_uuid(&self.id)?;
    let created_at = decode_dt(&self.created_at)?;

    Ok(match self.side {
      Side::Candidate => Profile::Candidate(Candidate {
        candidate_id: id,
        created_at,
        name:         self.name,
        email:        self.email,
        phone:        self.phone,
        skills:       self.about,
      }),
      Side::Organization => Profile::Organization(Organization {
        organization_id: id,
        created_at,
        name:            self.name,
        email:           self.email,
        phone:           self.phone,
        description:     self.about,
      }),
    })
  }
}

/// Raw strings read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:        String,
  pub candidate_id:    String,
  pub organization_id: String,
  pub created_at:      String,
}

impl RawMatch {
  pub const COLUMNS: &'static str = "match_id, candidate_id, organization_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawMatch {
      match_id:        row.get(0)?,
      candidate_id:    row.get(1)?,
      organization_id: row.get(2)?,
      created_at:      row.get(3)?,
    })
  }

  pub fn into_record(self) -> Result<MatchRecord> {
    Ok(MatchRecord {
      match_id:        decode_uuid(&self.match_id)?,
      candidate_id:    decode_uuid(&self.candidate_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
