//! [`SqliteStore`], the SQLite implementation of [`IdentityStore`] and
//! [`DecisionLedger`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tandem_core::{
  account::{Candidate, NewProfile, Organization, Profile, ProfileEdit, Side, Viewer},
  decision::{MatchInsert, MatchRecord},
  store::{AccountInsert, Backend, DecisionLedger, IdentityStore, StoredCredential},
};

use crate::{
  Result,
  encode::{
    RawAccount, RawMatch, account_table, decode_uuid, encode_dt, encode_side,
    encode_uuid, match_column,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tandem store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Decode a list of id strings into a set.
  fn id_set(raw: Vec<String>) -> Result<HashSet<Uuid>> {
    raw.iter().map(|s| decode_uuid(s)).collect()
  }
}

impl Backend for SqliteStore {
  type Error = crate::Error;
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  async fn insert_account(
    &self,
    input: NewProfile,
    credential_hash: String,
  ) -> Result<AccountInsert> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let profile = match input {
      NewProfile::Candidate(c) => Profile::Candidate(Candidate {
        candidate_id: id,
        created_at,
        name:         c.name,
        email:        c.email,
        phone:        c.phone,
        skills:       c.skills,
      }),
      NewProfile::Organization(o) => Profile::Organization(Organization {
        organization_id: id,
        created_at,
        name:            o.name,
        email:           o.email,
        phone:           o.phone,
        description:     o.description,
      }),
    };

    let table  = account_table(profile.side());
    let id_str = encode_uuid(id);
    let at_str = encode_dt(created_at);
    let (name, email, phone, about) = match &profile {
      Profile::Candidate(c) => (c.name.clone(), c.email.clone(), c.phone.clone(), c.skills.clone()),
      Profile::Organization(o) => {
        (o.name.clone(), o.email.clone(), o.phone.clone(), o.description.clone())
      }
    };

    let inserted = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO {} ({}, created_at, name, email, phone, credential, {})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (email) DO NOTHING",
          table.name, table.id, table.about,
        );
        Ok(conn.execute(
          &sql,
          rusqlite::params![id_str, at_str, name, email, phone, credential_hash, about],
        )?)
      })
      .await?;

    if inserted == 0 {
      tracing::debug!(side = %profile.side(), "email already registered");
      return Ok(AccountInsert::EmailTaken);
    }
    Ok(AccountInsert::Created(profile))
  }

  async fn find_credential(&self, side: Side, email: String) -> Result<Option<StoredCredential>> {
    let table = account_table(side);

    let raw: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}, credential FROM {} WHERE email = ?1",
          table.id, table.name,
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![email], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(id, credential_hash)| {
        Ok(StoredCredential { account_id: decode_uuid(&id)?, credential_hash })
      })
      .transpose()
  }

  async fn get_account(&self, side: Side, id: Uuid) -> Result<Option<Profile>> {
    let table  = account_table(side);
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM {} WHERE {} = ?1",
          RawAccount::columns(side),
          table.name,
          table.id,
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| RawAccount::from_row(side, row))
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_profile).transpose()
  }

  async fn list_accounts(&self, side: Side) -> Result<Vec<Profile>> {
    let table = account_table(side);

    let raws: Vec<RawAccount> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM {} ORDER BY seq",
          RawAccount::columns(side),
          table.name,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawAccount::from_row(side, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccount::into_profile).collect()
  }

  async fn update_account(
    &self,
    side: Side,
    id: Uuid,
    edit: ProfileEdit,
  ) -> Result<Option<Profile>> {
    let table  = account_table(side);
    let id_str = encode_uuid(id);

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let update = format!(
          "UPDATE {} SET name = COALESCE(?2, name), {about} = COALESCE(?3, {about})
           WHERE {} = ?1",
          table.name,
          table.id,
          about = table.about,
        );
        let changed = tx.execute(&update, rusqlite::params![id_str, edit.name, edit.about])?;
        if changed == 0 {
          return Ok(None);
        }

        let select = format!(
          "SELECT {} FROM {} WHERE {} = ?1",
          RawAccount::columns(side),
          table.name,
          table.id,
        );
        let raw = tx.query_row(&select, rusqlite::params![id_str], |row| {
          RawAccount::from_row(side, row)
        })?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawAccount::into_profile).transpose()
  }
}

// ─── DecisionLedger impl ─────────────────────────────────────────────────────

impl DecisionLedger for SqliteStore {
  async fn record_skip(&self, viewer: Viewer, subject_id: Uuid) -> Result<()> {
    let side_str    = encode_side(viewer.side);
    let viewer_str  = encode_uuid(viewer.account_id);
    let subject_str = encode_uuid(subject_id);
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO skips (viewer_side, viewer_id, subject_id, recorded_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (viewer_side, viewer_id, subject_id) DO NOTHING",
          rusqlite::params![side_str, viewer_str, subject_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_match_if_absent(
    &self,
    candidate_id: Uuid,
    organization_id: Uuid,
  ) -> Result<MatchInsert> {
    let match_id_str = encode_uuid(Uuid::new_v4());
    let cand_str     = encode_uuid(candidate_id);
    let org_str      = encode_uuid(organization_id);
    let at_str       = encode_dt(Utc::now());

    // Insert and read back under one write lock: whichever accept commits
    // first creates the row, every later one reads it.
    let (inserted, raw): (usize, RawMatch) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
          "INSERT INTO matches (match_id, candidate_id, organization_id, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (candidate_id, organization_id) DO NOTHING",
          rusqlite::params![match_id_str, cand_str, org_str, at_str],
        )?;
        let raw = tx.query_row(
          &format!(
            "SELECT {} FROM matches WHERE candidate_id = ?1 AND organization_id = ?2",
            RawMatch::COLUMNS,
          ),
          rusqlite::params![cand_str, org_str],
          RawMatch::from_row,
        )?;
        tx.commit()?;
        Ok((inserted, raw))
      })
      .await?;

    let record = raw.into_record()?;
    Ok(if inserted == 1 {
      MatchInsert::Created(record)
    } else {
      MatchInsert::AlreadyExists(record)
    })
  }

  async fn skipped_subjects_of(&self, viewer: Viewer) -> Result<HashSet<Uuid>> {
    let side_str   = encode_side(viewer.side);
    let viewer_str = encode_uuid(viewer.account_id);

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_id FROM skips WHERE viewer_side = ?1 AND viewer_id = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![side_str, viewer_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Self::id_set(raw)
  }

  async fn matched_counterparts_of(&self, viewer: Viewer) -> Result<HashSet<Uuid>> {
    let own_col    = match_column(viewer.side);
    let other_col  = match_column(viewer.side.opposite());
    let viewer_str = encode_uuid(viewer.account_id);

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {other_col} FROM matches WHERE {own_col} = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![viewer_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Self::id_set(raw)
  }

  async fn matches_of(&self, viewer: Viewer) -> Result<Vec<MatchRecord>> {
    let own_col    = match_column(viewer.side);
    let viewer_str = encode_uuid(viewer.account_id);

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM matches WHERE {own_col} = ?1 ORDER BY rowid",
          RawMatch::COLUMNS,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![viewer_str], RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_record).collect()
  }
}
