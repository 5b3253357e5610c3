//! Selector, engine and matchmaker behaviour against an in-memory store.

use std::{
  collections::HashSet,
  convert::Infallible,
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Matchmaker,
  account::{
    Candidate, NewCandidate, NewOrganization, NewProfile, Organization, Profile,
    ProfileEdit, Side, Viewer,
  },
  credential::{Argon2Scheme, CredentialScheme},
  decision::{Action, MatchInsert, MatchRecord},
  engine::{MatchEngine, Outcome, SessionState},
  selector,
  store::{AccountInsert, Backend, DecisionLedger, IdentityStore, StoredCredential},
};

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  /// Registration order is insertion order.
  accounts: Vec<(Profile, String)>,
  skips:    HashSet<(Side, Uuid, Uuid)>,
  matches:  Vec<MatchRecord>,
}

#[derive(Default)]
struct MemoryStore {
  inner: Mutex<Inner>,
  /// Number of `list_accounts` calls, one per selector scan.
  scans: AtomicUsize,
}

impl Backend for MemoryStore {
  type Error = Infallible;
}

impl IdentityStore for MemoryStore {
  async fn insert_account(
    &self,
    input: NewProfile,
    credential_hash: String,
  ) -> Result<AccountInsert, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    let side = input.side();
    let taken = inner
      .accounts
      .iter()
      .any(|(p, _)| p.side() == side && p.email().eq_ignore_ascii_case(input.email()));
    if taken {
      return Ok(AccountInsert::EmailTaken);
    }

    let profile = match input {
      NewProfile::Candidate(c) => Profile::Candidate(Candidate {
        candidate_id: Uuid::new_v4(),
        created_at:   Utc::now(),
        name:         c.name,
        email:        c.email,
        phone:        c.phone,
        skills:       c.skills,
      }),
      NewProfile::Organization(o) => Profile::Organization(Organization {
        organization_id: Uuid::new_v4(),
        created_at:      Utc::now(),
        name:            o.name,
        email:           o.email,
        phone:           o.phone,
        description:     o.description,
      }),
    };
    inner.accounts.push((profile.clone(), credential_hash));
    Ok(AccountInsert::Created(profile))
  }

  async fn find_credential(
    &self,
    side: Side,
    email: String,
  ) -> Result<Option<StoredCredential>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .accounts
        .iter()
        .find(|(p, _)| p.side() == side && p.email().eq_ignore_ascii_case(&email))
        .map(|(p, hash)| StoredCredential {
          account_id:      p.id(),
          credential_hash: hash.clone(),
        }),
    )
  }

  async fn get_account(&self, side: Side, id: Uuid) -> Result<Option<Profile>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .accounts
        .iter()
        .map(|(p, _)| p)
        .find(|p| p.side() == side && p.id() == id)
        .cloned(),
    )
  }

  async fn list_accounts(&self, side: Side) -> Result<Vec<Profile>, Infallible> {
    self.scans.fetch_add(1, Ordering::SeqCst);
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .accounts
        .iter()
        .map(|(p, _)| p)
        .filter(|p| p.side() == side)
        .cloned()
        .collect(),
    )
  }

  async fn update_account(
    &self,
    side: Side,
    id: Uuid,
    edit: ProfileEdit,
  ) -> Result<Option<Profile>, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    Ok(
      inner
        .accounts
        .iter_mut()
        .map(|(p, _)| p)
        .find(|p| p.side() == side && p.id() == id)
        .map(|p| {
          edit.apply(p);
          p.clone()
        }),
    )
  }
}

impl DecisionLedger for MemoryStore {
  async fn record_skip(&self, viewer: Viewer, subject_id: Uuid) -> Result<(), Infallible> {
    let mut inner = self.inner.lock().unwrap();
    inner.skips.insert((viewer.side, viewer.account_id, subject_id));
    Ok(())
  }

  async fn record_match_if_absent(
    &self,
    candidate_id: Uuid,
    organization_id: Uuid,
  ) -> Result<MatchInsert, Infallible> {
    let mut inner = self.inner.lock().unwrap();
    if let Some(existing) = inner
      .matches
      .iter()
      .find(|m| m.candidate_id == candidate_id && m.organization_id == organization_id)
    {
      return Ok(MatchInsert::AlreadyExists(existing.clone()));
    }
    let record = MatchRecord {
      match_id: Uuid::new_v4(),
      candidate_id,
      organization_id,
      created_at: Utc::now(),
    };
    inner.matches.push(record.clone());
    Ok(MatchInsert::Created(record))
  }

  async fn skipped_subjects_of(&self, viewer: Viewer) -> Result<HashSet<Uuid>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .skips
        .iter()
        .filter(|(side, id, _)| *side == viewer.side && *id == viewer.account_id)
        .map(|(_, _, subject)| *subject)
        .collect(),
    )
  }

  async fn matched_counterparts_of(&self, viewer: Viewer) -> Result<HashSet<Uuid>, Infallible> {
    Ok(
      self
        .matches_of(viewer)
        .await?
        .iter()
        .map(|m| m.counterpart_of(viewer.side))
        .collect(),
    )
  }

  async fn matches_of(&self, viewer: Viewer) -> Result<Vec<MatchRecord>, Infallible> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .matches
        .iter()
        .filter(|m| m.counterpart_of(viewer.side.opposite()) == viewer.account_id)
        .cloned()
        .collect(),
    )
  }
}

// ─── Counting scheme ─────────────────────────────────────────────────────────

/// Argon2 underneath; counts `verify` calls.
struct CountingScheme {
  inner:    Argon2Scheme,
  verifies: AtomicUsize,
}

impl CredentialScheme for CountingScheme {
  fn hash(&self, provided: &str) -> crate::Result<String> { self.inner.hash(provided) }

  fn verify(&self, stored: &str, provided: &str) -> bool {
    self.verifies.fetch_add(1, Ordering::SeqCst);
    self.inner.verify(stored, provided)
  }

  fn decoy_hash(&self) -> &str { self.inner.decoy_hash() }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn matchmaker() -> Matchmaker<MemoryStore, Argon2Scheme> {
  Matchmaker::new(MemoryStore::default(), Argon2Scheme::with_costs(8, 1, 1).unwrap())
}

fn new_candidate(name: &str, email: &str) -> NewProfile {
  NewProfile::Candidate(NewCandidate {
    name:   name.into(),
    email:  email.into(),
    phone:  "555-0100".into(),
    skills: "rust, sql".into(),
  })
}

fn new_organization(name: &str, email: &str) -> NewProfile {
  NewProfile::Organization(NewOrganization {
    name:        name.into(),
    email:       email.into(),
    phone:       "555-0199".into(),
    description: "we build things".into(),
  })
}

async fn candidate(mm: &Matchmaker<MemoryStore, Argon2Scheme>, name: &str) -> Viewer {
  let email = format!("{}@example.com", name.to_lowercase());
  let p = mm.register(new_candidate(name, &email), "pw").await.unwrap();
  Viewer::new(Side::Candidate, p.id())
}

async fn organization(mm: &Matchmaker<MemoryStore, Argon2Scheme>, name: &str) -> Viewer {
  let email = format!("jobs@{}.example", name.to_lowercase());
  let p = mm.register(new_organization(name, &email), "pw").await.unwrap();
  Viewer::new(Side::Organization, p.id())
}

fn presented_id(state: &SessionState) -> Option<Uuid> { state.presented().map(Profile::id) }

// ─── Selector ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn selector_follows_registration_order() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let o1 = organization(&mm, "First").await;
  organization(&mm, "Second").await;

  let next = selector::next_for(mm.store(), ana).await.unwrap();
  assert_eq!(next.map(|p| p.id()), Some(o1.account_id));
}

#[tokio::test]
async fn repeated_reads_are_stable() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  organization(&mm, "First").await;
  organization(&mm, "Second").await;

  let a = mm.next_counterpart(ana).await.unwrap();
  let b = mm.next_counterpart(ana).await.unwrap();
  assert_eq!(a, b);
}

#[tokio::test]
async fn only_the_opposite_side_is_presented() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  candidate(&mm, "Bea").await;

  let state = mm.next_counterpart(ana).await.unwrap();
  assert!(state.is_exhausted());
}

// ─── Engine ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn engine_starts_idle_and_enters_presenting() {
  let mm = matchmaker();
  let acme = organization(&mm, "Acme").await;
  let ana = candidate(&mm, "Ana").await;

  let mut engine = MatchEngine::new(mm.store(), acme);
  assert_eq!(engine.state(), &SessionState::Idle);
  let state = engine.enter().await.unwrap();
  assert_eq!(presented_id(state), Some(ana.account_id));
}

#[tokio::test]
async fn skipped_counterpart_never_returns() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let o1 = organization(&mm, "First").await;
  let o2 = organization(&mm, "Second").await;

  let d = mm.decide(ana, o1.account_id, Action::Skip).await.unwrap();
  assert_eq!(d.outcome, Outcome::Skipped);
  assert_eq!(presented_id(&d.next), Some(o2.account_id));

  // Skipping again is harmless and still does not resurface it.
  mm.decide(ana, o1.account_id, Action::Skip).await.unwrap();
  for _ in 0..3 {
    let state = mm.next_counterpart(ana).await.unwrap();
    assert_ne!(presented_id(&state), Some(o1.account_id));
  }
}

#[tokio::test]
async fn scenario_skip_until_exhausted() {
  let mm = matchmaker();
  let c = candidate(&mm, "Ana").await;
  let o1 = organization(&mm, "O1").await;
  let o2 = organization(&mm, "O2").await;

  let d = mm.decide(c, o1.account_id, Action::Skip).await.unwrap();
  assert_eq!(presented_id(&d.next), Some(o2.account_id));

  let d = mm.decide(c, o2.account_id, Action::Skip).await.unwrap();
  assert!(d.next.is_exhausted());
  assert!(mm.next_counterpart(c).await.unwrap().is_exhausted());
}

#[tokio::test]
async fn exhaustion_is_rechecked_after_new_registration() {
  let mm = matchmaker();
  let c = candidate(&mm, "Ana").await;
  let o1 = organization(&mm, "O1").await;
  mm.decide(c, o1.account_id, Action::Accept).await.unwrap();
  assert!(mm.next_counterpart(c).await.unwrap().is_exhausted());

  let o2 = organization(&mm, "O2").await;
  let state = mm.next_counterpart(c).await.unwrap();
  assert_eq!(presented_id(&state), Some(o2.account_id));
}

#[tokio::test]
async fn scenario_accept_from_both_sides_matches_once() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let acme = organization(&mm, "Acme").await;

  let first = mm.decide(ana, acme.account_id, Action::Accept).await.unwrap();
  let Outcome::MatchCreated(record) = &first.outcome else {
    panic!("expected MatchCreated, got {:?}", first.outcome);
  };
  assert_eq!(record.candidate_id, ana.account_id);
  assert_eq!(record.organization_id, acme.account_id);

  let second = mm.decide(acme, ana.account_id, Action::Accept).await.unwrap();
  assert!(matches!(&second.outcome, Outcome::AlreadyMatched(r) if r == record));

  assert_eq!(mm.matches(ana).await.unwrap().len(), 1);
  assert_eq!(mm.matches(acme).await.unwrap().len(), 1);
}

#[tokio::test]
async fn accepted_counterpart_leaves_both_feeds() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let acme = organization(&mm, "Acme").await;

  mm.decide(ana, acme.account_id, Action::Accept).await.unwrap();
  assert!(mm.next_counterpart(ana).await.unwrap().is_exhausted());
  assert!(mm.next_counterpart(acme).await.unwrap().is_exhausted());
}

#[tokio::test]
async fn skip_by_one_side_does_not_hide_from_the_other() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let acme = organization(&mm, "Acme").await;

  mm.decide(acme, ana.account_id, Action::Skip).await.unwrap();
  assert!(mm.next_counterpart(acme).await.unwrap().is_exhausted());

  let state = mm.next_counterpart(ana).await.unwrap();
  assert_eq!(presented_id(&state), Some(acme.account_id));
  let d = mm.decide(ana, acme.account_id, Action::Accept).await.unwrap();
  assert!(matches!(d.outcome, Outcome::MatchCreated(_)));
}

#[tokio::test]
async fn deciding_on_unknown_counterpart_is_not_found() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let bea = candidate(&mm, "Bea").await;

  let err = mm.decide(ana, Uuid::new_v4(), Action::Accept).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { side: Side::Organization, .. }));

  // Same-side ids are not counterparts.
  let err = mm.decide(ana, bea.account_id, Action::Skip).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_duplicate_email_per_side() {
  let mm = matchmaker();
  mm.register(new_candidate("Ana", "shared@example.com"), "pw").await.unwrap();

  let err = mm
    .register(new_candidate("Ana Again", "SHARED@example.com"), "pw2")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail(Side::Candidate)));

  mm.register(new_organization("Acme", "shared@example.com"), "pw")
    .await
    .unwrap();
}

#[tokio::test]
async fn scenario_wrong_credential_reveals_nothing() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;

  let id = mm.authenticate(Side::Candidate, "ana@example.com", "pw").await.unwrap();
  assert_eq!(id, ana.account_id);

  let wrong_password = mm
    .authenticate(Side::Candidate, "ana@example.com", "nope")
    .await
    .unwrap_err();
  let unknown_email = mm
    .authenticate(Side::Candidate, "nobody@example.com", "pw")
    .await
    .unwrap_err();
  assert!(matches!(wrong_password, Error::InvalidCredential));
  assert!(matches!(unknown_email, Error::InvalidCredential));
  assert_eq!(wrong_password.to_string(), unknown_email.to_string());

  // Right email, wrong side.
  let err = mm
    .authenticate(Side::Organization, "ana@example.com", "pw")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredential));
}

#[tokio::test]
async fn edit_profile_updates_name_and_about() {
  let mm = matchmaker();
  let acme = organization(&mm, "Acme").await;

  let edit = ProfileEdit { name: Some("Acme Corp".into()), about: Some("rockets".into()) };
  let updated = mm.edit_profile(Side::Organization, acme.account_id, edit).await.unwrap();
  let Profile::Organization(o) = updated else { panic!("wrong side") };
  assert_eq!(o.name, "Acme Corp");
  assert_eq!(o.description, "rockets");
  assert_eq!(o.email, "jobs@acme.example");

  let err = mm
    .edit_profile(Side::Organization, Uuid::new_v4(), ProfileEdit::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn decision_serializes_flat() {
  let d = crate::Decision { outcome: Outcome::Skipped, next: SessionState::Exhausted };
  let json = serde_json::to_value(&d).unwrap();
  assert_eq!(json["outcome"], "skipped");
  assert_eq!(json["next"]["state"], "exhausted");
}

#[tokio::test]
async fn unknown_email_costs_the_same_verify_as_a_wrong_credential() {
  let scheme = CountingScheme {
    inner:    Argon2Scheme::with_costs(8, 1, 1).unwrap(),
    verifies: AtomicUsize::new(0),
  };
  let mm = Matchmaker::new(MemoryStore::default(), scheme);
  mm.register(new_candidate("Ana", "ana@example.com"), "pw").await.unwrap();

  let wrong = mm.authenticate(Side::Candidate, "ana@example.com", "nope").await;
  assert!(matches!(wrong, Err(Error::InvalidCredential)));
  assert_eq!(mm.scheme().verifies.swap(0, Ordering::SeqCst), 1);

  let unknown = mm.authenticate(Side::Candidate, "nobody@example.com", "nope").await;
  assert!(matches!(unknown, Err(Error::InvalidCredential)));
  assert_eq!(mm.scheme().verifies.swap(0, Ordering::SeqCst), 1);

  // Wrong side is an unknown email too.
  let other_side = mm.authenticate(Side::Organization, "ana@example.com", "pw").await;
  assert!(matches!(other_side, Err(Error::InvalidCredential)));
  assert_eq!(mm.scheme().verifies.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_viewer_is_not_found() {
  let mm = matchmaker();
  let acme = organization(&mm, "Acme").await;
  let ghost = Viewer::new(Side::Candidate, Uuid::new_v4());

  let err = mm.next_counterpart(ghost).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { side: Side::Candidate, id } if id == ghost.account_id));

  for action in [Action::Accept, Action::Skip] {
    let err = mm.decide(ghost, acme.account_id, action).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { side: Side::Candidate, .. }));
  }
  assert!(matches!(mm.matches(ghost).await, Err(Error::NotFound { .. })));

  // Nothing was recorded on the ghost's behalf.
  assert!(mm.matches(acme).await.unwrap().is_empty());
  assert!(mm.store().skipped_subjects_of(ghost).await.unwrap().is_empty());
}

#[tokio::test]
async fn decision_runs_a_single_selector_scan() {
  let mm = matchmaker();
  let ana = candidate(&mm, "Ana").await;
  let o1 = organization(&mm, "O1").await;
  let o2 = organization(&mm, "O2").await;

  let before = mm.store().scans.load(Ordering::SeqCst);
  let d = mm.decide(ana, o1.account_id, Action::Skip).await.unwrap();
  assert_eq!(presented_id(&d.next), Some(o2.account_id));
  assert_eq!(mm.store().scans.load(Ordering::SeqCst) - before, 1);
}
