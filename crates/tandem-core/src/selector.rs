//! Counterpart selection: who does a viewer see next?
//!
//! The exclusion set is everything the viewer has skipped plus everything the
//! viewer is matched with. The opposite population is scanned in registration
//! order and the first account outside the set is returned. Only the viewer's
//! own decisions count: a skip recorded by the other side never hides anyone
//! from this viewer.
//!
//! Each call is a full scan of the opposite population, which is fine for a
//! modest catalogue and is the documented limit of this selector.

use std::collections::HashSet;

use tracing::instrument;
use uuid::Uuid;

use crate::{
  account::{Profile, Viewer},
  store::{DecisionLedger, IdentityStore},
};

/// Ids `viewer` must not be shown again.
pub async fn exclusions_for<S>(
  store: &S,
  viewer: Viewer,
) -> Result<HashSet<Uuid>, S::Error>
where
  S: IdentityStore + DecisionLedger,
{
  let mut excluded = store.skipped_subjects_of(viewer).await?;
  excluded.extend(store.matched_counterparts_of(viewer).await?);
  Ok(excluded)
}

/// The first eligible counterpart for `viewer`, or `None` once every account
/// on the other side has been skipped or matched.
#[instrument(skip(store, viewer), fields(side = %viewer.side, viewer_id = %viewer.account_id))]
pub async fn next_for<S>(store: &S, viewer: Viewer) -> Result<Option<Profile>, S::Error>
where
  S: IdentityStore + DecisionLedger,
{
  let excluded = exclusions_for(store, viewer).await?;
  let pool = store.list_accounts(viewer.side.opposite()).await?;
  let next = first_eligible(pool, &excluded);

  match &next {
    Some(p) => tracing::debug!(counterpart_id = %p.id(), "selected counterpart"),
    None => tracing::debug!("no eligible counterpart"),
  }
  Ok(next)
}

/// First profile of `pool` (already in registration order) whose id is not in
/// `excluded`.
pub fn first_eligible(pool: Vec<Profile>, excluded: &HashSet<Uuid>) -> Option<Profile> {
  pool.into_iter().find(|p| !excluded.contains(&p.id()))
}
