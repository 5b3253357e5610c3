//! Registration, authentication and profile maintenance.

use tracing::instrument;
use uuid::Uuid;

use crate::{
  Error, Result,
  account::{NewProfile, Profile, ProfileEdit, Side},
  credential::CredentialScheme,
  store::{AccountInsert, IdentityStore},
};

/// Hash the credential and persist a new account.
///
/// Fails with [`Error::DuplicateEmail`] when the email is already in use on
/// the same side. The same email may exist once per side.
#[instrument(skip_all, fields(side = %input.side()))]
pub async fn register<S, C>(
  store: &S,
  scheme: &C,
  input: NewProfile,
  credential: &str,
) -> Result<Profile>
where
  S: IdentityStore,
  C: CredentialScheme,
{
  let side = input.side();
  let hash = scheme.hash(credential)?;

  match store.insert_account(input, hash).await.map_err(Error::storage)? {
    AccountInsert::Created(profile) => {
      tracing::info!(account_id = %profile.id(), "registered account");
      Ok(profile)
    }
    AccountInsert::EmailTaken => Err(Error::DuplicateEmail(side)),
  }
}

/// Resolve an email + credential pair to an account id.
///
/// An unknown email and a wrong credential both yield
/// [`Error::InvalidCredential`].
#[instrument(skip(store, scheme, email, credential))]
pub async fn authenticate<S, C>(
  store: &S,
  scheme: &C,
  side: Side,
  email: &str,
  credential: &str,
) -> Result<Uuid>
where
  S: IdentityStore,
  C: CredentialScheme,
{
  let stored = store
    .find_credential(side, email.to_owned())
    .await
    .map_err(Error::storage)?;

  let Some(stored) = stored else {
    // An unknown email still pays for one verify.
    scheme.verify(scheme.decoy_hash(), credential);
    tracing::debug!("authentication rejected");
    return Err(Error::InvalidCredential);
  };

  if !scheme.verify(&stored.credential_hash, credential) {
    tracing::debug!("authentication rejected");
    return Err(Error::InvalidCredential);
  }
  Ok(stored.account_id)
}

pub async fn load<S>(store: &S, side: Side, id: Uuid) -> Result<Profile>
where
  S: IdentityStore,
{
  store
    .get_account(side, id)
    .await
    .map_err(Error::storage)?
    .ok_or(Error::NotFound { side, id })
}

#[instrument(skip(store, edit))]
pub async fn update_profile<S>(
  store: &S,
  side: Side,
  id: Uuid,
  edit: ProfileEdit,
) -> Result<Profile>
where
  S: IdentityStore,
{
  if edit.is_empty() {
    return load(store, side, id).await;
  }
  store
    .update_account(side, id, edit)
    .await
    .map_err(Error::storage)?
    .ok_or(Error::NotFound { side, id })
}
