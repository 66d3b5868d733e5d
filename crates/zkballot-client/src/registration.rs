use std::sync::Arc;
use tracing::{debug, info, warn};
use zkballot_types::{BallotError, BallotResult, CommitmentEntry, SecretRecord};
use zkballot_crypto::{derive_identity, SecretMaterial};

use crate::authenticator::Authenticator;
use crate::registry::Registry;
use crate::store::SecretRecordStore;

/// One-time voter onboarding: authenticate, derive the identity, commit the
/// secret material locally, push the commitment to the registry and bind the
/// assigned leaf index to the record.
///
/// The whole flow is idempotent per username. Secret material is persisted
/// before the registry call, so a crash or a confirmation timeout between
/// submission and confirmation never regenerates it - and a retry first asks
/// the registry whether the commitment already has a leaf, re-submitting only
/// when it does not, so an unobserved confirmation never duplicates a leaf.
pub struct RegistrationCoordinator {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn SecretRecordStore>,
    registry: Arc<dyn Registry>,
}

impl RegistrationCoordinator {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn SecretRecordStore>,
        registry: Arc<dyn Registry>,
    ) -> Self {
        Self {
            authenticator,
            store,
            registry,
        }
    }

    pub async fn register(&self, username: &str) -> BallotResult<SecretRecord> {
        let credential_id = self.authenticator.register(username).await?;
        debug!(username, %credential_id, "Authenticator credential ready");

        let signature = self.authenticator.authenticate(username).await?;
        let identity = derive_identity(&signature)?;

        let record = match self.store.get(username) {
            Ok(existing) => {
                if existing.address != identity.address() {
                    return Err(BallotError::AuthenticationFailed(format!(
                        "Credential for '{}' no longer matches the stored identity",
                        username
                    )));
                }
                if existing.is_registered() {
                    debug!(username, "Already registered, returning existing record");
                    return Ok(existing);
                }
                // Unconfirmed earlier attempt: the leaf may exist even though
                // we never saw the confirmation, so re-query before anything
                // touches the tree again.
                if let Some(index) = self
                    .registry
                    .leaf_index_for(&existing.commitment_hash)
                    .await?
                {
                    info!(username, leaf_index = index, "Recovered unconfirmed leaf index");
                    self.store.set_leaf_index(username, index)?;
                    let mut record = existing;
                    record.leaf_index = Some(index);
                    return Ok(record);
                }
                warn!(username, "Retrying unconfirmed registration, no leaf found");
                existing
            }
            Err(BallotError::NotRegistered) => {
                let material = SecretMaterial::generate();
                let record = SecretRecord {
                    username: username.to_string(),
                    address: identity.address(),
                    secret: material.secret,
                    nullifier: material.nullifier,
                    commitment_hash: material.commitment_hash(),
                    leaf_index: None,
                };
                // Persist before the registry sees the commitment, so the
                // secret material survives any failure past this point.
                self.store.put(&record)?;
                record
            }
            Err(e) => return Err(e),
        };

        let entry = CommitmentEntry {
            username: record.username.clone(),
            address: record.address,
            commitment_hash: record.commitment_hash,
        };

        let indices = self.registry.register_commitments(&[entry]).await?;
        let leaf_index = indices.first().copied().ok_or_else(|| {
            BallotError::Protocol("Registry confirmed registration without a leaf index".into())
        })?;

        self.store.set_leaf_index(username, leaf_index)?;
        info!(username, leaf_index, "Voter registered");

        let mut record = record;
        record.leaf_index = Some(leaf_index);
        Ok(record)
    }
}
