use async_trait::async_trait;
use ethers::{
    contract::{ContractError, EthLogDecode},
    core::abi::RawLog,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, U256},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zkballot_types::{
    BallotError, BallotResult, CommitmentEntry, FieldElement, Proposal, VoteProof,
};

use super::bindings::{BallotRegistry, UsersRegisteredFilter};
use super::{InclusionPath, Registry};
use crate::config::ClientConfig;

type RegistryMiddleware = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Adapter binding the `Registry` interface to the on-chain ballot contract.
pub struct EthRegistry {
    contract: BallotRegistry<RegistryMiddleware>,
    confirmation_timeout: Duration,
}

impl EthRegistry {
    /// Connect to the RPC endpoint, verify the chain id and bind the
    /// registry contract with a signing wallet for write calls.
    pub async fn connect(config: &ClientConfig, private_key: &str) -> BallotResult<Self> {
        info!("Connecting to registry RPC: {}", config.rpc_url);

        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| BallotError::RegistryUnavailable(format!("Invalid RPC url: {}", e)))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| BallotError::RegistryUnavailable(format!("Chain id query failed: {}", e)))?;

        if chain_id.as_u64() != config.chain_id {
            return Err(BallotError::RegistryUnavailable(format!(
                "Chain id mismatch: expected {}, got {}",
                config.chain_id,
                chain_id.as_u64()
            )));
        }

        let wallet: LocalWallet = private_key
            .parse()
            .map_err(|e| BallotError::Protocol(format!("Invalid relayer key: {}", e)))?;
        let wallet = wallet.with_chain_id(config.chain_id);

        let registry_address: Address = config
            .registry_address
            .parse()
            .map_err(|e| BallotError::Protocol(format!("Invalid registry address: {}", e)))?;

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = BallotRegistry::new(registry_address, client);

        info!("Connected to registry on chain {}", config.chain_id);
        Ok(Self {
            contract,
            confirmation_timeout: config.confirmation_timeout(),
        })
    }
}

fn u256_to_field(value: U256) -> FieldElement {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    FieldElement::from_bytes(bytes)
}

fn field_to_u256(value: &FieldElement) -> U256 {
    U256::from_big_endian(value.as_bytes())
}

/// Ledger refusals carry a revert reason; everything else is transport.
fn classify_vote_error(error: ContractError<RegistryMiddleware>) -> BallotError {
    if let Some(reason) = error.decode_revert::<String>() {
        let lower = reason.to_lowercase();
        if lower.contains("nullifier") || lower.contains("already voted") {
            return BallotError::AlreadyVoted;
        }
        if lower.contains("root") {
            return BallotError::StaleRoot;
        }
        return BallotError::VoteRejected(reason);
    }
    if error.is_revert() {
        return BallotError::VoteRejected("Execution reverted".into());
    }
    BallotError::RegistryUnavailable(error.to_string())
}

fn classify_registration_error(error: ContractError<RegistryMiddleware>) -> BallotError {
    if let Some(reason) = error.decode_revert::<String>() {
        return BallotError::RegistrationRejected(reason);
    }
    if error.is_revert() {
        return BallotError::RegistrationRejected("Execution reverted".into());
    }
    BallotError::RegistryUnavailable(error.to_string())
}

#[async_trait]
impl Registry for EthRegistry {
    async fn current_root(&self) -> BallotResult<FieldElement> {
        let root = self
            .contract
            .current_root()
            .call()
            .await
            .map_err(|e| BallotError::RegistryUnavailable(format!("Root query failed: {}", e)))?;
        Ok(u256_to_field(root))
    }

    async fn inclusion_path(&self, leaf_index: u64) -> BallotResult<InclusionPath> {
        let leaf_count = self
            .contract
            .leaf_count()
            .call()
            .await
            .map_err(|e| BallotError::RegistryUnavailable(format!("Leaf count query failed: {}", e)))?;

        if U256::from(leaf_index) >= leaf_count {
            return Err(BallotError::NotRegistered);
        }

        let (siblings, path_indices) = self
            .contract
            .inclusion_path(U256::from(leaf_index))
            .call()
            .await
            .map_err(|e| BallotError::RegistryUnavailable(format!("Path query failed: {}", e)))?;

        Ok(InclusionPath {
            siblings: siblings.into_iter().map(u256_to_field).collect(),
            path_indices: path_indices.into_iter().map(u256_to_field).collect(),
        })
    }

    async fn leaf_index_for(&self, commitment_hash: &FieldElement) -> BallotResult<Option<u64>> {
        let (exists, index) = self
            .contract
            .commitment_index(field_to_u256(commitment_hash))
            .call()
            .await
            .map_err(|e| {
                BallotError::RegistryUnavailable(format!("Commitment query failed: {}", e))
            })?;
        Ok(exists.then(|| index.as_u64()))
    }

    async fn proposal(&self, proposal_id: u64) -> BallotResult<Proposal> {
        let (description, vote_count, votes_for, votes_against, created_at, is_accepted, data) =
            self.contract
                .proposals(U256::from(proposal_id))
                .call()
                .await
                .map_err(|e| {
                    BallotError::RegistryUnavailable(format!("Proposal query failed: {}", e))
                })?;

        Ok(Proposal {
            description,
            vote_count: vote_count.as_u64(),
            votes_for: votes_for.as_u64(),
            votes_against: votes_against.as_u64(),
            created_at: chrono::DateTime::from_timestamp(created_at.as_u64() as i64, 0)
                .unwrap_or_default(),
            is_accepted,
            data: data.to_vec(),
        })
    }

    async fn register_commitments(&self, entries: &[CommitmentEntry]) -> BallotResult<Vec<u64>> {
        let usernames: Vec<String> = entries.iter().map(|e| e.username.clone()).collect();
        let addresses: Vec<Address> = entries
            .iter()
            .map(|e| Address::from_slice(e.address.as_bytes()))
            .collect();
        let commitments: Vec<U256> = entries
            .iter()
            .map(|e| field_to_u256(&e.commitment_hash))
            .collect();

        debug!(count = entries.len(), "Submitting commitment registration");

        let call = self
            .contract
            .register_multiple_users(usernames, addresses, commitments);

        let pending = call.send().await.map_err(classify_registration_error)?;

        // Registration completes only when the confirming event is observed,
        // not on transaction acceptance. The event is decoded from this
        // transaction's own receipt, so it cannot belong to another batch.
        let receipt = tokio::time::timeout(self.confirmation_timeout, pending)
            .await
            .map_err(|_| BallotError::ConfirmationTimeout)?
            .map_err(|e| BallotError::RegistryUnavailable(format!("Receipt fetch failed: {}", e)))?
            .ok_or_else(|| {
                BallotError::RegistryUnavailable("Registration transaction dropped".into())
            })?;

        for log in &receipt.logs {
            let raw = RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            };
            if let Ok(event) = UsersRegisteredFilter::decode_log(&raw) {
                let indices: Vec<u64> = event.indices.iter().map(|i| i.as_u64()).collect();
                info!(?indices, "Registration confirmed");
                return Ok(indices);
            }
        }

        // Mined without the confirming event: treat as unconfirmed so the
        // caller re-queries instead of re-submitting.
        warn!("Registration mined but no confirmation event found");
        Err(BallotError::ConfirmationTimeout)
    }

    async fn vote(&self, bundle: &VoteProof) -> BallotResult<()> {
        let public_inputs = [
            field_to_u256(&bundle.public_inputs.root),
            field_to_u256(&bundle.public_inputs.nullifier_hash),
            field_to_u256(&bundle.public_inputs.proposal_id),
            field_to_u256(&bundle.public_inputs.vote_type),
        ];

        let call = self
            .contract
            .vote(Bytes::from(bundle.proof_bytes.clone()), public_inputs);

        let pending = call.send().await.map_err(classify_vote_error)?;

        let receipt = tokio::time::timeout(self.confirmation_timeout, pending)
            .await
            .map_err(|_| {
                BallotError::RegistryUnavailable("Vote confirmation timed out".into())
            })?
            .map_err(|e| BallotError::RegistryUnavailable(format!("Receipt fetch failed: {}", e)))?;

        match receipt {
            Some(receipt) if receipt.status == Some(1.into()) => Ok(()),
            Some(_) => Err(BallotError::VoteRejected(
                "Vote transaction reverted".into(),
            )),
            None => Err(BallotError::RegistryUnavailable(
                "Vote transaction dropped".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_field_roundtrip() {
        let fe = FieldElement::from_u64(0xabcdef);
        assert_eq!(u256_to_field(field_to_u256(&fe)), fe);
    }

    #[test]
    fn test_u256_conversion_is_big_endian() {
        let fe = u256_to_field(U256::from(1u64));
        assert_eq!(fe, FieldElement::from_u64(1));
        assert_eq!(fe.as_bytes()[31], 1);
    }
}
