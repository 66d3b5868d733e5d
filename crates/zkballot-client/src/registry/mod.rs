mod bindings;
mod eth;

pub use eth::EthRegistry;

use async_trait::async_trait;
use zkballot_types::{BallotResult, CommitmentEntry, FieldElement, Proposal, VoteProof};

/// Inclusion data as the registry reports it; the assembler pairs it with a
/// freshly read root.
#[derive(Clone, Debug)]
pub struct InclusionPath {
    pub siblings: Vec<FieldElement>,
    pub path_indices: Vec<FieldElement>,
}

/// Narrow interface over the append-only commitment registry and proposal
/// ledger. The core never sees provider or ABI types; adapters map transport
/// failures to `RegistryUnavailable` and ledger refusals to the vote/
/// registration error taxonomy.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn current_root(&self) -> BallotResult<FieldElement>;

    /// Inclusion path for a confirmed leaf. `NotRegistered` when the registry
    /// has no leaf at that index (stale local record).
    async fn inclusion_path(&self, leaf_index: u64) -> BallotResult<InclusionPath>;

    async fn proposal(&self, proposal_id: u64) -> BallotResult<Proposal>;

    /// Append commitments as new leaves. Returns only once the confirming
    /// registration event has been observed, carrying the assigned indices;
    /// `ConfirmationTimeout` if the event does not arrive in the bounded
    /// window (callers re-query rather than re-submit).
    async fn register_commitments(&self, entries: &[CommitmentEntry]) -> BallotResult<Vec<u64>>;

    /// Leaf index previously assigned to a commitment, `None` if the
    /// registry holds no such leaf. Recovery path for registrations whose
    /// confirmation was never observed.
    async fn leaf_index_for(&self, commitment_hash: &FieldElement) -> BallotResult<Option<u64>>;

    /// Submit a vote bundle. The registry verifies the proof against its own
    /// current root and refuses duplicate nullifier hashes.
    async fn vote(&self, bundle: &VoteProof) -> BallotResult<()>;
}
