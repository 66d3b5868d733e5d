use std::sync::Arc;
use tracing::{info, warn};
use zkballot_types::{BallotError, BallotResult, VoteProof};

use crate::registry::Registry;

/// Forwards finished vote bundles to the registry and relays the outcome.
///
/// The registry verifies the proof against its own current root, which may
/// have advanced since the membership proof was assembled; duplicate
/// nullifiers and stale roots come back as distinct, non-retryable outcomes.
pub struct SubmissionCoordinator {
    registry: Arc<dyn Registry>,
}

impl SubmissionCoordinator {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    pub async fn submit(&self, bundle: &VoteProof) -> BallotResult<()> {
        info!(
            proposal = %bundle.public_inputs.proposal_id,
            nullifier_hash = %bundle.public_inputs.nullifier_hash,
            "Submitting vote"
        );

        match self.registry.vote(bundle).await {
            Ok(()) => {
                info!(proposal = %bundle.public_inputs.proposal_id, "Vote accepted");
                Ok(())
            }
            Err(BallotError::AlreadyVoted) => {
                warn!("Vote refused: nullifier already seen for this proposal");
                Err(BallotError::AlreadyVoted)
            }
            Err(BallotError::StaleRoot) => {
                warn!("Vote refused: registry root advanced past the proof");
                Err(BallotError::StaleRoot)
            }
            Err(e) => {
                warn!(error = %e, "Vote submission failed");
                Err(e)
            }
        }
    }
}
