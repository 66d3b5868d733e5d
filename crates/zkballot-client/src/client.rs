use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use zkballot_types::{BallotError, BallotResult, Proposal, SecretRecord, VoteType};

use crate::authenticator::Authenticator;
use crate::config::ClientConfig;
use crate::engine::ProofEngine;
use crate::orchestrator::{LateProofResult, VoteOrchestrator, VoteOutcome};
use crate::registration::RegistrationCoordinator;
use crate::registry::Registry;
use crate::store::SecretRecordStore;

/// Top-level entry point tying the authenticator, local store, registry and
/// proof engine into the two user-facing flows: one-time registration and
/// per-proposal voting.
pub struct VotingClient {
    registry: Arc<dyn Registry>,
    registration: RegistrationCoordinator,
    orchestrator: VoteOrchestrator,
}

impl VotingClient {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn SecretRecordStore>,
        registry: Arc<dyn Registry>,
        engine: Arc<dyn ProofEngine>,
        config: &ClientConfig,
    ) -> Self {
        let registration = RegistrationCoordinator::new(
            authenticator.clone(),
            store.clone(),
            registry.clone(),
        );
        let orchestrator = VoteOrchestrator::new(
            authenticator,
            store,
            registry.clone(),
            engine,
            config.proof_deadline(),
        );
        Self {
            registry,
            registration,
            orchestrator,
        }
    }

    /// Register a voter. Safe to call again for the same username; an
    /// already-registered identity is returned unchanged.
    pub async fn register_voter(&self, username: &str) -> BallotResult<SecretRecord> {
        info!(username, "Registering voter");
        self.registration.register(username).await
    }

    /// Authenticate, prove membership and cast a vote on a proposal. A
    /// credential that no longer matches the registered identity fails with
    /// `AuthenticationFailed` before anything reaches the engine.
    ///
    /// An engine run that misses the proof deadline surfaces as
    /// `ProofTimeout`; its eventual result is still delivered on the
    /// late-result channel.
    pub async fn cast_vote(
        &self,
        username: &str,
        proposal_id: u64,
        vote_type: VoteType,
    ) -> BallotResult<()> {
        info!(username, proposal_id, ?vote_type, "Casting vote");

        match self
            .orchestrator
            .submit_vote(username, proposal_id, vote_type)
            .await?
        {
            VoteOutcome::Submitted => Ok(()),
            VoteOutcome::TimedOut => Err(BallotError::ProofTimeout),
        }
    }

    /// Read a proposal's current tallies from the registry.
    pub async fn proposal(&self, proposal_id: u64) -> BallotResult<Proposal> {
        self.registry.proposal(proposal_id).await
    }

    /// Results of proof runs that outlived their deadline. Can be taken once.
    pub fn take_late_results(&self) -> Option<mpsc::UnboundedReceiver<LateProofResult>> {
        self.orchestrator.take_late_results()
    }
}
