use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zkballot_types::{
    BallotError, BallotResult, PublicInputs, VoteProof, VoteType,
};
use zkballot_crypto::{derive_identity, nullifier_hash};

use crate::assembler::assemble_membership;
use crate::authenticator::Authenticator;
use crate::engine::{ProofEngine, ProofInputs};
use crate::registry::Registry;
use crate::store::SecretRecordStore;
use crate::submission::SubmissionCoordinator;

/// Phases of a single vote attempt. Terminal phases produce exactly one
/// user-facing outcome; intermediate ones only drive progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptPhase {
    Idle,
    Authenticating,
    AssemblingInputs,
    GeneratingProof,
    Submitted,
    TimedOut,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Submitted,
    /// The deadline elapsed with the engine still running. Not terminal for
    /// the engine: its eventual result arrives on the late-result channel.
    TimedOut,
}

/// Result of an engine run that outlived its deadline.
#[derive(Debug)]
pub struct LateProofResult {
    pub username: String,
    pub proposal_id: u64,
    pub result: BallotResult<Vec<u8>>,
}

/// Drives one vote attempt end to end: authenticate the voter, load the
/// secret record, assemble the membership proof, invoke the engine, race it
/// against the deadline and forward the finished bundle. All `AttemptPhase`
/// transitions are emitted here.
///
/// The engine task is never aborted on timeout - proof generation is
/// expensive and has no cheap cancellation point - so a drain task joins it
/// in the background. The in-flight guard for the (username, proposal) pair
/// is held until that drain finishes, keeping at most one generation per
/// pair. Late results go to the subscriber channel if one was taken, and are
/// logged and dropped otherwise.
pub struct VoteOrchestrator {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn SecretRecordStore>,
    registry: Arc<dyn Registry>,
    engine: Arc<dyn ProofEngine>,
    submission: SubmissionCoordinator,
    deadline: Duration,
    in_flight: Arc<Mutex<HashSet<(String, u64)>>>,
    late_tx: mpsc::UnboundedSender<LateProofResult>,
    late_rx: Mutex<Option<mpsc::UnboundedReceiver<LateProofResult>>>,
    late_subscribed: Arc<AtomicBool>,
}

impl VoteOrchestrator {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn SecretRecordStore>,
        registry: Arc<dyn Registry>,
        engine: Arc<dyn ProofEngine>,
        deadline: Duration,
    ) -> Self {
        let (late_tx, late_rx) = mpsc::unbounded_channel();
        Self {
            authenticator,
            store,
            registry: registry.clone(),
            engine,
            submission: SubmissionCoordinator::new(registry),
            deadline,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            late_tx,
            late_rx: Mutex::new(Some(late_rx)),
            late_subscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Take the receiving end of the late-result channel. Results of engine
    /// runs that missed their deadline arrive here; with no subscriber they
    /// are logged and dropped rather than queued without bound.
    pub fn take_late_results(&self) -> Option<mpsc::UnboundedReceiver<LateProofResult>> {
        let receiver = self.late_rx.lock().ok().and_then(|mut rx| rx.take());
        if receiver.is_some() {
            self.late_subscribed.store(true, Ordering::SeqCst);
        }
        receiver
    }

    pub async fn submit_vote(
        &self,
        username: &str,
        proposal_id: u64,
        vote_type: VoteType,
    ) -> BallotResult<VoteOutcome> {
        let key = (username.to_string(), proposal_id);
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .map_err(|_| BallotError::Storage("In-flight lock poisoned".into()))?;
            if !in_flight.insert(key.clone()) {
                return Err(BallotError::AttemptInProgress);
            }
        }

        let result = self
            .run_attempt(username, proposal_id, vote_type, &key)
            .await;

        if result.is_err() {
            self.transition(username, proposal_id, AttemptPhase::Failed);
        }

        // On timeout the drain task owns the guard; every other path
        // releases it here.
        if !matches!(result, Ok(VoteOutcome::TimedOut)) {
            self.release(&key);
        }
        result
    }

    async fn run_attempt(
        &self,
        username: &str,
        proposal_id: u64,
        vote_type: VoteType,
        key: &(String, u64),
    ) -> BallotResult<VoteOutcome> {
        self.transition(username, proposal_id, AttemptPhase::Idle);
        self.transition(username, proposal_id, AttemptPhase::Authenticating);

        let signature = self.authenticator.authenticate(username).await?;
        let identity = derive_identity(&signature)?;

        let record = self.store.get(username)?;
        if record.address != identity.address() {
            return Err(BallotError::AuthenticationFailed(format!(
                "Credential for '{}' does not match the registered identity",
                username
            )));
        }
        let leaf_index = record.leaf_index.ok_or(BallotError::NotRegistered)?;

        self.transition(username, proposal_id, AttemptPhase::AssemblingInputs);

        let membership = assemble_membership(self.registry.as_ref(), leaf_index).await?;

        let nullifier_hash = nullifier_hash(&record.nullifier, proposal_id);
        let inputs = ProofInputs::build(
            &membership,
            nullifier_hash,
            record.nullifier,
            record.secret,
            proposal_id,
            vote_type.to_field(),
        )?;

        self.transition(username, proposal_id, AttemptPhase::GeneratingProof);

        let engine = self.engine.clone();
        let engine_inputs = inputs.clone();
        let mut proof_task =
            tokio::spawn(async move { engine.generate_proof(&engine_inputs).await });

        tokio::select! {
            joined = &mut proof_task => {
                let proof_bytes = match joined {
                    Ok(Ok(bytes)) => bytes,
                    Ok(Err(e)) => {
                        return Err(match e {
                            BallotError::ProofEngineError(msg) => BallotError::ProofEngineError(msg),
                            other => BallotError::ProofEngineError(other.to_string()),
                        });
                    }
                    Err(e) => {
                        return Err(BallotError::ProofEngineError(format!(
                            "Engine task panicked: {}",
                            e
                        )));
                    }
                };

                let bundle = VoteProof {
                    proof_bytes,
                    public_inputs: PublicInputs {
                        root: inputs.root,
                        nullifier_hash: inputs.nullifier_hash,
                        proposal_id: inputs.proposal_id,
                        vote_type: inputs.vote_type,
                    },
                };

                self.submission.submit(&bundle).await?;
                self.transition(username, proposal_id, AttemptPhase::Submitted);
                Ok(VoteOutcome::Submitted)
            }
            _ = tokio::time::sleep(self.deadline) => {
                self.transition(username, proposal_id, AttemptPhase::TimedOut);
                self.drain_late(proof_task, key.clone());
                Ok(VoteOutcome::TimedOut)
            }
        }
    }

    /// Join the still-running engine task in the background. The in-flight
    /// guard is released only once the engine has actually settled.
    fn drain_late(
        &self,
        proof_task: tokio::task::JoinHandle<BallotResult<Vec<u8>>>,
        key: (String, u64),
    ) {
        let late_tx = self.late_tx.clone();
        let in_flight = self.in_flight.clone();
        let subscribed = self.late_subscribed.clone();

        tokio::spawn(async move {
            let result = match proof_task.await {
                Ok(result) => result,
                Err(e) => Err(BallotError::ProofEngineError(format!(
                    "Engine task panicked: {}",
                    e
                ))),
            };

            match &result {
                Ok(bytes) => info!(
                    username = %key.0,
                    proposal = key.1,
                    proof_len = bytes.len(),
                    "Proof finished after deadline"
                ),
                Err(e) => warn!(
                    username = %key.0,
                    proposal = key.1,
                    error = %e,
                    "Proof failed after deadline"
                ),
            }

            if subscribed.load(Ordering::SeqCst) {
                let _ = late_tx.send(LateProofResult {
                    username: key.0.clone(),
                    proposal_id: key.1,
                    result,
                });
            } else {
                debug!(
                    username = %key.0,
                    proposal = key.1,
                    "No late-result subscriber, dropping result"
                );
            }

            if let Ok(mut guard) = in_flight.lock() {
                guard.remove(&key);
            }
        });
    }

    fn release(&self, key: &(String, u64)) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(key);
        }
    }

    fn transition(&self, username: &str, proposal_id: u64, phase: AttemptPhase) {
        debug!(username, proposal_id, ?phase, "Vote attempt phase");
    }
}
