#![deny(unsafe_code)]
#![warn(clippy::all)]

//! Protocol core for anonymous, Sybil-resistant voting.
//!
//! A voter authenticates, derives a stable identity from the authenticator
//! signature, registers a Poseidon commitment with the on-ledger registry,
//! and later proves tree membership to a zero-knowledge proof engine without
//! revealing which leaf is theirs. Double votes on a proposal collide on the
//! per-proposal nullifier hash and are rejected by the registry.

pub mod assembler;
pub mod authenticator;
pub mod client;
pub mod config;
pub mod engine;
pub mod orchestrator;
pub mod registration;
pub mod registry;
pub mod store;
pub mod submission;

pub use assembler::assemble_membership;
pub use authenticator::{Authenticator, DeviceAuthenticator};
pub use client::VotingClient;
pub use config::ClientConfig;
pub use engine::{ProofEngine, ProofInputs};
pub use orchestrator::{AttemptPhase, LateProofResult, VoteOrchestrator, VoteOutcome};
pub use registration::RegistrationCoordinator;
pub use registry::{EthRegistry, InclusionPath, Registry};
pub use store::{MemoryRecordStore, SecretRecordStore, SledRecordStore};
pub use submission::SubmissionCoordinator;
