use thiserror::Error;

#[derive(Error, Debug)]
pub enum BallotError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Key derivation error: {0}")]
    Derivation(String),

    #[error("No registered identity for this voter")]
    NotRegistered,

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Proof generation exceeded the deadline")]
    ProofTimeout,

    #[error("Proof engine error: {0}")]
    ProofEngineError(String),

    #[error("Vote rejected by registry: {0}")]
    VoteRejected(String),

    #[error("A vote with this nullifier was already cast")]
    AlreadyVoted,

    #[error("Proof was built against a stale registry root")]
    StaleRoot,

    #[error("Registration rejected by registry: {0}")]
    RegistrationRejected(String),

    #[error("Registration confirmation not observed in time")]
    ConfirmationTimeout,

    #[error("Leaf index already assigned: stored {current}, requested {requested}")]
    AlreadySet { current: u64, requested: u64 },

    #[error("A proof is already in flight for this voter and proposal")]
    AttemptInProgress,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BallotError {
    /// Transient failures the caller may retry with backoff. Everything else
    /// requires either user action or fixed inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BallotError::RegistryUnavailable(_) | BallotError::ConfirmationTimeout
        )
    }
}

pub type BallotResult<T> = Result<T, BallotError>;
