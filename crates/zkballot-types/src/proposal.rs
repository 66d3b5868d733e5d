use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only proposal state owned by the registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
    pub votes_for: u64,
    pub votes_against: u64,
    pub created_at: DateTime<Utc>,
    pub is_accepted: bool,
    pub data: Vec<u8>,
}
