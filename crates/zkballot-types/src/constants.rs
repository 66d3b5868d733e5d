/// Depth of the registry's commitment Merkle tree. Every inclusion path
/// carries exactly this many siblings and path bits.
pub const TREE_DEPTH: usize = 32;

/// Width of every numeric value crossing the engine/registry boundary.
pub const FIELD_ELEMENT_SIZE: usize = 32;

pub const ETH_ADDRESS_SIZE: usize = 20;

/// Bounded wait for proof generation before reporting a timeout.
pub const PROOF_DEADLINE_SECS: u64 = 150;

/// Bounded wait for the registry's registration-confirmed event.
pub const CONFIRMATION_TIMEOUT_SECS: u64 = 120;
