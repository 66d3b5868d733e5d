use crate::constants::TREE_DEPTH;
use crate::error::{BallotError, BallotResult};
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    Against,
    For,
}

impl VoteType {
    pub fn as_u64(&self) -> u64 {
        match self {
            VoteType::Against => 0,
            VoteType::For => 1,
        }
    }

    pub fn to_field(&self) -> FieldElement {
        FieldElement::from_u64(self.as_u64())
    }
}

/// Merkle inclusion data fetched fresh from the registry per vote attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipProof {
    pub root: FieldElement,
    pub siblings: Vec<FieldElement>,
    pub path_indices: Vec<FieldElement>,
}

impl MembershipProof {
    /// Both sequences must carry exactly one element per tree level. A
    /// violation is a protocol bug between us and the registry, not a user
    /// error.
    pub fn validate(&self) -> BallotResult<()> {
        if self.siblings.len() != TREE_DEPTH {
            return Err(BallotError::Protocol(format!(
                "Inclusion path has {} siblings, expected {}",
                self.siblings.len(),
                TREE_DEPTH
            )));
        }
        if self.path_indices.len() != TREE_DEPTH {
            return Err(BallotError::Protocol(format!(
                "Inclusion path has {} indices, expected {}",
                self.path_indices.len(),
                TREE_DEPTH
            )));
        }
        for index in &self.path_indices {
            let value = index.as_bytes();
            if value[..31].iter().any(|b| *b != 0) || value[31] > 1 {
                return Err(BallotError::Protocol(
                    "Path index is not a 0/1 field element".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Public values the registry checks alongside the proof.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicInputs {
    pub root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub proposal_id: FieldElement,
    pub vote_type: FieldElement,
}

/// Submission bundle. Built per attempt, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteProof {
    pub proof_bytes: Vec<u8>,
    pub public_inputs: PublicInputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(depth: usize) -> MembershipProof {
        MembershipProof {
            root: FieldElement::from_u64(1),
            siblings: vec![FieldElement::zero(); depth],
            path_indices: vec![FieldElement::zero(); depth],
        }
    }

    #[test]
    fn test_vote_type_encoding() {
        assert_eq!(VoteType::Against.to_field(), FieldElement::from_u64(0));
        assert_eq!(VoteType::For.to_field(), FieldElement::from_u64(1));
    }

    #[test]
    fn test_membership_validate_depth() {
        assert!(membership(TREE_DEPTH).validate().is_ok());
        assert!(membership(TREE_DEPTH - 1).validate().is_err());
        assert!(membership(TREE_DEPTH + 1).validate().is_err());
    }

    #[test]
    fn test_membership_rejects_non_binary_index() {
        let mut m = membership(TREE_DEPTH);
        m.path_indices[3] = FieldElement::from_u64(2);
        assert!(m.validate().is_err());
    }
}
