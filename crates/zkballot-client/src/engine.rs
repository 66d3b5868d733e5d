use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zkballot_types::{BallotError, BallotResult, FieldElement, MembershipProof, TREE_DEPTH};

/// Full input vector for the proving circuit.
///
/// Every value is already in the 32-byte fixed-width wire form; the engine
/// and registry reject anything else as malformed rather than incorrect, so
/// width is enforced by construction and the lengths are re-checked before
/// every invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofInputs {
    pub root: FieldElement,
    pub nullifier_hash: FieldElement,
    pub proof_siblings: Vec<FieldElement>,
    pub proof_path_indices: Vec<FieldElement>,
    pub nullifier: FieldElement,
    pub secret: FieldElement,
    pub proposal_id: FieldElement,
    pub vote_type: FieldElement,
}

impl ProofInputs {
    pub fn build(
        membership: &MembershipProof,
        nullifier_hash: FieldElement,
        nullifier: FieldElement,
        secret: FieldElement,
        proposal_id: u64,
        vote_type: FieldElement,
    ) -> BallotResult<Self> {
        membership.validate()?;

        let inputs = Self {
            root: membership.root,
            nullifier_hash,
            proof_siblings: membership.siblings.clone(),
            proof_path_indices: membership.path_indices.clone(),
            nullifier,
            secret,
            proposal_id: FieldElement::from_u64(proposal_id),
            vote_type,
        };
        inputs.validate()?;
        Ok(inputs)
    }

    /// A wrong vector length here is a protocol bug between assembler and
    /// engine, caught before the engine is ever invoked.
    pub fn validate(&self) -> BallotResult<()> {
        if self.proof_siblings.len() != TREE_DEPTH || self.proof_path_indices.len() != TREE_DEPTH {
            return Err(BallotError::Protocol(format!(
                "Input vector lengths {}/{} do not match tree depth {}",
                self.proof_siblings.len(),
                self.proof_path_indices.len(),
                TREE_DEPTH
            )));
        }
        Ok(())
    }
}

/// Opaque zero-knowledge proving backend.
///
/// One invocation per vote attempt; generation is expensive and has no cheap
/// cancellation point, so callers race it against a deadline instead of
/// aborting it.
#[async_trait]
pub trait ProofEngine: Send + Sync {
    async fn generate_proof(&self, inputs: &ProofInputs) -> BallotResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership() -> MembershipProof {
        MembershipProof {
            root: FieldElement::from_u64(42),
            siblings: vec![FieldElement::zero(); TREE_DEPTH],
            path_indices: vec![FieldElement::zero(); TREE_DEPTH],
        }
    }

    #[test]
    fn test_build_passes_membership_through_unmodified() {
        let m = membership();
        let inputs = ProofInputs::build(
            &m,
            FieldElement::from_u64(9),
            FieldElement::from_u64(2),
            FieldElement::from_u64(1),
            0,
            FieldElement::from_u64(1),
        )
        .unwrap();

        assert_eq!(inputs.root, m.root);
        assert_eq!(inputs.proof_siblings, m.siblings);
        assert_eq!(inputs.proof_path_indices, m.path_indices);
        assert_eq!(inputs.proposal_id, FieldElement::from_u64(0));
        assert_eq!(inputs.vote_type, FieldElement::from_u64(1));
    }

    #[test]
    fn test_build_rejects_truncated_path() {
        let mut m = membership();
        m.siblings.pop();
        assert!(ProofInputs::build(
            &m,
            FieldElement::zero(),
            FieldElement::zero(),
            FieldElement::zero(),
            0,
            FieldElement::zero(),
        )
        .is_err());
    }
}
