use tracing::debug;
use zkballot_types::{BallotResult, MembershipProof};

use crate::registry::Registry;

/// Fetch the current root and this identity's inclusion path from the
/// registry and pair them into a membership proof.
///
/// The root is read fresh per attempt - the registry's tree may have advanced
/// since registration, and the registry re-verifies against its own root at
/// submission time anyway. The path is not validated cryptographically here;
/// that is the engine's job at proof time and the registry's at verification.
pub async fn assemble_membership(
    registry: &dyn Registry,
    leaf_index: u64,
) -> BallotResult<MembershipProof> {
    let root = registry.current_root().await?;
    let path = registry.inclusion_path(leaf_index).await?;

    let proof = MembershipProof {
        root,
        siblings: path.siblings,
        path_indices: path.path_indices,
    };
    proof.validate()?;

    debug!(leaf_index, root = %proof.root, "Membership proof assembled");
    Ok(proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InclusionPath;
    use async_trait::async_trait;
    use zkballot_types::{
        BallotError, CommitmentEntry, FieldElement, Proposal, VoteProof, TREE_DEPTH,
    };

    struct FixedRegistry {
        root: FieldElement,
        depth: usize,
        leaf_known: bool,
    }

    #[async_trait]
    impl Registry for FixedRegistry {
        async fn current_root(&self) -> BallotResult<FieldElement> {
            Ok(self.root)
        }

        async fn inclusion_path(&self, _leaf_index: u64) -> BallotResult<InclusionPath> {
            if !self.leaf_known {
                return Err(BallotError::NotRegistered);
            }
            Ok(InclusionPath {
                siblings: vec![FieldElement::from_u64(5); self.depth],
                path_indices: vec![FieldElement::zero(); self.depth],
            })
        }

        async fn proposal(&self, _proposal_id: u64) -> BallotResult<Proposal> {
            unimplemented!("not exercised")
        }

        async fn register_commitments(
            &self,
            _entries: &[CommitmentEntry],
        ) -> BallotResult<Vec<u64>> {
            unimplemented!("not exercised")
        }

        async fn leaf_index_for(
            &self,
            _commitment_hash: &FieldElement,
        ) -> BallotResult<Option<u64>> {
            unimplemented!("not exercised")
        }

        async fn vote(&self, _bundle: &VoteProof) -> BallotResult<()> {
            unimplemented!("not exercised")
        }
    }

    #[tokio::test]
    async fn test_assembles_root_and_path() {
        let registry = FixedRegistry {
            root: FieldElement::from_u64(0xabc123),
            depth: TREE_DEPTH,
            leaf_known: true,
        };
        let proof = assemble_membership(&registry, 7).await.unwrap();
        assert_eq!(proof.root, registry.root);
        assert_eq!(proof.siblings.len(), TREE_DEPTH);
        assert_eq!(proof.path_indices.len(), TREE_DEPTH);
    }

    #[tokio::test]
    async fn test_short_path_is_protocol_error() {
        let registry = FixedRegistry {
            root: FieldElement::from_u64(1),
            depth: TREE_DEPTH - 1,
            leaf_known: true,
        };
        assert!(matches!(
            assemble_membership(&registry, 0).await,
            Err(BallotError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_leaf_surfaces_not_registered() {
        let registry = FixedRegistry {
            root: FieldElement::from_u64(1),
            depth: TREE_DEPTH,
            leaf_known: false,
        };
        assert!(matches!(
            assemble_membership(&registry, 99).await,
            Err(BallotError::NotRegistered)
        ));
    }
}
