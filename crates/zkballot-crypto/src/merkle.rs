use ark_bn254::Fr;
use std::sync::OnceLock;
use zkballot_types::{FieldElement, MembershipProof, TREE_DEPTH};

use crate::poseidon::{field_to_fr, fr_to_field, poseidon_hash2_fields};

static ZERO_VALUES: OnceLock<Vec<Fr>> = OnceLock::new();

fn zero_values() -> &'static Vec<Fr> {
    ZERO_VALUES.get_or_init(|| {
        let mut values = Vec::with_capacity(TREE_DEPTH + 1);
        let mut current = Fr::from(0u64);
        values.push(current);
        for _ in 0..TREE_DEPTH {
            current = poseidon_hash2_fields(current, current);
            values.push(current);
        }
        values
    })
}

/// Append-only Poseidon Merkle tree over registered commitments.
///
/// The canonical tree lives in the registry; this mirror exists for
/// registry-side adapters and tests that need real roots and inclusion
/// paths. Path index convention: 0 when the node is a left child.
pub struct CommitmentTree {
    leaves: Vec<Fr>,
}

impl CommitmentTree {
    pub fn new() -> Self {
        let _ = zero_values();
        Self { leaves: Vec::new() }
    }

    pub fn insert(&mut self, commitment: &FieldElement) -> u64 {
        let index = self.leaves.len() as u64;
        self.leaves.push(field_to_fr(commitment));
        index
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf(&self, index: u64) -> Option<FieldElement> {
        self.leaves.get(index as usize).map(|fr| fr_to_field(fr))
    }

    pub fn root(&self) -> FieldElement {
        fr_to_field(&self.root_fr())
    }

    fn root_fr(&self) -> Fr {
        let zeros = zero_values();
        if self.leaves.is_empty() {
            return zeros[TREE_DEPTH];
        }

        let mut level = self.leaves.clone();
        for zero in zeros.iter().take(TREE_DEPTH) {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut i = 0;
            while i < level.len() {
                let left = level[i];
                let right = if i + 1 < level.len() { level[i + 1] } else { *zero };
                next.push(poseidon_hash2_fields(left, right));
                i += 2;
            }
            level = next;
        }
        level[0]
    }

    /// Inclusion path for the leaf at `index`, or `None` past the frontier.
    pub fn inclusion_path(&self, index: u64) -> Option<MembershipProof> {
        let index = index as usize;
        if index >= self.leaves.len() {
            return None;
        }

        let zeros = zero_values();
        let mut siblings = Vec::with_capacity(TREE_DEPTH);
        let mut path_indices = Vec::with_capacity(TREE_DEPTH);

        let mut level = self.leaves.clone();
        let mut idx = index;

        for zero in zeros.iter().take(TREE_DEPTH) {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            let sibling = if sibling_idx < level.len() {
                level[sibling_idx]
            } else {
                *zero
            };

            siblings.push(fr_to_field(&sibling));
            path_indices.push(FieldElement::from_u64((idx % 2) as u64));

            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut i = 0;
            while i < level.len() {
                let left = level[i];
                let right = if i + 1 < level.len() { level[i + 1] } else { *zero };
                next.push(poseidon_hash2_fields(left, right));
                i += 2;
            }
            level = next;
            idx /= 2;
        }

        Some(MembershipProof {
            root: fr_to_field(&level[0]),
            siblings,
            path_indices,
        })
    }

    pub fn verify(leaf: &FieldElement, proof: &MembershipProof) -> bool {
        if proof.siblings.len() != TREE_DEPTH || proof.path_indices.len() != TREE_DEPTH {
            return false;
        }

        let mut current = field_to_fr(leaf);
        for (sibling, index) in proof.siblings.iter().zip(&proof.path_indices) {
            let sibling = field_to_fr(sibling);
            current = if index.is_zero() {
                poseidon_hash2_fields(current, sibling)
            } else {
                poseidon_hash2_fields(sibling, current)
            };
        }

        fr_to_field(&current) == proof.root
    }
}

impl Default for CommitmentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_indices() {
        let mut tree = CommitmentTree::new();
        assert_eq!(tree.insert(&FieldElement::from_u64(0x11)), 0);
        assert_eq!(tree.insert(&FieldElement::from_u64(0x22)), 1);
        assert_eq!(tree.insert(&FieldElement::from_u64(0x33)), 2);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn test_inclusion_paths_verify() {
        let mut tree = CommitmentTree::new();
        let leaves = [
            FieldElement::from_u64(0x11),
            FieldElement::from_u64(0x22),
            FieldElement::from_u64(0x33),
        ];
        for leaf in &leaves {
            tree.insert(leaf);
        }

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.inclusion_path(i as u64).unwrap();
            assert_eq!(proof.siblings.len(), TREE_DEPTH);
            assert_eq!(proof.path_indices.len(), TREE_DEPTH);
            assert_eq!(proof.root, tree.root());
            assert!(CommitmentTree::verify(leaf, &proof));
        }
    }

    #[test]
    fn test_wrong_leaf_fails() {
        let mut tree = CommitmentTree::new();
        let leaf1 = FieldElement::from_u64(0x11);
        let leaf2 = FieldElement::from_u64(0x22);
        tree.insert(&leaf1);
        tree.insert(&leaf2);

        let proof = tree.inclusion_path(0).unwrap();
        assert!(!CommitmentTree::verify(&leaf2, &proof));
    }

    #[test]
    fn test_missing_leaf_has_no_path() {
        let tree = CommitmentTree::new();
        assert!(tree.inclusion_path(0).is_none());
    }

    #[test]
    fn test_empty_tree_root_deterministic() {
        let tree = CommitmentTree::new();
        assert_eq!(tree.root(), CommitmentTree::new().root());
        assert!(!tree.root().is_zero());
    }

    #[test]
    fn test_root_advances_on_insert() {
        let mut tree = CommitmentTree::new();
        let r0 = tree.root();
        tree.insert(&FieldElement::from_u64(0x11));
        let r1 = tree.root();
        assert_ne!(r0, r1);
    }
}
