use crate::address::VoterAddress;
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Per-identity secret material plus the leaf index assigned by the registry.
///
/// `secret` and `nullifier` never leave the device except through the derived
/// commitment. `leaf_index` is `None` until the registry confirms
/// registration and is immutable once set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub username: String,
    pub address: VoterAddress,
    pub secret: FieldElement,
    pub nullifier: FieldElement,
    pub commitment_hash: FieldElement,
    pub leaf_index: Option<u64>,
}

impl SecretRecord {
    /// A record can be voted with only after registration is confirmed.
    pub fn is_registered(&self) -> bool {
        self.leaf_index.is_some()
    }
}

impl Drop for SecretRecord {
    fn drop(&mut self) {
        self.secret.0.zeroize();
        self.nullifier.0.zeroize();
    }
}

/// Registration payload pushed to the registry's registration entrypoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitmentEntry {
    pub username: String,
    pub address: VoterAddress,
    pub commitment_hash: FieldElement,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SecretRecord {
        SecretRecord {
            username: "alice".into(),
            address: VoterAddress::from_bytes([0x11; 20]),
            secret: FieldElement::from_u64(1),
            nullifier: FieldElement::from_u64(2),
            commitment_hash: FieldElement::from_u64(3),
            leaf_index: None,
        }
    }

    #[test]
    fn test_registered_only_with_leaf_index() {
        let mut r = record();
        assert!(!r.is_registered());
        r.leaf_index = Some(7);
        assert!(r.is_registered());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut r = record();
        r.leaf_index = Some(7);
        let json = serde_json::to_string(&r).unwrap();
        let back: SecretRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
