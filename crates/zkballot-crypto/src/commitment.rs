use ark_bn254::Fr;
use ark_std::UniformRand;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;
use zkballot_types::FieldElement;

use crate::poseidon::{field_to_fr, fr_to_field, poseidon_hash2_fields};

/// Secret material generated once per identity at registration.
///
/// Both values are uniform scalars in the proving field, drawn from the
/// thread CSPRNG. Only the derived commitment ever leaves the device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMaterial {
    pub secret: FieldElement,
    pub nullifier: FieldElement,
}

impl SecretMaterial {
    pub fn generate() -> Self {
        let mut rng = thread_rng();
        let secret = Fr::rand(&mut rng);
        let nullifier = Fr::rand(&mut rng);
        Self {
            secret: fr_to_field(&secret),
            nullifier: fr_to_field(&nullifier),
        }
    }

    /// Public registration token: Poseidon(secret, nullifier).
    pub fn commitment_hash(&self) -> FieldElement {
        commitment_hash(&self.secret, &self.nullifier)
    }
}

impl Drop for SecretMaterial {
    fn drop(&mut self) {
        self.secret.0.zeroize();
        self.nullifier.0.zeroize();
    }
}

pub fn commitment_hash(secret: &FieldElement, nullifier: &FieldElement) -> FieldElement {
    fr_to_field(&poseidon_hash2_fields(
        field_to_fr(secret),
        field_to_fr(nullifier),
    ))
}

/// Per-proposal nullifier hash: Poseidon(nullifier, proposal_id).
///
/// Argument order is fixed by the circuit. Scoping by proposal keeps votes
/// across proposals unlinkable while making a second vote on the same
/// proposal collide.
pub fn nullifier_hash(nullifier: &FieldElement, proposal_id: u64) -> FieldElement {
    fr_to_field(&poseidon_hash2_fields(
        field_to_fr(nullifier),
        Fr::from(proposal_id),
    ))
}
