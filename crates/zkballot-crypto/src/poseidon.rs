//! Canonical Poseidon hash over the BN254 scalar field.
//!
//! Commitments, nullifier hashes and Merkle nodes MUST all go through these
//! functions; the proving circuit computes the same sponge internally, so any
//! divergence here produces proofs the registry rejects.
//!
//! Parameters: width 3 (rate 2, capacity 1), 8 full / 57 partial rounds,
//! x^5 S-box, Grain LFSR round constants (arkworks standard).

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge},
    CryptographicSponge,
};
use ark_ff::{BigInteger, PrimeField};
use std::sync::OnceLock;
use zkballot_types::FieldElement;

static CANONICAL_CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

pub fn canonical_config() -> &'static PoseidonConfig<Fr> {
    CANONICAL_CONFIG.get_or_init(|| {
        let rate = 2;
        let alpha = 5u64;
        let full_rounds = 8;
        let partial_rounds = 57;
        let field_bits = 254;

        let (ark, mds) =
            find_poseidon_ark_and_mds::<Fr>(field_bits, rate, full_rounds, partial_rounds, 0);

        PoseidonConfig {
            full_rounds: full_rounds as usize,
            partial_rounds: partial_rounds as usize,
            alpha,
            ark,
            mds,
            rate,
            capacity: 1,
        }
    })
}

/// Hash field elements, returning the first squeezed element.
pub fn poseidon_hash_fields(inputs: &[Fr]) -> Fr {
    let config = canonical_config();
    let mut sponge = PoseidonSponge::new(config);
    for input in inputs {
        sponge.absorb(input);
    }
    let output: Vec<Fr> = sponge.squeeze_field_elements(1);
    output[0]
}

pub fn poseidon_hash2_fields(left: Fr, right: Fr) -> Fr {
    poseidon_hash_fields(&[left, right])
}

/// Convert a field element to the 32-byte big-endian wire form.
pub fn fr_to_field(f: &Fr) -> FieldElement {
    let bytes = f.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    FieldElement::from_bytes(out)
}

/// Interpret a 32-byte big-endian wire value as a field element (mod order).
pub fn field_to_fr(fe: &FieldElement) -> Fr {
    Fr::from_be_bytes_mod_order(fe.as_bytes())
}

/// Hash two wire-encoded values.
pub fn poseidon_hash2(left: &FieldElement, right: &FieldElement) -> FieldElement {
    fr_to_field(&poseidon_hash2_fields(field_to_fr(left), field_to_fr(right)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = Fr::from(12345u64);
        let b = Fr::from(67890u64);

        let h1 = poseidon_hash2_fields(a, b);
        let h2 = poseidon_hash2_fields(a, b);
        assert_eq!(h1, h2);

        // Order matters
        let h3 = poseidon_hash2_fields(b, a);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_wire_roundtrip() {
        let original = Fr::from(0xdeadbeefu64);
        let wire = fr_to_field(&original);
        let restored = field_to_fr(&wire);
        assert_eq!(original, restored);
    }

    #[test]
    fn test_wire_hash_matches_field_hash() {
        let a = FieldElement::from_u64(3);
        let b = FieldElement::from_u64(4);
        let wire = poseidon_hash2(&a, &b);
        let direct = poseidon_hash2_fields(Fr::from(3u64), Fr::from(4u64));
        assert_eq!(wire, fr_to_field(&direct));
    }

    #[test]
    fn test_small_values_encode_canonically() {
        // Canonical field values below the modulus survive the byte roundtrip.
        let fe = FieldElement::from_u64(7);
        assert_eq!(fr_to_field(&field_to_fr(&fe)), fe);
    }
}
