use bip39::Mnemonic;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;
use zkballot_types::{BallotError, BallotResult, VoterAddress};

thread_local! {
    static SECP256K1_CTX: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Keypair derived deterministically from an authenticator signature.
///
/// The signing key stays on the device; only the address is ever shared.
pub struct VoterIdentity {
    signing_key: [u8; 32],
    address: VoterAddress,
}

impl VoterIdentity {
    pub fn address(&self) -> VoterAddress {
        self.address
    }

    pub fn signing_key_bytes(&self) -> &[u8; 32] {
        &self.signing_key
    }
}

impl Drop for VoterIdentity {
    fn drop(&mut self) {
        self.signing_key.zeroize();
    }
}

/// Derive a stable identity from raw authenticator signature bytes.
///
/// keccak256(signature) becomes BIP39 entropy, the mnemonic seed is expanded
/// into a secp256k1 key, and the address is the keccak tail of the public
/// key. The same signature always maps to the same address; no network access
/// involved. Failures abort - entropy is never silently replaced.
pub fn derive_identity(signature: &[u8]) -> BallotResult<VoterIdentity> {
    if signature.is_empty() {
        return Err(BallotError::InvalidSignature(
            "Empty authenticator signature".into(),
        ));
    }

    let entropy: [u8; 32] = Keccak256::digest(signature).into();

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| BallotError::Derivation(format!("Entropy to mnemonic failed: {}", e)))?;

    let mut seed = mnemonic.to_seed("");
    let mut key_bytes = blake3::derive_key("zkballot identity signing key v1", &seed);
    seed.zeroize();

    let secret = SecretKey::from_slice(&key_bytes).map_err(|e| {
        key_bytes.zeroize();
        BallotError::Derivation(format!("Derived key outside curve order: {}", e))
    })?;

    let address = SECP256K1_CTX.with(|ctx| {
        let public = PublicKey::from_secret_key(ctx, &secret);
        let uncompressed = public.serialize_uncompressed();
        let hash = Keccak256::digest(&uncompressed[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hash[12..]);
        VoterAddress::from_bytes(addr)
    });

    Ok(VoterIdentity {
        signing_key: key_bytes,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_derivation_deterministic() {
        let a = derive_identity(b"sig123").unwrap();
        let b = derive_identity(b"sig123").unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.signing_key_bytes(), b.signing_key_bytes());
    }

    #[test]
    fn test_different_signatures_different_addresses() {
        let a = derive_identity(b"sig123").unwrap();
        let b = derive_identity(b"sig456").unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_empty_signature_rejected() {
        assert!(matches!(
            derive_identity(b""),
            Err(BallotError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_address_is_nonzero() {
        let id = derive_identity(b"sig123").unwrap();
        assert_ne!(id.address(), VoterAddress::zero());
    }

    proptest! {
        #[test]
        fn prop_derivation_pure(sig in proptest::collection::vec(any::<u8>(), 1..256)) {
            let a = derive_identity(&sig).unwrap();
            let b = derive_identity(&sig).unwrap();
            prop_assert_eq!(a.address(), b.address());
        }

        #[test]
        fn prop_distinct_signatures_distinct_addresses(
            sig1 in proptest::collection::vec(any::<u8>(), 1..128),
            sig2 in proptest::collection::vec(any::<u8>(), 1..128),
        ) {
            prop_assume!(sig1 != sig2);
            let a = derive_identity(&sig1).unwrap();
            let b = derive_identity(&sig2).unwrap();
            prop_assert_ne!(a.address(), b.address());
        }
    }
}
