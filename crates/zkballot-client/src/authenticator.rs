use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use zkballot_types::{BallotError, BallotResult};

/// Opaque authenticator producing raw signature bytes.
///
/// The ceremony itself (passkey, platform biometric, roaming key) is outside
/// the core; all the protocol needs is that the same credential yields the
/// same signature bytes for the same identity hint.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Create a credential for a new username, returning its opaque id.
    async fn register(&self, username: &str) -> BallotResult<String>;

    /// Run the authentication ceremony and return the raw signature.
    /// A cancelled or failed ceremony surfaces as `AuthenticationFailed`.
    async fn authenticate(&self, identity_hint: &str) -> BallotResult<Vec<u8>>;
}

/// Device-bound software authenticator.
///
/// Signs the identity hint with a device-local key, so signatures are stable
/// per (device, username) - the same property a platform passkey gives us.
/// Used by embedders without a hardware authenticator and by tests.
pub struct DeviceAuthenticator {
    device_key: [u8; 32],
    credentials: RwLock<HashMap<String, String>>,
}

impl DeviceAuthenticator {
    pub fn new(device_key: [u8; 32]) -> Self {
        Self {
            device_key,
            credentials: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Authenticator for DeviceAuthenticator {
    async fn register(&self, username: &str) -> BallotResult<String> {
        let mut credentials = self
            .credentials
            .write()
            .map_err(|_| BallotError::Storage("Credential lock poisoned".into()))?;

        let credential_id = credentials
            .entry(username.to_string())
            .or_insert_with(|| {
                hex::encode(blake3::derive_key("zkballot credential id v1", username.as_bytes()))
            })
            .clone();

        Ok(credential_id)
    }

    async fn authenticate(&self, identity_hint: &str) -> BallotResult<Vec<u8>> {
        let credentials = self
            .credentials
            .read()
            .map_err(|_| BallotError::Storage("Credential lock poisoned".into()))?;

        if !credentials.contains_key(identity_hint) {
            return Err(BallotError::AuthenticationFailed(format!(
                "No credential for '{}'",
                identity_hint
            )));
        }

        let signature = blake3::keyed_hash(&self.device_key, identity_hint.as_bytes());
        Ok(signature.as_bytes().to_vec())
    }
}
