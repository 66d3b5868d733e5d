use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use zkballot_types::{CONFIRMATION_TIMEOUT_SECS, PROOF_DEADLINE_SECS};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub registry_address: String,
    pub data_dir: PathBuf,
    pub proof_deadline_secs: u64,
    pub confirmation_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".into(),
            chain_id: 31337,
            registry_address: String::new(),
            data_dir: PathBuf::from(".zkballot"),
            proof_deadline_secs: PROOF_DEADLINE_SECS,
            confirmation_timeout_secs: CONFIRMATION_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn proof_deadline(&self) -> Duration {
        Duration::from_secs(self.proof_deadline_secs)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.proof_deadline(), Duration::from_secs(150));
        assert_eq!(config.chain_id, 31337);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"rpc_url": "http://node:8545"}"#).unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.proof_deadline_secs, PROOF_DEADLINE_SECS);
    }
}
