use crate::constants::{ETH_ADDRESS_SIZE, FIELD_ELEMENT_SIZE};
use crate::error::{BallotError, BallotResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fixed-width value crossing the proof-engine and registry boundaries.
///
/// Stored big-endian. The wire form is always a 0x-prefixed 64-nibble hex
/// string; anything narrower or wider is rejected as malformed rather than
/// padded, since a width mismatch means the payload would be refused
/// downstream anyway.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldElement(pub [u8; FIELD_ELEMENT_SIZE]);

impl FieldElement {
    pub fn from_bytes(bytes: [u8; FIELD_ELEMENT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FIELD_ELEMENT_SIZE] {
        &self.0
    }

    pub fn zero() -> Self {
        Self([0u8; FIELD_ELEMENT_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
        bytes[FIELD_ELEMENT_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Left-pads a 20-byte address into the field width.
    pub fn from_address_bytes(address: &[u8; ETH_ADDRESS_SIZE]) -> Self {
        let mut bytes = [0u8; FIELD_ELEMENT_SIZE];
        bytes[FIELD_ELEMENT_SIZE - ETH_ADDRESS_SIZE..].copy_from_slice(address);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> BallotResult<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| BallotError::Protocol(format!("Malformed field element: {}", e)))?;
        if bytes.len() != FIELD_ELEMENT_SIZE {
            return Err(BallotError::Protocol(format!(
                "Malformed field element: expected {} bytes, got {}",
                FIELD_ELEMENT_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; FIELD_ELEMENT_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FieldElement::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let fe = FieldElement::from_u64(0xdeadbeef);
        let restored = FieldElement::from_hex(&fe.to_hex()).unwrap();
        assert_eq!(fe, restored);
    }

    #[test]
    fn test_wrong_width_rejected() {
        assert!(FieldElement::from_hex("0x1234").is_err());
        let too_wide = format!("0x{}", "ab".repeat(33));
        assert!(FieldElement::from_hex(&too_wide).is_err());
    }

    #[test]
    fn test_from_u64_big_endian() {
        let fe = FieldElement::from_u64(1);
        assert_eq!(fe.0[31], 1);
        assert!(fe.0[..31].iter().all(|b| *b == 0));
        assert_eq!(
            fe.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_address_padding() {
        let addr = [0xab; ETH_ADDRESS_SIZE];
        let fe = FieldElement::from_address_bytes(&addr);
        assert!(fe.0[..12].iter().all(|b| *b == 0));
        assert_eq!(&fe.0[12..], &addr[..]);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let fe = FieldElement::from_u64(7);
        let json = serde_json::to_string(&fe).unwrap();
        assert_eq!(
            json,
            "\"0x0000000000000000000000000000000000000000000000000000000000000007\""
        );
        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(fe, back);
    }
}
