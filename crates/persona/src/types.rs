use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Registry address used when none is supplied at construction.
pub const DEFAULT_REGISTRY_ADDRESS: &str = "0xa9be82e93628abaac5ab557a9b3b02f711c0151c";

/// Reserved attribute name anchoring the persona's signing key.
pub const PUB_SIGN_KEY: &str = "pubSignKey";

/// Reserved attribute name anchoring the persona's encryption key.
pub const PUB_ENC_KEY: &str = "pubEncKey";

/// The flattened attribute-name → value view derived from verified claims.
pub type Profile = BTreeMap<String, serde_json::Value>;

/// A blockchain account address: `0x` followed by 20 bytes of hex.
///
/// Stored lowercase so equality is textual.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let hex = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;
        if hex.len() != 40 {
            return Err(AddressError::InvalidLength(hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex(s.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The default registry address as a parsed [`Address`].
pub fn default_registry_address() -> Address {
    Address::parse(DEFAULT_REGISTRY_ADDRESS).expect("default registry address constant is valid")
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address missing 0x prefix: {0}")]
    MissingPrefix(String),
    #[error("invalid address length: {0} hex chars (expected 40)")]
    InvalidLength(usize),
    #[error("address contains non-hex characters: {0}")]
    InvalidHex(String),
}
