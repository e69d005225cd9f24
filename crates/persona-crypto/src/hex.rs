//! Lowercase hex codec for key and signature material.

use crate::error::CryptoError;

/// Hex-encode bytes as a lowercase string.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode a hex string. Rejects odd lengths and non-hex characters.
pub fn decode(hex: &str) -> Result<Vec<u8>, CryptoError> {
    if hex.len() % 2 != 0 {
        return Err(CryptoError::InvalidHex(format!(
            "odd length: {}",
            hex.len()
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| CryptoError::InvalidHex(hex[i..i + 2].to_string()))
        })
        .collect()
}
