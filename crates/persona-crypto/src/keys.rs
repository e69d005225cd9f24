//! Ed25519 key derivation and digest-based signing.

use crate::error::CryptoError;
use crate::hex;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

const PRIVATE_KEY_LEN: usize = 32;
const PUBLIC_KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// Generate a fresh random private key, hex-encoded.
pub fn generate_private_key() -> String {
    let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
    OsRng.fill_bytes(&mut *bytes);
    hex::encode(&*bytes)
}

/// Derive the public key for a hex-encoded private key.
///
/// Deterministic: the same private key always yields the same public key.
pub fn derive_public_key(private_key_hex: &str) -> Result<String, CryptoError> {
    let signing_key = parse_signing_key(private_key_hex)?;
    Ok(hex::encode(signing_key.verifying_key().as_bytes()))
}

/// Sign `message` with a hex-encoded private key.
///
/// The signature is taken over `blake3(message)` and returned hex-encoded.
pub fn sign_message(private_key_hex: &str, message: &[u8]) -> Result<String, CryptoError> {
    let signing_key = parse_signing_key(private_key_hex)?;
    let digest = blake3::hash(message);
    let signature = signing_key.sign(digest.as_bytes());
    Ok(hex::encode(&signature.to_bytes()))
}

/// Verify a hex-encoded signature over `blake3(message)` against a
/// hex-encoded public key.
pub fn verify_signature(
    public_key_hex: &str,
    message: &[u8],
    signature_hex: &str,
) -> Result<(), CryptoError> {
    let pk_bytes = hex::decode(public_key_hex)?;
    let pk_array: [u8; PUBLIC_KEY_LEN] =
        pk_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: pk_bytes.len(),
            })?;
    let verifying_key =
        VerifyingKey::from_bytes(&pk_array).map_err(|_| CryptoError::VerificationFailed)?;

    let sig_bytes = hex::decode(signature_hex)?;
    let sig_array: [u8; SIGNATURE_LEN] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidSignatureLength(sig_bytes.len()))?;
    let signature = Signature::from_bytes(&sig_array);

    let digest = blake3::hash(message);
    verifying_key
        .verify(digest.as_bytes(), &signature)
        .map_err(|_| CryptoError::VerificationFailed)
}

fn parse_signing_key(private_key_hex: &str) -> Result<SigningKey, CryptoError> {
    let decoded = Zeroizing::new(hex::decode(private_key_hex)?);
    if decoded.len() != PRIVATE_KEY_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: PRIVATE_KEY_LEN,
            actual: decoded.len(),
        });
    }
    let mut key_bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
    key_bytes.copy_from_slice(&decoded);
    Ok(SigningKey::from_bytes(&key_bytes))
}
