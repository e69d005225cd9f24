#![deny(unsafe_code)]
//! Cryptographic primitives for persona claims.
//!
//! Everything a persona needs from the curve lives here: hex codec for
//! wire-facing key and signature material, deterministic Ed25519
//! private-to-public derivation, and digest-based signing/verification
//! (signatures are taken over the BLAKE3 hash of the message, never the
//! raw message).
//!
//! Keys and signatures cross this API as lowercase hex strings because
//! that is how they travel inside claim tokens. Decoded private-key bytes
//! are zeroized before this crate returns.

mod error;
pub mod hex;
mod keys;

pub use error::CryptoError;
pub use keys::{derive_public_key, generate_private_key, sign_message, verify_signature};
