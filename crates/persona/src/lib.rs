#![deny(unsafe_code)]
//! # persona
//!
//! Self-sovereign identity personas: a persona is the set of
//! cryptographically signed attribute claims about one blockchain account
//! address, persisted on a remote attribute registry.
//!
//! ## Architecture
//!
//! ```text
//! caller ──▶ Persona ──▶ ClaimStore (ordered claim tokens, in memory)
//!               │
//!               └──────▶ AttributeRegistry (durable, keyed by owner address)
//! ```
//!
//! Attributes are signed into single-claim tokens (`{name: value}` plus
//! issuer/subject metadata), collected in an ordered store, and persisted
//! wholesale to the registry. Reading a profile verifies every token and
//! folds the claims into a flat mapping. The reserved `pubSignKey` claim,
//! self-signed at bootstrap, is the trust anchor verifiers compare issuer
//! keys against.
//!
//! ## Key Types
//!
//! - [`Persona`] — controller: load, query, sign, mutate, persist
//! - [`WritePolicy`] — registry-first (transactional) or local-first
//!   (explicit flush) mutation
//! - [`ClaimToken`] / [`Claim`] — one signed attribute assertion
//! - [`ClaimStore`] — ordered in-memory token collection
//! - [`AttributeRegistry`] — registry collaborator trait, with
//!   [`InMemoryAttributeRegistry`] and [`RemoteAttributeRegistry`]
//!   implementations

pub mod client;
pub mod controller;
pub mod error;
pub mod registry;
pub mod store;
pub mod token;
pub mod types;

pub use client::{RemoteAttributeRegistry, TransportProviders};
pub use controller::{Persona, WritePolicy};
pub use error::{PersonaError, RegistryError, TokenError};
pub use registry::{AttributeRegistry, InMemoryAttributeRegistry, TxReceipt};
pub use store::ClaimStore;
pub use token::{Claim, ClaimToken, DecodedToken, Issuer, Subject, TokenPayload};
pub use types::{
    default_registry_address, Address, Profile, DEFAULT_REGISTRY_ADDRESS, PUB_ENC_KEY,
    PUB_SIGN_KEY,
};

// Key derivation, re-exported for callers that bootstrap personas.
pub use persona_crypto::derive_public_key;
