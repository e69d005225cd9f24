//! End-to-end persona lifecycle against the in-memory registry: bootstrap
//! a profile, reload it from the registry, collect a third-party
//! attestation, replace it, and delete it.

use persona::{
    Address, Claim, InMemoryAttributeRegistry, Persona, Profile, WritePolicy, PUB_ENC_KEY,
    PUB_SIGN_KEY,
};
use persona_crypto::hex;
use serde_json::json;
use std::sync::Arc;

fn alice_address() -> Address {
    Address::parse("0x1234567890abcdef1234567890abcdef12345678").unwrap()
}

fn attestor_address() -> Address {
    Address::parse("0xfedcba0987654321fedcba0987654321fedcba09").unwrap()
}

fn alice_key() -> String {
    hex::encode(&[11u8; 32])
}

fn attestor_key() -> String {
    hex::encode(&[22u8; 32])
}

fn alice_profile() -> Profile {
    Profile::from([
        ("name".to_string(), json!("Alice")),
        ("country".to_string(), json!("SE")),
    ])
}

fn stripped(mut profile: Profile) -> Profile {
    profile.remove(PUB_SIGN_KEY);
    profile.remove(PUB_ENC_KEY);
    profile
}

#[tokio::test]
async fn full_persona_lifecycle() {
    let registry = Arc::new(InMemoryAttributeRegistry::new());

    // Bootstrap.
    let mut persona = Persona::new(alice_address(), registry.clone());
    persona
        .set_profile(&alice_profile(), &alice_key())
        .await
        .unwrap();

    let profile = persona.get_profile().unwrap();
    assert_eq!(stripped(profile), alice_profile());
    assert_eq!(
        persona.public_signing_key().unwrap(),
        persona_crypto::derive_public_key(&alice_key()).unwrap()
    );

    // A fresh instance for the same address recovers the exact collection.
    let written = persona.all_claims().to_vec();
    let mut reloaded = Persona::new(alice_address(), registry.clone());
    reloaded.load().await.unwrap();
    assert_eq!(reloaded.all_claims(), written.as_slice());

    // Third-party attestation: two claims for the same name co-exist.
    let attestation = reloaded
        .sign_attribute(
            Claim::new("name", "Alice verified"),
            &attestor_key(),
            Some(attestor_address()),
        )
        .unwrap();
    reloaded.add_claim(attestation).await.unwrap();
    assert_eq!(reloaded.claims("name").len(), 2);

    // Replacing is self-sovereign-only: the attestation is dropped.
    reloaded
        .replace_attribute(Claim::new("name", "Alice B."), &alice_key())
        .await
        .unwrap();
    let names = reloaded.claims("name");
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].attribute_value(), "Alice B.");

    // Deletion clears the name entirely and leaves the rest alone.
    reloaded.delete_attribute("name").await.unwrap();
    assert!(reloaded.claims("name").is_empty());
    assert_eq!(reloaded.claims("country").len(), 1);

    // The registry reflects every step: a third instance sees the result.
    let mut observer = Persona::new(alice_address(), registry.clone());
    observer.load().await.unwrap();
    let profile = observer.get_profile().unwrap();
    assert_eq!(
        stripped(profile),
        Profile::from([("country".to_string(), json!("SE"))])
    );
}

#[tokio::test]
async fn local_first_session_flushes_once() {
    let registry = Arc::new(InMemoryAttributeRegistry::new());

    let mut persona = Persona::new(alice_address(), registry.clone())
        .with_write_policy(WritePolicy::LocalFirst);
    persona
        .set_profile(&alice_profile(), &alice_key())
        .await
        .unwrap();

    // A batch of local edits, no registry round trips in between.
    persona
        .add_attribute(Claim::new("phone", "111"), &alice_key())
        .await
        .unwrap();
    persona
        .replace_attribute(Claim::new("phone", "222"), &alice_key())
        .await
        .unwrap();
    persona.delete_attribute("country").await.unwrap();

    // The registry still holds the bootstrap state.
    let mut observer = Persona::new(alice_address(), registry.clone());
    observer.load().await.unwrap();
    assert_eq!(observer.all_claims().len(), 3);
    assert!(observer.claims("phone").is_empty());

    // One explicit flush publishes the batch.
    persona.save().await.unwrap();
    observer.load().await.unwrap();
    assert_eq!(observer.claims("phone").len(), 1);
    assert_eq!(observer.claims("phone")[0].attribute_value(), "222");
    assert!(observer.claims("country").is_empty());
}

#[tokio::test]
async fn trust_is_established_through_the_anchor_claim() {
    let registry = Arc::new(InMemoryAttributeRegistry::new());

    let mut persona = Persona::new(alice_address(), registry.clone());
    persona
        .set_profile(&alice_profile(), &alice_key())
        .await
        .unwrap();

    let attestation = persona
        .sign_attribute(
            Claim::new("employer", "Example Corp"),
            &attestor_key(),
            Some(attestor_address()),
        )
        .unwrap();
    persona.add_claim(attestation).await.unwrap();

    // Every stored token is self-consistent, but only the self-signed
    // ones carry the anchored key.
    let anchor = persona.public_signing_key().unwrap();
    for token in persona.all_claims() {
        assert!(Persona::is_token_valid(token));
        let self_signed = token.decoded_token.payload.issuer.public_key == anchor;
        let is_attestation = token.attribute_name() == "employer";
        assert_eq!(self_signed, !is_attestation);
    }
}
