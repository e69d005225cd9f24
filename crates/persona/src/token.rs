use crate::error::TokenError;
use crate::types::Address;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder carried in the subject's `publicKey` field. The real key
/// lives in the reserved `pubSignKey` claim.
pub const SUBJECT_KEY_PLACEHOLDER: &str = "Public key can be read from pubSignKey record.";

/// A single attribute-name/value pair.
///
/// On the wire a claim is a JSON map with exactly one entry
/// (`{ "name": "Alice" }`); anything else fails to deserialize.
#[derive(Clone, Debug, PartialEq)]
pub struct Claim {
    name: String,
    value: Value,
}

impl Claim {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Serialize for Claim {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Claim {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = serde_json::Map::deserialize(deserializer)?;
        if entries.len() != 1 {
            return Err(serde::de::Error::custom(format!(
                "claim must carry exactly one attribute, got {}",
                entries.len()
            )));
        }
        match entries.into_iter().next() {
            Some((name, value)) => Ok(Self { name, value }),
            None => Err(serde::de::Error::custom("claim must carry one attribute")),
        }
    }
}

/// The signer's identity: public key, plus an owner address when the
/// issuer wants to be reverse-lookupable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Address>,
}

/// The persona the claim is about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub owner_id: Address,
    pub public_key: String,
}

/// Signed content of a claim token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub issuer: Issuer,
    pub subject: Subject,
    pub claim: Claim,
}

/// Decoded view of a token, exposing the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub payload: TokenPayload,
}

/// A signed statement asserting one attribute about a subject.
///
/// `raw_token` is the canonical JSON of the payload; `signature` is the
/// hex Ed25519 signature over `blake3(raw_token)`. Immutable once
/// created; mutation of a persona is removal plus re-signing, never
/// in-place edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimToken {
    pub decoded_token: DecodedToken,
    pub raw_token: String,
    pub signature: String,
}

impl ClaimToken {
    /// Sign `claim` about `subject_owner` with the given private key.
    ///
    /// `issuer_id` is embedded as `issuer.ownerId` when present, enabling
    /// reverse lookup of the attestor's own persona; when absent the
    /// issuer is anonymous but still verifiable via its public key.
    pub fn sign(
        claim: Claim,
        subject_owner: &Address,
        private_key_hex: &str,
        issuer_id: Option<Address>,
    ) -> Result<Self, TokenError> {
        let issuer_public_key = persona_crypto::derive_public_key(private_key_hex)?;
        let payload = TokenPayload {
            issuer: Issuer {
                public_key: issuer_public_key,
                owner_id: issuer_id,
            },
            subject: Subject {
                owner_id: subject_owner.clone(),
                public_key: SUBJECT_KEY_PLACEHOLDER.to_string(),
            },
            claim,
        };
        let raw_token =
            serde_json::to_string(&payload).map_err(|e| TokenError::Malformed(e.to_string()))?;
        let signature = persona_crypto::sign_message(private_key_hex, raw_token.as_bytes())?;
        Ok(Self {
            decoded_token: DecodedToken { payload },
            raw_token,
            signature,
        })
    }

    /// Verify this token's self-consistency and return the re-decoded
    /// payload.
    ///
    /// The raw token is decoded, compared against the decoded view, and
    /// the signature is checked against the public key declared in the
    /// payload's own issuer field. This establishes that the token was
    /// signed by whoever it claims signed it, NOT that the issuer is
    /// trusted; trust is the caller's comparison against a previously
    /// retrieved `pubSignKey` claim.
    pub fn verify(&self) -> Result<TokenPayload, TokenError> {
        let payload: TokenPayload = serde_json::from_str(&self.raw_token)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        if payload != self.decoded_token.payload {
            return Err(TokenError::PayloadMismatch);
        }
        persona_crypto::verify_signature(
            &payload.issuer.public_key,
            self.raw_token.as_bytes(),
            &self.signature,
        )?;
        Ok(payload)
    }

    /// Whether [`verify`](Self::verify) succeeds.
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// The single attribute name this token asserts.
    pub fn attribute_name(&self) -> &str {
        self.decoded_token.payload.claim.name()
    }

    /// The asserted attribute value.
    pub fn attribute_value(&self) -> &Value {
        self.decoded_token.payload.claim.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_crypto::hex;

    fn test_address() -> Address {
        Address::parse("0x1111111111111111111111111111111111111111").unwrap()
    }

    fn test_key() -> String {
        hex::encode(&[42u8; 32])
    }

    #[test]
    fn sign_produces_valid_token() {
        let token = ClaimToken::sign(
            Claim::new("name", "Alice"),
            &test_address(),
            &test_key(),
            Some(test_address()),
        )
        .unwrap();
        assert!(token.is_valid());
        assert_eq!(token.attribute_name(), "name");
        assert_eq!(token.attribute_value(), &Value::from("Alice"));
    }

    #[test]
    fn issuer_id_embedded_when_present() {
        let addr = test_address();
        let token = ClaimToken::sign(
            Claim::new("name", "Alice"),
            &addr,
            &test_key(),
            Some(addr.clone()),
        )
        .unwrap();
        assert_eq!(token.decoded_token.payload.issuer.owner_id, Some(addr));
    }

    #[test]
    fn anonymous_issuer_still_verifiable() {
        let token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        assert!(token.decoded_token.payload.issuer.owner_id.is_none());
        assert!(token.is_valid());
    }

    #[test]
    fn issuer_key_matches_derivation() {
        let key = test_key();
        let token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &key, None).unwrap();
        assert_eq!(
            token.decoded_token.payload.issuer.public_key,
            persona_crypto::derive_public_key(&key).unwrap()
        );
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let mut token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        token.signature = "00".repeat(64);
        assert!(matches!(
            token.verify(),
            Err(TokenError::Signature(_))
        ));
    }

    #[test]
    fn tampered_decoded_payload_is_invalid() {
        let mut token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        token.decoded_token.payload.claim = Claim::new("name", "Mallory");
        assert!(matches!(token.verify(), Err(TokenError::PayloadMismatch)));
    }

    #[test]
    fn tampered_raw_token_is_invalid() {
        let mut token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        token.raw_token = token.raw_token.replace("Alice", "Mallory");
        assert!(token.verify().is_err());
    }

    #[test]
    fn mismatched_issuer_key_is_invalid() {
        let mut token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        // Swap in a different (valid) key, in both views so they agree.
        let other = persona_crypto::derive_public_key(&hex::encode(&[7u8; 32])).unwrap();
        token.decoded_token.payload.issuer.public_key = other.clone();
        token.raw_token = serde_json::to_string(&token.decoded_token.payload).unwrap();
        assert!(matches!(token.verify(), Err(TokenError::Signature(_))));
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let token = ClaimToken::sign(
            Claim::new("name", "Alice"),
            &test_address(),
            &test_key(),
            Some(test_address()),
        )
        .unwrap();
        let json = serde_json::to_value(&token).unwrap();
        let payload = &json["decodedToken"]["payload"];
        assert!(payload["issuer"]["publicKey"].is_string());
        assert!(payload["issuer"]["ownerId"].is_string());
        assert!(payload["subject"]["ownerId"].is_string());
        assert_eq!(payload["claim"]["name"], "Alice");
        assert_eq!(
            payload["subject"]["publicKey"],
            SUBJECT_KEY_PLACEHOLDER
        );
        assert!(json["rawToken"].is_string());
        assert!(json["signature"].is_string());
    }

    #[test]
    fn serde_roundtrip_preserves_validity() {
        let token =
            ClaimToken::sign(Claim::new("name", "Alice"), &test_address(), &test_key(), None)
                .unwrap();
        let json = serde_json::to_string(&token).unwrap();
        let restored: ClaimToken = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, token);
        assert!(restored.is_valid());
    }

    #[test]
    fn claim_rejects_multiple_attributes() {
        let result: Result<Claim, _> =
            serde_json::from_str(r#"{"name": "Alice", "email": "a@example.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn claim_rejects_empty_map() {
        let result: Result<Claim, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn claim_accepts_structured_values() {
        let claim = Claim::new("links", serde_json::json!({"web": "https://example.com"}));
        let json = serde_json::to_string(&claim).unwrap();
        let restored: Claim = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, claim);
    }
}
