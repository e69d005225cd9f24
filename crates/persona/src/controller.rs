use crate::error::{PersonaError, TokenError};
use crate::registry::{AttributeRegistry, TxReceipt};
use crate::store::ClaimStore;
use crate::token::{Claim, ClaimToken};
use crate::types::{default_registry_address, Address, Profile, PUB_ENC_KEY, PUB_SIGN_KEY};
use std::sync::Arc;

/// When mutations reach the registry.
///
/// `RegistryFirst` persists as part of every mutating call and rolls the
/// local change back if the remote write fails, so local and remote never
/// diverge. `LocalFirst` appends in memory only; the caller flushes with
/// an explicit [`Persona::save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WritePolicy {
    RegistryFirst,
    LocalFirst,
}

/// A persona: an identity anchored to an address, represented as the set
/// of signed claim tokens about that address.
///
/// One logical owner per instance; mutating methods take `&mut self` and
/// there is no internal locking. Registry interactions are async and
/// surface failures immediately: no retry, no caching beyond the
/// in-memory token collection.
pub struct Persona {
    address: Address,
    registry_address: Address,
    policy: WritePolicy,
    store: ClaimStore,
    registry: Arc<dyn AttributeRegistry>,
}

impl Persona {
    /// Create a persona for `address`, talking to `registry` at the
    /// default registry address, persisting registry-first.
    pub fn new(address: Address, registry: Arc<dyn AttributeRegistry>) -> Self {
        Self {
            address,
            registry_address: default_registry_address(),
            policy: WritePolicy::RegistryFirst,
            store: ClaimStore::new(),
            registry,
        }
    }

    /// Use a registry address other than the default.
    pub fn with_registry_address(mut self, registry_address: Address) -> Self {
        self.registry_address = registry_address;
        self
    }

    /// Select when mutations reach the registry.
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn registry_address(&self) -> &Address {
        &self.registry_address
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    /// Fetch the full token collection for this persona from the registry
    /// and install it, replacing the in-memory collection.
    ///
    /// All-or-nothing: on failure the previous in-memory state is left
    /// untouched.
    pub async fn load(&mut self) -> Result<(), PersonaError> {
        let tokens = self
            .registry
            .get_attributes(&self.registry_address, &self.address)
            .await?;
        tracing::debug!(address = %self.address, count = tokens.len(), "loaded claims");
        self.store.replace_all(tokens);
        Ok(())
    }

    /// Persist the current token collection to the registry.
    pub async fn save(&self) -> Result<TxReceipt, PersonaError> {
        let receipt = self
            .registry
            .set_attributes(&self.registry_address, self.store.all(), &self.address)
            .await?;
        tracing::debug!(address = %self.address, tx_id = %receipt.tx_id, "saved claims");
        Ok(receipt)
    }

    /// Bootstrap a brand-new persona from a profile mapping.
    ///
    /// Every profile entry is signed as a self-signed claim, plus the
    /// reserved `pubSignKey` claim carrying the public key derived from
    /// `private_key`, the trust anchor later verifiers compare issuer
    /// keys against. Replaces the entire token collection and persists it
    /// regardless of write policy. Destructive: initial creation only,
    /// never incremental update. On remote failure the previous
    /// collection is restored.
    pub async fn set_profile(
        &mut self,
        profile: &Profile,
        private_key: &str,
    ) -> Result<TxReceipt, PersonaError> {
        let mut tokens = Vec::with_capacity(profile.len() + 1);
        for (name, value) in profile {
            tokens.push(self.sign_as_self(Claim::new(name.clone(), value.clone()), private_key)?);
        }
        let pub_sign_key = persona_crypto::derive_public_key(private_key)
            .map_err(|e| PersonaError::InvalidClaim(TokenError::Signature(e)))?;
        tokens.push(self.sign_as_self(Claim::new(PUB_SIGN_KEY, pub_sign_key), private_key)?);

        let previous = self.store.replace_all(tokens);
        match self.save().await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                self.store.replace_all(previous);
                Err(e)
            }
        }
    }

    /// Verify every stored token and fold the claims into a flat profile
    /// mapping; later tokens overwrite earlier ones for the same name.
    ///
    /// All-or-nothing: a single unverifiable token fails the whole read,
    /// naming the offending claim. Callers needing partial results can
    /// pre-filter via [`all_claims`](Self::all_claims) +
    /// [`is_token_valid`](Self::is_token_valid).
    pub fn get_profile(&self) -> Result<Profile, PersonaError> {
        let mut profile = Profile::new();
        for token in self.store.all() {
            let payload = token.verify().map_err(|e| PersonaError::Projection {
                attribute: token.attribute_name().to_string(),
                source: e,
            })?;
            profile.insert(
                payload.claim.name().to_string(),
                payload.claim.value().clone(),
            );
        }
        Ok(profile)
    }

    /// The persona's public signing key, from the first `pubSignKey` claim.
    pub fn public_signing_key(&self) -> Result<String, PersonaError> {
        self.reserved_key(PUB_SIGN_KEY)
    }

    /// The persona's public encryption key, from the first `pubEncKey` claim.
    pub fn public_encryption_key(&self) -> Result<String, PersonaError> {
        self.reserved_key(PUB_ENC_KEY)
    }

    fn reserved_key(&self, name: &str) -> Result<String, PersonaError> {
        let claims = self.store.claims_for(name);
        let token = claims
            .first()
            .ok_or_else(|| PersonaError::AttributeNotFound(name.to_string()))?;
        token
            .attribute_value()
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                PersonaError::InvalidClaim(TokenError::Malformed(format!(
                    "{} claim is not a string",
                    name
                )))
            })
    }

    /// All stored claim tokens, in insertion order.
    pub fn all_claims(&self) -> &[ClaimToken] {
        self.store.all()
    }

    /// All stored claim tokens for `name`, in insertion order.
    pub fn claims(&self, name: &str) -> Vec<&ClaimToken> {
        self.store.claims_for(name)
    }

    /// Add a signed claim token, the path for tokens signed by third
    /// parties. Multiple claims for the same attribute name may co-exist
    /// (multi-attestation); use [`replace_attribute`](Self::replace_attribute)
    /// for at-most-one semantics.
    ///
    /// Invalid tokens are rejected with no mutation.
    pub async fn add_claim(&mut self, token: ClaimToken) -> Result<(), PersonaError> {
        token.verify()?;
        let previous = self.store.all().to_vec();
        self.store.append(token);
        self.commit(previous).await
    }

    /// Add multiple signed claim tokens. Every token is validated before
    /// any is appended, so an invalid token mid-list causes no partial
    /// mutation.
    pub async fn add_claims(&mut self, tokens: Vec<ClaimToken>) -> Result<(), PersonaError> {
        for token in &tokens {
            token.verify()?;
        }
        let previous = self.store.all().to_vec();
        for token in tokens {
            self.store.append(token);
        }
        self.commit(previous).await
    }

    /// Sign `claim` as self (issuer = own address) and add it.
    pub async fn add_attribute(
        &mut self,
        claim: Claim,
        private_key: &str,
    ) -> Result<(), PersonaError> {
        let token = self.sign_as_self(claim, private_key)?;
        self.add_claim(token).await
    }

    /// Remove every existing claim for the claim's attribute name, then
    /// add the new self-signed claim: exactly one claim survives.
    ///
    /// Re-attestation is self-sovereign-only: prior attestations for the
    /// name, including third-party ones, are dropped.
    pub async fn replace_attribute(
        &mut self,
        claim: Claim,
        private_key: &str,
    ) -> Result<(), PersonaError> {
        let token = self.sign_as_self(claim, private_key)?;
        let previous = self.store.all().to_vec();
        self.store.remove_by_name(token.attribute_name());
        self.store.append(token);
        self.commit(previous).await
    }

    /// Remove every claim for `name`. An absent name is not an error;
    /// other attribute names are untouched.
    pub async fn delete_attribute(&mut self, name: &str) -> Result<(), PersonaError> {
        let previous = self.store.all().to_vec();
        self.store.remove_by_name(name);
        self.commit(previous).await
    }

    /// Remove exactly one stored token matching `token` by equality.
    pub async fn remove_claim(&mut self, token: &ClaimToken) -> Result<(), PersonaError> {
        let previous = self.store.all().to_vec();
        if self.store.remove_one(token).is_none() {
            return Err(PersonaError::ClaimNotFound);
        }
        self.commit(previous).await
    }

    /// Sign a claim about this persona without touching the store.
    ///
    /// `issuer_id`, when given, is embedded as `issuer.ownerId` so the
    /// attestor's own persona can be looked up; when absent the issuer is
    /// anonymous but verifiable.
    pub fn sign_attribute(
        &self,
        claim: Claim,
        private_key: &str,
        issuer_id: Option<Address>,
    ) -> Result<ClaimToken, PersonaError> {
        ClaimToken::sign(claim, &self.address, private_key, issuer_id)
            .map_err(PersonaError::InvalidClaim)
    }

    /// Sign each claim in the input independently with the given key and
    /// issuer.
    pub fn sign_attributes(
        &self,
        claims: Vec<Claim>,
        private_key: &str,
        issuer_id: Option<Address>,
    ) -> Result<Vec<ClaimToken>, PersonaError> {
        claims
            .into_iter()
            .map(|claim| self.sign_attribute(claim, private_key, issuer_id.clone()))
            .collect()
    }

    /// Self-consistency check: the token was signed by whoever it claims
    /// signed it. Trust in the issuer is the caller's comparison against
    /// a previously retrieved `pubSignKey` claim.
    pub fn is_token_valid(token: &ClaimToken) -> bool {
        token.is_valid()
    }

    fn sign_as_self(&self, claim: Claim, private_key: &str) -> Result<ClaimToken, PersonaError> {
        self.sign_attribute(claim, private_key, Some(self.address.clone()))
    }

    async fn commit(&mut self, previous: Vec<ClaimToken>) -> Result<(), PersonaError> {
        if self.policy == WritePolicy::LocalFirst {
            return Ok(());
        }
        match self.save().await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.store.replace_all(previous);
                Err(e)
            }
        }
    }
}
