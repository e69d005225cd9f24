//! HTTP client for a remote attribute registry.
//!
//! Persistence is two-step, mirroring the content-store/ledger split: the
//! token collection is stored whole in the content store, which returns a
//! content hash; the ledger then records that hash under
//! `(registry_address, owner)`. Reads resolve the hash from the ledger and
//! fetch the collection from the content store.

use crate::error::RegistryError;
use crate::registry::{AttributeRegistry, TxReceipt};
use crate::token::ClaimToken;
use crate::types::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport endpoints for the registry's backing services. Supplied once
/// at construction, before any load/save.
#[derive(Clone, Debug)]
pub struct TransportProviders {
    pub content_store: String,
    pub ledger: String,
}

impl TransportProviders {
    pub fn new(content_store: impl Into<String>, ledger: impl Into<String>) -> Self {
        Self {
            content_store: content_store.into().trim_end_matches('/').to_string(),
            ledger: ledger.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Reference to a token collection held in the content store.
#[derive(Debug, Serialize, Deserialize)]
struct ContentRef {
    hash: String,
}

/// Remote registry client over HTTP.
pub struct RemoteAttributeRegistry {
    client: Client,
    providers: TransportProviders,
}

impl RemoteAttributeRegistry {
    pub fn new(providers: TransportProviders) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(Self { client, providers })
    }

    fn ledger_entry_url(&self, registry_address: &Address, owner: &Address) -> String {
        format!(
            "{}/registries/{}/owners/{}",
            self.providers.ledger, registry_address, owner
        )
    }

    async fn expect_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RegistryError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| RegistryError::Serialization(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(RegistryError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl AttributeRegistry for RemoteAttributeRegistry {
    async fn get_attributes(
        &self,
        registry_address: &Address,
        owner: &Address,
    ) -> Result<Vec<ClaimToken>, RegistryError> {
        let response = self
            .client
            .get(self.ledger_entry_url(registry_address, owner))
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        // No ledger entry yet: a brand-new persona has nothing stored.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let content_ref: ContentRef = Self::expect_json(response).await?;

        let response = self
            .client
            .get(format!(
                "{}/objects/{}",
                self.providers.content_store, content_ref.hash
            ))
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let tokens: Vec<ClaimToken> = Self::expect_json(response).await?;
        tracing::debug!(owner = %owner, count = tokens.len(), "fetched attributes");
        Ok(tokens)
    }

    async fn set_attributes(
        &self,
        registry_address: &Address,
        tokens: &[ClaimToken],
        from: &Address,
    ) -> Result<TxReceipt, RegistryError> {
        let response = self
            .client
            .post(format!("{}/objects", self.providers.content_store))
            .json(&tokens)
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let content_ref: ContentRef = Self::expect_json(response).await?;

        let response = self
            .client
            .post(self.ledger_entry_url(registry_address, from))
            .json(&content_ref)
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let receipt: TxReceipt = Self::expect_json(response).await?;
        tracing::debug!(owner = %from, tx_id = %receipt.tx_id, "persisted attributes");
        Ok(receipt)
    }
}
