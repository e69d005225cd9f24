use crate::error::RegistryError;
use crate::token::ClaimToken;
use crate::types::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

/// Handle returned by a successful registry write.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub tx_id: String,
    pub registry_address: Address,
    pub owner: Address,
    pub committed_at: DateTime<Utc>,
}

/// The remote attribute registry: a durable key-value store mapping
/// `(registry_address, owner)` to a token collection.
///
/// Calls are async and surface transport failures immediately; retry
/// policy is the caller's concern. Implementations may back onto an
/// in-memory map, an HTTP service, or a ledger.
#[async_trait]
pub trait AttributeRegistry: Send + Sync {
    /// Read the full token collection stored for an owner. An owner with
    /// nothing stored reads as the empty collection.
    async fn get_attributes(
        &self,
        registry_address: &Address,
        owner: &Address,
    ) -> Result<Vec<ClaimToken>, RegistryError>;

    /// Replace the full token collection stored for an owner.
    async fn set_attributes(
        &self,
        registry_address: &Address,
        tokens: &[ClaimToken],
        from: &Address,
    ) -> Result<TxReceipt, RegistryError>;
}

/// In-memory registry for tests and development.
///
/// Deterministic and test-friendly; `set_offline` lets callers exercise
/// unavailability paths.
#[derive(Default)]
pub struct InMemoryAttributeRegistry {
    records: RwLock<HashMap<(Address, Address), Vec<ClaimToken>>>,
    offline: AtomicBool,
}

impl InMemoryAttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the registry becoming unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), RegistryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("registry offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AttributeRegistry for InMemoryAttributeRegistry {
    async fn get_attributes(
        &self,
        registry_address: &Address,
        owner: &Address,
    ) -> Result<Vec<ClaimToken>, RegistryError> {
        self.check_online()?;
        let records = self
            .records
            .read()
            .map_err(|e| RegistryError::Unavailable(format!("lock poisoned: {}", e)))?;
        Ok(records
            .get(&(registry_address.clone(), owner.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn set_attributes(
        &self,
        registry_address: &Address,
        tokens: &[ClaimToken],
        from: &Address,
    ) -> Result<TxReceipt, RegistryError> {
        self.check_online()?;
        let mut records = self
            .records
            .write()
            .map_err(|e| RegistryError::Unavailable(format!("lock poisoned: {}", e)))?;
        records.insert(
            (registry_address.clone(), from.clone()),
            tokens.to_vec(),
        );
        Ok(TxReceipt {
            tx_id: format!("tx-{}", Uuid::new_v4()),
            registry_address: registry_address.clone(),
            owner: from.clone(),
            committed_at: Utc::now(),
        })
    }
}
