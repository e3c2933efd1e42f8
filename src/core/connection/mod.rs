use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::external::Storage;

/// Connected wallet record as it is stored in the local storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletConnected {
    #[serde(rename = "cosmosAddress", default)]
    pub cosmos_address: String,
    /// Auxiliary wallet metadata (wallet kind, hd path, etc.)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WalletConnected {
    pub fn new(cosmos_address: &str) -> Self {
        Self {
            cosmos_address: cosmos_address.to_owned(),
            extra: Default::default(),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.cosmos_address.is_empty()
    }
}

/// In-memory connected wallet record backed by the persistent storage
pub struct ConnectionStore {
    storage: Arc<dyn Storage>,
    wallet: RwLock<Option<WalletConnected>>,
}

impl ConnectionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            wallet: Default::default(),
        }
    }

    /// Returns the in-memory record if it has an address, otherwise
    /// the record persisted under `key`. Missing or malformed data
    /// results in an empty record
    pub async fn connected_wallet(&self, key: &str) -> WalletConnected {
        let wallet = self.wallet.read().clone();
        match wallet {
            Some(wallet) if wallet.is_connected() => wallet,
            _ => self.load_persisted(key).await,
        }
    }

    /// Replaces the in-memory record. Storage is left untouched
    pub fn set_connected_wallet(&self, value: Option<WalletConnected>) -> WalletConnected {
        let wallet = value.unwrap_or_default();
        *self.wallet.write() = Some(wallet.clone());
        wallet
    }

    /// Persists the record under `key` and makes it current
    pub async fn connect(&self, key: &str, wallet: WalletConnected) -> Result<WalletConnected> {
        let data = serde_json::to_string(&wallet)?;
        self.storage.set(key, &data).await?;
        Ok(self.set_connected_wallet(Some(wallet)))
    }

    /// Forgets the in-memory record and removes the persisted one
    pub async fn clear(&self, key: &str) -> Result<()> {
        *self.wallet.write() = None;
        self.storage.remove(key).await
    }

    async fn load_persisted(&self, key: &str) -> WalletConnected {
        let data = match self.storage.get(key).await {
            Ok(Some(data)) => data,
            Ok(None) => return Default::default(),
            Err(e) => {
                log::warn!("Failed to read connected wallet: {e:?}");
                return Default::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(wallet) => wallet,
            Err(e) => {
                log::warn!("Malformed connected wallet record: {e}");
                Default::default()
            }
        }
    }
}
