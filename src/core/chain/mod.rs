use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use kosmo_utils::validate_prefix;

use crate::transport::models::StakingParams;
use crate::transport::Transport;

/// Static description of the network
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human readable chain name, e.g. `cosmoshub`
    pub chain_name: String,
    /// Bech32 prefix of account addresses. Addresses keep their own prefix if not set
    #[serde(default)]
    pub bech32_prefix: Option<String>,
    /// Staking denomination used until the staking params are fetched
    pub bond_denom: String,
    /// Default HD path of the network. Also used as a storage key
    /// for the connected wallet record
    pub default_hd_path: String,
}

/// Active network: its config and transport
pub struct ChainContext {
    config: NetworkConfig,
    transport: Arc<dyn Transport>,
    staking_params: RwLock<Option<StakingParams>>,
}

impl ChainContext {
    pub fn new(config: NetworkConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        if config.default_hd_path.is_empty() {
            return Err(ChainError::EmptyStorageKey.into());
        }
        if config.bond_denom.is_empty() {
            return Err(ChainError::EmptyBondDenom.into());
        }
        if let Some(prefix) = config.bech32_prefix.as_deref().filter(|p| !p.is_empty()) {
            validate_prefix(prefix).map_err(|_| ChainError::InvalidPrefix)?;
        }

        Ok(Self {
            config,
            transport,
            staking_params: Default::default(),
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.chain_name
    }

    pub fn bech32_prefix(&self) -> Option<&str> {
        self.config
            .bech32_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
    }

    pub fn storage_key(&self) -> &str {
        &self.config.default_hd_path
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Staking denomination from the fetched params or the configured fallback
    pub fn bond_denom(&self) -> String {
        match &*self.staking_params.read() {
            Some(params) => params.bond_denom.clone(),
            None => self.config.bond_denom.clone(),
        }
    }

    pub fn staking_params(&self) -> Option<StakingParams> {
        self.staking_params.read().clone()
    }

    pub async fn refresh_staking_params(&self) -> Result<StakingParams> {
        let params = self.transport.get_staking_params().await?;
        if params.bond_denom.is_empty() {
            return Err(ChainError::EmptyBondDenom.into());
        }

        log::debug!(
            "Staking params updated for {}: bond denom {}",
            self.config.chain_name,
            params.bond_denom
        );
        *self.staking_params.write() = Some(params.clone());
        Ok(params)
    }
}

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ChainError {
    #[error("Storage key must not be empty")]
    EmptyStorageKey,
    #[error("Bond denomination must not be empty")]
    EmptyBondDenom,
    #[error("Invalid bech32 prefix")]
    InvalidPrefix,
}
