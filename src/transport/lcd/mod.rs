use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::*;
use super::Transport;
use crate::external::LcdConnection;

/// [`Transport`] over the Cosmos SDK REST gateway
pub struct LcdTransport {
    connection: Arc<dyn LcdConnection>,
}

impl LcdTransport {
    pub fn new(connection: Arc<dyn LcdConnection>) -> Self {
        Self { connection }
    }

    async fn fetch<T>(&self, path: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        log::debug!("LCD request: {path}");
        match self.connection.send_get(path).await? {
            Some(response) => parse_response(&response).map(Some),
            None => Ok(None),
        }
    }

    async fn fetch_or_default<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.fetch(path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl Transport for LcdTransport {
    async fn get_bank_balances(&self, address: &str) -> Result<BankBalancesResponse> {
        let address = checked_address(address)?;
        self.fetch_or_default(&format!("cosmos/bank/v1beta1/balances/{address}"))
            .await
    }

    async fn get_staking_delegations(&self, address: &str) -> Result<DelegationsResponse> {
        let address = checked_address(address)?;
        self.fetch_or_default(&format!("cosmos/staking/v1beta1/delegations/{address}"))
            .await
    }

    async fn get_staking_delegator_unbonding(
        &self,
        address: &str,
    ) -> Result<UnbondingDelegationsResponse> {
        let address = checked_address(address)?;
        self.fetch_or_default(&format!(
            "cosmos/staking/v1beta1/delegators/{address}/unbonding_delegations"
        ))
        .await
    }

    async fn get_distribution_delegator_rewards(
        &self,
        address: &str,
    ) -> Result<DelegatorRewards> {
        let address = checked_address(address)?;
        self.fetch_or_default(&format!(
            "cosmos/distribution/v1beta1/delegators/{address}/rewards"
        ))
        .await
    }

    async fn get_staking_params(&self) -> Result<StakingParams> {
        match self
            .fetch::<StakingParamsResponse>("cosmos/staking/v1beta1/params")
            .await?
        {
            Some(response) => Ok(response.params),
            None => Err(TransportError::NotFound.into()),
        }
    }
}

/// Addresses are placed into the url path as is
fn checked_address(address: &str) -> Result<&str, TransportError> {
    if !address.is_empty() && address.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(address)
    } else {
        Err(TransportError::InvalidAddress)
    }
}

fn parse_response<T>(response: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    #[derive(Deserialize)]
    struct ApiError {
        code: u32,
        #[serde(default)]
        message: String,
    }

    let value = serde_json::from_str::<serde_json::Value>(response)
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

    if value.get("code").is_some() {
        if let Ok(ApiError { code, message }) = serde_json::from_value::<ApiError>(value.clone()) {
            if code != 0 {
                return Err(TransportError::Api { code, message }.into());
            }
        }
    }

    serde_json::from_value(value).map_err(|e| TransportError::InvalidResponse(e.to_string()).into())
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum TransportError {
    #[error("Invalid address")]
    InvalidAddress,
    #[error("Resource not found")]
    NotFound,
    #[error("Api error {code}: {message}")]
    Api { code: u32, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
