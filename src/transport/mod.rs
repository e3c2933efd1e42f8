use anyhow::Result;
use async_trait::async_trait;

pub mod lcd;
pub mod models;

use self::models::*;

/// Chain queries required by the wallet store
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_bank_balances(&self, address: &str) -> Result<BankBalancesResponse>;

    async fn get_staking_delegations(&self, address: &str) -> Result<DelegationsResponse>;

    async fn get_staking_delegator_unbonding(
        &self,
        address: &str,
    ) -> Result<UnbondingDelegationsResponse>;

    async fn get_distribution_delegator_rewards(&self, address: &str)
        -> Result<DelegatorRewards>;

    async fn get_staking_params(&self) -> Result<StakingParams>;
}
