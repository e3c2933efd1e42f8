use std::fmt;
use std::time::Duration;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use kosmo_utils::*;

/// Token amount with an integer value
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "serde_string")]
    pub amount: BigUint,
}

impl Coin {
    pub fn new<A: Into<BigUint>>(denom: &str, amount: A) -> Self {
        Self {
            denom: denom.to_owned(),
            amount: amount.into(),
        }
    }

    /// Placeholder used when there is no entry for the denomination
    pub fn zero(denom: &str) -> Self {
        Self::new(denom, 0u32)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Token amount with a decimal value (e.g. accrued rewards).
///
/// The amount is kept exactly as it was received.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: String,
}

impl DecCoin {
    pub fn zero(denom: &str) -> Self {
        Self {
            denom: denom.to_owned(),
            amount: "0".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default, with = "serde_optional_u64")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BankBalancesResponse {
    #[serde(default)]
    pub balances: Vec<Coin>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    #[serde(default)]
    pub shares: String,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelegationResponse {
    #[serde(default)]
    pub delegation: Delegation,
    pub balance: Coin,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelegationsResponse {
    #[serde(default)]
    pub delegation_responses: Vec<DelegationResponse>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnbondingDelegationEntry {
    #[serde(default, with = "serde_u64")]
    pub creation_height: u64,
    #[serde(default)]
    pub completion_time: String,
    #[serde(default, with = "serde_string")]
    pub initial_balance: BigUint,
    #[serde(with = "serde_string")]
    pub balance: BigUint,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnbondingDelegation {
    pub delegator_address: String,
    pub validator_address: String,
    #[serde(default)]
    pub entries: Vec<UnbondingDelegationEntry>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UnbondingDelegationsResponse {
    #[serde(default)]
    pub unbonding_responses: Vec<UnbondingDelegation>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelegationDelegatorReward {
    pub validator_address: String,
    #[serde(default)]
    pub reward: Vec<DecCoin>,
}

/// Rewards accrued by the delegator. Empty until the first fetch
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DelegatorRewards {
    #[serde(default)]
    pub rewards: Vec<DelegationDelegatorReward>,
    #[serde(default)]
    pub total: Vec<DecCoin>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StakingParams {
    #[serde(with = "serde_proto_duration")]
    pub unbonding_time: Duration,
    pub max_validators: u32,
    pub max_entries: u32,
    #[serde(default)]
    pub historical_entries: u32,
    pub bond_denom: String,
    #[serde(default)]
    pub min_commission_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingParamsResponse {
    pub params: StakingParams,
}
