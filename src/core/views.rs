//! Display values derived from the cached wallet data.
//!
//! All functions are pure: the staking denomination of the active
//! network is passed explicitly.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::transport::models::*;

/// Balance of the staking token or a zero placeholder
pub fn balance_of_staking_token(balances: &[Coin], bond_denom: &str) -> Coin {
    balances
        .iter()
        .find(|coin| coin.denom == bond_denom)
        .cloned()
        .unwrap_or_else(|| Coin::zero(bond_denom))
}

/// Sum of all delegated balances.
///
/// Delegations are expected to share one denomination. The resulting
/// denomination is the one of the last entry (empty if there are no delegations).
/// Use [`staking_amounts_by_denom`] for multi-denomination chains.
pub fn staking_amount(delegations: &[DelegationResponse]) -> Coin {
    let mut amount = BigUint::default();
    let mut denom: Option<&str> = None;

    for item in delegations {
        if let Some(prev) = denom {
            if prev != item.balance.denom {
                log::warn!(
                    "Delegations have different denominations: {prev} and {}",
                    item.balance.denom
                );
            }
        }
        amount += &item.balance.amount;
        denom = Some(&item.balance.denom);
    }

    Coin {
        denom: denom.unwrap_or_default().to_owned(),
        amount,
    }
}

/// Delegated balances aggregated per denomination, sorted by denomination
pub fn staking_amounts_by_denom(delegations: &[DelegationResponse]) -> Vec<Coin> {
    let mut amounts = BTreeMap::<&str, BigUint>::new();
    for item in delegations {
        *amounts.entry(&item.balance.denom).or_default() += &item.balance.amount;
    }

    amounts
        .into_iter()
        .map(|(denom, amount)| Coin {
            denom: denom.to_owned(),
            amount,
        })
        .collect()
}

/// Total reward in the staking token or a zero placeholder
pub fn reward_amount(rewards: &DelegatorRewards, bond_denom: &str) -> DecCoin {
    rewards
        .total
        .iter()
        .find(|coin| coin.denom == bond_denom)
        .cloned()
        .unwrap_or_else(|| DecCoin::zero(bond_denom))
}

/// Sum of all unbonding entries. Entries are assumed to be in the staking token
pub fn unbonding_amount(unbonding: &[UnbondingDelegation], bond_denom: &str) -> Coin {
    let amount = unbonding
        .iter()
        .flat_map(|item| item.entries.iter())
        .fold(BigUint::default(), |sum, entry| sum + &entry.balance);

    Coin {
        denom: bond_denom.to_owned(),
        amount,
    }
}
