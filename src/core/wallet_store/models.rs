use crate::transport::models::*;

/// Last fetched wallet data
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct WalletAssets {
    pub balances: Vec<Coin>,
    pub delegations: Vec<DelegationResponse>,
    pub unbonding: Vec<UnbondingDelegation>,
    pub rewards: DelegatorRewards,
}

kosmo_utils::define_string_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub enum AssetKind {
        Balances,
        Delegations,
        Unbonding,
        Rewards,
    }
);

#[derive(Debug)]
pub enum FetchOutcome {
    /// Wallet was not connected, nothing was requested
    Skipped,
    /// Response was written to the cache
    Applied,
    /// Request failed, the cache is unchanged
    Failed(anyhow::Error),
    /// Response arrived after the address or network change and was discarded
    Stale,
    /// Request was aborted
    Cancelled,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Joint result of the four fetches issued by `load_my_asset`
#[derive(Debug)]
pub struct AssetsLoadReport {
    /// Address the data was requested for
    pub address: Option<String>,
    pub balances: FetchOutcome,
    pub delegations: FetchOutcome,
    pub unbonding: FetchOutcome,
    pub rewards: FetchOutcome,
}

impl AssetsLoadReport {
    pub(super) fn skipped() -> Self {
        Self {
            address: None,
            balances: FetchOutcome::Skipped,
            delegations: FetchOutcome::Skipped,
            unbonding: FetchOutcome::Skipped,
            rewards: FetchOutcome::Skipped,
        }
    }

    pub fn outcomes(&self) -> [(AssetKind, &FetchOutcome); 4] {
        [
            (AssetKind::Balances, &self.balances),
            (AssetKind::Delegations, &self.delegations),
            (AssetKind::Unbonding, &self.unbonding),
            (AssetKind::Rewards, &self.rewards),
        ]
    }

    /// All four responses were written to the cache
    pub fn is_complete(&self) -> bool {
        self.outcomes()
            .iter()
            .all(|(_, outcome)| outcome.is_applied())
    }

    pub fn errors(&self) -> impl Iterator<Item = (AssetKind, &anyhow::Error)> + '_ {
        self.outcomes()
            .into_iter()
            .filter_map(|(kind, outcome)| Some((kind, outcome.error()?)))
    }
}
