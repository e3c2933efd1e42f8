use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::{self, AbortHandle, Abortable, Aborted};
use parking_lot::{Mutex, RwLock};

use kosmo_utils::*;

pub use self::models::*;
use super::chain::ChainContext;
use super::connection::{ConnectionStore, WalletConnected};
use super::views;
use crate::external::Storage;
use crate::transport::models::*;

mod models;

/// Cached wallet data of the connected address on the active network
pub struct WalletStore {
    chain: RwLock<Arc<ChainContext>>,
    connection: ConnectionStore,
    assets: RwLock<CachedAssets>,
    pending: Mutex<PendingLoads>,
    handler: Arc<dyn WalletStoreHandler>,
}

impl WalletStore {
    pub fn new(
        chain: Arc<ChainContext>,
        storage: Arc<dyn Storage>,
        handler: Arc<dyn WalletStoreHandler>,
    ) -> Self {
        Self {
            chain: RwLock::new(chain),
            connection: ConnectionStore::new(storage),
            assets: Default::default(),
            pending: Default::default(),
            handler,
        }
    }

    pub fn chain(&self) -> Arc<ChainContext> {
        self.chain.read().clone()
    }

    /// Switches the active network.
    ///
    /// Cached data belongs to the previous network so it is reset
    /// and all pending loads are cancelled.
    pub fn set_chain(&self, chain: Arc<ChainContext>) {
        log::debug!("Switching network to {}", chain.name());
        *self.chain.write() = chain;
        self.reset_assets();
    }

    pub async fn connected_wallet(&self) -> WalletConnected {
        let chain = self.chain();
        self.connection.connected_wallet(chain.storage_key()).await
    }

    /// Replaces the in-memory connected wallet record without persisting it
    pub fn set_connected_wallet(&self, value: Option<WalletConnected>) -> WalletConnected {
        let wallet = self.connection.set_connected_wallet(value);
        self.invalidate();
        wallet
    }

    /// Persists the connected wallet record for the active network and makes it current
    pub async fn connect(&self, wallet: WalletConnected) -> Result<WalletConnected> {
        let chain = self.chain();
        let wallet = self.connection.connect(chain.storage_key(), wallet).await?;
        // Loads started while the record was being saved still see the previous address
        self.invalidate();
        Ok(wallet)
    }

    /// Forgets the connected wallet and resets all cached data
    pub async fn disconnect(&self) -> Result<()> {
        let chain = self.chain();
        self.invalidate();
        let result = self.connection.clear(chain.storage_key()).await;
        // The persisted record stays visible until it is removed
        self.reset_assets();
        result
    }

    /// Connected address encoded with the prefix of the active network.
    /// Empty if there is no connected wallet
    pub async fn current_address(&self) -> Result<String> {
        let wallet = self.connected_wallet().await;
        if !wallet.is_connected() {
            return Ok(String::new());
        }

        let chain = self.chain();
        convert_address_prefix(&wallet.cosmos_address, chain.bech32_prefix())
    }

    pub async fn short_address(&self) -> Result<String> {
        let address = self.current_address().await?;
        Ok(short_address(&address))
    }

    pub fn assets(&self) -> WalletAssets {
        self.assets.read().data.clone()
    }

    pub fn balances(&self) -> Vec<Coin> {
        self.assets.read().data.balances.clone()
    }

    pub fn delegations(&self) -> Vec<DelegationResponse> {
        self.assets.read().data.delegations.clone()
    }

    pub fn unbonding(&self) -> Vec<UnbondingDelegation> {
        self.assets.read().data.unbonding.clone()
    }

    pub fn rewards(&self) -> DelegatorRewards {
        self.assets.read().data.rewards.clone()
    }

    pub fn balance_of_staking_token(&self) -> Coin {
        let bond_denom = self.chain().bond_denom();
        views::balance_of_staking_token(&self.assets.read().data.balances, &bond_denom)
    }

    pub fn staking_amount(&self) -> Coin {
        views::staking_amount(&self.assets.read().data.delegations)
    }

    pub fn staking_amounts_by_denom(&self) -> Vec<Coin> {
        views::staking_amounts_by_denom(&self.assets.read().data.delegations)
    }

    pub fn reward_amount(&self) -> DecCoin {
        let bond_denom = self.chain().bond_denom();
        views::reward_amount(&self.assets.read().data.rewards, &bond_denom)
    }

    pub fn unbonding_amount(&self) -> Coin {
        let bond_denom = self.chain().bond_denom();
        views::unbonding_amount(&self.assets.read().data.unbonding, &bond_denom)
    }

    /// Fetches balances, delegations, unbonding entries and rewards concurrently.
    ///
    /// Every response is written to the cache as soon as it arrives. Resolves when
    /// all four fetches are settled. Responses which arrive after the address or
    /// the network was changed are discarded.
    pub async fn load_my_asset(&self) -> Result<AssetsLoadReport> {
        let generation = self.assets.read().generation;

        let address = self.current_address().await?;
        if address.is_empty() {
            return Ok(AssetsLoadReport::skipped());
        }

        let chain = self.chain();
        let transport = chain.transport();
        let guard = PendingLoadGuard::new(&self.pending);

        log::debug!("Loading assets of {address} on {}", chain.name());

        let balances = guard.abortable(self.fetch_into(
            generation,
            async {
                let response = transport.get_bank_balances(&address).await?;
                Ok::<_, anyhow::Error>(response.balances)
            },
            |assets, value| assets.balances = value,
            |handler, value| handler.on_balances_changed(value),
        ));
        let delegations = guard.abortable(self.fetch_into(
            generation,
            async {
                let response = transport.get_staking_delegations(&address).await?;
                Ok::<_, anyhow::Error>(response.delegation_responses)
            },
            |assets, value| assets.delegations = value,
            |handler, value| handler.on_delegations_changed(value),
        ));
        let unbonding = guard.abortable(self.fetch_into(
            generation,
            async {
                let response = transport.get_staking_delegator_unbonding(&address).await?;
                Ok::<_, anyhow::Error>(response.unbonding_responses)
            },
            |assets, value| assets.unbonding = value,
            |handler, value| handler.on_unbonding_changed(value),
        ));
        let rewards = guard.abortable(self.fetch_into(
            generation,
            transport.get_distribution_delegator_rewards(&address),
            |assets, value| assets.rewards = value,
            |handler, value| handler.on_rewards_changed(value),
        ));

        let (balances, delegations, unbonding, rewards) =
            future::join4(balances, delegations, unbonding, rewards).await;

        let report = AssetsLoadReport {
            address: Some(address),
            balances: settle(AssetKind::Balances, balances),
            delegations: settle(AssetKind::Delegations, delegations),
            unbonding: settle(AssetKind::Unbonding, unbonding),
            rewards: settle(AssetKind::Rewards, rewards),
        };
        log::debug!("Assets loaded: {report:?}");

        Ok(report)
    }

    /// Fresh balances of the connected address. The cache is not updated
    pub async fn my_balance(&self) -> Result<Vec<Coin>> {
        let address = self.require_address().await?;
        let chain = self.chain();
        Ok(chain.transport().get_bank_balances(&address).await?.balances)
    }

    /// Fresh delegations of the connected address. The cache is not updated
    pub async fn my_delegations(&self) -> Result<Vec<DelegationResponse>> {
        let address = self.require_address().await?;
        let chain = self.chain();
        Ok(chain
            .transport()
            .get_staking_delegations(&address)
            .await?
            .delegation_responses)
    }

    /// Fresh unbonding entries of the connected address. The cache is not updated
    pub async fn my_unbonding(&self) -> Result<Vec<UnbondingDelegation>> {
        let address = self.require_address().await?;
        let chain = self.chain();
        Ok(chain
            .transport()
            .get_staking_delegator_unbonding(&address)
            .await?
            .unbonding_responses)
    }

    /// Fresh rewards of the connected address. The cache is not updated
    pub async fn my_rewards(&self) -> Result<DelegatorRewards> {
        let address = self.require_address().await?;
        let chain = self.chain();
        chain
            .transport()
            .get_distribution_delegator_rewards(&address)
            .await
    }

    /// Aborts all pending loads. Their late responses are discarded
    pub fn cancel_pending(&self) {
        self.invalidate();
    }

    async fn require_address(&self) -> Result<String> {
        let address = self.current_address().await?;
        if address.is_empty() {
            return Err(WalletStoreError::NotConnected.into());
        }
        Ok(address)
    }

    async fn fetch_into<T, F, A, N>(
        &self,
        generation: u64,
        fetch: F,
        apply: A,
        notify: N,
    ) -> Result<FetchOutcome>
    where
        T: Clone,
        F: Future<Output = Result<T>>,
        A: FnOnce(&mut WalletAssets, T),
        N: FnOnce(&dyn WalletStoreHandler, &T),
    {
        let value = fetch.await?;

        {
            let mut assets = self.assets.write();
            if assets.generation != generation {
                return Ok(FetchOutcome::Stale);
            }
            apply(&mut assets.data, value.clone());
        }

        notify(self.handler.as_ref(), &value);
        Ok(FetchOutcome::Applied)
    }

    fn invalidate(&self) {
        {
            let mut assets = self.assets.write();
            assets.generation = assets.generation.wrapping_add(1);
        }

        let loads = std::mem::take(&mut self.pending.lock().loads);
        for handle in loads.into_values().flatten() {
            handle.abort();
        }
    }

    fn reset_assets(&self) {
        self.invalidate();
        self.assets.write().data = Default::default();
        self.handler.on_assets_reset();
    }
}

pub trait WalletStoreHandler: Send + Sync {
    fn on_balances_changed(&self, balances: &[Coin]);

    fn on_delegations_changed(&self, delegations: &[DelegationResponse]);

    fn on_unbonding_changed(&self, unbonding: &[UnbondingDelegation]);

    fn on_rewards_changed(&self, rewards: &DelegatorRewards);

    /// Called when the cache is cleared on disconnect or network switch
    fn on_assets_reset(&self);
}

#[derive(Default)]
struct CachedAssets {
    generation: u64,
    data: WalletAssets,
}

#[derive(Default)]
struct PendingLoads {
    next_id: u64,
    loads: HashMap<u64, Vec<AbortHandle>>,
}

/// Registers abort handles of a single load and unregisters them when dropped
struct PendingLoadGuard<'a> {
    pending: &'a Mutex<PendingLoads>,
    id: u64,
}

impl<'a> PendingLoadGuard<'a> {
    fn new(pending: &'a Mutex<PendingLoads>) -> Self {
        let mut state = pending.lock();
        let id = state.next_id;
        state.next_id = state.next_id.wrapping_add(1);
        state.loads.insert(id, Vec::new());
        Self { pending, id }
    }

    fn abortable<F: Future>(&self, fut: F) -> Abortable<F> {
        let (handle, registration) = AbortHandle::new_pair();
        match self.pending.lock().loads.get_mut(&self.id) {
            Some(handles) => handles.push(handle),
            // Load was cancelled before this fetch started
            None => handle.abort(),
        }
        Abortable::new(fut, registration)
    }
}

impl Drop for PendingLoadGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().loads.remove(&self.id);
    }
}

fn settle(kind: AssetKind, result: Result<Result<FetchOutcome>, Aborted>) -> FetchOutcome {
    match result {
        Ok(Ok(outcome)) => {
            if matches!(outcome, FetchOutcome::Stale) {
                log::debug!("Discarded stale {kind} response");
            }
            outcome
        }
        Ok(Err(e)) => {
            log::warn!("Failed to fetch {kind}: {e:?}");
            FetchOutcome::Failed(e)
        }
        Err(Aborted) => FetchOutcome::Cancelled,
    }
}

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum WalletStoreError {
    #[error("Wallet is not connected")]
    NotConnected,
}
