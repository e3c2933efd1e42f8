pub use self::chain::{ChainContext, NetworkConfig};
pub use self::connection::{ConnectionStore, WalletConnected};
pub use self::wallet_store::{WalletStore, WalletStoreHandler};

pub mod chain;
pub mod connection;
pub mod views;
pub mod wallet_store;
