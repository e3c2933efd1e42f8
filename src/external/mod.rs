use anyhow::Result;
use async_trait::async_trait;

/// Persistent key-value storage, e.g. browser local storage
#[async_trait]
pub trait Storage: Sync + Send {
    /// Retrieve data from storage
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Upsert data into storage and wait until operation complete
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove data from storage and wait until operation complete
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Raw access to the Cosmos SDK REST (LCD) endpoint
#[async_trait]
pub trait LcdConnection: Send + Sync {
    /// Performs a GET request for the path relative to the endpoint.
    /// Returns `None` if the resource was not found
    async fn send_get(&self, path: &str) -> Result<Option<String>>;
}
