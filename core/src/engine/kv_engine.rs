use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// External key-value store backing the multi-level cache (§4.2). A miss is
/// `Ok(None)`, never an error; only transport/connection failures surface as
/// [`crate::error::CacheError`].
#[async_trait]
pub trait KvEngine: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete every key matching a glob-style `prefix*` pattern, used for
    /// session-end cache clearing and pattern-based invalidation.
    async fn delete_matching(&self, prefix: &str) -> Result<u64>;
}
