//! Store health and lifecycle.

use async_trait::async_trait;

use super::error::RepositoryResult;

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store answered
    /// - `Ok(false)` if it is known to be unavailable
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Release the underlying client. Called once at shutdown.
    async fn close(&self) -> RepositoryResult<()>;
}
