//! Stop collection operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Stop, StopId};

#[async_trait]
pub trait StopRepository: Send + Sync {
    /// Persist a new stop. Any `id` on the input is ignored.
    ///
    /// # Returns
    /// The stored stop with its assigned identifier.
    async fn insert_stop(&self, stop: &Stop) -> RepositoryResult<Stop>;

    /// Delete a stop by identifier.
    ///
    /// # Returns
    /// `Ok(true)` if a document was removed, `Ok(false)` if none matched.
    async fn delete_stop(&self, id: &StopId) -> RepositoryResult<bool>;

    /// All stops in insertion order.
    async fn list_stops(&self) -> RepositoryResult<Vec<Stop>>;
}
