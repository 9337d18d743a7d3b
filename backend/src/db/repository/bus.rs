//! Bus collection operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Bus, BusId, Location};

#[async_trait]
pub trait BusRepository: Send + Sync {
    /// Persist a new bus. Any `id` on the input is ignored.
    async fn insert_bus(&self, bus: &Bus) -> RepositoryResult<Bus>;

    /// Delete a bus by identifier.
    ///
    /// # Returns
    /// `Ok(true)` if a document was removed, `Ok(false)` if none matched.
    async fn delete_bus(&self, id: &BusId) -> RepositoryResult<bool>;

    /// All buses in insertion order.
    async fn list_buses(&self) -> RepositoryResult<Vec<Bus>>;

    /// First bus whose name matches exactly.
    async fn find_bus_by_name(&self, name: &str) -> RepositoryResult<Option<Bus>>;

    /// Overwrite the location of the first bus named `name`.
    ///
    /// # Returns
    /// * `Ok(Some(Bus))` - The bus after the update
    /// * `Ok(None)` - No bus has this name
    async fn update_bus_location(
        &self,
        name: &str,
        location: Location,
    ) -> RepositoryResult<Option<Bus>>;
}
