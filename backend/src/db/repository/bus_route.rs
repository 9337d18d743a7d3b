//! Bus route snapshot operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{BusRoute, BusRouteId, RouteSnapshot};

#[async_trait]
pub trait BusRouteRepository: Send + Sync {
    /// Persist a new bus route snapshot. Any `id` on the input is ignored.
    async fn insert_bus_route(&self, bus_route: &BusRoute) -> RepositoryResult<BusRoute>;

    /// Bus routes whose snapshot contains a stop for every name in
    /// `stop_names`. Stop order is not considered.
    async fn find_bus_routes_with_stops(
        &self,
        stop_names: &[String],
    ) -> RepositoryResult<Vec<BusRoute>>;

    /// All bus routes recorded for the bus called `bus_name`.
    async fn find_bus_routes_by_bus(&self, bus_name: &str) -> RepositoryResult<Vec<BusRoute>>;

    /// Replace the embedded route snapshot of one bus route.
    ///
    /// # Returns
    /// * `Ok(Some(BusRoute))` - The bus route after the update
    /// * `Ok(None)` - No bus route has this identifier
    async fn replace_route_snapshot(
        &self,
        id: &BusRouteId,
        snapshot: &RouteSnapshot,
    ) -> RepositoryResult<Option<BusRoute>>;
}
