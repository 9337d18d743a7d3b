//! Route collection operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Route, RouteId};

#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Persist a new route. Any `id` on the input is ignored.
    async fn insert_route(&self, route: &Route) -> RepositoryResult<Route>;

    /// Fetch a route by identifier.
    ///
    /// # Returns
    /// * `Ok(Some(Route))` - The route
    /// * `Ok(None)` - No route has this identifier
    /// * `Err(RepositoryError)` - If the lookup fails
    async fn get_route(&self, id: &RouteId) -> RepositoryResult<Option<Route>>;

    /// All routes in insertion order.
    async fn list_routes(&self) -> RepositoryResult<Vec<Route>>;
}
