//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. Collections are kept as
//! `Vec`s so listing and first-match lookups follow insertion order, the same
//! way a document store scans a collection without an explicit sort.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    Bus, BusId, BusRoute, BusRouteId, Collection, Location, Route, RouteId, RouteSnapshot, Stop,
    StopId,
};

/// In-memory local repository.
///
/// Cloning shares the same underlying data.
///
/// # Example
/// ```
/// use bus_tracker::db::repositories::LocalRepository;
/// use bus_tracker::db::repository::StopRepository;
/// use bus_tracker::models::{Location, Stop};
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// let stop = Stop { name: Some("Central".into()), location: Location::new(1.0, 2.0), ..Default::default() };
/// repo.insert_stop(&stop).await.unwrap();
/// assert_eq!(repo.list_stops().await.unwrap().len(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    routes: Vec<Route>,
    bus_routes: Vec<BusRoute>,

    // Collections whose operations fail, for exercising error paths
    failing: HashSet<Collection>,

    // Connection health
    is_healthy: bool,
    closed: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            stops: Vec::new(),
            buses: Vec::new(),
            routes: Vec::new(),
            bus_routes: Vec::new(),
            failing: HashSet::new(),
            is_healthy: true,
            closed: false,
        }
    }
}

impl LocalData {
    fn check(&self, collection: Collection, operation: &str) -> RepositoryResult<()> {
        if self.closed {
            return Err(RepositoryError::connection_with_context(
                "Repository has been closed",
                ErrorContext::new(operation).with_entity(collection.entity()),
            ));
        }
        if self.failing.contains(&collection) {
            return Err(RepositoryError::query_with_context(
                format!("Simulated failure on collection '{}'", collection.name()),
                ErrorContext::new(operation).with_entity(collection.entity()),
            ));
        }
        Ok(())
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make every operation on `collection` fail (or succeed again).
    pub fn set_collection_failure(&self, collection: Collection, failing: bool) {
        let mut data = self.data.write();
        if failing {
            data.failing.insert(collection);
        } else {
            data.failing.remove(&collection);
        }
    }

    /// Clear all documents, keeping health and failure settings.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.stops.clear();
        data.buses.clear();
        data.routes.clear();
        data.bus_routes.clear();
    }

    /// Replace a stored route in place, bypassing the API.
    ///
    /// Returns `false` if no route has the given identifier.
    pub fn overwrite_route(&self, route: Route) -> bool {
        let mut data = self.data.write();
        match data
            .routes
            .iter_mut()
            .find(|existing| existing.id.is_some() && existing.id == route.id)
        {
            Some(existing) => {
                *existing = route;
                true
            }
            None => false,
        }
    }

    pub fn stop_count(&self) -> usize {
        self.data.read().stops.len()
    }

    pub fn bus_count(&self) -> usize {
        self.data.read().buses.len()
    }

    pub fn route_count(&self) -> usize {
        self.data.read().routes.len()
    }

    pub fn bus_route_count(&self) -> usize {
        self.data.read().bus_routes.len()
    }

    pub fn is_closed(&self) -> bool {
        self.data.read().closed
    }
}

// =============================================================================
// Connection
// =============================================================================

#[async_trait]
impl ConnectionRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read();
        Ok(data.is_healthy && !data.closed)
    }

    async fn close(&self) -> RepositoryResult<()> {
        self.data.write().closed = true;
        Ok(())
    }
}

// =============================================================================
// Stops
// =============================================================================

#[async_trait]
impl StopRepository for LocalRepository {
    async fn insert_stop(&self, stop: &Stop) -> RepositoryResult<Stop> {
        let mut data = self.data.write();
        data.check(Collection::Stops, "insert_stop")?;
        let stored = Stop {
            id: Some(StopId::generate()),
            ..stop.clone()
        };
        data.stops.push(stored.clone());
        Ok(stored)
    }

    async fn delete_stop(&self, id: &StopId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        data.check(Collection::Stops, "delete_stop")?;
        let before = data.stops.len();
        if let Some(pos) = data.stops.iter().position(|s| s.id.as_ref() == Some(id)) {
            data.stops.remove(pos);
        }
        Ok(data.stops.len() < before)
    }

    async fn list_stops(&self) -> RepositoryResult<Vec<Stop>> {
        let data = self.data.read();
        data.check(Collection::Stops, "list_stops")?;
        Ok(data.stops.clone())
    }
}

// =============================================================================
// Routes
// =============================================================================

#[async_trait]
impl RouteRepository for LocalRepository {
    async fn insert_route(&self, route: &Route) -> RepositoryResult<Route> {
        let mut data = self.data.write();
        data.check(Collection::Routes, "insert_route")?;
        let stored = Route {
            id: Some(RouteId::generate()),
            ..route.clone()
        };
        data.routes.push(stored.clone());
        Ok(stored)
    }

    async fn get_route(&self, id: &RouteId) -> RepositoryResult<Option<Route>> {
        let data = self.data.read();
        data.check(Collection::Routes, "get_route")?;
        Ok(data
            .routes
            .iter()
            .find(|r| r.id.as_ref() == Some(id))
            .cloned())
    }

    async fn list_routes(&self) -> RepositoryResult<Vec<Route>> {
        let data = self.data.read();
        data.check(Collection::Routes, "list_routes")?;
        Ok(data.routes.clone())
    }
}

// =============================================================================
// Buses
// =============================================================================

#[async_trait]
impl BusRepository for LocalRepository {
    async fn insert_bus(&self, bus: &Bus) -> RepositoryResult<Bus> {
        let mut data = self.data.write();
        data.check(Collection::Buses, "insert_bus")?;
        let stored = Bus {
            id: Some(BusId::generate()),
            ..bus.clone()
        };
        data.buses.push(stored.clone());
        Ok(stored)
    }

    async fn delete_bus(&self, id: &BusId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        data.check(Collection::Buses, "delete_bus")?;
        let before = data.buses.len();
        if let Some(pos) = data.buses.iter().position(|b| b.id.as_ref() == Some(id)) {
            data.buses.remove(pos);
        }
        Ok(data.buses.len() < before)
    }

    async fn list_buses(&self) -> RepositoryResult<Vec<Bus>> {
        let data = self.data.read();
        data.check(Collection::Buses, "list_buses")?;
        Ok(data.buses.clone())
    }

    async fn find_bus_by_name(&self, name: &str) -> RepositoryResult<Option<Bus>> {
        let data = self.data.read();
        data.check(Collection::Buses, "find_bus_by_name")?;
        Ok(data
            .buses
            .iter()
            .find(|b| b.name.as_deref() == Some(name))
            .cloned())
    }

    async fn update_bus_location(
        &self,
        name: &str,
        location: Location,
    ) -> RepositoryResult<Option<Bus>> {
        let mut data = self.data.write();
        data.check(Collection::Buses, "update_bus_location")?;
        Ok(data
            .buses
            .iter_mut()
            .find(|b| b.name.as_deref() == Some(name))
            .map(|bus| {
                bus.location = Some(location);
                bus.clone()
            }))
    }
}

// =============================================================================
// Bus routes
// =============================================================================

#[async_trait]
impl BusRouteRepository for LocalRepository {
    async fn insert_bus_route(&self, bus_route: &BusRoute) -> RepositoryResult<BusRoute> {
        let mut data = self.data.write();
        data.check(Collection::BusRoutes, "insert_bus_route")?;
        let stored = BusRoute {
            id: Some(BusRouteId::generate()),
            ..bus_route.clone()
        };
        data.bus_routes.push(stored.clone());
        Ok(stored)
    }

    async fn find_bus_routes_with_stops(
        &self,
        stop_names: &[String],
    ) -> RepositoryResult<Vec<BusRoute>> {
        let data = self.data.read();
        data.check(Collection::BusRoutes, "find_bus_routes_with_stops")?;
        // An empty `$all` matches nothing in a document store.
        if stop_names.is_empty() {
            return Ok(Vec::new());
        }
        Ok(data
            .bus_routes
            .iter()
            .filter(|br| br.route.contains_all(stop_names))
            .cloned()
            .collect())
    }

    async fn find_bus_routes_by_bus(&self, bus_name: &str) -> RepositoryResult<Vec<BusRoute>> {
        let data = self.data.read();
        data.check(Collection::BusRoutes, "find_bus_routes_by_bus")?;
        Ok(data
            .bus_routes
            .iter()
            .filter(|br| br.bus_name.as_deref() == Some(bus_name))
            .cloned()
            .collect())
    }

    async fn replace_route_snapshot(
        &self,
        id: &BusRouteId,
        snapshot: &RouteSnapshot,
    ) -> RepositoryResult<Option<BusRoute>> {
        let mut data = self.data.write();
        data.check(Collection::BusRoutes, "replace_route_snapshot")?;
        Ok(data
            .bus_routes
            .iter_mut()
            .find(|br| br.id.as_ref() == Some(id))
            .map(|br| {
                br.route = snapshot.clone();
                br.clone()
            }))
    }
}
