//! Stop, bus, route and bus-route documents.
//!
//! Field names follow the persisted JSON layout (`_id`, `busName`, ...) so the
//! same types serve as HTTP response bodies and in-memory documents. Every
//! scalar field is optional because the store applies no required-field rules.

use serde::{Deserialize, Serialize};

crate::define_id_type!(StopId);
crate::define_id_type!(BusId);
crate::define_id_type!(RouteId);
crate::define_id_type!(BusRouteId);

/// The four document collections.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Stops,
    Buses,
    Routes,
    BusRoutes,
}

impl Collection {
    /// Collection name in the document store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Stops => "stops",
            Collection::Buses => "buses",
            Collection::Routes => "routes",
            Collection::BusRoutes => "busroutes",
        }
    }

    /// Singular entity name used in error context.
    pub fn entity(&self) -> &'static str {
        match self {
            Collection::Stops => "stop",
            Collection::Buses => "bus",
            Collection::Routes => "route",
            Collection::BusRoutes => "bus_route",
        }
    }
}

/// Geographic position. No range checks are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }
}

/// A named bus stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StopId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Location,
}

/// A bus. `location` stays absent until the first location update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BusId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A stop entry inside a route or a bus route snapshot.
///
/// Routes created through the API only carry `name`; `location` is kept when a
/// stored document happens to have one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl RouteStop {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: None,
        }
    }
}

/// An ordered list of stops under a title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RouteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

/// Copy of a route's title and stops embedded in a [`BusRoute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

impl RouteSnapshot {
    pub fn of(route: &Route) -> Self {
        Self {
            title: route.title.clone(),
            stops: route
                .stops
                .iter()
                .map(|stop| RouteStop {
                    name: stop.name.clone(),
                    location: stop.location,
                })
                .collect(),
        }
    }

    /// True when every name appears somewhere in the stop list, in any order.
    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|wanted| {
            self.stops
                .iter()
                .any(|stop| stop.name.as_deref() == Some(wanted.as_ref()))
        })
    }
}

/// Association of a bus with the snapshot of the route it was attached to.
///
/// The snapshot does not follow later changes to the source route until it is
/// explicitly refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusRoute {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BusRouteId>,
    #[serde(rename = "busName", default, skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    #[serde(rename = "routeId", default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,
    #[serde(default)]
    pub route: RouteSnapshot,
}

impl BusRoute {
    /// Snapshot `route` for the bus called `bus_name`.
    pub fn snapshot(bus_name: Option<String>, route: &Route) -> Self {
        Self {
            id: None,
            bus_name,
            route_id: route.id.clone(),
            route: RouteSnapshot::of(route),
        }
    }
}
