//! Persisted document shapes for the MongoDB collections.
//!
//! Identifiers are stored as `ObjectId`s and exposed to the rest of the crate
//! as their hex string form.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{
    Bus, BusId, BusRoute, BusRouteId, Location, Route, RouteId, RouteSnapshot, RouteStop, Stop,
    StopId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusRouteDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "busName", default, skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    #[serde(rename = "routeId", default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<ObjectId>,
    #[serde(default)]
    pub route: RouteSnapshot,
}

fn hex(id: Option<ObjectId>) -> Option<String> {
    id.map(|oid| oid.to_hex())
}

impl From<StopDoc> for Stop {
    fn from(doc: StopDoc) -> Self {
        Stop {
            id: hex(doc.id).map(StopId::from),
            name: doc.name,
            location: doc.location,
        }
    }
}

impl From<&Stop> for StopDoc {
    fn from(stop: &Stop) -> Self {
        StopDoc {
            id: None,
            name: stop.name.clone(),
            location: stop.location,
        }
    }
}

impl From<BusDoc> for Bus {
    fn from(doc: BusDoc) -> Self {
        Bus {
            id: hex(doc.id).map(BusId::from),
            name: doc.name,
            location: doc.location,
        }
    }
}

impl From<&Bus> for BusDoc {
    fn from(bus: &Bus) -> Self {
        BusDoc {
            id: None,
            name: bus.name.clone(),
            location: bus.location,
        }
    }
}

impl From<RouteDoc> for Route {
    fn from(doc: RouteDoc) -> Self {
        Route {
            id: hex(doc.id).map(RouteId::from),
            title: doc.title,
            stops: doc.stops,
        }
    }
}

impl From<&Route> for RouteDoc {
    fn from(route: &Route) -> Self {
        RouteDoc {
            id: None,
            title: route.title.clone(),
            stops: route.stops.clone(),
        }
    }
}

impl From<BusRouteDoc> for BusRoute {
    fn from(doc: BusRouteDoc) -> Self {
        BusRoute {
            id: hex(doc.id).map(BusRouteId::from),
            bus_name: doc.bus_name,
            route_id: hex(doc.route_id).map(RouteId::from),
            route: doc.route,
        }
    }
}

impl From<&BusRoute> for BusRouteDoc {
    /// A `routeId` that is not a valid ObjectId is dropped.
    fn from(bus_route: &BusRoute) -> Self {
        BusRouteDoc {
            id: None,
            bus_name: bus_route.bus_name.clone(),
            route_id: bus_route
                .route_id
                .as_ref()
                .and_then(|id| ObjectId::parse_str(id.as_str()).ok()),
            route: bus_route.route.clone(),
        }
    }
}
