//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies use the camelCase names clients already send (`routeId`).
//! Stored documents are returned as-is, so most responses reuse
//! [`crate::models`] directly.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Bus, BusRoute, Location};

/// Accept a JSON number or a numeric string; `null` or a missing field
/// yields `None`.
pub fn coerce_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("number {} is out of range", n))),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("cast to number failed for value \"{}\"", s))),
        Some(other) => Err(D::Error::custom(format!(
            "cast to number failed for value {}",
            other
        ))),
    }
}

/// Body of `POST /add-stop`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddStopRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coerce_number")]
    pub longitude: Option<f64>,
}

impl AddStopRequest {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A stop entry in `POST /add-route`. Anything besides `name` is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteStopInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /add-route`. `stops` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRouteRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub stops: Vec<RouteStopInput>,
}

/// Body of `POST /add-bus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBusRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// A missing route id is treated like an unknown route.
    #[serde(rename = "routeId", default)]
    pub route_id: Option<String>,
}

/// Response of `POST /add-bus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBusResponse {
    pub bus: Bus,
    #[serde(rename = "busRoute")]
    pub bus_route: BusRoute,
}

/// Body of `POST /update-location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: String,
    #[serde(default, deserialize_with = "coerce_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coerce_number")]
    pub longitude: Option<f64>,
}

impl UpdateLocationRequest {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Body of `POST /search-buses`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBusesRequest {
    pub from: String,
    pub to: String,
}

/// Fixed confirmation body of the delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Store connection status
    pub database: String,
}
