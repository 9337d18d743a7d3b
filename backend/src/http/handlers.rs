//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer. Handlers that report their own failures (add-route, add-bus,
//! routes, search, bus details) take the JSON body as a `Result` so a
//! malformed body gets the same 500 response as a store failure; the others
//! leave body rejections to axum.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::error;

use super::dto::{
    AddBusRequest, AddBusResponse, AddRouteRequest, AddStopRequest, HealthResponse,
    MessageResponse, SearchBusesRequest, UpdateLocationRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services;
use crate::models::{Bus, BusId, BusRoute, Route, RouteId, Stop, StopId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Stops
// =============================================================================

/// POST /add-stop
pub async fn add_stop(
    State(state): State<AppState>,
    Json(request): Json<AddStopRequest>,
) -> HandlerResult<Stop> {
    let location = request.location();
    let stop = services::add_stop(state.repository.as_ref(), request.name, location).await?;
    Ok(Json(stop))
}

/// DELETE /delete-stop/{id}
pub async fn delete_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    services::delete_stop(state.repository.as_ref(), &StopId::new(id)).await?;
    Ok(Json(MessageResponse::new("Stop deleted successfully")))
}

/// GET /stops
pub async fn list_stops(State(state): State<AppState>) -> HandlerResult<Vec<Stop>> {
    Ok(Json(services::list_stops(state.repository.as_ref()).await?))
}

// =============================================================================
// Routes
// =============================================================================

/// POST /add-route
pub async fn add_route(
    State(state): State<AppState>,
    payload: Result<Json<AddRouteRequest>, JsonRejection>,
) -> HandlerResult<Route> {
    const MESSAGE: &str = "Error adding route";

    let Json(request) = payload.map_err(|e| AppError::operation(MESSAGE, e.body_text()))?;
    let stop_names = request.stops.into_iter().map(|stop| stop.name).collect();
    let route = services::add_route(state.repository.as_ref(), request.title, stop_names)
        .await
        .map_err(|e| AppError::operation(MESSAGE, e))?;
    Ok(Json(route))
}

/// GET /routes
pub async fn list_routes(State(state): State<AppState>) -> HandlerResult<Vec<Route>> {
    let routes = services::list_routes(state.repository.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Error fetching routes");
            AppError::Internal(INTERNAL_SERVER_ERROR.to_string())
        })?;
    Ok(Json(routes))
}

// =============================================================================
// Buses
// =============================================================================

/// POST /add-bus
///
/// Create a bus and attach it to an existing route.
pub async fn add_bus(
    State(state): State<AppState>,
    payload: Result<Json<AddBusRequest>, JsonRejection>,
) -> HandlerResult<AddBusResponse> {
    const MESSAGE: &str = "Error adding bus";

    let Json(request) = payload.map_err(|e| AppError::operation(MESSAGE, e.body_text()))?;
    let Some(route_id) = request.route_id.map(RouteId::new) else {
        return Err(AppError::NotFound("Route not found".to_string()));
    };
    match services::add_bus(state.repository.as_ref(), request.name, &route_id).await {
        Ok((bus, bus_route)) => Ok(Json(AddBusResponse { bus, bus_route })),
        Err(e) if e.is_not_found() => Err(AppError::NotFound("Route not found".to_string())),
        Err(e) => Err(AppError::operation(MESSAGE, e)),
    }
}

/// POST /update-location
///
/// Responds with JSON `null` when no bus has the given name.
pub async fn update_location(
    State(state): State<AppState>,
    Json(request): Json<UpdateLocationRequest>,
) -> HandlerResult<Option<Bus>> {
    let location = request.location();
    let bus =
        services::update_bus_location(state.repository.as_ref(), &request.name, location).await?;
    Ok(Json(bus))
}

/// GET /buses
pub async fn list_buses(State(state): State<AppState>) -> HandlerResult<Vec<Bus>> {
    Ok(Json(services::list_buses(state.repository.as_ref()).await?))
}

/// DELETE /delete-bus/{id}
pub async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<MessageResponse> {
    services::delete_bus(state.repository.as_ref(), &BusId::new(id)).await?;
    Ok(Json(MessageResponse::new("Bus deleted successfully")))
}

/// GET /bus-details/name/{name}
///
/// Live location of a bus, looked up by name.
pub async fn bus_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> HandlerResult<Bus> {
    match services::get_bus_by_name(state.repository.as_ref(), &name).await {
        Ok(bus) => Ok(Json(bus)),
        Err(e) if e.is_not_found() => Err(AppError::NotFound("Bus not found".to_string())),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

// =============================================================================
// Search & snapshots
// =============================================================================

/// POST /search-buses
///
/// Bus routes that serve both stops, regardless of direction.
pub async fn search_buses(
    State(state): State<AppState>,
    payload: Result<Json<SearchBusesRequest>, JsonRejection>,
) -> HandlerResult<Vec<BusRoute>> {
    let Json(request) = payload.map_err(|e| {
        error!(error = %e, "Error searching buses");
        AppError::Internal(INTERNAL_SERVER_ERROR.to_string())
    })?;

    let buses = services::search_buses(state.repository.as_ref(), &request.from, &request.to)
        .await
        .map_err(|e| {
            error!(error = %e, "Error searching buses");
            AppError::Internal(INTERNAL_SERVER_ERROR.to_string())
        })?;

    if buses.is_empty() {
        return Err(AppError::NotFound(
            "No buses found for the given route".to_string(),
        ));
    }
    Ok(Json(buses))
}

/// POST /refresh-bus-route/{bus_name}
///
/// Re-copy the source route into the bus's route snapshots.
pub async fn refresh_bus_route(
    State(state): State<AppState>,
    Path(bus_name): Path<String>,
) -> HandlerResult<Vec<BusRoute>> {
    let refreshed = services::refresh_bus_route(state.repository.as_ref(), &bus_name).await?;
    Ok(Json(refreshed))
}
