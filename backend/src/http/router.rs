//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing) and
//! returns an axum router ready for serving.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Browser clients call the API from any origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Stops
        .route("/add-stop", post(handlers::add_stop))
        .route("/delete-stop/{id}", delete(handlers::delete_stop))
        .route("/stops", get(handlers::list_stops))
        // Routes
        .route("/add-route", post(handlers::add_route))
        .route("/routes", get(handlers::list_routes))
        // Buses
        .route("/add-bus", post(handlers::add_bus))
        .route("/update-location", post(handlers::update_location))
        .route("/buses", get(handlers::list_buses))
        .route("/delete-bus/{id}", delete(handlers::delete_bus))
        .route("/bus-details/name/{name}", get(handlers::bus_details))
        // Search and snapshots
        .route("/search-buses", post(handlers::search_buses))
        .route(
            "/refresh-bus-route/{bus_name}",
            post(handlers::refresh_bus_route),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
