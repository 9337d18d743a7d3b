//! # Bus Tracker Backend
//!
//! REST backend for a city bus tracking application.
//!
//! Operators register stops, define routes as ordered lists of stop names,
//! and attach buses to routes. Attaching a bus stores a bus route: a copy of
//! the route as it was at that moment. Buses report their position by name,
//! and riders search for buses whose route serves two given stops.
//!
//! ## Architecture
//!
//! - [`models`]: Stored document types and identifier newtypes
//! - [`db`]: Repository traits, MongoDB and in-memory backends, service layer
//! - [`http`]: Axum router, handlers and error mapping
//!

// RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
