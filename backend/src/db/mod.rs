//! Storage for stops, routes, buses and bus route snapshots.
//!
//! This module provides abstractions for store operations via the Repository
//! pattern, so the HTTP layer never depends on a concrete database client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (crate::http)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Route stop reduction                                  │
//! │  - Bus attach with rollback                              │
//! │  - Snapshot refresh                                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌───────────▼─────────────┐
//! │ Mongo Repository │     │ Local Repository        │
//! │ (document store) │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use bus_tracker::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let buses = services::list_buses(repo.as_ref()).await?;
//!     repo.close().await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "mongo-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Mongo config is colocated with the repository implementation.
#[cfg(feature = "mongo-repo")]
pub use repositories::mongo::MongoConfig;
#[cfg(not(feature = "mongo-repo"))]
#[derive(Debug, Clone)]
pub struct MongoConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "mongo-repo")]
pub use repositories::MongoRepository;
pub use repository::{
    BusRepository, BusRouteRepository, ConnectionRepository, ErrorContext, FullRepository,
    RepositoryError, RepositoryResult, RouteRepository, StopRepository,
};
