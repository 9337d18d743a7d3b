//! Repository trait definitions for document store operations.
//!
//! Each collection gets its own focused trait so implementations and test
//! doubles stay small.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`connection`]: Health check and lifecycle
//! - [`stop`]: Stop documents
//! - [`route`]: Route documents
//! - [`bus`]: Bus documents and live locations
//! - [`bus_route`]: Bus route snapshots and stop search
//!
//! # Convenience Trait Bound
//!
//! Functions that need every collection use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn attach<R: FullRepository + ?Sized>(repo: &R, route_id: &RouteId) -> RepositoryResult<()> {
//!     let route = repo.get_route(route_id).await?;
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod bus_route;
pub mod connection;
pub mod error;
pub mod route;
pub mod stop;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use bus::BusRepository;
pub use bus_route::BusRouteRepository;
pub use connection::ConnectionRepository;
pub use route::RouteRepository;
pub use stop::StopRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type implementing all five traits.
pub trait FullRepository:
    ConnectionRepository + StopRepository + RouteRepository + BusRepository + BusRouteRepository
{
}

impl<T> FullRepository for T where
    T: ConnectionRepository
        + StopRepository
        + RouteRepository
        + BusRepository
        + BusRouteRepository
{
}
