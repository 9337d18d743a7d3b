//! Document types stored by the bus tracker.
//!
//! - [`transit`]: stops, buses, routes and bus route snapshots
//! - [`macros`]: identifier newtype generator

pub mod macros;
pub mod transit;

pub use transit::*;
