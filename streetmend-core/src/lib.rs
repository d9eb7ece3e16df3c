//! Topology repair and simplification for street networks.
//!
//! The network is held as a [`LandmarkStore`] (points with ε-identity) and a
//! [`StreetTopology`] (ordered landmark references). Algorithms mutate the
//! pair in place; graph views are derived projections rebuilt on demand.

pub mod algo;
mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod prelude;

pub use error::Error;
pub use model::{GeoBounds, GeoOrigin, Landmark, LandmarkStore, Street, StreetNetwork, StreetTopology};

pub type LandmarkId = u64;
pub type StreetId = u64;

/// Two coordinates closer than this in both axes denote the same landmark.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// Decimal places kept for crossing coordinates and edge weights.
pub const DEFAULT_PRECISION: u32 = 3;
/// Upper bound of partition pruning runs.
pub const MAX_SIMPLIFY_RUNS: usize = 10;
