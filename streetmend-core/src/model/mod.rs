//! Data model of the street network
//!
//! Landmarks and streets are the single source of truth, every graph
//! built from them is a disposable view.

pub mod landmarks;
pub mod network;
pub mod streets;

pub use landmarks::{GeoBounds, GeoOrigin, IndexedLandmark, Landmark, LandmarkStore};
pub use network::StreetNetwork;
pub use streets::{Street, StreetTopology};
