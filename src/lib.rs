//! Floormap - a facility locator that places GPS-tagged devices on building floorplans
//!
//! The geometric core lives in [`pip`] (which building contains a point) and
//! [`projection`] (where on that building's floorplan it lands). The
//! remaining modules feed devices in and look them up for the server binary.

pub mod config;
pub mod directory;
pub mod feed;
pub mod locator;
pub mod models;
pub mod pip;
pub mod projection;

pub use models::{BuildingBoundary, GeoPoint, PixelPoint};
pub use pip::PolygonClassifier;
pub use projection::QuadProjector;
