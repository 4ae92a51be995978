//! Core data models for the facility locator.

pub mod building;
pub mod device;
pub mod point;

pub use building::{BuildingBoundary, Corners, Floorplan};
pub use device::{DeviceRow, LocatedDevice};
pub use point::{GeoPoint, PixelPoint};
