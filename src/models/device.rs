//! Device records as read from the feed and as placed on a floorplan.

use serde::{Deserialize, Serialize};

use super::{GeoPoint, PixelPoint};

/// A validated feed row: the coordinates are known to be finite numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRow {
    pub name: String,
    /// Timestamp exactly as the sheet reports it
    pub timestamp: String,
    pub location: GeoPoint,
}

/// A device assigned to a building and placed on its floorplan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedDevice {
    pub name: String,
    pub timestamp: String,
    pub building: String,
    pub location: GeoPoint,
    pub position: PixelPoint,
    /// False when no boundary contained the device and the fallback building was used
    pub matched: bool,
}
