//! Building footprints and their floorplan images.

use geo::{BoundingRect, Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// The four GPS corners of a building footprint.
///
/// Corners are expected to form a simple quadrilateral. The ring order
/// top-left, top-right, bottom-right, bottom-left is what the classifier
/// walks, so corners must be supplied in that winding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub top_left: GeoPoint,
    pub top_right: GeoPoint,
    pub bottom_right: GeoPoint,
    pub bottom_left: GeoPoint,
}

impl Corners {
    /// Vertex ring in classification order
    pub fn ring(&self) -> [GeoPoint; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// A named building footprint in GPS space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingBoundary {
    pub id: String,
    pub corners: Corners,
}

impl BuildingBoundary {
    pub fn new(id: impl Into<String>, corners: Corners) -> Self {
        Self {
            id: id.into(),
            corners,
        }
    }

    /// Footprint as a closed geo polygon (x = lon, y = lat)
    pub fn polygon(&self) -> Polygon<f64> {
        let mut ring: Vec<Coord<f64>> = self.corners.ring().iter().map(|p| (*p).into()).collect();
        ring.push(ring[0]);
        Polygon::new(LineString::new(ring), vec![])
    }

    /// Get the bounding box of this boundary as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.polygon()
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Floorplan image drawn for one building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    /// Image path or URL handed to the frontend
    pub image: String,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> BuildingBoundary {
        BuildingBoundary::new(
            "sq",
            Corners {
                top_left: GeoPoint::new(1.0, 0.0),
                top_right: GeoPoint::new(1.0, 1.0),
                bottom_right: GeoPoint::new(0.0, 1.0),
                bottom_left: GeoPoint::new(0.0, 0.0),
            },
        )
    }

    #[test]
    fn test_ring_order() {
        let b = unit_square();
        let ring = b.corners.ring();
        assert_eq!(ring[0], b.corners.top_left);
        assert_eq!(ring[1], b.corners.top_right);
        assert_eq!(ring[2], b.corners.bottom_right);
        assert_eq!(ring[3], b.corners.bottom_left);
    }

    #[test]
    fn test_bbox() {
        let (min_lon, min_lat, max_lon, max_lat) = unit_square().bbox().unwrap();
        assert_eq!((min_lon, min_lat, max_lon, max_lat), (0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_polygon_is_closed() {
        let poly = unit_square().polygon();
        let coords: Vec<_> = poly.exterior().coords().collect();
        assert_eq!(coords.len(), 5);
        assert_eq!(coords.first(), coords.last());
    }
}
