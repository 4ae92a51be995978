//! Building classification for GPS points.

use geo::Coord;
use tracing::debug;

use super::geometry::ring_contains;
use super::EnvelopeIndex;
use crate::models::{BuildingBoundary, GeoPoint};

/// Assigns a point to the first declared building whose footprint contains it.
///
/// Boundaries are fixed at construction and only read afterwards, so a
/// classifier can be shared freely between threads.
pub struct PolygonClassifier {
    boundaries: Vec<BuildingBoundary>,
    rings: Vec<[Coord<f64>; 4]>,
    index: EnvelopeIndex,
}

impl PolygonClassifier {
    /// Create a classifier over boundaries in priority order
    pub fn new(boundaries: Vec<BuildingBoundary>) -> Self {
        let rings = boundaries
            .iter()
            .map(|b| b.corners.ring().map(Coord::from))
            .collect();
        let index = EnvelopeIndex::build(&boundaries);

        Self {
            boundaries,
            rings,
            index,
        }
    }

    /// Identifier of the first boundary containing `point`, if any
    pub fn classify(&self, point: GeoPoint) -> Option<&str> {
        self.classify_boundary(point).map(|b| b.id.as_str())
    }

    /// Like [`classify`](Self::classify) but returns the whole boundary
    pub fn classify_boundary(&self, point: GeoPoint) -> Option<&BuildingBoundary> {
        let query = Coord::from(point);

        let hit = self
            .index
            .candidates(point.lon, point.lat)
            .into_iter()
            .find(|&i| ring_contains(&self.rings[i], query))
            .map(|i| &self.boundaries[i]);

        debug!(
            "Classified ({}, {}) as {:?}",
            point.lat,
            point.lon,
            hit.map(|b| b.id.as_str())
        );

        hit
    }

    /// All boundaries in declared order
    pub fn boundaries(&self) -> &[BuildingBoundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}
