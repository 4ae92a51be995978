//! Four-corner interpolation from a building quadrilateral onto its floorplan.
//!
//! The horizontal fraction is the average of the point's fractions along the
//! top and bottom edges. This is exact for rectangles and parallelograms with
//! horizontal top and bottom edges; strongly trapezoidal footprints will show
//! some horizontal drift.

use thiserror::Error;
use tracing::warn;

use crate::models::{BuildingBoundary, GeoPoint, PixelPoint};

/// Normalized value used in place of a ratio that came out non-finite
pub const DEGENERATE_RATIO: f64 = 0.5;

/// Recoverable conditions reported alongside a projected point
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionWarning {
    #[error("missing map boundaries for building {0}")]
    UnknownBuilding(String),
    #[error("boundary {0} is degenerate; position collapsed to the middle of the affected axis")]
    DegenerateBoundary(String),
    #[error("point ({lat}, {lon}) is not a finite coordinate")]
    NonFinitePoint { lat: String, lon: String },
    #[error("no floorplan configured for building {0}")]
    MissingFloorplan(String),
}

/// Pixel position plus any warning raised while computing it
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub position: PixelPoint,
    pub warning: Option<ProjectionWarning>,
}

/// Stateless projector from GPS space into floorplan pixel space
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadProjector;

impl QuadProjector {
    pub fn new() -> Self {
        Self
    }

    /// Normalized (x, y) of `point` within `boundary`, each clamped to [0, 1].
    ///
    /// The second value is true when a ratio was non-finite and replaced by
    /// [`DEGENERATE_RATIO`]. `point` must be finite; [`project`](Self::project)
    /// checks that before normalizing.
    pub fn normalize(&self, point: GeoPoint, boundary: &BuildingBoundary) -> ((f64, f64), bool) {
        let c = &boundary.corners;

        let x_top = (point.lon - c.top_left.lon) / (c.top_right.lon - c.top_left.lon);
        let x_bottom = (point.lon - c.bottom_left.lon) / (c.bottom_right.lon - c.bottom_left.lon);

        let lat_at_top = c.top_left.lat + x_top * (c.top_right.lat - c.top_left.lat);
        let lat_at_bottom = c.bottom_left.lat + x_bottom * (c.bottom_right.lat - c.bottom_left.lat);

        // Image row 0 is the north edge, so falling latitude moves down the image
        let y_ratio = (lat_at_top - point.lat) / (lat_at_top - lat_at_bottom);
        let x_ratio = (x_top + x_bottom) / 2.0;

        let (x, x_degenerate) = settle(x_ratio);
        let (y, y_degenerate) = settle(y_ratio);

        ((x, y), x_degenerate || y_degenerate)
    }

    /// Project `point` onto a `width` x `height` canvas for `boundary`
    pub fn project(
        &self,
        point: GeoPoint,
        boundary: &BuildingBoundary,
        width: f64,
        height: f64,
    ) -> Projection {
        if !point.is_finite() {
            warn!(
                "Non-finite point ({}, {}) projected onto {}",
                point.lat, point.lon, boundary.id
            );
            return Projection {
                position: PixelPoint::new(width / 2.0, height / 2.0),
                warning: Some(ProjectionWarning::NonFinitePoint {
                    lat: point.lat.to_string(),
                    lon: point.lon.to_string(),
                }),
            };
        }

        let ((x, y), degenerate) = self.normalize(point, boundary);

        let warning = if degenerate {
            warn!(
                "Degenerate boundary {} while projecting ({}, {})",
                boundary.id, point.lat, point.lon
            );
            Some(ProjectionWarning::DegenerateBoundary(boundary.id.clone()))
        } else {
            None
        };

        Projection {
            position: PixelPoint::new(x * width, y * height),
            warning,
        }
    }

    /// Project onto the boundary named `building`, falling back to the
    /// canvas center when no such boundary exists
    pub fn project_building(
        &self,
        point: GeoPoint,
        building: &str,
        boundaries: &[BuildingBoundary],
        width: f64,
        height: f64,
    ) -> Projection {
        match boundaries.iter().find(|b| b.id == building) {
            Some(boundary) => self.project(point, boundary, width, height),
            None => {
                warn!("Missing map boundaries for building {}.", building);
                Projection {
                    position: PixelPoint::new(width / 2.0, height / 2.0),
                    warning: Some(ProjectionWarning::UnknownBuilding(building.to_string())),
                }
            }
        }
    }
}

/// Clamp a ratio into [0, 1], substituting the midpoint for a non-finite ratio
fn settle(ratio: f64) -> (f64, bool) {
    if ratio.is_finite() {
        (ratio.clamp(0.0, 1.0), false)
    } else {
        (DEGENERATE_RATIO, true)
    }
}
