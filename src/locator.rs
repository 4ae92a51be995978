//! Classify-then-project pipeline over feed rows.

use hashbrown::HashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{DeviceRow, Floorplan, GeoPoint, LocatedDevice, PixelPoint};
use crate::pip::PolygonClassifier;
use crate::projection::{ProjectionWarning, QuadProjector};

/// Where a single coordinate lands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub building: String,
    pub matched: bool,
    pub position: PixelPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Assigns devices to buildings and places them on floorplans
pub struct Locator {
    classifier: PolygonClassifier,
    projector: QuadProjector,
    floorplans: HashMap<String, Floorplan>,
    fallback_building: String,
}

impl Locator {
    pub fn new(
        classifier: PolygonClassifier,
        floorplans: HashMap<String, Floorplan>,
        fallback_building: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            projector: QuadProjector::new(),
            floorplans,
            fallback_building: fallback_building.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let floorplans = config
            .buildings
            .iter()
            .map(|b| (b.id.clone(), b.floorplan.clone()))
            .collect();

        Self::new(
            PolygonClassifier::new(config.boundaries()),
            floorplans,
            config.fallback_building.clone(),
        )
    }

    /// Classify a coordinate and project it onto the resulting building's floorplan
    pub fn place(&self, point: GeoPoint) -> Placement {
        let (building, matched) = match self.classifier.classify(point) {
            Some(id) => (id, true),
            None => (self.fallback_building.as_str(), false),
        };

        let Some(floorplan) = self.floorplans.get(building) else {
            warn!("No floorplan configured for building {}.", building);
            return Placement {
                building: building.to_string(),
                matched,
                position: PixelPoint::new(0.0, 0.0),
                warning: Some(ProjectionWarning::MissingFloorplan(building.to_string()).to_string()),
            };
        };
        let (width, height) = (floorplan.width, floorplan.height);

        let projection = self.projector.project_building(
            point,
            building,
            self.classifier.boundaries(),
            width,
            height,
        );

        Placement {
            building: building.to_string(),
            matched,
            position: projection.position,
            warning: projection.warning.map(|w| w.to_string()),
        }
    }

    /// Place every row, keeping feed order
    pub fn locate_rows(&self, rows: &[DeviceRow]) -> Vec<LocatedDevice> {
        let located: Vec<LocatedDevice> = rows
            .iter()
            .map(|row| {
                let placement = self.place(row.location);
                debug!(
                    "{} -> {} ({:.2}, {:.2})",
                    row.name, placement.building, placement.position.x, placement.position.y
                );
                LocatedDevice {
                    name: row.name.clone(),
                    timestamp: row.timestamp.clone(),
                    building: placement.building,
                    location: row.location,
                    position: placement.position,
                    matched: placement.matched,
                }
            })
            .collect();

        let unmatched = located.iter().filter(|d| !d.matched).count();
        info!(
            "Located {} devices ({} assigned to fallback {})",
            located.len(),
            unmatched,
            self.fallback_building
        );

        located
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildingBoundary, Corners};

    fn locator() -> Locator {
        Locator::from_config(&Config::builtin().unwrap())
    }

    fn row(name: &str, lat: f64, lon: f64) -> DeviceRow {
        DeviceRow {
            name: name.to_string(),
            timestamp: "t".to_string(),
            location: GeoPoint::new(lat, lon),
        }
    }

    #[test]
    fn test_place_inside_building() {
        let placement = locator().place(GeoPoint::new(14.263735, 120.919951));
        assert_eq!(placement.building, "B1");
        assert!(placement.matched);
        assert!(placement.warning.is_none());
        assert!((placement.position.x - 500.0).abs() < 15.0);
        assert!((placement.position.y - 400.0).abs() < 15.0);
    }

    #[test]
    fn test_unmatched_uses_fallback() {
        let placement = locator().place(GeoPoint::new(0.0, 0.0));
        assert_eq!(placement.building, "B1");
        assert!(!placement.matched);
        // Clamped onto the fallback floorplan
        assert!(placement.position.x >= 0.0 && placement.position.x <= 1000.0);
        assert!(placement.position.y >= 0.0 && placement.position.y <= 800.0);
    }

    #[test]
    fn test_missing_fallback_boundary_centers_marker() {
        let config = Config::builtin().unwrap();
        let mut floorplans = HashMap::new();
        floorplans.insert(
            "lobby".to_string(),
            Floorplan {
                image: "lobby.png".to_string(),
                width: 200.0,
                height: 100.0,
            },
        );
        let locator = Locator::new(
            PolygonClassifier::new(config.boundaries()),
            floorplans,
            "lobby",
        );

        let placement = locator.place(GeoPoint::new(0.0, 0.0));
        assert_eq!(placement.building, "lobby");
        assert_eq!(placement.position, PixelPoint::new(100.0, 50.0));
        assert!(placement.warning.unwrap().contains("lobby"));
    }

    #[test]
    fn test_missing_floorplan_is_reported() {
        let boundary = BuildingBoundary::new(
            "X",
            Corners {
                top_left: GeoPoint::new(1.0, 0.0),
                top_right: GeoPoint::new(1.0, 1.0),
                bottom_right: GeoPoint::new(0.0, 1.0),
                bottom_left: GeoPoint::new(0.0, 0.0),
            },
        );
        let locator = Locator::new(PolygonClassifier::new(vec![boundary]), HashMap::new(), "X");

        let placement = locator.place(GeoPoint::new(0.5, 0.5));
        assert_eq!(placement.building, "X");
        assert!(placement.matched);
        assert_eq!(
            placement.warning.as_deref(),
            Some("no floorplan configured for building X")
        );
    }

    #[test]
    fn test_locate_rows_keeps_order() {
        let rows = vec![
            row("in b3", 14.2612, 120.9210),
            row("nowhere", 0.0, 0.0),
            row("in b6", 14.2590, 120.9204),
        ];
        let located = locator().locate_rows(&rows);

        let summary: Vec<(&str, &str, bool)> = located
            .iter()
            .map(|d| (d.name.as_str(), d.building.as_str(), d.matched))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("in b3", "B3", true),
                ("nowhere", "B1", false),
                ("in b6", "B6", true),
            ]
        );
    }
}
