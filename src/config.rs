//! Configuration file: feed source, polling, buildings and floorplans.

use anyhow::{Context, Result};
use hashbrown::HashSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::models::{BuildingBoundary, Corners, Floorplan};

/// Campus layout shipped with the crate
const BUILTIN_CONFIG: &str = include_str!("../floormap.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Building used for devices that no boundary contains
    pub fallback_building: String,
    pub feed: FeedConfig,
    /// Buildings in classification priority order
    pub buildings: Vec<BuildingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildingConfig {
    pub id: String,
    pub floorplan: Floorplan,
    pub corners: Corners,
}

fn default_sheet() -> String {
    "Sheet1".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// The default campus layout
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG).context("Built-in config is invalid")
    }

    fn validate(&self) -> Result<()> {
        if self.buildings.is_empty() {
            anyhow::bail!("No buildings configured");
        }

        let mut seen = HashSet::new();
        for b in &self.buildings {
            if !seen.insert(b.id.as_str()) {
                anyhow::bail!("Duplicate building id '{}'", b.id);
            }
            let (w, h) = (b.floorplan.width, b.floorplan.height);
            if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
                anyhow::bail!(
                    "Floorplan for building '{}' must have positive dimensions, got {}x{}",
                    b.id,
                    w,
                    h
                );
            }
            let finite = b.corners.ring().iter().all(|p| p.is_finite());
            if !finite {
                anyhow::bail!("Corners of building '{}' must be finite coordinates", b.id);
            }
        }

        if !seen.contains(self.fallback_building.as_str()) {
            anyhow::bail!(
                "Fallback building '{}' is not configured",
                self.fallback_building
            );
        }

        if self.feed.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than zero");
        }

        if self.feed.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Boundaries in declared order
    pub fn boundaries(&self) -> Vec<BuildingBoundary> {
        self.buildings
            .iter()
            .map(|b| BuildingBoundary::new(b.id.clone(), b.corners))
            .collect()
    }

    pub fn building(&self, id: &str) -> Option<&BuildingConfig> {
        self.buildings.iter().find(|b| b.id == id)
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
fallback_building = "A"

[feed]
url = "http://localhost:8080/exec"

[[buildings]]
id = "A"
floorplan = { image = "a.png", width = 640, height = 480 }
corners.top_left = { lat = 1.0, lon = 0.0 }
corners.top_right = { lat = 1.0, lon = 1.0 }
corners.bottom_right = { lat = 0.0, lon = 1.0 }
corners.bottom_left = { lat = 0.0, lon = 0.0 }
"#;

    #[test]
    fn test_builtin_config() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.fallback_building, "B1");
        let ids: Vec<&str> = config.buildings.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2", "B3", "B4", "B5", "B6"]);
        assert_eq!(config.building("B2").unwrap().floorplan.image, "B2a.png");
        assert_eq!(config.feed.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.feed.sheet, "Sheet1");
        assert_eq!(config.feed.poll_interval_secs, 60);
        assert_eq!(config.feed.timeout_secs, 30);
        assert_eq!(config.building("A").unwrap().floorplan.width, 640.0);
        assert_eq!(config.boundaries().len(), 1);
    }

    #[test]
    fn test_unknown_fallback_rejected() {
        let bad = MINIMAL.replace("fallback_building = \"A\"", "fallback_building = \"Z\"");
        assert!(Config::from_toml_str(&bad).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let extra = &MINIMAL[MINIMAL.find("[[buildings]]").unwrap()..];
        let bad = format!("{}\n{}", MINIMAL, extra);
        assert!(Config::from_toml_str(&bad).is_err());
    }

    #[test]
    fn test_zero_sized_floorplan_rejected() {
        let bad = MINIMAL.replace("width = 640", "width = 0");
        assert!(Config::from_toml_str(&bad).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let bad = MINIMAL.replace(
            "url = \"http://localhost:8080/exec\"",
            "url = \"http://localhost:8080/exec\"\ntimeout_secs = 0",
        );
        let err = Config::from_toml_str(&bad).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_non_finite_corners_rejected() {
        for value in ["nan", "inf", "-inf"] {
            let bad = MINIMAL.replace(
                "corners.top_right = { lat = 1.0, lon = 1.0 }",
                &format!("corners.top_right = {{ lat = {}, lon = 1.0 }}", value),
            );
            let err = Config::from_toml_str(&bad).unwrap_err();
            assert!(err.to_string().contains("finite"), "{} accepted", value);
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load_from_file("/nonexistent/floormap.toml").is_err());
    }
}
