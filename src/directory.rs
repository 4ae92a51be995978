//! Device lookup and per-client view state.

use hashbrown::HashMap;
use serde::Serialize;

use crate::models::LocatedDevice;

/// Default number of autocomplete suggestions
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Snapshot of located devices with lookups by building and name
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: Vec<LocatedDevice>,
    by_building: HashMap<String, Vec<usize>>,
}

impl DeviceDirectory {
    pub fn new(devices: Vec<LocatedDevice>) -> Self {
        let mut by_building: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, d) in devices.iter().enumerate() {
            by_building.entry(d.building.clone()).or_default().push(i);
        }

        Self {
            devices,
            by_building,
        }
    }

    /// Devices assigned to `building`, in feed order
    pub fn in_building<'a>(&'a self, building: &str) -> impl Iterator<Item = &'a LocatedDevice> {
        self.by_building
            .get(building)
            .map(|idx| idx.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.devices[i])
    }

    /// Names starting with `query`, ignoring case
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<&str> {
        let query = query.to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.devices
            .iter()
            .map(|d| d.name.as_str())
            .filter(|name| name.to_lowercase().starts_with(&query))
            .take(limit)
            .collect()
    }

    /// First device whose name equals `name`, ignoring case and surrounding whitespace
    pub fn find(&self, name: &str) -> Option<&LocatedDevice> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.devices.iter().find(|d| d.name.to_lowercase() == name)
    }

    pub fn devices(&self) -> &[LocatedDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// A device marker ready to draw on the selected floorplan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub name: String,
    pub building: String,
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub highlight: bool,
}

impl Marker {
    fn new(device: &LocatedDevice, highlight: bool) -> Self {
        Self {
            id: format!("dot-{}", device.name.replace(char::is_whitespace, "_")),
            name: device.name.clone(),
            building: device.building.clone(),
            x: device.position.x,
            y: device.position.y,
            label: format!(
                "{} | X: {:.2} px, Y: {:.2} px",
                device.name, device.position.x, device.position.y
            ),
            highlight,
        }
    }
}

/// Result of a name search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found {
        device: LocatedDevice,
        message: String,
    },
    NotFound {
        message: String,
    },
    /// Blank query; nothing changed
    Empty,
}

/// What one client is looking at: the selected building and the highlighted device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    building: String,
    highlight: Option<String>,
}

impl ViewState {
    pub fn new(building: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            highlight: None,
        }
    }

    pub fn building(&self) -> &str {
        &self.building
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }

    /// Switch floorplans; any highlight is dropped
    pub fn select(&mut self, building: impl Into<String>) -> String {
        self.building = building.into();
        self.highlight = None;
        format!("Viewing {}. Click a dot for details.", self.building)
    }

    /// Highlight a device by name without leaving the current building
    pub fn set_highlight(&mut self, name: Option<&str>) {
        self.highlight = name.map(|n| n.trim().to_lowercase());
    }

    /// Jump to the building of the device named `query` and highlight it
    pub fn search(&mut self, directory: &DeviceDirectory, query: &str) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::Empty;
        }

        match directory.find(query) {
            Some(device) => {
                self.building = device.building.clone();
                self.highlight = Some(device.name.to_lowercase());
                SearchOutcome::Found {
                    message: format!("{} found in {}", device.name, device.building),
                    device: device.clone(),
                }
            }
            None => {
                self.highlight = None;
                SearchOutcome::NotFound {
                    message: format!("Machine '{}' not found.", query),
                }
            }
        }
    }

    /// Markers for the selected building
    pub fn markers(&self, directory: &DeviceDirectory) -> Vec<Marker> {
        directory
            .in_building(&self.building)
            .map(|d| {
                let highlight = self
                    .highlight
                    .as_deref()
                    .is_some_and(|h| d.name.to_lowercase() == h);
                Marker::new(d, highlight)
            })
            .collect()
    }

    /// Message shown when a marker is clicked
    pub fn describe(device: &LocatedDevice) -> String {
        format!("{} is in {}", device.name, device.building)
    }
}
