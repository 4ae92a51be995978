//! Sheet payload parsing.
//!
//! The sheet returns `{"data": [[header...], [name, time, lat, lon], ...]}`.
//! Cells arrive as whatever JSON type the sheet produced, so coordinates may
//! be numbers or numeric strings.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{DeviceRow, GeoPoint};

/// Raw response body from the sheet web app
#[derive(Debug, Deserialize)]
pub struct SheetPayload {
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Turn a payload into validated device rows.
///
/// The header row is skipped and rows without numeric coordinates are
/// dropped. An `error` reported by the sheet is returned as `Err`.
pub fn parse_payload(payload: SheetPayload) -> Result<Vec<DeviceRow>> {
    if let Some(err) = payload.error {
        anyhow::bail!("Apps Script Error: {}", err);
    }

    let rows = match payload.data {
        Some(rows) if rows.len() >= 2 => rows,
        _ => {
            warn!("No data rows fetched or only header row exists.");
            return Ok(Vec::new());
        }
    };

    Ok(rows.iter().skip(1).filter_map(|row| parse_row(row)).collect())
}

fn parse_row(row: &[Value]) -> Option<DeviceRow> {
    let name = row.first().map(cell_text).unwrap_or_default();
    let name = name.trim().to_string();

    let lat = row.get(2).and_then(cell_number);
    let lon = row.get(3).and_then(cell_number);

    let (lat, lon) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            warn!("Skipping device {}: Invalid coordinates.", name);
            return None;
        }
    };

    Some(DeviceRow {
        name,
        timestamp: row.get(1).map(cell_text).unwrap_or_default(),
        location: GeoPoint::new(lat, lon),
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
