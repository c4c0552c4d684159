//! Loading zone and weather snapshots from JSON.
//!
//! Snapshots are produced by external services. Each category and each zone
//! is decoded on its own so one bad entry never costs the rest of the
//! snapshot: rejected entries are logged and skipped.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::data::{Category, CategorySet, Zone};
use crate::error::{Error, Result};
use crate::weather::WeatherPoint;

/// Wire shape of a category before its zones are decoded.
#[derive(Deserialize)]
struct RawCategory {
    color: u32,
    name: String,
    #[serde(default)]
    zones: Option<Vec<Value>>,
}

/// Read and decode a category snapshot file.
pub fn load_category_set(path: &Path) -> Result<CategorySet> {
    let text = read(path)?;
    parse_category_set(&text)
}

/// Read and decode a weather snapshot file.
pub fn load_weather(path: &Path) -> Result<Vec<WeatherPoint>> {
    let text = read(path)?;
    parse_weather(&text)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a category snapshot.
///
/// Fails only if the document is not a JSON object.
pub fn parse_category_set(json: &str) -> Result<CategorySet> {
    let value: Value = serde_json::from_str(json).map_err(|source| Error::Json {
        context: "category snapshot",
        source,
    })?;
    category_set_from_value(value)
}

/// Decode a category snapshot from an already-parsed JSON value.
pub fn category_set_from_value(value: Value) -> Result<CategorySet> {
    let Value::Object(entries) = value else {
        return Err(Error::invalid("category snapshot", "expected a JSON object"));
    };

    let mut set = CategorySet::new();
    for (key, entry) in entries {
        match decode_category(&key, entry) {
            Ok(category) => set.insert(key, category),
            Err(e) => tracing::warn!("Skipping category '{key}': {e}"),
        }
    }
    Ok(set)
}

fn decode_category(key: &str, entry: Value) -> Result<Category> {
    let raw: RawCategory = serde_json::from_value(entry).map_err(|source| Error::Json {
        context: "category",
        source,
    })?;

    let mut category = Category::new(raw.name, raw.color);
    category.validate()?;

    let Some(zones) = raw.zones else {
        tracing::warn!("Category '{key}' has no zone list");
        return Ok(category);
    };

    for (index, zone) in zones.into_iter().enumerate() {
        let decoded = serde_json::from_value::<Zone>(zone)
            .map_err(Error::from)
            .and_then(Zone::sanitized);
        match decoded {
            Ok(zone) => category.zones.push(zone),
            Err(e) => tracing::warn!("Skipping zone {index} of '{key}': {e}"),
        }
    }
    Ok(category)
}

/// Decode a weather snapshot (a JSON array of points).
pub fn parse_weather(json: &str) -> Result<Vec<WeatherPoint>> {
    let value: Value = serde_json::from_str(json).map_err(|source| Error::Json {
        context: "weather snapshot",
        source,
    })?;
    let Value::Array(items) = value else {
        return Err(Error::invalid("weather snapshot", "expected a JSON array"));
    };

    let points = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let decoded = serde_json::from_value::<WeatherPoint>(item)
                .map_err(Error::from)
                .and_then(|point| point.validate().map(|()| point));
            match decoded {
                Ok(point) => Some(point),
                Err(e) => {
                    tracing::warn!("Skipping weather point {index}: {e}");
                    None
                }
            }
        })
        .collect();
    Ok(points)
}
