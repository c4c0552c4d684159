//! Zone and category data consumed by the globe.
//!
//! These types mirror the structured data handed over by the intel and
//! weather services. A [`CategorySet`] is treated as an immutable, versioned
//! snapshot: the scene never patches markers in place, it rebuilds them.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Category key whose markers always use [`PHENOMENA_COLOR`].
pub const PHENOMENA_KEY: &str = "phenomena";

/// Neutral color used for the phenomena category, regardless of its record.
pub const PHENOMENA_COLOR: u32 = 0xd0_d8_e0;

/// Largest value that fits in a 24-bit RGB color.
const MAX_RGB24: u32 = 0x00ff_ffff;

/// A single geographic point of interest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lon: f64,
    /// Normalized intensity, `[0, 1]`.
    pub intensity: f32,
    /// Severity on a 1-10 scale.
    #[serde(default = "default_severity")]
    pub severity: f32,
    /// Affected radius in kilometers.
    #[serde(default, rename = "affectedRadius")]
    pub affected_radius_km: f32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

fn default_severity() -> f32 {
    1.0
}

impl Zone {
    /// Create a zone with the given position and intensity.
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, intensity: f32) -> Self {
        Self {
            lat,
            lon,
            intensity,
            severity: default_severity(),
            affected_radius_km: 0.0,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Check that the zone can be placed on the globe.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::invalid("zone", format!("latitude {} out of range", self.lat)));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::invalid("zone", format!("longitude {} out of range", self.lon)));
        }
        if !self.intensity.is_finite()
            || !self.severity.is_finite()
            || !self.affected_radius_km.is_finite()
        {
            return Err(Error::invalid(
                "zone",
                format!("non-finite metadata on '{}'", self.name),
            ));
        }
        Ok(())
    }

    /// Validate the zone and clamp its metadata into the documented ranges.
    pub fn sanitized(mut self) -> Result<Self> {
        self.validate()?;
        self.intensity = self.intensity.clamp(0.0, 1.0);
        self.severity = self.severity.clamp(1.0, 10.0);
        self.affected_radius_km = self.affected_radius_km.max(0.0);
        Ok(self)
    }
}

/// A named, colored grouping of zones.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// 24-bit RGB color.
    pub color: u32,
    pub display_name: String,
    pub zones: Vec<Zone>,
}

impl Category {
    pub fn new(display_name: impl Into<String>, color: u32) -> Self {
        Self {
            color,
            display_name: display_name.into(),
            zones: Vec::new(),
        }
    }

    /// Builder-style helper to append a zone.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    /// Check that the color fits in 24 bits.
    pub fn validate(&self) -> Result<()> {
        if self.color > MAX_RGB24 {
            return Err(Error::invalid(
                "category",
                format!("color {:#x} exceeds 24 bits", self.color),
            ));
        }
        Ok(())
    }
}

/// Non-owning reference from a marker to the zone it represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneRef {
    pub category: String,
    pub index: usize,
}

/// Snapshot of every category and zone at a point in time.
///
/// Keys iterate in sorted order so that marker ids are stable for a given
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySet {
    categories: BTreeMap<String, Category>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a category.
    pub fn insert(&mut self, key: impl Into<String>, category: Category) {
        self.categories.insert(key.into(), category);
    }

    /// Builder-style variant of [`CategorySet::insert`].
    #[must_use]
    pub fn with_category(mut self, key: impl Into<String>, category: Category) -> Self {
        self.insert(key, category);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of zones across all categories.
    pub fn zone_count(&self) -> usize {
        self.categories.values().map(|c| c.zones.len()).sum()
    }

    /// Look up the zone a marker points at.
    pub fn zone(&self, zone_ref: &ZoneRef) -> Option<&Zone> {
        self.categories
            .get(&zone_ref.category)
            .and_then(|c| c.zones.get(zone_ref.index))
    }
}

/// A requested camera focus point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub lat: f64,
    pub lon: f64,
}

impl TargetView {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Resolve the color a category's markers are drawn with.
///
/// The phenomena category is always drawn in a neutral tone.
pub fn resolved_color(category_key: &str, category: &Category) -> u32 {
    if category_key == PHENOMENA_KEY {
        PHENOMENA_COLOR
    } else {
        category.color & MAX_RGB24
    }
}

/// Convert a 24-bit RGB integer into a Bevy color.
pub fn rgb24_to_color(rgb: u32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_validation_rejects_out_of_range() {
        assert!(Zone::new("ok", 48.37, 31.16, 0.9).validate().is_ok());
        assert!(Zone::new("lat", 91.0, 0.0, 0.5).validate().is_err());
        assert!(Zone::new("lon", 0.0, -180.5, 0.5).validate().is_err());
        assert!(Zone::new("nan", f64::NAN, 0.0, 0.5).validate().is_err());
        assert!(Zone::new("inf", 0.0, 0.0, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_zone_sanitized_clamps_metadata() {
        let mut zone = Zone::new("hot", 10.0, 10.0, 1.7);
        zone.severity = 42.0;
        zone.affected_radius_km = -5.0;
        let zone = zone.sanitized().unwrap();
        assert_eq!(zone.intensity, 1.0);
        assert_eq!(zone.severity, 10.0);
        assert_eq!(zone.affected_radius_km, 0.0);
    }

    #[test]
    fn test_phenomena_color_override() {
        let category = Category::new("Anomalies", 0xff_00_00);
        assert_eq!(resolved_color("phenomena", &category), PHENOMENA_COLOR);
        assert_eq!(resolved_color("war", &category), 0xff_00_00);
        // The record itself is untouched.
        assert_eq!(category.color, 0xff_00_00);
    }

    #[test]
    fn test_zone_lookup() {
        let set = CategorySet::new().with_category(
            "war",
            Category::new("Armed Conflict", 0xff_44_00).with_zone(Zone::new("a", 1.0, 2.0, 0.5)),
        );
        let found = set.zone(&ZoneRef {
            category: "war".into(),
            index: 0,
        });
        assert_eq!(found.map(|z| z.name.as_str()), Some("a"));
        assert!(
            set.zone(&ZoneRef {
                category: "war".into(),
                index: 1,
            })
            .is_none()
        );
        assert_eq!(set.zone_count(), 1);
    }

    #[test]
    fn test_rgb24_to_color() {
        let color = rgb24_to_color(0xff_44_00).to_srgba();
        assert!((color.red - 1.0).abs() < 1e-6);
        assert!((color.green - f32::from(0x44_u8) / 255.0).abs() < 1e-6);
        assert!(color.blue.abs() < 1e-6);
    }
}
