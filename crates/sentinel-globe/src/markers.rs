//! Marker records for zones placed on the globe.
//!
//! Markers are kept in an arena indexed by [`MarkerId`]. Each record owns its
//! scene entities and material handles and refers back to its source zone
//! through a [`ZoneRef`] lookup key, so nothing in the scene graph points at
//! the zone data directly.

use bevy::prelude::*;

use crate::GlobeSettings;
use crate::data::{CategorySet, ZoneRef, resolved_color};
use crate::geo::lat_lon_to_vec3;

/// Core sphere radius per unit of intensity.
const CORE_RADIUS_PER_INTENSITY: f32 = 0.06;
/// Smallest core radius, so low-intensity zones stay visible.
const MIN_CORE_RADIUS: f32 = 0.02;

/// Stable index of a marker within one scene build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u32);

impl MarkerId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Component attached to a marker's group entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct MarkerTag(pub MarkerId);

/// Scene entities and per-marker materials owned by a marker.
#[derive(Debug, Clone)]
pub struct MarkerNodes {
    /// Group entity positioned on the surface, facing the globe center.
    pub group: Entity,
    pub core: Entity,
    pub ring: Entity,
    pub core_material: Handle<StandardMaterial>,
    pub ring_material: Handle<StandardMaterial>,
}

/// Where and how a zone's marker should be built.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlan {
    pub zone: ZoneRef,
    pub resolved_color: u32,
    /// Position in the surface frame.
    pub surface_position: Vec3,
    pub core_radius: f32,
}

/// A built marker.
#[derive(Debug, Clone)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub nodes: MarkerNodes,
    pub zone: ZoneRef,
    pub resolved_color: u32,
    pub surface_position: Vec3,
    pub core_radius: f32,
    /// Derived each frame from the active filters.
    pub visible: bool,
    pub hovered: bool,
    /// Smoothed hover glow in `[0, 1]`.
    pub glow: f32,
    /// Glow last written to the core material.
    pub applied_glow: f32,
}

impl MarkerRecord {
    pub fn category_key(&self) -> &str {
        &self.zone.category
    }
}

/// Arena of every marker in the current build.
#[derive(Debug, Default)]
pub struct MarkerArena {
    records: Vec<MarkerRecord>,
}

impl MarkerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a built marker and return its id.
    pub fn push(&mut self, plan: MarkerPlan, nodes: MarkerNodes) -> MarkerId {
        let id = MarkerId(self.records.len() as u32);
        self.records.push(MarkerRecord {
            id,
            nodes,
            zone: plan.zone,
            resolved_color: plan.resolved_color,
            surface_position: plan.surface_position,
            core_radius: plan.core_radius,
            visible: false,
            hovered: false,
            glow: 0.0,
            applied_glow: 0.0,
        });
        id
    }

    pub fn get(&self, id: MarkerId) -> Option<&MarkerRecord> {
        self.records.get(id.index())
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut MarkerRecord> {
        self.records.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MarkerRecord> {
        self.records.iter_mut()
    }

    /// Markers currently eligible for rendering and hit-testing.
    pub fn visible(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.records.iter().filter(|r| r.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark exactly one marker (or none) as hovered.
    pub fn set_hovered(&mut self, hovered: Option<MarkerId>) {
        for record in &mut self.records {
            record.hovered = Some(record.id) == hovered;
        }
    }

    pub fn hovered(&self) -> Option<MarkerId> {
        self.records.iter().find(|r| r.hovered).map(|r| r.id)
    }
}

/// Core sphere radius for a zone intensity.
pub fn core_radius(intensity: f32) -> f32 {
    (CORE_RADIUS_PER_INTENSITY * intensity).max(MIN_CORE_RADIUS)
}

/// Plan one marker per valid zone across all categories.
///
/// Categories with an invalid color and zones that fail validation are
/// skipped with a warning.
pub fn plan_markers(set: &CategorySet, settings: &GlobeSettings) -> Vec<MarkerPlan> {
    let mut plans = Vec::with_capacity(set.zone_count());
    for (key, category) in set.iter() {
        if let Err(e) = category.validate() {
            tracing::warn!("Skipping category '{key}': {e}");
            continue;
        }
        let color = resolved_color(key, category);
        for (index, zone) in category.zones.iter().enumerate() {
            if let Err(e) = zone.validate() {
                tracing::warn!("Skipping zone {index} of '{key}': {e}");
                continue;
            }
            let position = lat_lon_to_vec3(zone.lat, zone.lon, f64::from(settings.marker_radius));
            plans.push(MarkerPlan {
                zone: ZoneRef {
                    category: key.to_owned(),
                    index,
                },
                resolved_color: color,
                surface_position: position.as_vec3(),
                core_radius: core_radius(zone.intensity.clamp(0.0, 1.0)),
            });
        }
    }
    plans
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{Category, PHENOMENA_COLOR, Zone};

    pub(crate) fn placeholder_nodes() -> MarkerNodes {
        MarkerNodes {
            group: Entity::PLACEHOLDER,
            core: Entity::PLACEHOLDER,
            ring: Entity::PLACEHOLDER,
            core_material: Handle::default(),
            ring_material: Handle::default(),
        }
    }

    pub(crate) fn placeholder_record() -> MarkerRecord {
        let mut arena = MarkerArena::new();
        let id = arena.push(
            MarkerPlan {
                zone: ZoneRef {
                    category: "war".into(),
                    index: 0,
                },
                resolved_color: 0xff_44_00,
                surface_position: Vec3::Z * 5.05,
                core_radius: 0.05,
            },
            placeholder_nodes(),
        );
        arena.get(id).unwrap().clone()
    }

    fn sample_set() -> CategorySet {
        CategorySet::new()
            .with_category(
                "war",
                Category::new("Armed Conflict", 0xff_44_00)
                    .with_zone(Zone::new("Donbas Offensive", 48.37, 31.16, 0.95))
                    .with_zone(Zone::new("Broken", 123.0, 0.0, 0.5))
                    .with_zone(Zone::new("Faint", -10.0, 20.0, 0.0)),
            )
            .with_category(
                "phenomena",
                Category::new("Anomalies", 0x12_34_56).with_zone(Zone::new("Glow", 0.0, 0.0, 0.4)),
            )
            .with_category(
                "invalid",
                Category::new("Invalid", 0x0100_0000).with_zone(Zone::new("x", 0.0, 0.0, 0.4)),
            )
    }

    #[test]
    fn test_plan_skips_invalid_entries() {
        let plans = plan_markers(&sample_set(), &GlobeSettings::default());
        assert_eq!(plans.len(), 3);
        assert!(plans.iter().all(|p| p.zone.category != "invalid"));
        // Zone indices refer back to the original zone list.
        let war: Vec<usize> = plans
            .iter()
            .filter(|p| p.zone.category == "war")
            .map(|p| p.zone.index)
            .collect();
        assert_eq!(war, vec![0, 2]);
    }

    #[test]
    fn test_plan_applies_phenomena_override() {
        let plans = plan_markers(&sample_set(), &GlobeSettings::default());
        let phenomena = plans
            .iter()
            .find(|p| p.zone.category == "phenomena")
            .unwrap();
        assert_eq!(phenomena.resolved_color, PHENOMENA_COLOR);
        let war = plans.iter().find(|p| p.zone.category == "war").unwrap();
        assert_eq!(war.resolved_color, 0xff_44_00);
    }

    #[test]
    fn test_plan_places_markers_on_marker_shell() {
        let settings = GlobeSettings::default();
        for plan in plan_markers(&sample_set(), &settings) {
            assert!((plan.surface_position.length() - settings.marker_radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_core_radius_scales_with_intensity() {
        assert!((core_radius(1.0) - 0.06).abs() < 1e-6);
        assert_eq!(core_radius(0.0), MIN_CORE_RADIUS);
    }

    #[test]
    fn test_arena_hover_is_exclusive() {
        let mut arena = MarkerArena::new();
        for plan in plan_markers(&sample_set(), &GlobeSettings::default()) {
            arena.push(plan, placeholder_nodes());
        }
        arena.set_hovered(Some(MarkerId(1)));
        assert_eq!(arena.hovered(), Some(MarkerId(1)));
        arena.set_hovered(Some(MarkerId(2)));
        assert_eq!(arena.hovered(), Some(MarkerId(2)));
        assert_eq!(arena.iter().filter(|r| r.hovered).count(), 1);
        arena.set_hovered(None);
        assert_eq!(arena.hovered(), None);
    }
}
