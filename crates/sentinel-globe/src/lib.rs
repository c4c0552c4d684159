//! Interactive 3D globe of geopolitical and environmental zones using Bevy.
//!
//! The library exposes the globe engine as a [`GlobePlugin`] that a host Bevy
//! app mounts by entering [`GlobeState::Mounted`]. Collaborators feed it
//! through the [`GlobeInputs`] resource and listen for [`MarkerSelected`]
//! messages.

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

/// Per-frame animation: scanner, satellites, marker glow, ambient layers.
pub mod animation;
/// Orbit camera, pointer state machine, and picking.
pub mod camera;
/// Zone and category data model.
pub mod data;
pub mod error;
/// Spherical coordinate conversion and region labels.
pub mod geo;
pub mod input;
/// Scene mount, rebuild, and teardown.
pub mod lifecycle;
/// Marker arena and placement.
pub mod markers;
/// Scene graph construction.
pub mod scene;
/// JSON snapshot loading.
pub mod snapshot;
/// Procedural textures.
pub mod textures;
/// Per-build graphics resource tracking.
pub mod tracker;
/// Category and intensity filtering of markers.
pub mod visibility;
/// Weather points and WMO condition codes.
pub mod weather;

pub use camera::{CameraState, CursorHint, MarkerSelected, PointerIntents, SelectionState};
pub use data::{Category, CategorySet, TargetView, Zone};
pub use input::GlobeInputPlugin;
pub use lifecycle::{GlobeScene, GlobeState};
pub use weather::WeatherPoint;

/// Default auto-rotation rate, in radians per frame.
pub const DEFAULT_ROTATION_SPEED: f32 = 0.0015;

// ============================================================================
// Settings
// ============================================================================

/// Tuning constants for the globe.
///
/// Rates are per frame, distances in scene units (globe radius 5).
#[derive(Resource, Debug, Clone)]
pub struct GlobeSettings {
    pub globe_radius: f32,
    /// Hex grid overlay shell.
    pub grid_radius: f32,
    pub cloud_radius: f32,
    /// Back-facing atmosphere halo.
    pub atmosphere_radius: f32,
    /// Radius markers sit at, just above the surface.
    pub marker_radius: f32,
    pub weather_radius: f32,
    pub scanner_radius: f32,

    /// Starting camera distance from the globe center.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Distance change per unit of scroll.
    pub zoom_step: f32,

    /// Radians of rotation per pixel of drag.
    pub drag_sensitivity: f32,
    /// Per-move rotation above which a press no longer counts as a click.
    pub click_drag_threshold: f32,
    /// Inertia decay factor per frame.
    pub damping: f32,
    /// Velocity below which inertia stops.
    pub stop_threshold: f32,
    /// Horizontal velocity below which auto-rotation resumes.
    pub auto_rotate_gate: f32,
    pub target_smoothing: f32,
    /// Angular distance at which a target view snaps into place.
    pub target_epsilon: f32,
    pub zoom_smoothing: f32,
    pub glow_smoothing: f32,
    /// Minimum hit radius around a marker.
    pub pick_radius: f32,

    pub satellite_count: usize,
    pub star_count: usize,
    pub star_radius: f32,

    /// Scanner sweeps between `-scanner_band` and `scanner_band`.
    pub scanner_band: f32,
    pub scanner_speed: f32,
    /// Animation time added per frame.
    pub time_step: f32,
    /// Cloud shell rotation per frame.
    pub cloud_drift: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            globe_radius: 5.0,
            grid_radius: 5.02,
            cloud_radius: 5.08,
            atmosphere_radius: 6.0,
            marker_radius: 5.05,
            weather_radius: 5.3,
            scanner_radius: 5.15,

            camera_distance: 13.0,
            fov_degrees: 75.0,
            min_zoom: 7.0,
            max_zoom: 30.0,
            zoom_step: 1.0,

            drag_sensitivity: 0.005,
            click_drag_threshold: 0.01,
            damping: 0.95,
            stop_threshold: 1e-4,
            auto_rotate_gate: 1e-3,
            target_smoothing: 0.05,
            target_epsilon: 1e-4,
            zoom_smoothing: 0.1,
            glow_smoothing: 0.15,
            pick_radius: 0.15,

            satellite_count: 6,
            star_count: 3000,
            star_radius: 400.0,

            scanner_band: 4.5,
            scanner_speed: 0.03,
            time_step: 0.02,
            cloud_drift: 0.0004,
        }
    }
}

impl GlobeSettings {
    /// Vertical field of view in radians.
    pub fn fov_y(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Inputs supplied by the host application.
///
/// The category snapshot and weather points are structural: replacing either
/// bumps the revision and the scene is rebuilt on the next frame. The
/// remaining fields are read every frame.
#[derive(Resource, Debug, Clone)]
pub struct GlobeInputs {
    categories: Arc<CategorySet>,
    weather: Arc<Vec<WeatherPoint>>,
    revision: u64,
    /// Category key to enabled flag. Keys absent here are hidden.
    pub active_categories: HashMap<String, bool>,
    /// Minimum zone intensity shown, in `[0, 1]`.
    pub intensity_filter: f32,
    /// Auto-rotation in radians per frame; `0.0` disables it.
    pub rotation_speed: f32,
    pub target_view: Option<TargetView>,
}

impl Default for GlobeInputs {
    fn default() -> Self {
        Self {
            categories: Arc::default(),
            weather: Arc::default(),
            revision: 0,
            active_categories: HashMap::new(),
            intensity_filter: 0.0,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            target_view: None,
        }
    }
}

impl GlobeInputs {
    /// Install a new category snapshot.
    ///
    /// Categories not seen before start enabled; existing toggles are kept.
    pub fn set_categories(&mut self, categories: CategorySet) {
        for key in categories.keys() {
            self.active_categories.entry(key.to_string()).or_insert(true);
        }
        self.categories = Arc::new(categories);
        self.revision += 1;
    }

    /// Install a new weather snapshot.
    pub fn set_weather(&mut self, weather: Vec<WeatherPoint>) {
        self.weather = Arc::new(weather);
        self.revision += 1;
    }

    pub fn categories(&self) -> Arc<CategorySet> {
        Arc::clone(&self.categories)
    }

    pub fn weather(&self) -> &[WeatherPoint] {
        &self.weather
    }

    /// Counter bumped on every structural change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Flip a category on or off, returning the new state.
    pub fn toggle_category(&mut self, key: &str) -> bool {
        let active = self.active_categories.entry(key.to_string()).or_insert(false);
        *active = !*active;
        *active
    }

    pub fn set_intensity_filter(&mut self, filter: f32) {
        self.intensity_filter = if filter.is_finite() {
            filter.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Request the camera to center on a location.
    pub fn focus(&mut self, lat: f64, lon: f64) {
        self.target_view = Some(TargetView::new(lat, lon));
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Counters describing the mounted scene.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobeStats {
    pub visible_markers: usize,
    pub total_markers: usize,
    /// Scene builds since startup.
    pub builds: u64,
    /// Tracked resources owned by the current build.
    pub live_resources: usize,
    /// Tracked resources released across all teardowns.
    pub released_resources: u64,
}

// ============================================================================
// Plugin
// ============================================================================

/// Ordering of the globe's per-frame work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlobeSystems {
    /// Pointer input is collected into intents.
    Input,
    /// Rebuild, visibility, pointer, animation, and camera.
    Frame,
}

/// Plugin that registers the globe engine.
///
/// The host enters [`GlobeState::Mounted`] to build the scene and leaves it
/// to tear everything down.
pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GlobeState>()
            .add_message::<MarkerSelected>()
            .init_resource::<GlobeSettings>()
            .init_resource::<GlobeInputs>()
            .init_resource::<GlobeStats>()
            .init_resource::<GlobeScene>()
            .init_resource::<tracker::ResourceTracker>()
            .init_resource::<CameraState>()
            .init_resource::<PointerIntents>()
            .init_resource::<SelectionState>()
            .init_resource::<CursorHint>()
            .init_resource::<animation::AnimationClock>()
            .configure_sets(
                Update,
                (GlobeSystems::Input, GlobeSystems::Frame)
                    .chain()
                    .run_if(in_state(GlobeState::Mounted)),
            )
            .add_plugins(GlobeInputPlugin)
            .add_systems(OnEnter(GlobeState::Mounted), lifecycle::mount_scene)
            .add_systems(OnExit(GlobeState::Mounted), lifecycle::unmount_scene)
            .add_systems(
                Update,
                (
                    lifecycle::rebuild_on_change,
                    visibility::apply_marker_visibility,
                    camera::process_pointer,
                    animation::tick_clock,
                    animation::advance_scanner,
                    animation::advance_satellites,
                    camera::advance_camera,
                    animation::animate_markers,
                    animation::drift_clouds,
                    animation::animate_weather,
                    lifecycle::update_stats,
                )
                    .chain()
                    .in_set(GlobeSystems::Frame),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(keys: &[&str]) -> CategorySet {
        keys.iter().fold(CategorySet::new(), |set, key| {
            set.with_category(*key, Category::new(*key, 0x00_ff_00))
        })
    }

    #[test]
    fn test_new_categories_start_enabled() {
        let mut inputs = GlobeInputs::default();
        inputs.set_categories(snapshot(&["war", "environmental"]));
        assert_eq!(inputs.active_categories.get("war"), Some(&true));
        assert_eq!(inputs.revision(), 1);

        // Existing toggles survive a new snapshot.
        assert!(!inputs.toggle_category("war"));
        inputs.set_categories(snapshot(&["war", "phenomena"]));
        assert_eq!(inputs.active_categories.get("war"), Some(&false));
        assert_eq!(inputs.active_categories.get("phenomena"), Some(&true));
        assert_eq!(inputs.revision(), 2);
    }

    #[test]
    fn test_weather_bumps_revision() {
        let mut inputs = GlobeInputs::default();
        inputs.set_weather(Vec::new());
        assert_eq!(inputs.revision(), 1);
        assert!(inputs.weather().is_empty());
    }

    #[test]
    fn test_intensity_filter_is_clamped() {
        let mut inputs = GlobeInputs::default();
        inputs.set_intensity_filter(1.7);
        assert_eq!(inputs.intensity_filter, 1.0);
        inputs.set_intensity_filter(-0.2);
        assert_eq!(inputs.intensity_filter, 0.0);
        inputs.set_intensity_filter(f32::NAN);
        assert_eq!(inputs.intensity_filter, 0.0);
    }

    #[test]
    fn test_focus_sets_target() {
        let mut inputs = GlobeInputs::default();
        inputs.focus(48.37, 31.16);
        let target = inputs.target_view.unwrap();
        assert_eq!((target.lat, target.lon), (48.37, 31.16));
    }
}
