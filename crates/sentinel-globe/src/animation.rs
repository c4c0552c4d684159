//! Per-frame animation of the mounted scene.
//!
//! Runs in a fixed order every frame: scanner sweep, satellite orbits,
//! camera (in [`crate::camera`]), marker glow and pulse, then the ambient
//! cloud drift and weather bobbing. Animation advances per frame rather than
//! per second, matching the tuning constants in [`GlobeSettings`].

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::GlobeSettings;
use crate::data::rgb24_to_color;
use crate::lifecycle::GlobeScene;
use crate::markers::MarkerRecord;

/// Pulse angular frequency, in radians per unit of animation time.
const PULSE_RATE: f32 = 4.0;
/// Glow within this distance of its target snaps to it.
const GLOW_SNAP: f32 = 1e-3;
/// Weather sprite bob height above their resting position.
const BOB_HEIGHT: f32 = 0.04;

// ============================================================================
// Clock
// ============================================================================

/// Animation time, advanced once per frame while mounted.
#[derive(Resource, Default, Debug)]
pub struct AnimationClock {
    time: f32,
    frame: u64,
}

impl AnimationClock {
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn tick(&mut self, step: f32) {
        self.time += step;
        self.frame += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// Horizontal scanner ring sweeping up and down the globe.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ScannerSweep {
    /// Height of the ring along the globe axis.
    pub position: f32,
    /// `1.0` moving up, `-1.0` moving down.
    pub direction: f32,
}

impl Default for ScannerSweep {
    fn default() -> Self {
        Self {
            position: 0.0,
            direction: 1.0,
        }
    }
}

impl ScannerSweep {
    /// Move one step, reversing at `±band`.
    pub fn step(&mut self, band: f32, speed: f32) {
        self.position += self.direction * speed;
        if self.position >= band {
            self.position = band;
            self.direction = -1.0;
        } else if self.position <= -band {
            self.position = -band;
            self.direction = 1.0;
        }
    }

    /// Horizontal scale that keeps a ring of `radius` on the sphere surface
    /// at the current height.
    pub fn ring_scale(&self, radius: f32) -> f32 {
        if radius <= 0.0 {
            return 0.0;
        }
        (radius * radius - self.position * self.position).max(0.0).sqrt() / radius
    }
}

// ============================================================================
// Satellites
// ============================================================================

/// Circular orbit parameters for one satellite.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SatelliteOrbit {
    pub radius: f32,
    /// Tilt of the orbital plane from the equator.
    pub inclination: f32,
    /// Longitude of the ascending node.
    pub node: f32,
    pub phase: f32,
    /// Phase advance per frame.
    pub speed: f32,
}

impl SatelliteOrbit {
    /// Random orbit between 6.5 and 9 units out.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            radius: rng.random_range(6.5..9.0),
            inclination: rng.random_range(-1.2..1.2),
            node: rng.random_range(0.0..TAU),
            phase: rng.random_range(0.0..TAU),
            speed: rng.random_range(0.002..0.008),
        }
    }

    pub fn advance(&mut self) {
        self.phase = (self.phase + self.speed) % TAU;
    }

    /// Position relative to the globe center.
    pub fn position(&self) -> Vec3 {
        let (sin, cos) = self.phase.sin_cos();
        let in_plane = Vec3::new(cos * self.radius, 0.0, sin * self.radius);
        Quat::from_rotation_y(self.node) * Quat::from_rotation_x(self.inclination) * in_plane
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Ring scale of the marker pulse at a given time.
pub fn pulse(time: f32) -> f32 {
    1.0 + (time * PULSE_RATE).sin() * 0.3
}

/// Exponentially smooth a glow value toward its hover flag.
pub fn smooth_glow(glow: f32, hovered: bool, rate: f32) -> f32 {
    let target = if hovered { 1.0 } else { 0.0 };
    let next = glow + (target - glow) * rate;
    if (target - next).abs() < GLOW_SNAP {
        target
    } else {
        next
    }
}

/// Take the glow that still has to be written to the marker's material.
///
/// Returns `None` once the material already shows the current glow, so a
/// settled marker leaves its material untouched.
pub fn pending_glow(record: &mut MarkerRecord) -> Option<f32> {
    if record.glow == record.applied_glow {
        return None;
    }
    record.applied_glow = record.glow;
    Some(record.glow)
}

// ============================================================================
// Ambient layers
// ============================================================================

/// Slowly rotating cloud shell.
#[derive(Component, Debug, Default)]
pub struct CloudDrift;

/// Weather glyph resting on the surface.
#[derive(Component, Debug, Clone, Copy)]
pub struct WeatherSprite {
    /// Resting position in the surface frame.
    pub rest: Vec3,
    /// Bob phase offset.
    pub phase: f32,
}

impl WeatherSprite {
    /// Position at the given time, bobbing along the surface normal.
    pub fn position(&self, time: f32) -> Vec3 {
        let normal = self.rest.normalize_or_zero();
        self.rest + normal * ((time * 2.0 + self.phase).sin() * BOB_HEIGHT)
    }
}

// ============================================================================
// Systems
// ============================================================================

pub fn tick_clock(mut clock: ResMut<AnimationClock>, settings: Res<GlobeSettings>) {
    clock.tick(settings.time_step);
}

pub fn advance_scanner(
    settings: Res<GlobeSettings>,
    mut scanners: Query<(&mut ScannerSweep, &mut Transform)>,
) {
    for (mut sweep, mut transform) in &mut scanners {
        sweep.step(settings.scanner_band, settings.scanner_speed);
        let scale = sweep.ring_scale(settings.scanner_radius);
        transform.translation.y = sweep.position;
        transform.scale = Vec3::new(scale, 1.0, scale);
    }
}

pub fn advance_satellites(mut satellites: Query<(&mut SatelliteOrbit, &mut Transform)>) {
    for (mut orbit, mut transform) in &mut satellites {
        orbit.advance();
        transform.translation = orbit.position();
        transform.look_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Smooth hover glow and pulse the rings of visible markers.
///
/// The pulse only moves transforms; materials are written when the glow of a
/// marker changed.
pub fn animate_markers(
    clock: Res<AnimationClock>,
    settings: Res<GlobeSettings>,
    mut scene: ResMut<GlobeScene>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(built) = scene.built_mut() else {
        return;
    };
    let ring_scale = pulse(clock.time());

    for record in built.markers.iter_mut() {
        record.glow = smooth_glow(record.glow, record.hovered, settings.glow_smoothing);
        if !record.visible {
            continue;
        }

        if let Ok(mut transform) = transforms.get_mut(record.nodes.ring) {
            transform.scale = Vec3::splat(ring_scale * (1.0 + record.glow * 0.3));
        }
        let Some(glow) = pending_glow(record) else {
            continue;
        };
        let base = LinearRgba::from(rgb24_to_color(record.resolved_color));
        if let Some(mut material) = materials.get_mut(&record.nodes.core_material) {
            material.emissive = base * (1.0 + glow * 4.0);
        }
        if let Ok(mut transform) = transforms.get_mut(record.nodes.core) {
            transform.scale = Vec3::splat(1.0 + glow * 0.5);
        }
    }
}

pub fn drift_clouds(
    settings: Res<GlobeSettings>,
    mut clouds: Query<&mut Transform, With<CloudDrift>>,
) {
    for mut transform in &mut clouds {
        transform.rotate_y(settings.cloud_drift);
    }
}

pub fn animate_weather(
    clock: Res<AnimationClock>,
    mut sprites: Query<(&WeatherSprite, &mut Transform)>,
) {
    for (sprite, mut transform) in &mut sprites {
        transform.translation = sprite.position(clock.time());
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::data::{Category, CategorySet, Zone};
    use crate::lifecycle::tests::built_world;
    use crate::markers::MarkerId;
    use crate::markers::tests::placeholder_record;
    use crate::visibility::apply_marker_visibility;

    #[test]
    fn test_scanner_bounces_within_band() {
        let mut sweep = ScannerSweep::default();
        let mut reversals = 0;
        let mut direction = sweep.direction;
        for _ in 0..2000 {
            sweep.step(4.5, 0.03);
            assert!(sweep.position.abs() <= 4.5);
            if sweep.direction != direction {
                reversals += 1;
                direction = sweep.direction;
            }
        }
        // 2000 steps of 0.03 cover 60 units; each leg is at most 9 units.
        assert!(reversals >= 6);
    }

    #[test]
    fn test_scanner_ring_hugs_sphere() {
        let sweep = ScannerSweep {
            position: 3.0,
            direction: 1.0,
        };
        assert!((sweep.ring_scale(5.0) - 0.8).abs() < 1e-6);
        let outside = ScannerSweep {
            position: 6.0,
            direction: 1.0,
        };
        assert_eq!(outside.ring_scale(5.0), 0.0);
    }

    #[test]
    fn test_satellite_orbit_keeps_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut orbit = SatelliteOrbit::random(&mut rng);
        assert!((6.5..9.0).contains(&orbit.radius));
        let before = orbit.position();
        for _ in 0..100 {
            orbit.advance();
            assert!((orbit.position().length() - orbit.radius).abs() < 1e-4);
        }
        assert_ne!(before, orbit.position());
    }

    #[test]
    fn test_glow_converges_toward_hover() {
        let mut glow = 0.0;
        for _ in 0..60 {
            let next = smooth_glow(glow, true, 0.15);
            assert!(next >= glow);
            glow = next;
        }
        assert!(glow > 0.99);
        for _ in 0..60 {
            glow = smooth_glow(glow, false, 0.15);
        }
        assert!(glow < 0.01);
    }

    #[test]
    fn test_glow_settles_exactly() {
        let mut glow = 0.0;
        let mut frames = 0;
        while glow != 1.0 {
            glow = smooth_glow(glow, true, 0.15);
            frames += 1;
            assert!(frames < 100, "glow never reached its target");
        }
        assert_eq!(smooth_glow(glow, true, 0.15), 1.0);
    }

    #[test]
    fn test_pending_glow_only_reports_changes() {
        let mut record = placeholder_record();
        assert_eq!(pending_glow(&mut record), None);

        record.glow = 0.3;
        assert_eq!(pending_glow(&mut record), Some(0.3));
        assert_eq!(pending_glow(&mut record), None);
    }

    #[test]
    fn test_pulse_range() {
        for i in 0..200 {
            assert!((0.7..=1.3).contains(&pulse(i as f32 * 0.02)));
        }
    }

    #[test]
    fn test_settled_markers_leave_materials_untouched() {
        let set = CategorySet::new().with_category(
            "war",
            Category::new("Armed Conflict", 0xff_44_00)
                .with_zone(Zone::new("Donbas Offensive", 48.37, 31.16, 0.95)),
        );
        let mut world = built_world(set);
        world.run_system_once(apply_marker_visibility).unwrap();
        world
            .resource_mut::<GlobeScene>()
            .built_mut()
            .unwrap()
            .markers
            .set_hovered(Some(MarkerId(0)));

        world.clear_trackers();
        world.run_system_once(animate_markers).unwrap();
        assert!(world.is_resource_changed::<Assets<StandardMaterial>>());

        for _ in 0..100 {
            world.run_system_once(animate_markers).unwrap();
        }
        let scene = world.resource::<GlobeScene>();
        let record = scene.built().unwrap().markers.get(MarkerId(0)).unwrap();
        assert_eq!(record.glow, 1.0);
        assert_eq!(record.applied_glow, 1.0);

        world.clear_trackers();
        for _ in 0..10 {
            world.resource_mut::<AnimationClock>().tick(0.02);
            world.run_system_once(animate_markers).unwrap();
        }
        assert!(!world.is_resource_changed::<Assets<StandardMaterial>>());
    }

    #[test]
    fn test_weather_sprite_bobs_along_normal() {
        let sprite = WeatherSprite {
            rest: Vec3::new(0.0, 5.3, 0.0),
            phase: 0.0,
        };
        for i in 0..50 {
            let p = sprite.position(i as f32 * 0.1);
            assert!(p.x.abs() < 1e-6 && p.z.abs() < 1e-6);
            assert!((p.y - 5.3).abs() <= BOB_HEIGHT + 1e-6);
        }
    }

    #[test]
    fn test_clock_ticks() {
        let mut clock = AnimationClock::default();
        clock.tick(0.02);
        clock.tick(0.02);
        assert_eq!(clock.frame(), 2);
        assert!((clock.time() - 0.04).abs() < 1e-6);
        clock.reset();
        assert_eq!(clock.frame(), 0);
    }
}
