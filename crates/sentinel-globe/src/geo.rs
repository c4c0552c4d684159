//! Coordinate conversion utilities.
//!
//! Provides conversions between geographic coordinates (latitude, longitude)
//! and positions on the globe mesh, plus the globe rotations that bring a
//! given point in front of the camera.
//!
//! ## Frames
//!
//! - **Surface frame**: where markers live. `lat_lon_to_vec3` places
//!   `(0°, 0°)` on `+X` with `+Y` through the north pole.
//! - **Globe frame**: the surface frame yawed by `-90°` so that `(0°, 0°)`
//!   sits on `+Z`, facing a camera on the positive Z axis.
//! - **World**: the globe frame rotated by the orbit angles, pitch about X
//!   applied after yaw about Y.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use bevy::prelude::*;
use glam::DVec3;

/// Convert latitude, longitude (degrees), and radius to a surface-frame position.
///
/// Uses a spherical globe. The X component is negated so that the front of
/// the globe faces the viewer; keep the trig order as is, marker placement
/// and re-centering both depend on it.
pub fn lat_lon_to_vec3(lat_deg: f64, lon_deg: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - lat_deg) * (PI / 180.0);
    let theta = (lon_deg + 180.0) * (PI / 180.0);
    DVec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Rotation from the surface frame into the globe frame.
pub fn surface_frame() -> Quat {
    Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2)
}

/// Globe orientation for the given orbit angles (`x` pitch, `y` yaw).
pub fn globe_orientation(angles: Vec2) -> Quat {
    Quat::from_rotation_x(angles.x) * Quat::from_rotation_y(angles.y)
}

/// World position of a surface-frame point under the given orbit angles.
pub fn surface_to_world(angles: Vec2, surface: Vec3) -> Vec3 {
    globe_orientation(angles) * (surface_frame() * surface)
}

/// Orbit angles that bring the given latitude/longitude to face the camera.
///
/// `x = lat`, `y = -lon`, both in radians.
pub fn target_angles(lat_deg: f64, lon_deg: f64) -> Vec2 {
    Vec2::new(
        (lat_deg * PI / 180.0) as f32,
        (-lon_deg * PI / 180.0) as f32,
    )
}

/// Orbit angles (`x`, `y`) that bring a surface-frame point to face the camera.
///
/// Derived from the point itself rather than from its latitude/longitude.
pub fn facing_angles(surface: DVec3) -> (f64, f64) {
    // Surface frame -> globe frame (yaw by -90°).
    let (sin, cos) = (-FRAC_PI_2).sin_cos();
    let q = DVec3::new(
        surface.x * cos + surface.z * sin,
        surface.y,
        -surface.x * sin + surface.z * cos,
    );
    let horizontal = q.x.hypot(q.z);
    (q.y.atan2(horizontal), (-q.x).atan2(q.z))
}

/// Recover latitude/longitude (degrees) from orbit angles.
///
/// Inverse of [`target_angles`]; longitude is wrapped into `[-180, 180)`.
pub fn lat_lon_from_angles(x: f64, y: f64) -> (f64, f64) {
    let lat = x.to_degrees().clamp(-90.0, 90.0);
    let lon = wrap_angle(-y).to_degrees();
    (lat, lon)
}

/// Wrap an angle in radians into `[-π, π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Wrap an `f32` angle in radians into `[-π, π)`.
pub fn wrap_angle_f32(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

/// Informal region label for a latitude/longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Antarctica,
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
    MiddleEast,
    InternationalWaters,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Region::Antarctica => "Antarctica",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
            Region::Europe => "Europe",
            Region::Africa => "Africa",
            Region::Asia => "Asia",
            Region::Oceania => "Oceania",
            Region::MiddleEast => "Middle East",
            Region::InternationalWaters => "International Waters",
        }
    }
}

/// Classify a latitude/longitude into an informal region.
///
/// The bands overlap; the first matching check wins, so Middle East is only
/// reported where none of the earlier bands apply.
pub fn region_for(lat: f64, lon: f64) -> Region {
    if lat < -60.0 {
        Region::Antarctica
    } else if lat > 15.0 && lon > -170.0 && lon < -50.0 {
        Region::NorthAmerica
    } else if lat <= 15.0 && lat > -60.0 && lon > -90.0 && lon < -30.0 {
        Region::SouthAmerica
    } else if lat > 35.0 && lon > -10.0 && lon < 50.0 {
        Region::Europe
    } else if lat <= 35.0 && lat > -40.0 && lon > -20.0 && lon < 55.0 {
        Region::Africa
    } else if lat > 10.0 && lon > 55.0 && lon < 180.0 {
        Region::Asia
    } else if lat <= 10.0 && lat > -50.0 && lon > 110.0 && lon < 180.0 {
        Region::Oceania
    } else if lon > 30.0 && lon < 60.0 && lat > 10.0 && lat < 45.0 {
        Region::MiddleEast
    } else {
        Region::InternationalWaters
    }
}
