//! Ray casting from the pointer against marker spheres.
//!
//! The camera sits on the positive Z axis at the zoom distance, looking at
//! the globe center, and the globe itself carries the orbit rotation. Rays
//! and projections here use the same perspective as the rendered view.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::GlobeSettings;
use crate::geo::surface_to_world;
use crate::markers::{MarkerArena, MarkerId};

/// Per-axis scale from normalized device coordinates to view-space slope.
fn view_scale(viewport: Vec2, fov_y: f32) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let tan = (fov_y * 0.5).tan();
    Some(Vec2::new(tan * viewport.x / viewport.y, tan))
}

/// World-space ray through a cursor position (logical pixels, origin top-left).
///
/// Returns `None` for an empty viewport.
pub fn pointer_ray(cursor: Vec2, viewport: Vec2, fov_y: f32, distance: f32) -> Option<Ray3d> {
    let scale = view_scale(viewport, fov_y)?;
    let ndc = Vec2::new(
        cursor.x / viewport.x * 2.0 - 1.0,
        1.0 - cursor.y / viewport.y * 2.0,
    );
    let direction = Dir3::new((ndc * scale).extend(-1.0)).ok()?;
    Some(Ray3d::new(Vec3::Z * distance, direction))
}

/// Screen position of a world point, or `None` if it is behind the camera.
pub fn project_to_screen(world: Vec3, viewport: Vec2, fov_y: f32, distance: f32) -> Option<Vec2> {
    let scale = view_scale(viewport, fov_y)?;
    let relative = world - Vec3::Z * distance;
    if relative.z >= 0.0 {
        return None;
    }
    let ndc = relative.truncate() / (-relative.z * scale);
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    ))
}

/// Distance along the ray to the nearest intersection with a sphere.
pub fn ray_sphere(ray: Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let offset = ray.origin - center;
    let b = offset.dot(*ray.direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t >= 0.0)
}

/// Nearest visible marker hit by the ray.
///
/// Hidden markers are never candidates, and hits behind the globe surface
/// are rejected.
pub fn pick_marker(
    arena: &MarkerArena,
    rotation: Vec2,
    ray: Ray3d,
    settings: &GlobeSettings,
) -> Option<MarkerId> {
    let globe_hit = ray_sphere(ray, Vec3::ZERO, settings.globe_radius);
    arena
        .visible()
        .filter_map(|record| {
            let center = surface_to_world(rotation, record.surface_position);
            let radius = settings.pick_radius.max(record.core_radius);
            let t = ray_sphere(ray, center, radius)?;
            if globe_hit.is_some_and(|globe| t > globe) {
                return None;
            }
            Some((record.id, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Category, CategorySet, Zone};
    use crate::geo::target_angles;
    use crate::markers::plan_markers;
    use crate::markers::tests::placeholder_nodes;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn arena_for(zones: &[(f64, f64)]) -> MarkerArena {
        let mut category = Category::new("Test", 0xff_00_00);
        for (i, &(lat, lon)) in zones.iter().enumerate() {
            category = category.with_zone(Zone::new(format!("z{i}"), lat, lon, 0.8));
        }
        let set = CategorySet::new().with_category("test", category);
        let mut arena = MarkerArena::new();
        for plan in plan_markers(&set, &GlobeSettings::default()) {
            arena.push(plan, placeholder_nodes());
        }
        for record in arena.iter_mut() {
            record.visible = true;
        }
        arena
    }

    #[test]
    fn test_center_ray_points_at_globe() {
        let settings = GlobeSettings::default();
        let ray = pointer_ray(VIEWPORT * 0.5, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        assert!((ray.direction.as_vec3() - Vec3::NEG_Z).length() < 1e-6);
        let t = ray_sphere(ray, Vec3::ZERO, settings.globe_radius).unwrap();
        assert!((t - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_and_ray_agree() {
        let settings = GlobeSettings::default();
        let world = Vec3::new(1.5, -0.7, 4.2);
        let screen = project_to_screen(world, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        let ray = pointer_ray(screen, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        let to_point = (world - ray.origin).normalize();
        assert!(to_point.dot(*ray.direction) > 0.99999);
    }

    #[test]
    fn test_empty_viewport_has_no_ray() {
        assert!(pointer_ray(Vec2::ZERO, Vec2::ZERO, 1.0, 13.0).is_none());
    }

    #[test]
    fn test_pick_front_marker() {
        let settings = GlobeSettings::default();
        let arena = arena_for(&[(48.37, 31.16), (-33.86, 151.2)]);
        let rotation = target_angles(48.37, 31.16);

        let center = surface_to_world(rotation, arena.get(MarkerId(0)).unwrap().surface_position);
        let screen = project_to_screen(center, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        let ray = pointer_ray(screen, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        assert_eq!(pick_marker(&arena, rotation, ray, &settings), Some(MarkerId(0)));
    }

    #[test]
    fn test_pick_rejects_occluded_marker() {
        let settings = GlobeSettings::default();
        // Antipodal markers: one faces the camera, the other is directly behind.
        let arena = arena_for(&[(0.0, 0.0), (0.0, 180.0)]);
        let rotation = target_angles(0.0, 180.0);
        let ray = pointer_ray(VIEWPORT * 0.5, VIEWPORT, settings.fov_y(), 13.0).unwrap();
        assert_eq!(pick_marker(&arena, rotation, ray, &settings), Some(MarkerId(1)));

        // With the front marker hidden, the one behind the globe is not picked.
        let mut arena = arena;
        arena.get_mut(MarkerId(1)).unwrap().visible = false;
        assert_eq!(pick_marker(&arena, rotation, ray, &settings), None);
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let settings = GlobeSettings::default();
        let arena = arena_for(&[(0.0, 0.0)]);
        let ray = pointer_ray(Vec2::new(5.0, 5.0), VIEWPORT, settings.fov_y(), 13.0).unwrap();
        assert_eq!(pick_marker(&arena, Vec2::ZERO, ray, &settings), None);
    }
}
