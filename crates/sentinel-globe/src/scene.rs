//! Scene graph construction for one build of the globe.
//!
//! A build spawns the whole scene under a single root entity: starfield,
//! globe shells, scanner ring, atmosphere, satellites, one marker per zone,
//! and the weather sprites. Every mesh and material it allocates goes through
//! the [`ResourceTracker`], so tearing the build down is a single despawn
//! plus [`ResourceTracker::release_all`].
//!
//! ```text
//! GlobeRoot
//! ├── starfield, atmosphere, scanner, lights, satellites
//! └── GlobePivot (orbit rotation)
//!     ├── base sphere, hex shell, cloud shell
//!     └── SurfaceFrame (lat/lon frame)
//!         ├── markers (core + ring)
//!         └── weather sprites
//! ```

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use rand::Rng;

use crate::animation::{CloudDrift, SatelliteOrbit, ScannerSweep, WeatherSprite};
use crate::data::{CategorySet, rgb24_to_color};
use crate::geo::{lat_lon_to_vec3, surface_frame};
use crate::markers::{MarkerArena, MarkerNodes, MarkerPlan, MarkerTag, plan_markers};
use crate::textures::TextureLibrary;
use crate::tracker::{ResourceTracker, SceneAssets};
use crate::weather::{WeatherCondition, WeatherPoint};
use crate::{GlobeInputs, GlobeSettings};

const GLOBE_COLOR: u32 = 0x02_1a_2e;
const GLOBE_EMISSIVE: u32 = 0x00_0a_1a;
const ACCENT_COLOR: u32 = 0x06_b6_d4;
const STAR_COLOR: u32 = 0x44_88_ff;

/// Ring inner and outer radius around each marker core.
const RING_RADII: (f32, f32) = (0.1, 0.15);
/// Weather sprite edge length for zone and reference-city points.
const WEATHER_SPRITE_SIZE: f32 = 0.4;
const REFERENCE_SPRITE_SIZE: f32 = 0.25;

// ============================================================================
// Components
// ============================================================================

/// Root of a scene build.
#[derive(Component, Debug)]
pub struct GlobeRoot;

/// Node carrying the orbit rotation.
#[derive(Component, Debug)]
pub struct GlobePivot;

/// Node aligning lat/lon positions with the globe frame.
#[derive(Component, Debug)]
pub struct SurfaceFrame;

#[derive(Component, Debug)]
pub struct Starfield;

#[derive(Component, Debug)]
pub struct Satellite;

// ============================================================================
// Build output
// ============================================================================

/// Everything a build spawned, kept until its teardown.
#[derive(Debug)]
pub struct BuiltScene {
    pub root: Entity,
    pub pivot: Entity,
    pub markers: MarkerArena,
    /// The snapshot the markers were built from.
    pub snapshot: Arc<CategorySet>,
    /// Input revision this build reflects.
    pub revision: u64,
    pub satellites: usize,
    pub weather_sprites: usize,
    /// Resources this build registered with the tracker.
    pub allocated: usize,
}

/// Allocates assets and registers them with the tracker.
struct Allocator<'a> {
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    tracker: &'a mut ResourceTracker,
    count: usize,
}

impl Allocator<'_> {
    fn mesh(&mut self, mesh: impl Into<Mesh>) -> Handle<Mesh> {
        self.count += 1;
        self.tracker.track(self.meshes.add(mesh))
    }

    fn material(&mut self, material: StandardMaterial) -> Handle<StandardMaterial> {
        self.count += 1;
        self.tracker.track(self.materials.add(material))
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build the full scene for the current inputs.
///
/// Zones that fail validation are skipped; everything else is built.
#[allow(clippy::too_many_arguments)]
pub fn build_scene(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    tracker: &mut ResourceTracker,
    textures: &TextureLibrary,
    inputs: &GlobeInputs,
    settings: &GlobeSettings,
    rng: &mut impl Rng,
) -> BuiltScene {
    let mut alloc = Allocator {
        meshes: &mut *assets.meshes,
        materials: &mut *assets.materials,
        tracker,
        count: 0,
    };

    let root = commands
        .spawn((
            Name::new("Globe"),
            GlobeRoot,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    spawn_starfield(commands, &mut alloc, root, settings, rng);
    spawn_lights(commands, root);
    spawn_atmosphere(commands, &mut alloc, root, settings);
    spawn_scanner(commands, &mut alloc, root, settings);
    let satellites = spawn_satellites(commands, &mut alloc, root, settings, rng);

    let pivot = commands
        .spawn((
            Name::new("Globe pivot"),
            GlobePivot,
            Transform::default(),
            Visibility::default(),
            ChildOf(root),
        ))
        .id();
    spawn_shells(commands, &mut alloc, pivot, textures, settings);

    let surface = commands
        .spawn((
            Name::new("Surface frame"),
            SurfaceFrame,
            Transform::from_rotation(surface_frame()),
            Visibility::default(),
            ChildOf(pivot),
        ))
        .id();

    let snapshot = inputs.categories();
    let markers = spawn_markers(
        commands,
        &mut alloc,
        surface,
        plan_markers(&snapshot, settings),
    );
    let weather_sprites = spawn_weather(
        commands,
        &mut alloc,
        surface,
        textures,
        inputs.weather(),
        settings,
        rng,
    );

    tracing::info!(
        "Built globe scene: {} markers, {} weather sprites, {} satellites, {} resources",
        markers.len(),
        weather_sprites,
        satellites,
        alloc.count
    );

    BuiltScene {
        root,
        pivot,
        markers,
        snapshot,
        revision: inputs.revision(),
        satellites,
        weather_sprites,
        allocated: alloc.count,
    }
}

/// Uniformly distributed points on a sphere of the given radius.
pub fn starfield_positions(count: usize, radius: f32, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|_| {
            let z: f32 = rng.random_range(-1.0..=1.0);
            let angle: f32 = rng.random_range(0.0..TAU);
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let (sin, cos) = angle.sin_cos();
            [ring * cos * radius, ring * sin * radius, z * radius]
        })
        .collect()
}

fn spawn_starfield(
    commands: &mut Commands,
    alloc: &mut Allocator,
    root: Entity,
    settings: &GlobeSettings,
    rng: &mut impl Rng,
) {
    let positions = starfield_positions(settings.star_count, settings.star_radius, rng);
    let mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    let material = StandardMaterial {
        base_color: rgb24_to_color(STAR_COLOR).with_alpha(0.5),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    };
    commands.spawn((
        Name::new("Starfield"),
        Starfield,
        Mesh3d(alloc.mesh(mesh)),
        MeshMaterial3d(alloc.material(material)),
        Transform::default(),
        ChildOf(root),
    ));
}

fn spawn_lights(commands: &mut Commands, root: Entity) {
    commands.spawn((
        Name::new("Key light"),
        DirectionalLight {
            color: Color::WHITE,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 3.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ChildOf(root),
    ));
}

fn spawn_shells(
    commands: &mut Commands,
    alloc: &mut Allocator,
    pivot: Entity,
    textures: &TextureLibrary,
    settings: &GlobeSettings,
) {
    let base = StandardMaterial {
        base_color: rgb24_to_color(GLOBE_COLOR),
        emissive: LinearRgba::from(rgb24_to_color(GLOBE_EMISSIVE)),
        perceptual_roughness: 0.45,
        reflectance: 0.3,
        ..default()
    };
    commands.spawn((
        Name::new("Globe surface"),
        Mesh3d(alloc.mesh(Sphere::new(settings.globe_radius).mesh().uv(64, 64))),
        MeshMaterial3d(alloc.material(base)),
        Transform::default(),
        ChildOf(pivot),
    ));

    let grid = StandardMaterial {
        base_color: Color::WHITE.with_alpha(0.6),
        base_color_texture: Some(textures.hex_grid.clone()),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    };
    commands.spawn((
        Name::new("Hex shell"),
        Mesh3d(alloc.mesh(Sphere::new(settings.grid_radius).mesh().uv(48, 48))),
        MeshMaterial3d(alloc.material(grid)),
        Transform::default(),
        ChildOf(pivot),
    ));

    let clouds = StandardMaterial {
        base_color: Color::WHITE.with_alpha(0.35),
        base_color_texture: Some(textures.clouds.clone()),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 1.0,
        ..default()
    };
    commands.spawn((
        Name::new("Cloud shell"),
        CloudDrift,
        Mesh3d(alloc.mesh(Sphere::new(settings.cloud_radius).mesh().uv(48, 48))),
        MeshMaterial3d(alloc.material(clouds)),
        Transform::default(),
        ChildOf(pivot),
    ));
}

fn spawn_atmosphere(
    commands: &mut Commands,
    alloc: &mut Allocator,
    root: Entity,
    settings: &GlobeSettings,
) {
    // Back faces only, added on top of whatever is behind: a rim glow.
    let halo = StandardMaterial {
        base_color: rgb24_to_color(ACCENT_COLOR).with_alpha(0.15),
        alpha_mode: AlphaMode::Add,
        unlit: true,
        cull_mode: Some(Face::Front),
        ..default()
    };
    commands.spawn((
        Name::new("Atmosphere"),
        Mesh3d(alloc.mesh(Sphere::new(settings.atmosphere_radius).mesh().uv(64, 64))),
        MeshMaterial3d(alloc.material(halo)),
        Transform::default(),
        ChildOf(root),
    ));
}

fn spawn_scanner(
    commands: &mut Commands,
    alloc: &mut Allocator,
    root: Entity,
    settings: &GlobeSettings,
) {
    let r = settings.scanner_radius;
    let material = StandardMaterial {
        base_color: rgb24_to_color(ACCENT_COLOR).with_alpha(0.7),
        emissive: LinearRgba::from(rgb24_to_color(ACCENT_COLOR)) * 2.0,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    };
    commands.spawn((
        Name::new("Scanner"),
        ScannerSweep::default(),
        Mesh3d(alloc.mesh(Torus::new(r - 0.015, r + 0.015))),
        MeshMaterial3d(alloc.material(material)),
        Transform::default(),
        ChildOf(root),
    ));
}

fn spawn_satellites(
    commands: &mut Commands,
    alloc: &mut Allocator,
    root: Entity,
    settings: &GlobeSettings,
    rng: &mut impl Rng,
) -> usize {
    let body_mesh = alloc.mesh(Cuboid::new(0.08, 0.08, 0.16));
    let panel_mesh = alloc.mesh(Cuboid::new(0.36, 0.01, 0.08));
    let body_material = alloc.material(StandardMaterial {
        base_color: Color::srgb_u8(0xcb, 0xd5, 0xe1),
        metallic: 0.8,
        perceptual_roughness: 0.3,
        ..default()
    });
    let panel_material = alloc.material(StandardMaterial {
        base_color: Color::srgb_u8(0x1e, 0x3a, 0x8a),
        emissive: LinearRgba::rgb(0.02, 0.05, 0.2),
        ..default()
    });

    for i in 0..settings.satellite_count {
        let orbit = SatelliteOrbit::random(rng);
        let satellite = commands
            .spawn((
                Name::new(format!("Satellite {i}")),
                Satellite,
                orbit,
                Mesh3d(body_mesh.clone()),
                MeshMaterial3d(body_material.clone()),
                Transform::from_translation(orbit.position()).looking_at(Vec3::ZERO, Vec3::Y),
                ChildOf(root),
            ))
            .id();
        commands.spawn((
            Mesh3d(panel_mesh.clone()),
            MeshMaterial3d(panel_material.clone()),
            Transform::default(),
            ChildOf(satellite),
        ));
    }
    settings.satellite_count
}

fn spawn_markers(
    commands: &mut Commands,
    alloc: &mut Allocator,
    surface: Entity,
    plans: Vec<MarkerPlan>,
) -> MarkerArena {
    let mut arena = MarkerArena::new();
    if plans.is_empty() {
        return arena;
    }
    let ring_mesh = alloc.mesh(Annulus::new(RING_RADII.0, RING_RADII.1));

    for plan in plans {
        let color = rgb24_to_color(plan.resolved_color);
        let core_material = alloc.material(StandardMaterial {
            base_color: color,
            emissive: LinearRgba::from(color),
            ..default()
        });
        let ring_material = alloc.material(StandardMaterial {
            base_color: color.with_alpha(0.4),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        let core_mesh = alloc.mesh(Sphere::new(plan.core_radius).mesh().uv(16, 16));

        let group = commands
            .spawn((
                Transform::from_translation(plan.surface_position).looking_at(Vec3::ZERO, Vec3::Y),
                Visibility::Hidden,
                ChildOf(surface),
            ))
            .id();
        let core = commands
            .spawn((
                Mesh3d(core_mesh),
                MeshMaterial3d(core_material.clone()),
                Transform::default(),
                ChildOf(group),
            ))
            .id();
        let ring = commands
            .spawn((
                Mesh3d(ring_mesh.clone()),
                MeshMaterial3d(ring_material.clone()),
                Transform::default(),
                ChildOf(group),
            ))
            .id();

        let id = arena.push(
            plan,
            MarkerNodes {
                group,
                core,
                ring,
                core_material,
                ring_material,
            },
        );
        commands
            .entity(group)
            .insert((MarkerTag(id), Name::new(format!("Marker {}", id.0))));
    }
    arena
}

fn spawn_weather(
    commands: &mut Commands,
    alloc: &mut Allocator,
    surface: Entity,
    textures: &TextureLibrary,
    points: &[WeatherPoint],
    settings: &GlobeSettings,
    rng: &mut impl Rng,
) -> usize {
    if points.is_empty() {
        return 0;
    }
    let zone_mesh = alloc.mesh(Rectangle::new(WEATHER_SPRITE_SIZE, WEATHER_SPRITE_SIZE));
    let reference_mesh = alloc.mesh(Rectangle::new(REFERENCE_SPRITE_SIZE, REFERENCE_SPRITE_SIZE));
    let mut materials: HashMap<WeatherCondition, Handle<StandardMaterial>> = HashMap::new();

    let mut spawned = 0;
    for point in points {
        if let Err(e) = point.validate() {
            tracing::warn!("Skipping weather point: {e}");
            continue;
        }
        let condition = point.condition();
        let material = materials
            .entry(condition)
            .or_insert_with(|| {
                alloc.material(StandardMaterial {
                    base_color: Color::WHITE,
                    base_color_texture: Some(textures.glyph(condition)),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    double_sided: true,
                    cull_mode: None,
                    ..default()
                })
            })
            .clone();
        let mesh = if point.is_reference {
            reference_mesh.clone()
        } else {
            zone_mesh.clone()
        };

        let rest =
            lat_lon_to_vec3(point.lat, point.lon, f64::from(settings.weather_radius)).as_vec3();
        // Facing outward, spun about the surface normal by the wind direction.
        let mut transform = Transform::from_translation(rest).looking_at(Vec3::ZERO, Vec3::Y);
        transform.rotate_local_z(-point.wind_direction.to_radians());

        commands.spawn((
            Name::new(format!("Weather {}", condition.description())),
            WeatherSprite {
                rest,
                phase: rng.random_range(0.0..TAU),
            },
            Mesh3d(mesh),
            MeshMaterial3d(material),
            transform,
            ChildOf(surface),
        ));
        spawned += 1;
    }
    spawned
}
