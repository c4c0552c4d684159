//! Mount, rebuild, and teardown of the globe scene.
//!
//! ## States
//!
//! - **Unmounted**: nothing spawned, no per-frame systems run.
//! - **Mounted**: view rig and one scene build are live; the frame systems run.
//! - **Failed**: mounting aborted because no render device was available.
//!
//! Every frame system is gated on [`GlobeState::Mounted`], so leaving the state
//! stops them before the teardown in `OnExit` runs. A structural input change
//! (new snapshot or weather) tears the current build down completely before
//! the next one is built.

use bevy::camera::ClearColorConfig;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;
use bevy::render::renderer::RenderDevice;
use bevy::render::view::Hdr;

use crate::animation::AnimationClock;
use crate::camera::{CameraState, PointerIntents};
use crate::scene::{BuiltScene, build_scene};
use crate::textures::TextureLibrary;
use crate::tracker::{ResourceTracker, SceneAssets};
use crate::{GlobeInputs, GlobeSettings, GlobeStats};

/// Mount lifecycle of the globe.
#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobeState {
    #[default]
    Unmounted,
    Mounted,
    /// Mounting failed; stays here until the host requests another mount.
    Failed,
}

/// Marker for the globe's camera.
#[derive(Component, Debug)]
pub struct GlobeCamera;

/// Entities and build output of the mounted globe.
#[derive(Resource, Default, Debug)]
pub struct GlobeScene {
    /// Camera and other view entities that outlive rebuilds.
    rig: Vec<Entity>,
    built: Option<BuiltScene>,
    /// Ambient light the host had before mounting.
    host_ambient: Option<GlobalAmbientLight>,
}

impl GlobeScene {
    pub fn built(&self) -> Option<&BuiltScene> {
        self.built.as_ref()
    }

    pub fn built_mut(&mut self) -> Option<&mut BuiltScene> {
        self.built.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        !self.rig.is_empty()
    }
}

/// Despawn the current build and release everything it allocated.
fn teardown_build(
    commands: &mut Commands,
    scene: &mut GlobeScene,
    tracker: &mut ResourceTracker,
    assets: &mut SceneAssets,
) {
    if let Some(built) = scene.built.take() {
        commands.entity(built.root).despawn();
    }
    // Released even when nothing was built, so a partial build never leaks.
    let released = tracker.release_all(assets);
    if released > 0 {
        tracing::info!("Released {released} scene resources");
    }
}

/// Swap in the globe's ambient light, remembering the host's.
fn install_ambient(
    commands: &mut Commands,
    scene: &mut GlobeScene,
    host: Option<&GlobalAmbientLight>,
) {
    scene.host_ambient = host.cloned();
    commands.insert_resource(GlobalAmbientLight {
        color: Color::srgb_u8(0x40, 0x40, 0x40),
        brightness: 400.0,
        affects_lightmapped_meshes: true,
    });
}

/// Put back the ambient light the host had before mounting.
fn restore_ambient(commands: &mut Commands, scene: &mut GlobeScene) {
    match scene.host_ambient.take() {
        Some(light) => commands.insert_resource(light),
        None => commands.remove_resource::<GlobalAmbientLight>(),
    }
}

/// Build the scene for the current inputs, replacing any existing build.
#[allow(clippy::too_many_arguments)]
fn rebuild(
    commands: &mut Commands,
    scene: &mut GlobeScene,
    tracker: &mut ResourceTracker,
    assets: &mut SceneAssets,
    textures: &TextureLibrary,
    inputs: &GlobeInputs,
    settings: &GlobeSettings,
    stats: &mut GlobeStats,
) {
    teardown_build(commands, scene, tracker, assets);
    let mut rng = rand::rng();
    let built = build_scene(commands, assets, tracker, textures, inputs, settings, &mut rng);
    stats.builds += 1;
    stats.total_markers = built.markers.len();
    scene.built = Some(built);
}

/// Mount the globe: check for a render device, spawn the view rig, and build.
#[allow(clippy::too_many_arguments)]
pub fn mount_scene(
    mut commands: Commands,
    render_device: Option<Res<RenderDevice>>,
    mut next_state: ResMut<NextState<GlobeState>>,
    mut scene: ResMut<GlobeScene>,
    mut tracker: ResMut<ResourceTracker>,
    library: Option<Res<TextureLibrary>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    inputs: Res<GlobeInputs>,
    settings: Res<GlobeSettings>,
    mut camera: ResMut<CameraState>,
    mut stats: ResMut<GlobeStats>,
    ambient: Option<Res<GlobalAmbientLight>>,
) {
    if render_device.is_none() {
        tracing::error!("No render device available; globe not mounted");
        next_state.set(GlobeState::Failed);
        return;
    }

    // Generated once and shared by every build.
    let textures = match library {
        Some(library) => (*library).clone(),
        None => {
            let library = TextureLibrary::generate(&mut images);
            commands.insert_resource(library.clone());
            library
        }
    };

    *camera = CameraState::new(&settings);

    let view = commands
        .spawn((
            Name::new("Globe camera"),
            GlobeCamera,
            Camera3d::default(),
            Camera {
                clear_color: ClearColorConfig::Custom(Color::BLACK),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, camera.zoom_distance()).looking_at(Vec3::ZERO, Vec3::Y),
            Projection::Perspective(PerspectiveProjection {
                fov: settings.fov_y(),
                near: 0.1,
                far: 1000.0,
                ..default()
            }),
            Tonemapping::AcesFitted,
            Hdr,
            // Markers and the scanner glow through bloom.
            Bloom::NATURAL,
        ))
        .id();
    scene.rig.push(view);

    install_ambient(&mut commands, &mut scene, ambient.as_deref());

    let mut assets = SceneAssets::new(&mut meshes, &mut materials, &mut images);
    rebuild(
        &mut commands,
        &mut scene,
        &mut tracker,
        &mut assets,
        &textures,
        &inputs,
        &settings,
        &mut stats,
    );
    tracing::info!("Globe mounted");
}

/// Tear everything down when leaving the mounted state.
#[allow(clippy::too_many_arguments)]
pub fn unmount_scene(
    mut commands: Commands,
    mut scene: ResMut<GlobeScene>,
    mut tracker: ResMut<ResourceTracker>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut intents: ResMut<PointerIntents>,
    mut camera: ResMut<CameraState>,
    mut clock: ResMut<AnimationClock>,
    settings: Res<GlobeSettings>,
) {
    let mut assets = SceneAssets::new(&mut meshes, &mut materials, &mut images);
    teardown_build(&mut commands, &mut scene, &mut tracker, &mut assets);
    for entity in scene.rig.drain(..) {
        commands.entity(entity).despawn();
    }
    restore_ambient(&mut commands, &mut scene);

    intents.clear();
    *camera = CameraState::new(&settings);
    clock.reset();
    tracing::info!("Globe unmounted");
}

/// Rebuild when the snapshot or weather inputs changed since the last build.
#[allow(clippy::too_many_arguments)]
pub fn rebuild_on_change(
    mut commands: Commands,
    mut scene: ResMut<GlobeScene>,
    mut tracker: ResMut<ResourceTracker>,
    textures: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    inputs: Res<GlobeInputs>,
    settings: Res<GlobeSettings>,
    mut stats: ResMut<GlobeStats>,
) {
    let current = scene.built().map(|built| built.revision);
    if current == Some(inputs.revision()) {
        return;
    }
    tracing::info!(
        "Scene inputs changed (revision {:?} -> {}), rebuilding",
        current,
        inputs.revision()
    );
    let mut assets = SceneAssets::new(&mut meshes, &mut materials, &mut images);
    rebuild(
        &mut commands,
        &mut scene,
        &mut tracker,
        &mut assets,
        &textures,
        &inputs,
        &settings,
        &mut stats,
    );
}

/// Mirror the tracker's counters into the stats resource.
pub fn update_stats(
    tracker: Res<ResourceTracker>,
    mut stats: ResMut<GlobeStats>,
    mut last: Local<GlobeStats>,
) {
    stats.live_resources = tracker.live_count();
    stats.released_resources = tracker.released_total();
    if *stats != *last {
        tracing::debug!(
            "Globe: {}/{} markers visible, {} live resources, {} released, {} builds",
            stats.visible_markers,
            stats.total_markers,
            stats.live_resources,
            stats.released_resources,
            stats.builds
        );
        *last = stats.clone();
    }
}
