//! Orbit camera and pointer controller.
//!
//! Drag rotates the globe with inertia, the scroll wheel eases the camera
//! distance, and the pointer is hit-tested against visible markers for hover
//! and selection.
//!
//! ## Pointer state machine
//!
//! ```text
//! Idle --press--> Dragging --release--> InertialCoast --velocity decayed--> Idle
//!                    ^                        |
//!                    +---------press----------+
//! ```
//!
//! Input systems never touch [`CameraState`] directly. They enqueue
//! [`PointerIntent`]s and the frame update is the single writer that applies
//! them, so the result does not depend on how input events and frames
//! interleave.
//!
//! Rotation priority per frame: target view, then active drag, then inertial
//! coast plus auto-rotation.

mod picking;

use bevy::ecs::message::{Message, MessageWriter};
use bevy::prelude::*;

use crate::data::{CategorySet, Zone, ZoneRef};
use crate::geo::{globe_orientation, target_angles, wrap_angle_f32};
use crate::lifecycle::{GlobeCamera, GlobeScene};
use crate::markers::{MarkerArena, MarkerId};
use crate::scene::GlobePivot;
use crate::{GlobeInputs, GlobeSettings};

pub use picking::{pick_marker, pointer_ray, project_to_screen, ray_sphere};

/// Pitch limit, so the globe never flips over the poles.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2;

// ============================================================================
// Intents
// ============================================================================

/// Pointer interaction phase.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug)]
pub enum PointerPhase {
    #[default]
    Idle,
    /// A button is held and pointer motion rotates the globe.
    Dragging,
    /// Released with velocity; decaying every frame.
    InertialCoast,
}

/// A pointer event waiting to be applied by the next frame update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerIntent {
    Press { position: Vec2 },
    Move { position: Vec2 },
    /// Release, at the given position if the pointer is still over the view.
    Release { position: Option<Vec2> },
    /// Scroll delta; positive zooms in.
    Wheel { delta: f32 },
    /// The pointer left the view.
    Leave,
    /// The view was resized.
    Resize { size: Vec2 },
}

/// Queue of pointer intents.
///
/// Input systems push; [`process_pointer`] drains the queue once per frame.
#[derive(Resource, Default, Debug)]
pub struct PointerIntents {
    pending: Vec<PointerIntent>,
}

impl PointerIntents {
    pub fn push(&mut self, intent: PointerIntent) {
        self.pending.push(intent);
    }

    pub fn press(&mut self, position: Vec2) {
        self.push(PointerIntent::Press { position });
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.push(PointerIntent::Move { position });
    }

    pub fn release(&mut self, position: Option<Vec2>) {
        self.push(PointerIntent::Release { position });
    }

    pub fn wheel(&mut self, delta: f32) {
        self.push(PointerIntent::Wheel { delta });
    }

    pub fn leave(&mut self) {
        self.push(PointerIntent::Leave);
    }

    pub fn resize(&mut self, size: Vec2) {
        self.push(PointerIntent::Resize { size });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Discard anything queued, e.g. when the scene unmounts.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Take all pending intents for processing.
    pub fn take(&mut self) -> Vec<PointerIntent> {
        std::mem::take(&mut self.pending)
    }
}

// ============================================================================
// Camera state
// ============================================================================

/// Orbit rotation, zoom, and drag physics.
#[derive(Resource, Debug, Clone)]
pub struct CameraState {
    /// Orbit angles: `x` pitch, `y` yaw.
    rotation: Vec2,
    zoom_distance: f32,
    target_zoom: f32,
    /// Rotation per frame recorded from the latest drag move.
    velocity: Vec2,
    phase: PointerPhase,
    /// Last known pointer position, if over the view.
    pointer: Option<Vec2>,
    viewport: Vec2,
    /// Drag rotation accumulated since the last frame.
    pending_drag: Vec2,
    /// Set once a drag move exceeds the click threshold.
    drag_exceeded: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(&GlobeSettings::default())
    }
}

impl CameraState {
    pub fn new(settings: &GlobeSettings) -> Self {
        let distance = settings.camera_distance.clamp(settings.min_zoom, settings.max_zoom);
        Self {
            rotation: Vec2::ZERO,
            zoom_distance: distance,
            target_zoom: distance,
            velocity: Vec2::ZERO,
            phase: PointerPhase::Idle,
            pointer: None,
            viewport: Vec2::ZERO,
            pending_drag: Vec2::ZERO,
            drag_exceeded: false,
        }
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn zoom_distance(&self) -> f32 {
        self.zoom_distance
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == PointerPhase::Dragging
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Apply queued intents in order, returning the position of a confirmed
    /// click if one completed.
    pub fn apply_intents(
        &mut self,
        intents: impl IntoIterator<Item = PointerIntent>,
        settings: &GlobeSettings,
    ) -> Option<Vec2> {
        intents
            .into_iter()
            .fold(None, |click, intent| self.apply(intent, settings).or(click))
    }

    /// Apply a single intent.
    pub fn apply(&mut self, intent: PointerIntent, settings: &GlobeSettings) -> Option<Vec2> {
        match intent {
            PointerIntent::Press { position } => {
                self.phase = PointerPhase::Dragging;
                self.pointer = Some(position);
                self.velocity = Vec2::ZERO;
                self.drag_exceeded = false;
                None
            }
            PointerIntent::Move { position } => {
                if self.is_dragging() {
                    if let Some(last) = self.pointer {
                        let delta = position - last;
                        // Horizontal motion yaws, vertical motion pitches.
                        let velocity = Vec2::new(delta.y, delta.x) * settings.drag_sensitivity;
                        self.pending_drag += velocity;
                        self.velocity = velocity;
                        if velocity.length() > settings.click_drag_threshold {
                            self.drag_exceeded = true;
                        }
                    }
                }
                self.pointer = Some(position);
                None
            }
            PointerIntent::Release { position } => {
                if let Some(position) = position {
                    self.pointer = Some(position);
                }
                if !self.is_dragging() {
                    return None;
                }
                self.end_drag(settings);
                if self.drag_exceeded {
                    None
                } else {
                    self.pointer
                }
            }
            PointerIntent::Wheel { delta } => {
                self.target_zoom = (self.target_zoom - delta * settings.zoom_step)
                    .clamp(settings.min_zoom, settings.max_zoom);
                None
            }
            PointerIntent::Leave => {
                self.pointer = None;
                if self.is_dragging() {
                    self.end_drag(settings);
                }
                None
            }
            PointerIntent::Resize { size } => {
                self.viewport = size;
                None
            }
        }
    }

    fn end_drag(&mut self, settings: &GlobeSettings) {
        self.phase = if self.velocity.length() > settings.stop_threshold {
            PointerPhase::InertialCoast
        } else {
            self.velocity = Vec2::ZERO;
            PointerPhase::Idle
        };
    }

    /// Advance one frame: resolve rotation by priority and ease the zoom.
    ///
    /// `target` is the orbit angles of an active target view.
    pub fn advance(&mut self, settings: &GlobeSettings, rotation_speed: f32, target: Option<Vec2>) {
        let drag = std::mem::take(&mut self.pending_drag);

        if let Some(target) = target {
            self.velocity = Vec2::ZERO;
            if self.phase == PointerPhase::InertialCoast {
                self.phase = PointerPhase::Idle;
            }
            let offset = angular_offset(self.rotation, target);
            if offset.length() < settings.target_epsilon {
                self.rotation += offset;
            } else {
                self.rotation += offset * settings.target_smoothing;
            }
        } else {
            self.rotation += drag;
            if self.phase == PointerPhase::InertialCoast {
                self.rotation += self.velocity;
                self.velocity *= settings.damping;
                if self.velocity.length() < settings.stop_threshold {
                    self.velocity = Vec2::ZERO;
                    self.phase = PointerPhase::Idle;
                }
            }
            if rotation_speed != 0.0
                && self.phase != PointerPhase::Dragging
                && self.velocity.y.abs() < settings.auto_rotate_gate
            {
                self.rotation.y += rotation_speed;
            }
        }

        self.rotation.x = self.rotation.x.clamp(-MAX_PITCH, MAX_PITCH);
        self.rotation.y = wrap_angle_f32(self.rotation.y);
        self.zoom_distance += (self.target_zoom - self.zoom_distance) * settings.zoom_smoothing;
    }
}

/// Shortest rotation from `from` to `to`, with yaw wrapped.
pub fn angular_offset(from: Vec2, to: Vec2) -> Vec2 {
    Vec2::new(to.x - from.x, wrap_angle_f32(to.y - from.y))
}

// ============================================================================
// Selection
// ============================================================================

/// Emitted when a visible marker is clicked (not dragged).
#[derive(Message, Debug, Clone, PartialEq)]
pub struct MarkerSelected {
    pub zone: Zone,
    pub category_key: String,
    pub category_display_name: String,
    /// 24-bit RGB the marker is drawn with.
    pub resolved_color: u32,
}

/// The most recent selection, kept for re-centering.
#[derive(Resource, Default, Debug)]
pub struct SelectionState {
    last: Option<MarkerSelected>,
}

impl SelectionState {
    pub fn select(&mut self, selection: MarkerSelected) {
        self.last = Some(selection);
    }

    pub fn last(&self) -> Option<&MarkerSelected> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// Build the selection payload for a marker.
pub fn selection_for(
    arena: &MarkerArena,
    snapshot: &CategorySet,
    id: MarkerId,
) -> Option<MarkerSelected> {
    let record = arena.get(id)?;
    let ZoneRef { category, index } = &record.zone;
    let owner = snapshot.get(category)?;
    let zone = owner.zones.get(*index)?;
    Some(MarkerSelected {
        zone: zone.clone(),
        category_key: category.clone(),
        category_display_name: owner.display_name.clone(),
        resolved_color: record.resolved_color,
    })
}

/// Hit-test the visible markers at a pointer position.
pub fn pick_at(
    arena: &MarkerArena,
    camera: &CameraState,
    cursor: Vec2,
    settings: &GlobeSettings,
) -> Option<MarkerId> {
    let ray = pointer_ray(
        cursor,
        camera.viewport(),
        settings.fov_y(),
        camera.zoom_distance(),
    )?;
    pick_marker(arena, camera.rotation(), ray, settings)
}

/// Cursor style hint for the host window.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Grab,
    Grabbing,
    /// Over a selectable marker.
    Pointer,
}

// ============================================================================
// Systems
// ============================================================================

/// Apply queued pointer intents, then hover and click hit-testing.
#[allow(clippy::too_many_arguments)]
pub fn process_pointer(
    mut intents: ResMut<PointerIntents>,
    mut camera: ResMut<CameraState>,
    settings: Res<GlobeSettings>,
    mut inputs: ResMut<GlobeInputs>,
    mut scene: ResMut<GlobeScene>,
    mut selection: ResMut<SelectionState>,
    mut cursor: ResMut<CursorHint>,
    mut selected: MessageWriter<MarkerSelected>,
) {
    let click = camera.apply_intents(intents.take(), &settings);

    let Some(built) = scene.built_mut() else {
        return;
    };

    // Hover is re-probed every frame so markers moving under a still pointer
    // are picked up.
    let hovered = if camera.is_dragging() {
        None
    } else {
        camera
            .pointer()
            .and_then(|p| pick_at(&built.markers, &camera, p, &settings))
    };
    built.markers.set_hovered(hovered);

    let hint = if camera.is_dragging() {
        CursorHint::Grabbing
    } else if hovered.is_some() {
        CursorHint::Pointer
    } else {
        CursorHint::Grab
    };
    cursor.set_if_neq(hint);

    let Some(position) = click else {
        return;
    };
    let Some(id) = pick_at(&built.markers, &camera, position, &settings) else {
        return;
    };
    let Some(event) = selection_for(&built.markers, &built.snapshot, id) else {
        return;
    };

    tracing::debug!(
        "Selected '{}' ({})",
        event.zone.name,
        event.category_display_name
    );
    inputs.target_view = None;
    selection.select(event.clone());
    selected.write(event);
}

/// Resolve the frame's rotation and zoom and apply them to the scene.
pub fn advance_camera(
    mut camera: ResMut<CameraState>,
    settings: Res<GlobeSettings>,
    inputs: Res<GlobeInputs>,
    mut pivots: Query<&mut Transform, (With<GlobePivot>, Without<GlobeCamera>)>,
    mut cameras: Query<&mut Transform, (With<GlobeCamera>, Without<GlobePivot>)>,
) {
    let target = inputs.target_view.map(|t| target_angles(t.lat, t.lon));
    camera.advance(&settings, inputs.rotation_speed, target);

    for mut transform in &mut pivots {
        transform.rotation = globe_orientation(camera.rotation());
    }
    for mut transform in &mut cameras {
        transform.translation = Vec3::Z * camera.zoom_distance();
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::MessageReader;
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::data::Category;
    use crate::geo::surface_to_world;
    use crate::lifecycle::tests::built_world;
    use crate::visibility::apply_marker_visibility;

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn settings() -> GlobeSettings {
        GlobeSettings::default()
    }

    /// Built world centered on one visible marker, with its screen position.
    fn world_with_marker() -> (World, Vec2) {
        let set = CategorySet::new().with_category(
            "war",
            Category::new("Armed Conflict", 0xff_44_00)
                .with_zone(Zone::new("Donbas Offensive", 48.37, 31.16, 0.95)),
        );
        let mut world = built_world(set);
        world.run_system_once(apply_marker_visibility).unwrap();

        let settings = world.resource::<GlobeSettings>().clone();
        let mut camera = world.resource_mut::<CameraState>();
        camera.apply(PointerIntent::Resize { size: VIEWPORT }, &settings);
        for _ in 0..2000 {
            camera.advance(&settings, 0.0, Some(target_angles(48.37, 31.16)));
        }
        let camera = (*camera).clone();

        let scene = world.resource::<GlobeScene>();
        let record = scene.built().unwrap().markers.get(MarkerId(0)).unwrap();
        let screen = project_to_screen(
            surface_to_world(camera.rotation(), record.surface_position),
            VIEWPORT,
            settings.fov_y(),
            camera.zoom_distance(),
        )
        .unwrap();
        (world, screen)
    }

    fn selections(world: &mut World) -> Vec<MarkerSelected> {
        world
            .run_system_once(|mut reader: MessageReader<MarkerSelected>| {
                reader.read().cloned().collect::<Vec<_>>()
            })
            .unwrap()
    }

    #[test]
    fn test_press_release_without_motion_clicks() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        let p = Vec2::new(400.0, 300.0);
        let click = camera.apply_intents(
            [
                PointerIntent::Press { position: p },
                PointerIntent::Release { position: Some(p) },
            ],
            &settings,
        );
        assert_eq!(click, Some(p));
        assert_eq!(camera.phase(), PointerPhase::Idle);
    }

    #[test]
    fn test_drag_then_release_does_not_click() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        let click = camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::new(400.0, 300.0),
                },
                PointerIntent::Move {
                    position: Vec2::new(440.0, 300.0),
                },
                // Back over the starting point.
                PointerIntent::Move {
                    position: Vec2::new(400.0, 300.0),
                },
                PointerIntent::Release {
                    position: Some(Vec2::new(400.0, 300.0)),
                },
            ],
            &settings,
        );
        assert_eq!(click, None);
        assert_eq!(camera.phase(), PointerPhase::InertialCoast);
    }

    #[test]
    fn test_small_jitter_still_clicks() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        let click = camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::new(100.0, 100.0),
                },
                PointerIntent::Move {
                    position: Vec2::new(101.0, 100.0),
                },
                PointerIntent::Release { position: None },
            ],
            &settings,
        );
        assert_eq!(click, Some(Vec2::new(101.0, 100.0)));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        let click = camera.apply(
            PointerIntent::Release {
                position: Some(Vec2::ONE),
            },
            &settings,
        );
        assert_eq!(click, None);
    }

    #[test]
    fn test_drag_rotates_and_coast_decays_to_idle() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::new(0.0, 0.0),
                },
                PointerIntent::Move {
                    position: Vec2::new(20.0, 0.0),
                },
            ],
            &settings,
        );
        camera.advance(&settings, 0.0, None);
        assert!((camera.rotation().y - 0.1).abs() < 1e-6);

        camera.apply(PointerIntent::Release { position: None }, &settings);
        assert_eq!(camera.phase(), PointerPhase::InertialCoast);

        let mut previous = camera.velocity().length();
        for _ in 0..500 {
            camera.advance(&settings, 0.0, None);
            let speed = camera.velocity().length();
            assert!(speed <= previous);
            previous = speed;
        }
        assert_eq!(camera.phase(), PointerPhase::Idle);
        assert_eq!(camera.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_auto_rotation_waits_for_velocity_to_decay() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.advance(&settings, 0.01, None);
        assert!((camera.rotation().y - 0.01).abs() < 1e-6);

        // While dragging, auto-rotation is suspended.
        camera.apply(PointerIntent::Press { position: Vec2::ZERO }, &settings);
        let before = camera.rotation();
        camera.advance(&settings, 0.01, None);
        assert!((camera.rotation() - before).length() < 1e-6);
    }

    #[test]
    fn test_horizontal_coast_blocks_auto_rotation() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::ZERO,
                },
                PointerIntent::Move {
                    position: Vec2::new(40.0, 0.0),
                },
            ],
            &settings,
        );
        // Consume the drag itself first.
        camera.advance(&settings, 0.01, None);
        camera.apply(PointerIntent::Release { position: None }, &settings);
        assert_eq!(camera.phase(), PointerPhase::InertialCoast);

        let coast = camera.velocity().y;
        assert!(coast.abs() > settings.auto_rotate_gate);
        let before = camera.rotation().y;
        camera.advance(&settings, 0.01, None);
        let step = camera.rotation().y - before;
        assert!((step - coast).abs() < 1e-6, "yaw step {step}, coast {coast}");
    }

    #[test]
    fn test_vertical_coast_keeps_auto_rotation() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::ZERO,
                },
                PointerIntent::Move {
                    position: Vec2::new(0.0, 40.0),
                },
            ],
            &settings,
        );
        camera.advance(&settings, 0.01, None);
        camera.apply(PointerIntent::Release { position: None }, &settings);
        assert_eq!(camera.phase(), PointerPhase::InertialCoast);

        let before = camera.rotation();
        camera.advance(&settings, 0.01, None);
        assert!((camera.rotation().y - before.y - 0.01).abs() < 1e-6);
        assert!(camera.rotation().x > before.x);
    }

    #[test]
    fn test_wheel_clamps_target_and_zoom_eases() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.apply(PointerIntent::Wheel { delta: 1000.0 }, &settings);
        assert_eq!(camera.target_zoom(), settings.min_zoom);
        camera.apply(PointerIntent::Wheel { delta: -1000.0 }, &settings);
        assert_eq!(camera.target_zoom(), settings.max_zoom);

        let start = camera.zoom_distance();
        camera.advance(&settings, 0.0, None);
        let step = camera.zoom_distance() - start;
        assert!(step > 0.0);
        assert!(step < settings.max_zoom - start);
    }

    #[test]
    fn test_target_view_converges_monotonically() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        // Leave some coasting velocity behind.
        camera.apply_intents(
            [
                PointerIntent::Press {
                    position: Vec2::ZERO,
                },
                PointerIntent::Move {
                    position: Vec2::new(30.0, 10.0),
                },
                PointerIntent::Release { position: None },
            ],
            &settings,
        );

        let target = target_angles(-33.86, 151.2);
        let mut previous = f32::MAX;
        let mut frames = 0;
        while angular_offset(camera.rotation(), target).length() > settings.target_epsilon {
            camera.advance(&settings, 0.01, Some(target));
            let distance = angular_offset(camera.rotation(), target).length();
            assert!(distance < previous, "frame {frames}: {distance} >= {previous}");
            previous = distance;
            frames += 1;
            assert!(frames < 1000, "did not converge");
        }

        // Auto-rotation stays blocked while the target is held.
        for _ in 0..10 {
            camera.advance(&settings, 0.01, Some(target));
        }
        assert!(angular_offset(camera.rotation(), target).length() < 1e-5);

        // Clearing the target lets it resume.
        camera.advance(&settings, 0.01, None);
        assert!(angular_offset(camera.rotation(), target).length() > 0.005);
    }

    #[test]
    fn test_leave_cancels_drag_without_click() {
        let settings = settings();
        let mut camera = CameraState::new(&settings);
        camera.apply(PointerIntent::Press { position: Vec2::ZERO }, &settings);
        camera.apply(PointerIntent::Leave, &settings);
        assert!(!camera.is_dragging());
        assert_eq!(camera.pointer(), None);
    }

    #[test]
    fn test_click_on_marker_emits_one_selection() {
        let (mut world, screen) = world_with_marker();
        world.resource_mut::<GlobeInputs>().focus(-33.86, 151.2);
        {
            let mut intents = world.resource_mut::<PointerIntents>();
            intents.move_to(screen);
            intents.press(screen);
            intents.release(Some(screen));
        }
        world.run_system_once(process_pointer).unwrap();

        let selected = selections(&mut world);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].zone.name, "Donbas Offensive");
        assert_eq!(selected[0].category_display_name, "Armed Conflict");
        assert!(world.resource::<GlobeInputs>().target_view.is_none());
        assert_eq!(world.resource::<SelectionState>().last(), Some(&selected[0]));
        assert_eq!(*world.resource::<CursorHint>(), CursorHint::Pointer);

        // Hovering on later frames selects nothing more.
        world.run_system_once(process_pointer).unwrap();
        assert_eq!(selections(&mut world).len(), 1);
    }

    #[test]
    fn test_drag_across_marker_emits_nothing() {
        let (mut world, screen) = world_with_marker();
        world.resource_mut::<GlobeInputs>().focus(-33.86, 151.2);
        {
            let mut intents = world.resource_mut::<PointerIntents>();
            intents.press(screen - Vec2::new(60.0, 0.0));
            intents.move_to(screen);
            intents.release(Some(screen));
        }
        world.run_system_once(process_pointer).unwrap();

        assert!(selections(&mut world).is_empty());
        assert!(world.resource::<SelectionState>().last().is_none());
        assert!(world.resource::<GlobeInputs>().target_view.is_some());
        assert!(world.resource::<PointerIntents>().is_empty());
    }

    #[test]
    fn test_intents_queue_drains() {
        let mut intents = PointerIntents::default();
        intents.press(Vec2::ONE);
        intents.wheel(1.0);
        assert_eq!(intents.take().len(), 2);
        assert!(intents.is_empty());
    }
}
