//! Pointer input for the globe.
//!
//! Maps the mouse through `leafwing-input-manager` and turns action state
//! plus the window cursor into [`PointerIntent`]s. Nothing here mutates the
//! camera; the frame update applies the queued intents.

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use leafwing_input_manager::prelude::*;

use crate::GlobeSystems;
use crate::camera::{CursorHint, PointerIntents};
use crate::lifecycle::GlobeState;

/// Pointer actions on the globe.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum GlobeAction {
    /// Drag to rotate; press and release in place to select.
    Press,
    /// Zoom with the mouse wheel.
    #[actionlike(Axis)]
    Zoom,
}

/// Create the default input map for globe actions.
pub fn default_globe_input_map() -> InputMap<GlobeAction> {
    InputMap::default()
        .with(GlobeAction::Press, MouseButton::Left)
        .with_axis(GlobeAction::Zoom, MouseScrollAxis::Y)
}

/// Plugin that registers the globe actions and the pointer systems.
pub struct GlobeInputPlugin;

impl Plugin for GlobeInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<GlobeAction>::default())
            .add_systems(Startup, spawn_input_map)
            .add_systems(
                Update,
                (
                    collect_pointer_intents.in_set(GlobeSystems::Input),
                    apply_cursor_hint.after(GlobeSystems::Frame),
                )
                    .run_if(in_state(GlobeState::Mounted)),
            );
    }
}

fn spawn_input_map(mut commands: Commands) {
    commands.spawn((
        Name::new("Globe input"),
        default_globe_input_map(),
        ActionState::<GlobeAction>::default(),
    ));
}

/// Cursor and window size seen on the previous frame.
#[derive(Default)]
struct PointerSample {
    cursor: Option<Vec2>,
    size: Vec2,
}

/// Translate this frame's pointer input into intents.
fn collect_pointer_intents(
    action_query: Query<&ActionState<GlobeAction>>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut intents: ResMut<PointerIntents>,
    mut last: Local<PointerSample>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    let size = Vec2::new(window.width(), window.height());
    if size != last.size {
        intents.resize(size);
        last.size = size;
    }

    let cursor = window.cursor_position();
    match cursor {
        Some(position) if last.cursor != Some(position) => intents.move_to(position),
        None if last.cursor.is_some() => intents.leave(),
        _ => {}
    }
    last.cursor = cursor;

    if action_state.just_pressed(&GlobeAction::Press) {
        if let Some(position) = cursor {
            intents.press(position);
        }
    }
    if action_state.just_released(&GlobeAction::Press) {
        intents.release(cursor);
    }

    let scroll = action_state.clamped_value(&GlobeAction::Zoom);
    if scroll != 0.0 {
        intents.wheel(scroll);
    }
}

/// Show the cursor style the pointer controller asked for.
fn apply_cursor_hint(
    mut commands: Commands,
    hint: Res<CursorHint>,
    window: Single<Entity, With<PrimaryWindow>>,
) {
    if !hint.is_changed() {
        return;
    }
    let icon = match *hint {
        CursorHint::Grab => SystemCursorIcon::Grab,
        CursorHint::Grabbing => SystemCursorIcon::Grabbing,
        CursorHint::Pointer => SystemCursorIcon::Pointer,
    };
    commands.entity(*window).insert(CursorIcon::from(icon));
}
