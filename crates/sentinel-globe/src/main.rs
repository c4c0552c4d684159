//! Stand-alone viewer for the sentinel globe.
//!
//! Loads a category snapshot (or a built-in demo set), mounts the globe in a
//! window, and wires a few keys to the globe inputs.

mod launch_params;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use sentinel_globe::geo::region_for;
use sentinel_globe::snapshot::{load_category_set, load_weather};
use sentinel_globe::{
    Category, CategorySet, DEFAULT_ROTATION_SPEED, GlobeInputs, GlobePlugin, GlobeState,
    MarkerSelected, SelectionState, WeatherPoint, Zone,
};

use launch_params::LaunchParams;

/// Intensity filter change per key press.
const FILTER_STEP: f32 = 0.05;

const CATEGORY_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Small built-in data set used when no snapshot is given.
fn demo_categories() -> CategorySet {
    CategorySet::new()
        .with_category(
            "war",
            Category::new("Armed Conflict", 0xff_44_00)
                .with_zone(Zone::new("Donbas Offensive", 48.37, 31.16, 0.95))
                .with_zone(Zone::new("Khartoum Clashes", 15.5, 32.56, 0.85))
                .with_zone(Zone::new("Sahel Insurgency", 14.0, 1.0, 0.6)),
        )
        .with_category(
            "environmental",
            Category::new("Environmental", 0x22_c5_5e)
                .with_zone(Zone::new("Amazon Deforestation", -3.47, -62.37, 0.7))
                .with_zone(Zone::new("Great Barrier Reef Bleaching", -18.29, 147.7, 0.55))
                .with_zone(Zone::new("Aral Sea Retreat", 45.0, 60.0, 0.4)),
        )
        .with_category(
            "economic",
            Category::new("Economic", 0xea_b3_08)
                .with_zone(Zone::new("Suez Shipping Disruption", 30.58, 32.27, 0.75))
                .with_zone(Zone::new("Panama Canal Drought", 9.08, -79.68, 0.5)),
        )
        .with_category(
            "phenomena",
            Category::new("Phenomena", 0xa8_55_f7)
                .with_zone(Zone::new("Aurora Activity", 64.84, -147.72, 0.3)),
        )
}

fn demo_weather() -> Vec<WeatherPoint> {
    let point = |lat, lon, temp, condition_code, is_reference| WeatherPoint {
        lat,
        lon,
        temp,
        condition_code,
        precipitation: 0.0,
        wind_speed: 4.0,
        wind_direction: 270.0,
        is_reference,
    };
    vec![
        point(51.51, -0.13, 12.0, 61, true),
        point(40.71, -74.01, 18.0, 2, true),
        point(35.68, 139.69, 21.0, 0, true),
        point(48.37, 31.16, 8.0, 3, false),
        point(-3.47, -62.37, 29.0, 95, false),
    ]
}

/// Install the launch inputs and mount the globe.
fn setup_globe(
    params: Res<LaunchParams>,
    mut inputs: ResMut<GlobeInputs>,
    mut next_state: ResMut<NextState<GlobeState>>,
) {
    let categories = match &params.snapshot {
        Some(path) => match load_category_set(path) {
            Ok(set) => set,
            Err(e) => {
                tracing::error!("Failed to load snapshot, using demo data: {e}");
                demo_categories()
            }
        },
        None => demo_categories(),
    };
    tracing::info!(
        "Loaded {} categories with {} zones",
        categories.len(),
        categories.zone_count()
    );
    inputs.set_categories(categories);

    let weather = match &params.weather {
        Some(path) => load_weather(path).unwrap_or_else(|e| {
            tracing::error!("Failed to load weather: {e}");
            Vec::new()
        }),
        None => demo_weather(),
    };
    inputs.set_weather(weather);

    inputs.rotation_speed = params.rotation_speed;
    inputs.set_intensity_filter(params.intensity_filter);
    if let Some((lat, lon)) = params.focus {
        inputs.focus(lat, lon);
    }

    next_state.set(GlobeState::Mounted);
    tracing::info!(
        "Drag to rotate, scroll to zoom, click a marker to select. \
         1-9 toggle categories, +/- filter, R rotation, F focus, Esc release"
    );
}

/// Keyboard shortcuts for the globe inputs.
fn handle_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut inputs: ResMut<GlobeInputs>,
    selection: Res<SelectionState>,
    mut saved_rotation: Local<Option<f32>>,
) {
    let categories = inputs.categories();
    for (key, code) in categories.keys().zip(CATEGORY_KEYS) {
        if keyboard.just_pressed(code) {
            let active = inputs.toggle_category(key);
            tracing::info!("Category '{key}' {}", if active { "shown" } else { "hidden" });
        }
    }

    let step = if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        FILTER_STEP
    } else if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        -FILTER_STEP
    } else {
        0.0
    };
    if step != 0.0 {
        let filter = inputs.intensity_filter + step;
        inputs.set_intensity_filter(filter);
        tracing::info!("Intensity filter: {:.2}", inputs.intensity_filter);
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        if inputs.rotation_speed == 0.0 {
            inputs.rotation_speed = saved_rotation.take().unwrap_or(DEFAULT_ROTATION_SPEED);
        } else {
            *saved_rotation = Some(inputs.rotation_speed);
            inputs.rotation_speed = 0.0;
        }
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        if let Some(last) = selection.last() {
            inputs.focus(last.zone.lat, last.zone.lon);
        }
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        inputs.target_view = None;
    }
}

fn log_selections(mut selected: MessageReader<MarkerSelected>) {
    for event in selected.read() {
        let zone = &event.zone;
        tracing::info!(
            "{} [{}] in {}: intensity {:.2}, severity {:.0}, radius {:.0} km",
            zone.name,
            event.category_display_name,
            region_for(zone.lat, zone.lon).label(),
            zone.intensity,
            zone.severity,
            zone.affected_radius_km
        );
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "sentinel-globe".to_string(),
        resolution: (1600, 900).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.add_plugins(GlobePlugin)
        .insert_resource(params)
        .add_systems(Startup, setup_globe)
        .add_systems(
            Update,
            (handle_keys, log_selections).run_if(in_state(GlobeState::Mounted)),
        )
        .run();
}
