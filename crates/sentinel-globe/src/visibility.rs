//! Per-frame marker visibility from the active category filters.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::data::CategorySet;
use crate::lifecycle::GlobeScene;
use crate::markers::MarkerArena;
use crate::{GlobeInputs, GlobeStats};

/// Category toggles and intensity cutoff deciding which markers are shown.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilter<'a> {
    active: &'a HashMap<String, bool>,
    intensity_filter: f32,
}

impl<'a> VisibilityFilter<'a> {
    pub fn new(active: &'a HashMap<String, bool>, intensity_filter: f32) -> Self {
        Self {
            active,
            intensity_filter,
        }
    }

    pub fn from_inputs(inputs: &'a GlobeInputs) -> Self {
        Self::new(&inputs.active_categories, inputs.intensity_filter)
    }

    /// A category missing from the toggle map counts as inactive.
    pub fn is_visible(&self, category: &str, intensity: f32) -> bool {
        self.active.get(category).copied().unwrap_or(false) && intensity >= self.intensity_filter
    }
}

/// Recompute every marker's visibility flag, returning the visible count.
///
/// Markers whose zone can no longer be found are hidden.
pub fn refresh_visibility(
    arena: &mut MarkerArena,
    set: &CategorySet,
    filter: &VisibilityFilter,
) -> usize {
    let mut visible = 0;
    for record in arena.iter_mut() {
        record.visible = set
            .zone(&record.zone)
            .is_some_and(|zone| filter.is_visible(&record.zone.category, zone.intensity));
        if record.visible {
            visible += 1;
        } else {
            record.hovered = false;
        }
    }
    visible
}

/// Apply the filters to the live scene before anything is hit-tested.
pub fn apply_marker_visibility(
    inputs: Res<GlobeInputs>,
    mut scene: ResMut<GlobeScene>,
    mut stats: ResMut<GlobeStats>,
    mut visibilities: Query<&mut Visibility>,
) {
    let Some(built) = scene.built_mut() else {
        return;
    };
    let filter = VisibilityFilter::from_inputs(&inputs);
    let visible = refresh_visibility(&mut built.markers, &built.snapshot, &filter);

    for record in built.markers.iter() {
        if let Ok(mut visibility) = visibilities.get_mut(record.nodes.group) {
            let wanted = if record.visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            visibility.set_if_neq(wanted);
        }
    }

    if stats.visible_markers != visible {
        tracing::debug!("Visible markers: {visible}/{}", built.markers.len());
    }
    stats.visible_markers = visible;
    stats.total_markers = built.markers.len();
}
