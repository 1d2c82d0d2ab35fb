//! Terminal stand-ins for the map and the list view.
//!
//! Both render into memory; the command prints the final frame once the
//! intent has run. Warnings go straight to stderr.

use std::collections::BTreeMap;

use super::format::{format_fit, format_pan, format_workout};
use crate::lookup::LookupError;
use crate::model::{Coords, ValidationError, Workout, WorkoutId};
use crate::services::{Bounds, MapService, ViewService};

/// Keeps track of pins and where the camera was last sent.
#[derive(Debug, Default)]
pub struct TerminalMap {
    next: u32,
    pins: BTreeMap<u32, Coords>,
    camera: Option<String>,
}

impl TerminalMap {
    /// Number of pins currently on the map.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// The last camera move, if any.
    pub fn camera(&self) -> Option<&str> {
        self.camera.as_deref()
    }
}

impl MapService for TerminalMap {
    type Marker = u32;

    fn place_marker(&mut self, coords: Coords, popup: &str) -> u32 {
        self.next += 1;
        self.pins.insert(self.next, coords);
        tracing::trace!(marker = self.next, %coords, popup, "placed marker");
        self.next
    }

    fn remove_marker(&mut self, marker: u32) {
        self.pins.remove(&marker);
    }

    fn pan_to(&mut self, coords: Coords, zoom: u8) {
        self.camera = Some(format_pan(coords, zoom));
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding: (u32, u32)) {
        self.camera = Some(format_fit(bounds, padding));
    }
}

/// Holds the rendered list entries.
#[derive(Debug, Default)]
pub struct TerminalView {
    entries: Vec<String>,
    actions_enabled: bool,
}

impl TerminalView {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn actions_enabled(&self) -> bool {
        self.actions_enabled
    }
}

impl ViewService for TerminalView {
    fn render_list(&mut self, workouts: &[&Workout]) {
        self.entries = workouts.iter().map(|w| format_workout(w)).collect();
    }

    fn set_actions_enabled(&mut self, enabled: bool) {
        self.actions_enabled = enabled;
    }

    fn show_validation_warning(&mut self, error: &ValidationError) {
        eprintln!("Invalid input: {error}");
    }

    fn show_empty_warning(&mut self) {
        eprintln!("No workouts yet. Log one with `pinlog add`.");
    }

    fn show_lookup_failure(&mut self, error: &LookupError) {
        eprintln!("Lookup failed, logging without it: {error}");
    }

    fn show_missing_location(&mut self) {
        eprintln!("Pick a location first (--at LAT,LNG).");
    }

    fn show_not_found(&mut self, id: &WorkoutId) {
        eprintln!("No workout {id}");
    }
}
