//! Output formatting for CLI display.

use crate::model::{Coords, Workout, WorkoutKind};
use crate::order::{Direction, Filter, SortKey, ViewState};
use crate::services::Bounds;

const INDENT: &str = "          ";
const SEP: &str = "  ·  ";

/// Format a workout as a list entry: a heading line, an optional
/// location/weather line, and a metrics line.
pub(super) fn format_workout(workout: &Workout) -> String {
    let mut heading = format!(
        "{}  {} {}",
        workout.id().short(),
        workout.activity().glyph(),
        workout.description()
    );
    match workout.interaction_count() {
        0 => {}
        1 => heading.push_str("  (selected once)"),
        n => heading.push_str(&format!("  (selected {n} times)")),
    }

    let mut lines = vec![heading];
    if let Some(meta) = format_meta(workout) {
        lines.push(format!("{INDENT}{meta}"));
    }
    lines.push(format!("{INDENT}{}", format_metrics(workout)));
    lines.join("\n")
}

fn format_meta(workout: &Workout) -> Option<String> {
    let meta = workout.meta();
    if meta.is_empty() {
        return None;
    }
    let sky = match (&meta.weather, &meta.weather_icon) {
        (Some(w), Some(icon)) => Some(format!("{w} [{icon}]")),
        (Some(w), None) => Some(w.clone()),
        (None, icon) => icon.as_ref().map(|i| format!("[{i}]")),
    };
    let weather = match (sky, meta.temp_c) {
        (Some(w), Some(t)) => Some(format!("{w}, {t:.1} °C")),
        (Some(w), None) => Some(w),
        (None, Some(t)) => Some(format!("{t:.1} °C")),
        (None, None) => None,
    };

    let parts: Vec<String> = [meta.location.clone(), weather]
        .into_iter()
        .flatten()
        .collect();
    (!parts.is_empty()).then(|| parts.join(SEP))
}

fn format_metrics(workout: &Workout) -> String {
    let unit = workout.activity().value_unit();
    let basics = format!(
        "{} km{SEP}{} min",
        workout.distance_km(),
        workout.duration_min()
    );
    match workout.kind() {
        WorkoutKind::Running {
            cadence_spm,
            pace_min_per_km,
        } => format!("{basics}{SEP}{pace_min_per_km:.1} min/km{SEP}{cadence_spm} {unit}"),
        WorkoutKind::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => format!("{basics}{SEP}{speed_km_per_h:.1} km/h{SEP}{elevation_gain_m} {unit}"),
    }
}

/// One line describing what the list shows, e.g.
/// `"1 of 3 workouts · running only · by distance, longest first"`.
pub(super) fn format_view_header(state: ViewState, shown: usize, total: usize) -> String {
    let noun = if total == 1 { "workout" } else { "workouts" };
    let mut parts = vec![if shown == total {
        format!("{total} {noun}")
    } else {
        format!("{shown} of {total} {noun}")
    }];

    match state.filter {
        Filter::All => {}
        Filter::OnlyRunning => parts.push("running only".to_string()),
        Filter::OnlyCycling => parts.push("cycling only".to_string()),
    }

    if let Some(sort) = state.sort {
        let order = match (sort.key, sort.direction) {
            (SortKey::Date, Direction::Descending) => "by date, newest first",
            (SortKey::Date, Direction::Ascending) => "by date, oldest first",
            (SortKey::Distance, Direction::Descending) => "by distance, longest first",
            (SortKey::Distance, Direction::Ascending) => "by distance, shortest first",
            (SortKey::Duration, Direction::Descending) => "by duration, longest first",
            (SortKey::Duration, Direction::Ascending) => "by duration, shortest first",
        };
        parts.push(order.to_string());
    }

    parts.join(" · ")
}

pub(super) fn format_pan(coords: Coords, zoom: u8) -> String {
    format!("map centred on {coords} at zoom {zoom}")
}

pub(super) fn format_fit(bounds: Bounds, padding: (u32, u32)) -> String {
    format!(
        "map fitted to {} .. {} with {}x{} px padding",
        bounds.north_west, bounds.south_east, padding.0, padding.1
    )
}
