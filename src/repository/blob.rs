//! The persisted blob: a JSON array of flat, type-tagged workout records.
//!
//! ```json
//! [{"type":"running","id":"…","clicks":0,"coords":[38.7,-9.1],
//!   "distance":5,"duration":25,"date":1713085503000,
//!   "location":"Lisbon, Portugal","weather":"Clear Sky","weatherIcon":"01d",
//!   "weatherDeg":18.4,"description":"Running on April 14  |  09:05:03",
//!   "cadence":150,"pace":5}]
//! ```
//!
//! Derived fields (`description`, `pace`, `speed`) are written for anyone
//! reading the blob, but never trusted on the way back in. Older blobs may
//! lack the descriptive fields or carry `weatherDeg` as a string; both read fine.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{ActivityType, Coords, Draft, Meta, ValidationError, Workout, WorkoutId};

/// One record as it sits in the blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    #[serde(rename = "type")]
    activity: ActivityType,
    id: WorkoutId,
    #[serde(default)]
    clicks: u32,
    coords: [f64; 2],
    distance: f64,
    duration: f64,
    /// Epoch milliseconds.
    date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weather_icon: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    weather_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
}

/// Why a stored record could not be brought back.
#[derive(Debug, thiserror::Error)]
enum RestoreError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid date: {0}")]
    Date(#[from] jiff::Error),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let coords = w.coords();
        let meta = w.meta();
        let running = w.activity() == ActivityType::Running;
        Self {
            activity: w.activity(),
            id: w.id().clone(),
            clicks: w.interaction_count(),
            coords: [coords.lat, coords.lng],
            distance: w.distance_km(),
            duration: w.duration_min(),
            date: w.created_at().as_millisecond(),
            location: meta.location.clone(),
            weather: meta.weather.clone(),
            weather_icon: meta.weather_icon.clone(),
            weather_deg: meta.temp_c,
            description: Some(w.description().to_string()),
            cadence: running.then(|| w.value()),
            pace: w.pace(),
            elevation_gain: (!running).then(|| w.value()),
            speed: w.speed(),
        }
    }
}

impl StoredWorkout {
    /// Rebuilds the record, recomputing everything derived.
    fn restore(self) -> Result<Workout, RestoreError> {
        let value = match self.activity {
            ActivityType::Running => self.cadence.ok_or(RestoreError::Missing("cadence"))?,
            ActivityType::Cycling => self
                .elevation_gain
                .ok_or(RestoreError::Missing("elevationGain"))?,
        };
        let draft = Draft {
            activity: self.activity,
            coords: Coords::new(self.coords[0], self.coords[1]),
            distance_km: self.distance,
            duration_min: self.duration,
            value,
            created_at: Timestamp::from_millisecond(self.date)?,
            meta: Meta {
                location: self.location,
                weather: self.weather,
                weather_icon: self.weather_icon,
                temp_c: self.weather_deg,
            },
        };
        Ok(Workout::from_draft(self.id, draft)?.with_interaction_count(self.clicks))
    }
}

/// Serializes the whole collection, in order.
pub fn serialize(workouts: &[Workout]) -> serde_json::Result<String> {
    let stored: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
    serde_json::to_string(&stored)
}

/// Reads a blob back into records.
///
/// An unparsable blob reads as empty. Records that can't be restored, and
/// records repeating an id already seen, are skipped. Each skip is logged.
pub fn deserialize(blob: &str) -> Vec<Workout> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(blob) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "stored workouts are unreadable; starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut workouts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let restored = serde_json::from_value::<StoredWorkout>(entry)
            .map_err(|e| e.to_string())
            .and_then(|stored| stored.restore().map_err(|e| e.to_string()));
        match restored {
            Ok(w) if seen.insert(w.id().clone()) => workouts.push(w),
            Ok(w) => tracing::warn!(index, id = %w.id(), "skipping duplicate stored workout"),
            Err(error) => tracing::warn!(index, %error, "skipping unreadable stored workout"),
        }
    }
    workouts
}

/// Accepts a number, a numeric string, or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}
