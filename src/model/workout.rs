//! Workout records: the unit of the log.
//!
//! Fields are private. The only ways to change a record are
//! [`Workout::apply_edit`] and [`Workout::record_interaction`], and the
//! former always finishes with [`Workout::recompute_derived`], so pace,
//! speed and description can never be observed stale.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActivityType, Coords, Meta};

/// Separates the date part of a description from its time part.
const TIME_SEPARATOR: &str = "  |  ";

/// Opaque, never-reused record id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// A fresh id for a newly created record.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for display.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl From<String> for WorkoutId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for WorkoutId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input rejected before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
}

/// Variant-specific data, with the metric derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutKind {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        /// May be zero or negative.
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// Everything needed to build a record, minus its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub activity: ActivityType,
    pub coords: Coords,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Cadence for running, elevation gain for cycling.
    pub value: f64,
    pub created_at: Timestamp,
    pub meta: Meta,
}

/// One logged workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    created_at: Timestamp,
    meta: Meta,
    interaction_count: u32,
    kind: WorkoutKind,
    description: String,
}

impl Workout {
    /// Creates a running record with a fresh id.
    pub fn running(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        created_at: Timestamp,
        meta: Meta,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        Self::from_draft(
            WorkoutId::generate(),
            Draft {
                activity: ActivityType::Running,
                coords,
                distance_km,
                duration_min,
                value: cadence_spm,
                created_at,
                meta,
            },
        )
    }

    /// Creates a cycling record with a fresh id.
    pub fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        created_at: Timestamp,
        meta: Meta,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        Self::from_draft(
            WorkoutId::generate(),
            Draft {
                activity: ActivityType::Cycling,
                coords,
                distance_km,
                duration_min,
                value: elevation_gain_m,
                created_at,
                meta,
            },
        )
    }

    /// Builds a record under a known id (fresh or restored from storage).
    pub fn from_draft(id: WorkoutId, draft: Draft) -> Result<Self, ValidationError> {
        validate(
            draft.activity,
            draft.distance_km,
            draft.duration_min,
            draft.value,
        )?;

        let kind = match draft.activity {
            ActivityType::Running => WorkoutKind::Running {
                cadence_spm: draft.value,
                pace_min_per_km: 0.0,
            },
            ActivityType::Cycling => WorkoutKind::Cycling {
                elevation_gain_m: draft.value,
                speed_km_per_h: 0.0,
            },
        };

        let mut workout = Self {
            id,
            coords: draft.coords,
            distance_km: draft.distance_km,
            duration_min: draft.duration_min,
            // Stored as epoch milliseconds; keep the in-memory value equal to it.
            created_at: Timestamp::from_millisecond(draft.created_at.as_millisecond())
                .unwrap_or(draft.created_at),
            meta: draft.meta,
            interaction_count: 0,
            kind,
            description: String::new(),
        };
        workout.recompute_derived();
        Ok(workout)
    }

    /// Recomputes pace or speed and the description from the current fields.
    pub fn recompute_derived(&mut self) {
        self.kind = match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => WorkoutKind::Running {
                cadence_spm,
                pace_min_per_km: self.duration_min / self.distance_km,
            },
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => WorkoutKind::Cycling {
                elevation_gain_m,
                speed_km_per_h: self.distance_km / (self.duration_min / 60.0),
            },
        };
        self.description = describe_in(self.activity(), self.created_at, &TimeZone::system());
    }

    /// Replaces the metrics. The activity type never changes; `value` is
    /// read as cadence or elevation gain depending on it.
    ///
    /// On error the record is left exactly as it was.
    pub fn apply_edit(
        &mut self,
        distance_km: f64,
        duration_min: f64,
        value: f64,
    ) -> Result<(), ValidationError> {
        validate(self.activity(), distance_km, duration_min, value)?;

        self.distance_km = distance_km;
        self.duration_min = duration_min;
        match &mut self.kind {
            WorkoutKind::Running { cadence_spm, .. } => *cadence_spm = value,
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => *elevation_gain_m = value,
        }
        self.recompute_derived();
        Ok(())
    }

    /// Counts one more selection of this record.
    pub fn record_interaction(&mut self) {
        self.interaction_count = self.interaction_count.saturating_add(1);
    }

    /// Restores the selection count read back from storage.
    pub(crate) fn with_interaction_count(mut self, count: u32) -> Self {
        self.interaction_count = count;
        self
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }

    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub fn activity(&self) -> ActivityType {
        match self.kind {
            WorkoutKind::Running { .. } => ActivityType::Running,
            WorkoutKind::Cycling { .. } => ActivityType::Cycling,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub fn value(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => cadence_spm,
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        }
    }

    /// Minutes per kilometre; `None` for cycling.
    pub fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    /// Kilometres per hour; `None` for running.
    pub fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { .. } => None,
            WorkoutKind::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Marker popup text: glyph plus the date part of the description.
    pub fn popup_text(&self) -> String {
        let date = self
            .description
            .split(TIME_SEPARATOR)
            .next()
            .unwrap_or(&self.description);
        format!("{} {date}", self.activity().glyph())
    }
}

/// Checks form input for a workout of the given type.
///
/// Every field must be finite. Distance and duration must be positive, and
/// so must cadence. Elevation gain may be zero or negative.
pub fn validate(
    activity: ActivityType,
    distance_km: f64,
    duration_min: f64,
    value: f64,
) -> Result<(), ValidationError> {
    let value_name = activity.value_name();
    for (field, n) in [
        ("distance", distance_km),
        ("duration", duration_min),
        (value_name, value),
    ] {
        if !n.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
    }

    let mut positive = vec![("distance", distance_km), ("duration", duration_min)];
    if activity == ActivityType::Running {
        positive.push((value_name, value));
    }
    for (field, n) in positive {
        if n <= 0.0 {
            return Err(ValidationError::NotPositive { field });
        }
    }

    Ok(())
}

/// `"Running on April 14  |  09:05:03"`, in the given time zone.
pub fn describe_in(activity: ActivityType, created_at: Timestamp, tz: &TimeZone) -> String {
    let local = created_at.to_zoned(tz.clone());
    format!(
        "{} on {}{TIME_SEPARATOR}{}",
        activity.title(),
        local.strftime("%B %-d"),
        local.strftime("%H:%M:%S")
    )
}
