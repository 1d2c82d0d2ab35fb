//! Core data model for pinlog.
//!
//! A workout is a tagged union over its activity type: running carries a
//! cadence and a derived pace, cycling an elevation gain and a derived speed.

mod activity;
mod meta;
mod workout;

pub use activity::{ActivityType, Coords};
pub use meta::{Meta, Place, Weather};
pub use workout::{Draft, ValidationError, Workout, WorkoutId, WorkoutKind, validate};
