//! The map and the list view, as the controller sees them.
//!
//! Both are opaque: the controller tells them what to show and never reads
//! their state back. The terminal implementations live in `cli::terminal`.

use crate::lookup::LookupError;
use crate::model::{Coords, ValidationError, Workout, WorkoutId};

/// A map that can carry one pin per workout.
pub trait MapService {
    /// Handle to a placed marker, given back to remove it.
    type Marker;

    fn place_marker(&mut self, coords: Coords, popup: &str) -> Self::Marker;

    fn remove_marker(&mut self, marker: Self::Marker);

    fn pan_to(&mut self, coords: Coords, zoom: u8);

    /// Fits the viewport to `bounds`, keeping `padding` pixels (x, y) clear.
    fn fit_bounds(&mut self, bounds: Bounds, padding: (u32, u32));
}

/// The workout list and the warnings shown next to it.
pub trait ViewService {
    /// Replaces the whole list with these workouts, in this order.
    fn render_list(&mut self, workouts: &[&Workout]);

    /// Enables the collection-wide actions (sort, filter, show all, reset).
    fn set_actions_enabled(&mut self, enabled: bool);

    fn show_validation_warning(&mut self, error: &ValidationError);

    /// There are no workouts to act on.
    fn show_empty_warning(&mut self);

    fn show_lookup_failure(&mut self, error: &LookupError);

    /// A workout was submitted before a point on the map was picked.
    fn show_missing_location(&mut self);

    fn show_not_found(&mut self, id: &WorkoutId);
}

/// A box on the map given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// `(max lat, min lng)`.
    pub north_west: Coords,
    /// `(min lat, max lng)`.
    pub south_east: Coords,
}

impl Bounds {
    /// The smallest box holding every point; `None` when there are none.
    pub fn enclosing(points: impl IntoIterator<Item = Coords>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min, mut max) = (first, first);
        for p in points {
            min.lat = min.lat.min(p.lat);
            min.lng = min.lng.min(p.lng);
            max.lat = max.lat.max(p.lat);
            max.lng = max.lng.max(p.lng);
        }
        Some(Self {
            north_west: Coords::new(max.lat, min.lng),
            south_east: Coords::new(min.lat, max.lng),
        })
    }
}
