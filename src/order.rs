//! Filter and sort state, and the visible order it projects.
//!
//! The state is a product of a type filter and an optional sort. It never
//! touches the repository: [`visible_order`] borrows the records and returns
//! references in display order, recomputed on every render.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{ActivityType, Workout};

/// Key of the blob holding the persisted view state.
pub const VIEW_KEY: &str = "view";

/// Which records are shown. Type filters are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    #[default]
    All,
    OnlyRunning,
    OnlyCycling,
}

impl Filter {
    pub fn only(activity: ActivityType) -> Self {
        match activity {
            ActivityType::Running => Self::OnlyRunning,
            ActivityType::Cycling => Self::OnlyCycling,
        }
    }

    pub fn admits(self, workout: &Workout) -> bool {
        match self {
            Self::All => true,
            Self::OnlyRunning => workout.activity() == ActivityType::Running,
            Self::OnlyCycling => workout.activity() == ActivityType::Cycling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Date,
    Distance,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: SortKey,
    pub direction: Direction,
}

/// The list's filter and sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub sort: Option<Sort>,
}

impl ViewState {
    /// Toggles a type filter: activating it replaces any other type filter,
    /// requesting the active one again goes back to showing everything.
    pub fn toggle_filter(&mut self, activity: ActivityType) {
        let requested = Filter::only(activity);
        self.filter = if self.filter == requested {
            Filter::All
        } else {
            requested
        };
    }

    pub fn clear_filter(&mut self) {
        self.filter = Filter::All;
    }

    /// Selects a sort key. A new key starts descending; reselecting the
    /// active key flips its direction.
    pub fn select_sort(&mut self, key: SortKey) {
        let direction = match self.sort {
            Some(sort) if sort.key == key => sort.direction.flipped(),
            _ => Direction::Descending,
        };
        self.sort = Some(Sort { key, direction });
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Reads a persisted state; anything unreadable is the default state.
    pub fn from_blob(blob: &str) -> Self {
        serde_json::from_str(blob).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored view state is unreadable; using defaults");
            Self::default()
        })
    }
}

/// The records to show, in the order to show them.
///
/// Filters by type, then stable-sorts by the chosen key. Records with equal
/// keys keep their insertion order, in either direction.
pub fn visible_order<'a>(workouts: &'a [Workout], state: &ViewState) -> Vec<&'a Workout> {
    let mut visible: Vec<&Workout> = workouts
        .iter()
        .filter(|w| state.filter.admits(w))
        .collect();

    if let Some(sort) = state.sort {
        visible.sort_by(|a, b| {
            let ord = compare(sort.key, a, b);
            match sort.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }

    visible
}

fn compare(key: SortKey, a: &Workout, b: &Workout) -> Ordering {
    match key {
        SortKey::Date => a.created_at().cmp(&b.created_at()),
        SortKey::Distance => a.distance_km().total_cmp(&b.distance_km()),
        SortKey::Duration => a.duration_min().total_cmp(&b.duration_min()),
    }
}
