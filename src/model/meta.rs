//! Descriptive metadata fetched for a workout: where it was and what the weather was like.
//!
//! None of it is needed for the core bookkeeping. A failed lookup leaves the
//! matching fields absent.

/// A resolved place. Either part may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Place {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Place {
    /// `"<city>, <country>"`, with `???` standing in for an unknown part.
    pub fn label(&self) -> String {
        format!(
            "{}, {}",
            self.city.as_deref().unwrap_or("???"),
            self.country.as_deref().unwrap_or("???")
        )
    }
}

/// Current weather at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    /// Human-readable summary, e.g. "Light Rain".
    pub description: String,

    /// Provider icon id, e.g. "10d".
    pub icon_id: String,

    /// Temperature in degrees Celsius, one decimal.
    pub temp_c: f64,
}

/// The optional descriptive fields of a workout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub location: Option<String>,
    pub weather: Option<String>,
    pub weather_icon: Option<String>,
    pub temp_c: Option<f64>,
}

impl Meta {
    /// Builds metadata from whatever the lookups managed to return.
    pub fn from_lookups(place: Option<&Place>, weather: Option<&Weather>) -> Self {
        Self {
            location: place.map(Place::label),
            weather: weather.map(|w| w.description.clone()),
            weather_icon: weather.map(|w| w.icon_id.clone()),
            temp_c: weather.map(|w| w.temp_c),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.weather.is_none()
            && self.weather_icon.is_none()
            && self.temp_c.is_none()
    }
}
