//! Activity types and map coordinates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which kind of workout a record is. Fixed for the life of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Running,
    Cycling,
}

impl ActivityType {
    /// Lowercase discriminator, as written to the persisted blob.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    /// Capitalized name used in descriptions.
    pub fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Name of the variant-specific field (cadence or elevation gain).
    pub fn value_name(self) -> &'static str {
        match self {
            Self::Running => "cadence",
            Self::Cycling => "elevation gain",
        }
    }

    pub fn value_unit(self) -> &'static str {
        match self {
            Self::Running => "spm",
            Self::Cycling => "m",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point on the map, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Parses `"<lat>,<lng>"`, the form the CLI takes a map click in.
impl FromStr for Coords {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got '{s}'"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude '{}': {e}", lng.trim()))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {lat} is outside -90..=90"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude {lng} is outside -180..=180"));
        }

        Ok(Self { lat, lng })
    }
}
