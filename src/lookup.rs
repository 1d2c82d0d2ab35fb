//! Location and weather lookups for a point on the map.
//!
//! Both are best-effort. A failure only means the workout is logged
//! without that metadata.

mod http;

pub use http::HttpLookup;

use crate::model::{Coords, Place, Weather};

/// Errors from a lookup service.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("{service} lookup is not configured")]
    NotConfigured { service: &'static str },

    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} response was malformed: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

/// Resolves descriptive metadata for a point.
pub trait Lookup {
    /// Which city and country the point is in.
    fn resolve_location(&self, coords: Coords) -> Result<Place, LookupError>;

    /// Current weather at the point.
    fn resolve_weather(&self, coords: Coords) -> Result<Weather, LookupError>;
}
