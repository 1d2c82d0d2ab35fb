//! Lookups over HTTP: geocode.xyz for places, OpenWeatherMap for weather.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use super::{Lookup, LookupError};
use crate::model::{Coords, Place, Weather};

const GEOCODE: &str = "geocode";
const WEATHER: &str = "weather";

pub const DEFAULT_GEOCODE_URL: &str = "https://geocode.xyz";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";

/// Blocking HTTP client for both lookup services.
pub struct HttpLookup {
    client: Client,
    geocode_url: String,
    weather_url: String,
    geocode_auth: Option<String>,
    weather_api_key: Option<String>,
}

impl HttpLookup {
    /// Builds a client whose every request gives up after `timeout`.
    pub fn new(
        timeout: Duration,
        geocode_auth: Option<String>,
        weather_api_key: Option<String>,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| LookupError::Http {
                service: GEOCODE,
                source,
            })?;

        Ok(Self {
            client,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            weather_url: DEFAULT_WEATHER_URL.to_string(),
            geocode_auth,
            weather_api_key,
        })
    }

    #[must_use]
    pub fn with_geocode_url(mut self, url: &str) -> Self {
        self.geocode_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_weather_url(mut self, url: &str) -> Self {
        self.weather_url = url.trim_end_matches('/').to_string();
        self
    }
}

impl Lookup for HttpLookup {
    fn resolve_location(&self, coords: Coords) -> Result<Place, LookupError> {
        let url = format!("{}/{},{}", self.geocode_url, coords.lat, coords.lng);
        let mut request = self.client.get(&url).query(&[("json", "1")]);
        if let Some(auth) = &self.geocode_auth {
            request = request.query(&[("auth", auth)]);
        }

        tracing::debug!(%coords, "resolving location");
        let response = request.send().map_err(|source| LookupError::Http {
            service: GEOCODE,
            source,
        })?;
        let body: GeocodeResponse = read_json(GEOCODE, response)?;
        Ok(body.into_place())
    }

    fn resolve_weather(&self, coords: Coords) -> Result<Weather, LookupError> {
        let key = self
            .weather_api_key
            .as_deref()
            .ok_or(LookupError::NotConfigured { service: WEATHER })?;

        tracing::debug!(%coords, "resolving weather");
        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.weather_url))
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lng.to_string()),
                ("appid", key.to_string()),
            ])
            .send()
            .map_err(|source| LookupError::Http {
                service: WEATHER,
                source,
            })?;
        let body: WeatherResponse = read_json(WEATHER, response)?;
        body.into_weather()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, LookupError> {
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status {
            service,
            status: status.as_u16(),
        });
    }
    response.json().map_err(|e| LookupError::Malformed {
        service,
        reason: e.to_string(),
    })
}

/// The fields we use from a geocode.xyz reverse lookup.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    city: Option<String>,
    country: Option<String>,
}

impl GeocodeResponse {
    fn into_place(self) -> Place {
        // Throttled responses come back with blank or missing fields.
        let known = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Place {
            city: known(self.city),
            country: known(self.country),
        }
    }
}

/// The fields we use from an OpenWeatherMap current-weather response.
#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: WeatherMain,
    #[serde(default)]
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    /// Kelvin.
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
    icon: String,
}

impl WeatherResponse {
    fn into_weather(self) -> Result<Weather, LookupError> {
        let condition =
            self.weather
                .into_iter()
                .next()
                .ok_or_else(|| LookupError::Malformed {
                    service: WEATHER,
                    reason: "no weather conditions in response".to_string(),
                })?;

        Ok(Weather {
            description: title_case(&condition.description),
            icon_id: condition.icon,
            temp_c: kelvin_to_celsius(self.main.temp),
        })
    }
}

/// Upper-cases the first letter of every space-separated word.
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Celsius, rounded to one decimal.
fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - 273.15) * 10.0).round() / 10.0
}
