use serde::{Deserialize, Serialize};

/// A geographic point. Serialized as `{ lat, long }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.long)
    }
}

/// Current weather at one point, flattened from the weather API response.
///
/// Units are those of the API in metric mode; nothing is converted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city_name: String,
    /// Icon code, e.g. `"04d"`.
    pub img: String,
    pub description: String,
    pub country: String,
    /// Celsius.
    pub temp: f64,
    /// Cloud cover, percent.
    pub clouds: u8,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
    /// Degrees.
    pub wind_direction: f64,
    /// Metres per second.
    pub wind_speed: f64,
}

/// One autocomplete candidate from the geocoding API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub city_name: String,
    pub post_code: Option<String>,
}

/// City selection parsed from the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInput {
    pub city_name: String,
    pub post_code: Option<String>,
}
