use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    api::ApiClient,
    error::{ApiError, ApiResult},
    model::{Coordinates, WeatherRecord},
};

/// Anything that can report the current weather at a point.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// `Ok(None)` when the upstream API answered with a non-success status.
    async fn current(&self, at: Coordinates) -> ApiResult<Option<WeatherRecord>>;
}

/// OpenWeatherMap "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherAdapter {
    api: ApiClient,
}

impl OpenWeatherAdapter {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherAdapter {
    async fn current(&self, at: Coordinates) -> ApiResult<Option<WeatherRecord>> {
        let url = self.api.weather_url(at)?;

        let Some(raw) = self.api.get_json::<OwCurrentResponse>(url, "OpenWeather current").await?
        else {
            return Ok(None);
        };

        let record = WeatherRecord::try_from(raw)?;
        tracing::debug!(?record, "decoded weather");
        Ok(Some(record))
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    deg: f64,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    weather: Vec<OwWeather>,
    sys: OwSys,
    main: OwMain,
    clouds: OwClouds,
    wind: OwWind,
}

impl TryFrom<OwCurrentResponse> for WeatherRecord {
    type Error = ApiError;

    fn try_from(raw: OwCurrentResponse) -> Result<Self, Self::Error> {
        let condition = raw.weather.into_iter().next().ok_or(ApiError::MissingField {
            what: "OpenWeather current",
            field: "weather[0]",
        })?;

        Ok(WeatherRecord {
            city_name: raw.name,
            img: condition.icon,
            description: condition.description,
            country: raw.sys.country,
            temp: raw.main.temp,
            clouds: raw.clouds.all,
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_direction: raw.wind.deg,
            wind_speed: raw.wind.speed,
        })
    }
}
