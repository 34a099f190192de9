use chrono::{Local, NaiveDate};
use std::f64::consts::PI;

use crate::{
    Config,
    api::ApiClient,
    error::ApiResult,
    geocoding::{AdresseGeocoder, Geocoder},
    model::{Coordinates, SearchInput},
    render::{DetailsTable, SuggestionList, WeatherCard, details_table},
    search::{self, SearchParse},
    weather::{OpenWeatherAdapter, WeatherSource},
};

pub const DEFAULT_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 19;

pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Slippy-map tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapView {
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self { center, zoom: zoom.min(MAX_ZOOM) }
    }

    /// The tile containing the view center.
    pub fn tile(&self) -> Tile {
        let n = f64::from(1u32 << self.zoom);
        let max = (1u32 << self.zoom) - 1;
        let lat = self.center.lat.to_radians();

        let x = ((self.center.long + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        Tile {
            x: (x.max(0.0) as u32).min(max),
            y: (y.max(0.0) as u32).min(max),
            z: self.zoom,
        }
    }

    pub fn tile_url(&self) -> String {
        let tile = self.tile();
        TILE_URL_TEMPLATE
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub popup: Option<DetailsTable>,
}

impl Marker {
    fn move_to(&mut self, position: Coordinates) {
        self.position = position;
    }
}

/// Everything the page shows, owned by one [`MapController`].
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: MapView,
    pub marker: Marker,
    /// Where the view returns when a search finds nothing.
    pub home: Coordinates,
    /// Last successfully parsed search text.
    pub search: Option<SearchInput>,
    pub suggestions: SuggestionList,
    pub card: WeatherCard,
}

impl AppState {
    fn new(home: Coordinates) -> Self {
        Self {
            view: MapView::new(home, DEFAULT_ZOOM),
            marker: Marker { position: home, popup: None },
            home,
            search: None,
            suggestions: SuggestionList::default(),
            card: WeatherCard::NotFound,
        }
    }

    fn focus(&mut self, at: Coordinates) {
        self.marker.move_to(at);
        self.view = MapView::new(at, DEFAULT_ZOOM);
    }
}

/// Routes map clicks and search events through the weather pipeline.
#[derive(Debug)]
pub struct MapController {
    weather: Box<dyn WeatherSource>,
    geocoder: Box<dyn Geocoder>,
    state: AppState,
}

impl MapController {
    /// Centers the view and places the marker on `home`.
    pub fn new(
        weather: Box<dyn WeatherSource>,
        geocoder: Box<dyn Geocoder>,
        home: Coordinates,
    ) -> Self {
        tracing::debug!(%home, zoom = DEFAULT_ZOOM, "map initialized");
        Self { weather, geocoder, state: AppState::new(home) }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Look up the weather at `at` once, then update popup, card, marker and view from it.
    pub async fn on_map_click(&mut self, at: Coordinates) -> ApiResult<()> {
        tracing::debug!(%at, "map click");
        let record = self.weather.current(at).await?;

        self.state.marker.popup = record.as_ref().map(details_table);
        self.state.card = WeatherCard::render(record.as_ref(), today());
        self.state.focus(at);
        Ok(())
    }

    /// Parse the search box and store the selection, without fetching suggestions.
    pub fn set_search_text(&mut self, text: &str) -> SearchParse {
        let parsed = search::parse(text);

        match &parsed {
            SearchParse::Match(input) => self.state.search = Some(input.clone()),
            SearchParse::NoMatch => {
                if self.state.search.take().is_some() {
                    tracing::debug!(text, "search input not understood, selection cleared");
                }
            }
        }

        parsed
    }

    /// Store the parsed selection, then refresh suggestions on a match.
    ///
    /// The selection is kept even when the suggestion request fails.
    pub async fn on_search_input(&mut self, text: &str) -> ApiResult<SearchParse> {
        let parsed = self.set_search_text(text);

        if let SearchParse::Match(input) = &parsed {
            self.state.suggestions.refresh(self.geocoder.as_ref(), &input.city_name).await?;
        }

        Ok(parsed)
    }

    /// Geocode the stored selection and show its weather, or fall back to home.
    pub async fn on_search_submit(&mut self) -> ApiResult<()> {
        let found = match &self.state.search {
            Some(input) => {
                self.geocoder.coordinates_of(&input.city_name, input.post_code.as_deref()).await?
            }
            None => None,
        };

        let record = match found {
            Some(at) => self.weather.current(at).await?,
            None => None,
        };

        match (found, record) {
            (Some(at), Some(record)) => {
                self.state.card = WeatherCard::render(Some(&record), today());
                self.state.focus(at);
            }
            _ => {
                tracing::info!(search = ?self.state.search, "city not found");
                self.state.card = WeatherCard::NotFound;
                let home = self.state.home;
                self.state.focus(home);
            }
        }

        Ok(())
    }
}

/// Controller backed by OpenWeatherMap and api-adresse, centered on the configured home.
pub fn controller_from_config(config: &Config) -> anyhow::Result<MapController> {
    let api = ApiClient::from_config(config)?;

    Ok(MapController::new(
        Box::new(OpenWeatherAdapter::new(api.clone())),
        Box::new(AdresseGeocoder::new(api)),
        config.home(),
    ))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
