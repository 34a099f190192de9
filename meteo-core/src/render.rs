//! Presentation of weather records: popup details table, weather card, and
//! the autocomplete suggestion list.

use chrono::{Datelike, NaiveDate};
use std::fmt;

use crate::{
    error::ApiResult,
    geocoding::Geocoder,
    model::{CitySuggestion, WeatherRecord},
};

/// Shown in place of the card when no city is selected or found.
pub const DISABLED_CARD_MESSAGE: &str =
    "Pour afficher la météo d'une ville, recherchez-la grâce au champ de recherche !";

pub const IMAGES_DIR: &str = "../images";

/// Inputs shorter than this never trigger a suggestion fetch.
pub const MIN_SUGGESTION_CHARS: usize = 3;

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

/// Label/value rows shown in the marker popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsTable {
    rows: Vec<DetailRow>,
}

pub fn details_table(record: &WeatherRecord) -> DetailsTable {
    let row = |label, value: String, suffix: &str| DetailRow { label, value: value + suffix };

    DetailsTable {
        rows: vec![
            row("Country", record.country.clone(), ""),
            row("Temp", record.temp.to_string(), "°C"),
            row("Clouds", record.clouds.to_string(), "%"),
            row("Humidity", record.humidity.to_string(), "%"),
            row("Pressure", record.pressure.to_string(), "hPa"),
            row("Wind Direction", record.wind_direction.to_string(), "°"),
            row("Wind Speed", record.wind_speed.to_string(), "m/s"),
        ],
    }
}

impl DetailsTable {
    pub fn rows(&self) -> &[DetailRow] {
        &self.rows
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<table>");
        for row in &self.rows {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                row.label,
                escape_html(&row.value)
            ));
        }
        out.push_str("</table>");
        out
    }
}

impl fmt::Display for DetailsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        for row in &self.rows {
            writeln!(f, "{:<width$}  {}", row.label, row.value)?;
        }
        Ok(())
    }
}

/// Display strings of an enabled weather card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub city_name: String,
    pub date: String,
    pub icon: String,
    pub temp: String,
    pub description: String,
    pub wind: String,
    pub precipitation: String,
    pub humidity: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherCard {
    Found(CardView),
    /// Disabled card carrying [`DISABLED_CARD_MESSAGE`].
    NotFound,
}

impl WeatherCard {
    pub fn render(record: Option<&WeatherRecord>, today: NaiveDate) -> Self {
        let Some(record) = record else {
            return WeatherCard::NotFound;
        };

        WeatherCard::Found(CardView {
            city_name: record.city_name.clone(),
            date: card_date(today),
            icon: format!("{IMAGES_DIR}/{}.svg", record.img),
            temp: format!("{}°C", record.temp),
            description: record.description.clone(),
            wind: format!("{:.2} km/h", record.wind_speed * MPS_TO_KMH),
            precipitation: format!("{}%", record.clouds),
            humidity: format!("{}%", record.humidity),
        })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, WeatherCard::NotFound)
    }

    pub fn to_html(&self) -> String {
        let view = match self {
            WeatherCard::NotFound => {
                return format!("<p>{}</p>", escape_html(DISABLED_CARD_MESSAGE));
            }
            WeatherCard::Found(view) => view,
        };

        format!(
            r#"<div id="card">
    <div id="card-header">
        <p>{city}</p> <p>{date}</p>
    </div>
    <div id="card-body">
        <img src="{icon}" alt="Image de la météo"/>
        <p>{temp}</p>
        <p>{description}</p>
    </div>
    <div id="card-footer">
        <p><img src="{IMAGES_DIR}/wind.svg" alt="Image de vent"/> Vent : {wind}</p>
        <p><img src="{IMAGES_DIR}/rain.svg" alt="Image de pluie"/> Précipitations : {rain}</p>
        <p><img src="{IMAGES_DIR}/humidity.svg" alt="Image d'humidité"/> Humidité : {humidity}</p>
    </div>
</div>"#,
            city = escape_html(&view.city_name),
            date = view.date,
            icon = escape_html(&view.icon),
            temp = view.temp,
            description = escape_html(&view.description),
            wind = view.wind,
            rain = view.precipitation,
            humidity = view.humidity,
        )
    }
}

impl fmt::Display for WeatherCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherCard::NotFound => f.write_str(DISABLED_CARD_MESSAGE),
            WeatherCard::Found(view) => {
                writeln!(f, "{}  {}", view.city_name, view.date)?;
                writeln!(f, "{}, {}", view.temp, view.description)?;
                writeln!(f, "Vent : {}", view.wind)?;
                writeln!(f, "Précipitations : {}", view.precipitation)?;
                write!(f, "Humidité : {}", view.humidity)
            }
        }
    }
}

/// `day/MM/year`: the month is zero-padded, the day is not.
fn card_date(date: NaiveDate) -> String {
    format!("{}/{:02}/{}", date.day(), date.month(), date.year())
}

/// Autocomplete entries for the search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    entries: Vec<String>,
}

impl SuggestionList {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Repopulate from `geocoder`. Returns whether a fetch happened.
    pub async fn refresh(&mut self, geocoder: &dyn Geocoder, city_name: &str) -> ApiResult<bool> {
        if city_name.chars().count() < MIN_SUGGESTION_CHARS {
            return Ok(false);
        }

        self.entries.clear();
        let suggestions = geocoder.suggestions(city_name).await?;
        self.entries = suggestions.iter().map(suggestion_label).collect();
        Ok(true)
    }

    pub fn to_html(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!(r#"<option value="{}">"#, escape_html(entry)))
            .collect()
    }
}

/// `name(postcode)`, or just the name when the postcode is unknown.
pub fn suggestion_label(suggestion: &CitySuggestion) -> String {
    match &suggestion.post_code {
        Some(post_code) => format!("{}({post_code})", suggestion.city_name),
        None => suggestion.city_name.clone(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
