use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use meteo_core::{
    Config, Coordinates, SearchParse, controller_from_config,
    map::{MapController, TILE_ATTRIBUTION},
    render::MIN_SUGGESTION_CHARS,
};

use crate::configure;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Current weather for a point or a French city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeatherMap API key and the home location.
    Configure,

    /// Weather at a point, as if clicked on the map.
    Click {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Also write the popup table and the card as HTML to this file.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Weather for a city, e.g. `Lyon` or `Lyon (69001)`.
    Search {
        text: String,

        /// Also write the card as HTML to this file.
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// List cities matching the beginning of a name.
    Suggest { text: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!(command = ?self.command, "dispatching");
        match self.command {
            Command::Configure => configure::run(),
            Command::Click { lat, lon, html } => click(Coordinates::new(lat, lon), html).await,
            Command::Search { text, html } => search(&text, html).await,
            Command::Suggest { text } => suggest(&text).await,
        }
    }
}

fn load_controller() -> anyhow::Result<MapController> {
    let config = Config::load()?;
    tracing::debug!(home = %config.home(), lang = %config.lang, "configuration loaded");
    controller_from_config(&config)
}

async fn click(at: Coordinates, html: Option<PathBuf>) -> anyhow::Result<()> {
    let mut controller = load_controller()?;
    controller
        .on_map_click(at)
        .await
        .context("Failed to look up weather for the clicked point")?;
    print_map(&controller);

    let state = controller.state();
    if let Some(popup) = &state.marker.popup {
        println!("{popup}");
    }
    println!("{}", state.card);

    if let Some(path) = html {
        let popup = state.marker.popup.as_ref().map(|p| p.to_html()).unwrap_or_default();
        write_html(&path, &[popup, state.card.to_html()])?;
    }
    Ok(())
}

async fn search(text: &str, html: Option<PathBuf>) -> anyhow::Result<()> {
    let mut controller = load_controller()?;
    if controller.set_search_text(text) == SearchParse::NoMatch {
        eprintln!("Could not read '{text}'; expected `City` or `City (12345)`.");
    }
    controller.on_search_submit().await.context("Failed to search city")?;
    print_map(&controller);
    println!("{}", controller.state().card);

    if let Some(path) = html {
        write_html(&path, &[controller.state().card.to_html()])?;
    }
    Ok(())
}

async fn suggest(text: &str) -> anyhow::Result<()> {
    let mut controller = load_controller()?;
    match controller.on_search_input(text).await? {
        SearchParse::NoMatch => {
            eprintln!("Could not read '{text}'; expected `City` or `City (12345)`.");
        }
        SearchParse::Match(input) if input.city_name.chars().count() < MIN_SUGGESTION_CHARS => {
            eprintln!("Type at least {MIN_SUGGESTION_CHARS} letters to get suggestions.");
        }
        SearchParse::Match(_) => {
            for entry in controller.state().suggestions.entries() {
                println!("{entry}");
            }
        }
    }
    Ok(())
}

fn print_map(controller: &MapController) {
    let view = controller.state().view;
    println!("Map: {} ({}) at {}", view.center, TILE_ATTRIBUTION, view.tile_url());
    println!();
}

fn write_html(path: &Path, fragments: &[String]) -> anyhow::Result<()> {
    fs::write(path, fragments.join("\n"))
        .with_context(|| format!("Failed to write HTML to {}", path.display()))
}
