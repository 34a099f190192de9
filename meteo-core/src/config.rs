use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::model::Coordinates;

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_GEOCODING_URL: &str = "https://api-adresse.data.gouv.fr/search/";
pub const DEFAULT_LANG: &str = "fr";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Used when no home location has been configured.
pub const FALLBACK_HOME: Coordinates = Coordinates { lat: 48.8566, long: 2.3522 };

/// Credentials for OpenWeatherMap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    pub api_key: String,
}

/// Base URLs the request templates are built on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_weather_url")]
    pub weather: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self { weather: default_weather_url(), geocoding: default_geocoding_url() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// lang = "fr"
///
/// [openweather]
/// api_key = "..."
///
/// [home]
/// lat = 45.764
/// long = 4.8357
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language of the weather descriptions.
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    pub openweather: Option<OpenWeatherConfig>,

    /// Location the map falls back to when a search finds nothing.
    pub home: Option<Coordinates>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
            openweather: None,
            home: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Returns the OpenWeatherMap API key, or an error with a hint to configure one.
    pub fn api_key(&self) -> Result<&str> {
        self.openweather.as_ref().map(|ow| ow.api_key.as_str()).ok_or_else(|| {
            anyhow!(
                "No OpenWeatherMap API key configured.\n\
                 Hint: run `meteo configure` and enter your API key."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather = Some(OpenWeatherConfig { api_key });
    }

    /// Home location, or Paris when none is configured.
    pub fn home(&self) -> Coordinates {
        self.home.unwrap_or(FALLBACK_HOME)
    }

    pub fn set_home(&mut self, home: Coordinates) {
        self.home = Some(home);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeatherMap API key configured"));
        assert!(msg.contains("Hint: run `meteo configure`"));
    }

    #[test]
    fn set_api_key_replaces_previous() {
        let mut cfg = Config::default();

        cfg.set_api_key("FIRST".into());
        cfg.set_api_key("SECOND".into());

        assert_eq!(cfg.api_key().expect("key must exist"), "SECOND");
    }

    #[test]
    fn home_falls_back_to_paris() {
        let mut cfg = Config::default();
        assert_eq!(cfg.home(), FALLBACK_HOME);

        cfg.set_home(Coordinates::new(45.764, 4.8357));
        assert_eq!(cfg.home(), Coordinates::new(45.764, 4.8357));
    }

    #[test]
    fn missing_sections_take_defaults() {
        let cfg: Config = toml::from_str("[openweather]\napi_key = \"K\"\n").unwrap();

        assert_eq!(cfg.api_key().unwrap(), "K");
        assert_eq!(cfg.endpoints, Endpoints::default());
        assert_eq!(cfg.lang, "fr");
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(cfg.home.is_none());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_home(Coordinates::new(43.2965, 5.3698));
        cfg.lang = "en".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key().unwrap(), "KEY");
        assert_eq!(loaded.home(), Coordinates::new(43.2965, 5.3698));
        assert_eq!(loaded.lang, "en");
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.openweather.is_none());
    }
}
