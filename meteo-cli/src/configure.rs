use anyhow::Context;
use inquire::{CustomType, Password, PasswordDisplayMode};
use meteo_core::{Config, Coordinates};

/// Interactive prompts for the API key and home location, then save.
pub fn run() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key.to_string());

    let home = config.home();
    let lat = CustomType::<f64>::new("Home latitude:")
        .with_default(home.lat)
        .with_error_message("Please type a number, e.g. 48.8566")
        .prompt()
        .context("Failed to read home latitude")?;
    let long = CustomType::<f64>::new("Home longitude:")
        .with_default(home.long)
        .with_error_message("Please type a number, e.g. 2.3522")
        .prompt()
        .context("Failed to read home longitude")?;
    config.set_home(Coordinates::new(lat, long));

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
