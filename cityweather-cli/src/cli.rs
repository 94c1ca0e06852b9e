use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{CityWeather, Config, PipelineResult, WeatherAggregator, WeatherObservation};
use inquire::{Password, PasswordDisplayMode};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather and 5-day forecast for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather and the daily forecast for a city.
    Show {
        /// City name, optionally with state/country, e.g. "Paris" or "Portland, OR, US".
        city: String,

        /// Print the front-end JSON shape instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(&city, json).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    cfg.set_api_key(key);
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str, json: bool) -> anyhow::Result<()> {
    let cfg = Config::resolve()?;
    let aggregator = WeatherAggregator::from_config(&cfg)?;

    if json {
        let result: PipelineResult = aggregator.lookup(city).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let weather = aggregator
        .get_weather_for_city(city)
        .await
        .with_context(|| format!("Weather lookup for '{city}' failed"))?;

    print_weather(&weather);
    Ok(())
}

fn print_weather(weather: &CityWeather) {
    let loc = &weather.location;
    let region = [loc.state.as_deref(), loc.country.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    let (lat, lon) = (loc.coordinates.latitude, loc.coordinates.longitude);

    if region.is_empty() {
        println!("{} ({lat:.4}, {lon:.4})", loc.name);
    } else {
        println!("{}, {region} ({lat:.4}, {lon:.4})", loc.name);
    }

    println!();
    println!("Now");
    print_row(&weather.current);

    println!();
    println!("Forecast");
    if weather.forecast.is_empty() {
        println!("  (no noon forecast entries available)");
    }
    for day in &weather.forecast {
        print_row(day);
    }
}

fn print_row(obs: &WeatherObservation) {
    println!(
        "  {:<16} {:>6.1}°F  wind {:>5.1} mph  humidity {:>3.0}%  {}",
        obs.observed_date,
        obs.temperature_f,
        obs.wind_speed_mph,
        obs.humidity_percent,
        obs.icon_description,
    );
}
