use async_trait::async_trait;
use std::fmt::Debug;
use tracing::warn;

use crate::{
    Config,
    error::WeatherError,
    model::Coordinates,
    provider::openweather::{OpenWeatherProvider, OwCurrentResponse, OwForecastResponse, OwLocation},
};

pub mod openweather;

/// The three remote stages of a lookup. Each call is one request, never retried.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// First-ranked geocoding match for `city`, or [`WeatherError::NotFound`].
    async fn fetch_location(&self, city: &str) -> Result<OwLocation, WeatherError>;

    async fn fetch_current_weather(
        &self,
        coords: Coordinates,
    ) -> Result<OwCurrentResponse, WeatherError>;

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<OwForecastResponse, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing API key is only logged: the provider will answer 401.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    if !config.has_api_key() {
        warn!("No OpenWeather API key configured; requests will be rejected by the provider");
    }

    let provider = OpenWeatherProvider::new(
        config.api_key.clone(),
        &config.base_url,
        std::time::Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_accepts_missing_api_key() {
        let cfg = Config::default();
        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.base_url = "http://127.0.0.1:1/".into();

        let provider = provider_from_config(&cfg).expect("provider should build");
        assert!(format!("{provider:?}").contains("OpenWeatherProvider"));
    }
}
