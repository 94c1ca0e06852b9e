use chrono::{Offset, Utc};
use tracing::{debug, error, info, instrument};

use crate::{
    Config,
    error::WeatherError,
    model::{CityWeather, Location, PipelineResult},
    provider::{WeatherProvider, provider_from_config},
    reshape::{
        parse_current_observation, parse_forecast_entries, select_daily_forecast_entries,
        utc_offset,
    },
};

/// Runs the geocode → current weather → forecast pipeline for one city.
///
/// Holds no per-lookup state; one instance can serve concurrent lookups.
#[derive(Debug)]
pub struct WeatherAggregator {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherAggregator {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(provider_from_config(config)?))
    }

    /// Typed pipeline: the first failing stage short-circuits the rest.
    #[instrument(skip(self))]
    pub async fn get_weather_for_city(&self, city: &str) -> Result<CityWeather, WeatherError> {
        let location = Location::from(self.provider.fetch_location(city).await?);
        let coords = location.coordinates;
        debug!(?location, "Resolved location");

        let current = self.provider.fetch_current_weather(coords).await?;
        let forecast = self.provider.fetch_forecast(coords).await?;

        // Forecast steps are aligned to UTC; the city offset only labels the dates.
        let daily = select_daily_forecast_entries(&forecast.list, Utc.fix());
        debug!(
            entries = forecast.list.len(),
            days = daily.len(),
            "Selected daily forecast entries"
        );

        Ok(CityWeather {
            current: parse_current_observation(&current),
            forecast: parse_forecast_entries(city, &daily, utc_offset(forecast.timezone())),
            location,
        })
    }

    /// All-or-nothing lookup in the shape handed to front ends.
    pub async fn lookup(&self, city: &str) -> PipelineResult {
        let result = self.get_weather_for_city(city).await;

        match &result {
            Ok(weather) => {
                info!(city, days = weather.forecast.len(), "Weather lookup succeeded");
            }
            Err(err) => {
                error!(city, stage = %err.stage(), error = %err, "Error fetching weather data");
            }
        }

        result.into()
    }
}
