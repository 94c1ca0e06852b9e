//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider (geocoding, current weather, forecast)
//! - Reshaping of provider payloads into [`WeatherObservation`]s
//! - [`WeatherAggregator`], the sequential lookup pipeline
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod reshape;

pub use aggregator::WeatherAggregator;
pub use config::Config;
pub use error::{Stage, WeatherError};
pub use model::{CityWeather, Coordinates, Location, PipelineResult, WeatherObservation};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
