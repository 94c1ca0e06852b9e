use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::{Stage, WeatherError},
    model::{Coordinates, Location},
};

use super::WeatherProvider;

const UNITS: &str = "imperial";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn build_geocode_query(&self, city: &str) -> String {
        format!(
            "{}/geo/1.0/direct?q={}&limit=1&appid={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key),
        )
    }

    pub fn build_weather_query(&self, coords: Coordinates) -> String {
        self.coordinate_query("/data/2.5/weather", coords)
    }

    pub fn build_forecast_query(&self, coords: Coordinates) -> String {
        self.coordinate_query("/data/2.5/forecast", coords)
    }

    fn coordinate_query(&self, path: &str, coords: Coordinates) -> String {
        format!(
            "{}{}?lat={}&lon={}&units={}&appid={}",
            self.base_url,
            path,
            coords.latitude,
            coords.longitude,
            UNITS,
            urlencoding::encode(&self.api_key),
        )
    }

    /// GET `url` and decode the body as `T`, mapping every failure onto `stage`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        url: &str,
    ) -> Result<T, WeatherError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| WeatherError::Transport { stage, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Transport { stage, source })?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "OpenWeather returned an error status");
            return Err(WeatherError::Upstream {
                stage,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Malformed { stage, source })
    }
}

/// Geocoding match as returned by `/geo/1.0/direct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl From<OwLocation> for Location {
    fn from(raw: OwLocation) -> Self {
        Location {
            name: raw.name,
            coordinates: Coordinates {
                latitude: raw.lat,
                longitude: raw.lon,
            },
            country: raw.country,
            state: raw.state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwCondition {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// `/data/2.5/weather` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwCurrentResponse {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
    #[serde(default)]
    pub wind: Option<OwWind>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwForecastEntry {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
    #[serde(default)]
    pub wind: Option<OwWind>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: i32,
}

/// `/data/2.5/forecast` payload: 3-hour steps over roughly 5 days.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwForecastResponse {
    pub list: Vec<OwForecastEntry>,
    #[serde(default)]
    pub city: Option<OwCity>,
}

impl OwForecastResponse {
    pub fn timezone(&self) -> i32 {
        self.city.as_ref().map_or(0, |c| c.timezone)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn fetch_location(&self, city: &str) -> Result<OwLocation, WeatherError> {
        let matches: Vec<OwLocation> =
            self.get_json(Stage::Geocode, &self.build_geocode_query(city)).await?;

        debug!(matches = matches.len(), "Geocoding finished");

        matches
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound {
                city: city.to_string(),
            })
    }

    #[instrument(skip(self), fields(lat = %coords.latitude, lon = %coords.longitude))]
    async fn fetch_current_weather(
        &self,
        coords: Coordinates,
    ) -> Result<OwCurrentResponse, WeatherError> {
        let parsed: OwCurrentResponse = self
            .get_json(Stage::CurrentWeather, &self.build_weather_query(coords))
            .await?;

        debug!(
            name = %parsed.name,
            dt = parsed.dt,
            temp = parsed.main.temp,
            "Current weather fetched"
        );
        Ok(parsed)
    }

    #[instrument(skip(self), fields(lat = %coords.latitude, lon = %coords.longitude))]
    async fn fetch_forecast(
        &self,
        coords: Coordinates,
    ) -> Result<OwForecastResponse, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json(Stage::Forecast, &self.build_forecast_query(coords))
            .await?;

        debug!(entries = parsed.list.len(), "Forecast fetched");
        Ok(parsed)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(key: &str) -> OpenWeatherProvider {
        OpenWeatherProvider::new(
            key.to_string(),
            "https://api.openweathermap.org/",
            Duration::from_secs(5),
        )
        .expect("client should build")
    }

    const PARIS: Coordinates = Coordinates {
        latitude: 48.8566,
        longitude: 2.3522,
    };

    #[test]
    fn geocode_query_encodes_city() {
        let url = provider("KEY").build_geocode_query("San José, CR");
        let (base, query) = url.split_once('?').unwrap();
        assert_eq!(base, "https://api.openweathermap.org/geo/1.0/direct");
        assert_eq!(query, "q=San%20Jos%C3%A9%2C%20CR&limit=1&appid=KEY");
    }

    #[test]
    fn weather_query_uses_imperial_units() {
        let url = provider("KEY").build_weather_query(PARIS);
        let (base, query) = url.split_once('?').unwrap();
        assert_eq!(base, "https://api.openweathermap.org/data/2.5/weather");
        assert_eq!(query, "lat=48.8566&lon=2.3522&units=imperial&appid=KEY");
    }

    #[test]
    fn forecast_query_uses_forecast_path() {
        let url = provider("KEY").build_forecast_query(PARIS);
        assert!(url.starts_with("https://api.openweathermap.org/data/2.5/forecast?"));
        assert!(url.contains("units=imperial"));
    }

    #[test]
    fn empty_credential_is_not_rejected() {
        let url = provider("").build_weather_query(PARIS);
        assert!(url.ends_with("&appid="));
    }

    #[test]
    fn debug_hides_api_key() {
        let dbg = format!("{:?}", provider("SECRET"));
        assert!(!dbg.contains("SECRET"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn current_payload_tolerates_missing_optional_blocks() {
        let parsed: OwCurrentResponse =
            serde_json::from_str(r#"{ "dt": 1705320000, "main": { "temp": 41.0 } }"#).unwrap();
        assert_eq!(parsed.name, "");
        assert!(parsed.weather.is_empty());
        assert!(parsed.wind.is_none());
        assert_eq!(parsed.main.humidity, None);
    }

    #[test]
    fn geocode_record_converts_to_location() {
        let raw: OwLocation = serde_json::from_str(
            r#"{ "name": "Paris", "lat": 48.8566, "lon": 2.3522, "country": "FR" }"#,
        )
        .unwrap();

        let location = Location::from(raw);
        assert_eq!(location.name, "Paris");
        assert_eq!(location.coordinates, PARIS);
        assert_eq!(location.country.as_deref(), Some("FR"));
        assert_eq!(location.state, None);
    }

    #[test]
    fn current_payload_requires_main_block() {
        let res = serde_json::from_str::<OwCurrentResponse>(r#"{ "dt": 1705320000 }"#);
        assert!(res.is_err());
    }
}
