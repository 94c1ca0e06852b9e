use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolved place a lookup was run for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Coordinates,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// One weather snapshot: either the current conditions or a forecasted day.
///
/// Every field is always populated; missing upstream values become `""` or `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub location_name: String,
    pub observed_date: String,
    pub icon_code: String,
    pub icon_description: String,
    pub temperature_f: f64,
    pub wind_speed_mph: f64,
    pub humidity_percent: f64,
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct CityWeather {
    /// Geocoding match the coordinates were taken from.
    pub location: Location,
    pub current: WeatherObservation,
    pub forecast: Vec<WeatherObservation>,
}

/// Front-end shaped result: `[current, forecast]` or `{ "errorMessage": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PipelineResult {
    Success(WeatherObservation, Vec<WeatherObservation>),
    Failure {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(..))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PipelineResult::Success(..) => None,
            PipelineResult::Failure { error_message } => Some(error_message),
        }
    }
}

impl From<Result<CityWeather, WeatherError>> for PipelineResult {
    fn from(result: Result<CityWeather, WeatherError>) -> Self {
        match result {
            Ok(weather) => PipelineResult::Success(weather.current, weather.forecast),
            Err(err) => PipelineResult::Failure {
                error_message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(name: &str) -> WeatherObservation {
        WeatherObservation {
            location_name: name.to_string(),
            observed_date: "Mon Jan 15 2024".to_string(),
            icon_code: "01d".to_string(),
            icon_description: "clear sky".to_string(),
            temperature_f: 41.5,
            wind_speed_mph: 3.2,
            humidity_percent: 80.0,
        }
    }

    #[test]
    fn observation_serializes_camel_case() {
        let json = serde_json::to_value(observation("Paris")).unwrap();
        assert_eq!(json["locationName"], "Paris");
        assert_eq!(json["iconDescription"], "clear sky");
        assert_eq!(json["windSpeedMph"], 3.2);
        assert_eq!(json["humidityPercent"], 80.0);
    }

    #[test]
    fn success_serializes_as_pair() {
        let result = PipelineResult::Success(observation("Paris"), vec![observation("Paris")]);
        let json = serde_json::to_value(&result).unwrap();

        let arr = json.as_array().expect("success should be an array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["locationName"], "Paris");
        assert_eq!(arr[1].as_array().unwrap().len(), 1);
    }

    #[test]
    fn failure_carries_error_message() {
        let result: PipelineResult =
            Err(WeatherError::NotFound {
                city: "Zzyzxville".into(),
            })
            .into();

        assert!(!result.is_success());
        assert_eq!(result.error_message(), Some("City \"Zzyzxville\" not found."));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "errorMessage": "City \"Zzyzxville\" not found." }));
    }
}
