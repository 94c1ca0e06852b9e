use reqwest::StatusCode;
use thiserror::Error;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Geocode,
    CurrentWeather,
    Forecast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocode => "location data",
            Stage::CurrentWeather => "weather data",
            Stage::Forecast => "forecast data",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the weather pipeline.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Geocoding returned no match for the given name.
    #[error("City \"{city}\" not found.")]
    NotFound { city: String },

    /// The provider answered with a non-success status.
    #[error("Failed to fetch {stage}: HTTP {status}")]
    Upstream {
        stage: Stage,
        status: StatusCode,
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("Malformed {stage} response: {source}")]
    Malformed {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("Failed to send request for {stage}: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
}

impl WeatherError {
    pub fn stage(&self) -> Stage {
        match self {
            WeatherError::NotFound { .. } => Stage::Geocode,
            WeatherError::Upstream { stage, .. }
            | WeatherError::Malformed { stage, .. }
            | WeatherError::Transport { stage, .. } => *stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_city() {
        let err = WeatherError::NotFound {
            city: "Zzyzxville".into(),
        };
        assert_eq!(err.to_string(), "City \"Zzyzxville\" not found.");
        assert_eq!(err.stage(), Stage::Geocode);
    }

    #[test]
    fn upstream_message_mentions_fetch_failure() {
        let err = WeatherError::Upstream {
            stage: Stage::CurrentWeather,
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to fetch weather data"));
        assert!(msg.contains("401"));
        assert_eq!(err.stage(), Stage::CurrentWeather);
    }

    #[test]
    fn malformed_keeps_stage() {
        let source = serde_json::from_str::<u8>("nope").unwrap_err();
        let err = WeatherError::Malformed {
            stage: Stage::Forecast,
            source,
        };
        assert_eq!(err.stage(), Stage::Forecast);
        assert!(err.to_string().starts_with("Malformed forecast data response"));
    }
}
