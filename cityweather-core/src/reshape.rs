//! Conversion of raw OpenWeather payloads into [`WeatherObservation`]s.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use std::collections::HashSet;

use crate::{
    model::WeatherObservation,
    provider::openweather::{OwCondition, OwCurrentResponse, OwForecastEntry, OwMain, OwWind},
};

/// Hour of the representative entry of a forecast day.
pub const DAILY_FORECAST_HOUR: u32 = 12;

/// Offset for a provider `timezone` shift in seconds; UTC if out of range.
pub fn utc_offset(shift_secs: i32) -> FixedOffset {
    FixedOffset::east_opt(shift_secs).unwrap_or_else(|| Utc.fix())
}

fn local_time(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&offset))
}

/// Human-readable date such as `Mon Jan 15 2024`; empty for out-of-range timestamps.
pub fn format_date(ts: i64, offset: FixedOffset) -> String {
    local_time(ts, offset)
        .map(|t| t.format("%a %b %d %Y").to_string())
        .unwrap_or_default()
}

fn observation(
    location_name: &str,
    dt: i64,
    offset: FixedOffset,
    main: &OwMain,
    weather: &[OwCondition],
    wind: Option<&OwWind>,
) -> WeatherObservation {
    let condition = weather.first();

    WeatherObservation {
        location_name: location_name.to_string(),
        observed_date: format_date(dt, offset),
        icon_code: condition.map(|c| c.icon.clone()).unwrap_or_default(),
        icon_description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        temperature_f: main.temp,
        wind_speed_mph: wind.and_then(|w| w.speed).unwrap_or(0.0),
        humidity_percent: main.humidity.unwrap_or(0.0),
    }
}

pub fn parse_current_observation(raw: &OwCurrentResponse) -> WeatherObservation {
    observation(
        &raw.name,
        raw.dt,
        utc_offset(raw.timezone),
        &raw.main,
        &raw.weather,
        raw.wind.as_ref(),
    )
}

/// Keep the entries whose hour in `offset` is noon, at most one per calendar day.
///
/// OpenWeather steps are 3 hours from 00:00 UTC, so the pipeline selects in UTC.
/// Days without an exact noon entry (a truncated window, an `offset` off the
/// 3-hour grid) are dropped, not approximated.
pub fn select_daily_forecast_entries(
    entries: &[OwForecastEntry],
    offset: FixedOffset,
) -> Vec<&OwForecastEntry> {
    let mut seen: HashSet<NaiveDate> = HashSet::new();

    entries
        .iter()
        .filter(|entry| match local_time(entry.dt, offset) {
            Some(local) if local.hour() == DAILY_FORECAST_HOUR => seen.insert(local.date_naive()),
            _ => false,
        })
        .collect()
}

/// Forecast entries carry no location, so the requested city name is used.
pub fn parse_forecast_entries(
    city: &str,
    entries: &[&OwForecastEntry],
    offset: FixedOffset,
) -> Vec<WeatherObservation> {
    entries
        .iter()
        .map(|e| observation(city, e.dt, offset, &e.main, &e.weather, e.wind.as_ref()))
        .collect()
}
