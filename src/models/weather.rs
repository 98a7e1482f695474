// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mountain weather models: KMA feed items, parsed forecasts, API responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Forecast category codes used by the KMA mountain feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum KmaCategory {
    /// Hourly precipitation amount
    #[serde(rename = "PCP")]
    PrecipitationAmount,
    /// Probability of precipitation (%)
    #[serde(rename = "POP")]
    PrecipitationProbability,
    #[serde(rename = "REH")]
    Humidity,
    #[serde(rename = "SKY")]
    SkyStatus,
    #[serde(rename = "SNO")]
    SnowDepth,
    #[serde(rename = "SRE")]
    SunriseAt,
    #[serde(rename = "SSE")]
    SunsetAt,
    #[serde(rename = "TMP")]
    Temperature,
    #[serde(rename = "VEC")]
    WindDirection,
    #[serde(rename = "WSD")]
    WindSpeed,
    #[serde(other)]
    Unknown,
}

/// One entry of the KMA mountain weather response array.
///
/// Only the fields used for bucketing are required; the station metadata is
/// kept for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct KmaForecastItem {
    pub category: KmaCategory,
    #[serde(rename = "fcstBase", alias = "fcstDate")]
    pub forecast_date: String,
    #[serde(rename = "fcstTime")]
    pub forecast_time: String,
    #[serde(rename = "fcstValue")]
    pub forecast_value: String,
    #[serde(rename = "stn_nm", default)]
    pub location_name: Option<String>,
}

/// KMA sky codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmaSkyStatus {
    Sunny = 1,
    MostlyCloudy = 3,
    Overcast = 4,
    Rainy = 5,
    Snowy = 6,
}

impl KmaSkyStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Sunny),
            3 => Some(Self::MostlyCloudy),
            4 => Some(Self::Overcast),
            5 => Some(Self::Rainy),
            6 => Some(Self::Snowy),
            _ => None,
        }
    }
}

/// Snow depth level derived from KMA text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum SnowDepthLevel {
    NoSnow = 0,
    /// Under 1cm
    Moderate = 1,
    /// 1cm or more
    Heavy = 2,
}

impl SnowDepthLevel {
    pub fn from_kma(value: &str) -> Self {
        match value.trim() {
            "보통 눈" => Self::Moderate,
            "많은 눈" => Self::Heavy,
            _ => Self::NoSnow,
        }
    }
}

impl From<SnowDepthLevel> for u8 {
    fn from(level: SnowDepthLevel) -> Self {
        level as u8
    }
}

/// A fully populated forecast for one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct MountainForecast {
    pub forecast_at: NaiveDateTime,
    /// Hours after the (hour-truncated) target time
    pub offset_hours: i64,
    pub precipitation_amount: f64,
    pub precipitation_probability: f64,
    pub humidity: f64,
    pub sky_status: KmaSkyStatus,
    pub snow_depth: SnowDepthLevel,
    pub temperature: f64,
    pub wind_direction: f64,
    pub wind_speed: f64,
}

/// Accumulates category values for one forecast hour.
#[derive(Debug, Clone, Default)]
pub struct ForecastBuilder {
    forecast_at: Option<NaiveDateTime>,
    offset_hours: Option<i64>,
    precipitation_amount: Option<f64>,
    precipitation_probability: Option<f64>,
    humidity: Option<f64>,
    sky_status: Option<KmaSkyStatus>,
    snow_depth: Option<SnowDepthLevel>,
    temperature: Option<f64>,
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
}

/// Parse a KMA numeric value, tolerating a trailing unit.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let numeric = trimmed
        .trim_end_matches(|c: char| c.is_alphabetic() || c == '%')
        .trim();
    numeric.parse().ok()
}

impl ForecastBuilder {
    pub fn new(target: NaiveDateTime, forecast_at: NaiveDateTime) -> Self {
        let target = crate::time_utils::truncate_to_hour(target);
        Self {
            forecast_at: Some(forecast_at),
            offset_hours: Some((forecast_at - target).num_hours()),
            ..Self::default()
        }
    }

    /// Apply one category value. Unknown categories and unparsable values
    /// are ignored.
    pub fn apply(&mut self, category: KmaCategory, value: &str) {
        match category {
            KmaCategory::PrecipitationAmount => {
                self.precipitation_amount = if value.trim() == "강수없음" {
                    Some(0.0)
                } else {
                    parse_number(value)
                };
            }
            KmaCategory::PrecipitationProbability => {
                self.precipitation_probability = parse_number(value)
            }
            KmaCategory::Humidity => self.humidity = parse_number(value),
            KmaCategory::SkyStatus => {
                // Snow overrides sky; keep it if already set.
                if self.sky_status.is_none() {
                    self.sky_status =
                        parse_number(value).and_then(|v| KmaSkyStatus::from_code(v as i64));
                }
            }
            KmaCategory::SnowDepth => {
                let level = SnowDepthLevel::from_kma(value);
                self.snow_depth = Some(level);
                if level != SnowDepthLevel::NoSnow {
                    self.sky_status = Some(KmaSkyStatus::Snowy);
                }
            }
            KmaCategory::Temperature => self.temperature = parse_number(value),
            KmaCategory::WindDirection => self.wind_direction = parse_number(value),
            KmaCategory::WindSpeed => self.wind_speed = parse_number(value),
            KmaCategory::SunriseAt | KmaCategory::SunsetAt | KmaCategory::Unknown => {}
        }
    }

    /// Build the forecast, or `None` if any category is missing.
    pub fn build(self) -> Option<MountainForecast> {
        Some(MountainForecast {
            forecast_at: self.forecast_at?,
            offset_hours: self.offset_hours?,
            precipitation_amount: self.precipitation_amount?,
            precipitation_probability: self.precipitation_probability?,
            humidity: self.humidity?,
            sky_status: self.sky_status?,
            snow_depth: self.snow_depth?,
            temperature: self.temperature?,
            wind_direction: self.wind_direction?,
            wind_speed: self.wind_speed?,
        })
    }
}

/// Sky status exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub enum SkyStatus {
    Sunny,
    PartlyCloudy,
    MostlyCloudy,
    Overcast,
    Rainy,
    Snowy,
}

impl From<KmaSkyStatus> for SkyStatus {
    fn from(status: KmaSkyStatus) -> Self {
        match status {
            KmaSkyStatus::Sunny => SkyStatus::Sunny,
            KmaSkyStatus::MostlyCloudy => SkyStatus::MostlyCloudy,
            KmaSkyStatus::Overcast => SkyStatus::Overcast,
            KmaSkyStatus::Rainy => SkyStatus::Rainy,
            KmaSkyStatus::Snowy => SkyStatus::Snowy,
        }
    }
}

/// Weather for one hour in the 0-3h window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CurrentWeather {
    /// Requested time
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub now_at: NaiveDateTime,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub offset_hours: i64,
    /// Celsius
    pub temperature: f64,
    /// Hourly precipitation (mm)
    pub precip_amount: f64,
    /// m/s
    pub wind_speed: f64,
    /// Degrees
    pub wind_direction: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub snow_depth: SnowDepthLevel,
    pub sky_status: SkyStatus,
    pub humidity: f64,
}

impl CurrentWeather {
    pub fn from_forecast(now_at: NaiveDateTime, forecast: &MountainForecast) -> Self {
        Self {
            now_at,
            offset_hours: forecast.offset_hours,
            temperature: forecast.temperature,
            precip_amount: forecast.precipitation_amount,
            wind_speed: forecast.wind_speed,
            wind_direction: forecast.wind_direction,
            snow_depth: forecast.snow_depth,
            sky_status: forecast.sky_status.into(),
            humidity: forecast.humidity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CurrentWeatherResponse {
    /// Ordered from now to a few hours ahead
    pub weathers: Vec<CurrentWeather>,
}
