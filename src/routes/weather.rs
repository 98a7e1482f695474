// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather routes.

use crate::error::{AppError, Result};
use crate::models::CurrentWeatherResponse;
use crate::time_utils::{now_kst, parse_target_hour, truncate_to_hour, TARGET_HOUR_FORMAT};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::{Query, QueryRejection};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/weather/current", get(get_current_weather))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CurrentWeatherParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// Only mountain forecasts are served
    #[serde(rename = "isMountain", default = "default_true")]
    pub is_mountain: bool,
    /// `YYYY-MM-DD HH`, KST; defaults to the current hour
    #[validate(length(equal = 13))]
    pub datetime: Option<String>,
}

/// Hourly weather from now (or `datetime`) up to three hours ahead.
async fn get_current_weather(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<CurrentWeatherParams>, QueryRejection>,
) -> Result<Json<CurrentWeatherResponse>> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.to_string()))?;
    params.validate()?;

    if !params.is_mountain {
        return Err(AppError::BadRequest(
            "Only mountain forecasts are supported (isMountain=true)".to_string(),
        ));
    }

    let target = match params.datetime.as_deref() {
        Some(raw) => parse_target_hour(raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "datetime must be formatted as {}, got {:?}",
                TARGET_HOUR_FORMAT, raw
            ))
        })?,
        None => truncate_to_hour(now_kst()),
    };

    let weathers = state
        .weather_service
        .current_weather(params.lat, params.lon, target)
        .await?;

    Ok(Json(CurrentWeatherResponse { weathers }))
}
