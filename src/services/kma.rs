// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! KMA API hub client for mountain weather forecasts.
//!
//! The hub answers with a bare JSON array on success and an object carrying
//! a `message` on failure, often with a 200 status.

use crate::models::weather::KmaForecastItem;
use chrono::NaiveDateTime;
use std::time::Duration;

const MOUNTAIN_WEATHER_PATH: &str = "/typ08/getMountainWeather";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// KMA API hub client.
#[derive(Clone)]
pub struct KmaClient {
    http: reqwest::Client,
    base_url: String,
    auth_key: Option<String>,
}

impl KmaClient {
    pub fn new(base_url: &str, auth_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_key,
        }
    }

    /// Fetch the raw forecast items published at `announcement` for a
    /// mountain area.
    ///
    /// Any failure is logged and yields an empty list.
    pub async fn mountain_forecast(
        &self,
        mountain_num: i32,
        announcement: NaiveDateTime,
    ) -> Vec<KmaForecastItem> {
        let Some(auth_key) = self.auth_key.as_deref() else {
            tracing::warn!("KMA_API_AUTH_KEY not set, skipping mountain forecast");
            return Vec::new();
        };

        let url = format!("{}{}", self.base_url, MOUNTAIN_WEATHER_PATH);
        let base_date = announcement.format("%Y%m%d").to_string();
        let base_time = announcement.format("%H%M").to_string();
        let mountain = mountain_num.to_string();

        let response = match self
            .http
            .get(&url)
            .query(&[
                ("mountainNum", mountain.as_str()),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("authKey", auth_key),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, mountain_num, "KMA request failed");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), mountain_num, "KMA returned error status");
            return Vec::new();
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => parse_items(body, mountain_num),
            Err(e) => {
                tracing::warn!(error = %e, mountain_num, "KMA response is not JSON");
                Vec::new()
            }
        }
    }
}

/// Decode the response array, skipping malformed entries.
fn parse_items(body: serde_json::Value, mountain_num: i32) -> Vec<KmaForecastItem> {
    let entries = match body {
        serde_json::Value::Array(entries) => entries,
        other => {
            tracing::warn!(mountain_num, body = %other, "KMA response is not an array");
            return Vec::new();
        }
    };

    let total = entries.len();
    let items: Vec<KmaForecastItem> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();

    if items.len() < total {
        tracing::debug!(
            mountain_num,
            skipped = total - items.len(),
            "Skipped malformed KMA entries"
        );
    }

    items
}
