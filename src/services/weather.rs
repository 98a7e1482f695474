// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mountain weather for a coordinate, from the nearest KMA forecast area.

use crate::db::WeatherAreaRepository;
use crate::error::Result;
use crate::models::weather::{ForecastBuilder, KmaForecastItem};
use crate::models::{CurrentWeather, MountainForecast};
use crate::services::kma::KmaClient;
use crate::time_utils::{latest_kma_announcement, truncate_to_hour};
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Forecast window after the target hour.
const FORECAST_WINDOW_HOURS: i64 = 3;

/// (mountain area code, announcement time)
type CacheKey = (i32, NaiveDateTime);

#[derive(Clone)]
struct CachedItems {
    fetched_at: Instant,
    items: Arc<Vec<KmaForecastItem>>,
}

/// Bucket raw items by forecast hour and build one forecast per complete
/// bucket inside `[target, target + 3h]`, ordered by forecast time.
pub fn parse_forecasts(items: &[KmaForecastItem], target: NaiveDateTime) -> Vec<MountainForecast> {
    let window_start = truncate_to_hour(target);
    let window_end = window_start + ChronoDuration::hours(FORECAST_WINDOW_HOURS);
    let mut buckets: BTreeMap<NaiveDateTime, ForecastBuilder> = BTreeMap::new();

    for item in items {
        let raw = format!("{}{}", item.forecast_date, item.forecast_time);
        let Ok(forecast_at) = NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M") else {
            continue;
        };
        if forecast_at < window_start || forecast_at > window_end {
            continue;
        }

        buckets
            .entry(forecast_at)
            .or_insert_with(|| ForecastBuilder::new(target, forecast_at))
            .apply(item.category, &item.forecast_value);
    }

    buckets
        .into_values()
        .filter_map(ForecastBuilder::build)
        .collect()
}

/// Weather enrichment backed by the KMA mountain feed.
#[derive(Clone)]
pub struct WeatherService {
    areas: Arc<dyn WeatherAreaRepository>,
    kma: KmaClient,
    cache: Arc<DashMap<CacheKey, CachedItems>>,
    cache_ttl: Duration,
}

impl WeatherService {
    pub fn new(areas: Arc<dyn WeatherAreaRepository>, kma: KmaClient, cache_ttl: Duration) -> Self {
        Self {
            areas,
            kma,
            cache: Arc::new(DashMap::new()),
            cache_ttl,
        }
    }

    /// Hourly mountain forecasts from `target` up to three hours ahead.
    ///
    /// Empty when no forecast area exists or the provider fails.
    pub async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
        target: NaiveDateTime,
    ) -> Result<Vec<CurrentWeather>> {
        let Some(area_code) = self.areas.nearest_mountain_area_code(lat, lon).await? else {
            tracing::debug!(lat, lon, "No mountain weather area found");
            return Ok(Vec::new());
        };

        let announcement = latest_kma_announcement(target);
        let items = self.forecast_items(area_code, announcement).await;

        Ok(parse_forecasts(&items, target)
            .iter()
            .map(|forecast| CurrentWeather::from_forecast(target, forecast))
            .collect())
    }

    async fn forecast_items(
        &self,
        area_code: i32,
        announcement: NaiveDateTime,
    ) -> Arc<Vec<KmaForecastItem>> {
        let key = (area_code, announcement);

        if let Some(entry) = self.cache.get(&key) {
            if entry.fetched_at.elapsed() < self.cache_ttl {
                tracing::debug!(area_code, %announcement, "Forecast cache hit");
                return entry.items.clone();
            }
        }
        self.cache.remove_if(&key, |_, v| v.fetched_at.elapsed() >= self.cache_ttl);

        let items = Arc::new(self.kma.mountain_forecast(area_code, announcement).await);

        // Failures come back empty; don't pin them for the TTL.
        if !items.is_empty() {
            self.store(key, items.clone());
        }

        items
    }

    /// Insert fresh items, sweeping every expired entry first.
    ///
    /// Announcement keys roll over every three hours, so old keys are never
    /// requested again and would otherwise stay for the life of the process.
    fn store(&self, key: CacheKey, items: Arc<Vec<KmaForecastItem>>) {
        let ttl = self.cache_ttl;
        self.cache.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
        self.cache.insert(
            key,
            CachedItems {
                fetched_at: Instant::now(),
                items,
            },
        );
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
