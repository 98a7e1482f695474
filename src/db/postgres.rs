// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL client wrapper implementing the repository traits.
//!
//! Geometries are selected with `ST_AsGeoJSON` and decoded in Rust, see
//! [`crate::geometry`].

use crate::db::schema::SCHEMA;
use crate::db::{CourseRepository, CourseSearchFilter, PlaceRepository, WeatherAreaRepository};
use crate::error::{AppError, Result};
use crate::models::{
    CourseAddressRow, CourseDetailRow, CourseDifficulty, CourseIntervalRow, CourseStyle, ImageRow,
    PlaceRow,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::time::Duration;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Course columns plus one (land, road) address pair per endpoint of every
/// interval.
const COURSE_ADDRESS_COLUMNS: &str = "
SELECT c.id, c.name,
       cd.id AS difficulty_id, cd.code AS difficulty_code,
       cd.name AS difficulty_name, cd.level AS difficulty_level,
       cs.id AS course_style_id, cs.code AS course_style_code, cs.name AS course_style_name,
       land_addr.land_address, road_addr.road_address";

const COURSE_ADDRESS_FROM: &str = "
FROM course c
JOIN course_difficulty cd ON cd.id = c.course_difficulty_id
JOIN course_style cs ON cs.id = c.course_style_id
JOIN course_course_interval cci ON cci.course_id = c.id
JOIN course_interval ci ON ci.id = cci.interval_id
JOIN place pa ON pa.id = ci.place_a_id
JOIN place pb ON pb.id = ci.place_b_id
CROSS JOIN LATERAL (VALUES (pa.land_address), (pb.land_address)) AS land_addr(land_address)
CROSS JOIN LATERAL (VALUES (pa.road_address), (pb.road_address)) AS road_addr(road_address)
WHERE c.is_published";

const SEARCH_FROM: &str = "
FROM course c
JOIN course_course_interval cci ON cci.course_id = c.id
JOIN course_interval ci ON ci.id = cci.interval_id
JOIN place pa ON pa.id = ci.place_a_id
JOIN place pb ON pb.id = ci.place_b_id
WHERE c.is_published";

const COURSE_INTERVALS: &str = "
SELECT ci.id AS interval_id, cci.position, cci.is_reversed,
       ci.name, ci.description, ci.forward_description, ci.reverse_description,
       ST_AsGeoJSON(ci.geom) AS geom,
       ci.place_a_id, ci.place_b_id,
       ci.length_m, ci.duration_ab_minutes, ci.duration_ba_minutes,
       cid.id AS difficulty_id, cid.code AS difficulty_code,
       cid.name AS difficulty_name, cid.level AS difficulty_level
FROM course_course_interval cci
JOIN course c ON c.id = cci.course_id
JOIN course_interval ci ON ci.id = cci.interval_id
LEFT JOIN course_interval_difficulty cid ON cid.id = ci.course_interval_difficulty_id
WHERE cci.course_id = $1 AND c.is_published
ORDER BY cci.position, cci.id";

/// PostgreSQL database client.
#[derive(Clone)]
pub struct PgDb {
    pool: PgPool,
}

impl PgDb {
    /// Connect a pool of at most `pool_size` connections.
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!(pool_size, "Connected to PostgreSQL");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the PostGIS extension and all tables if missing.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        tracing::info!("Database schema ready");
        Ok(())
    }
}

/// Append the shared search joins, predicates and grouping.
fn push_search_predicates(builder: &mut QueryBuilder<'_, Postgres>, filter: &CourseSearchFilter) {
    builder.push(SEARCH_FROM);

    if let Some(pattern) = filter.like_pattern() {
        let columns = [
            "c.name",
            "pa.land_address",
            "pa.road_address",
            "pb.land_address",
            "pb.road_address",
        ];
        builder.push(" AND (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }

    if !filter.difficulties.is_empty() {
        builder
            .push(" AND c.course_difficulty_id = ANY(")
            .push_bind(filter.difficulties.clone())
            .push(")");
    }

    if !filter.course_styles.is_empty() {
        builder
            .push(" AND c.course_style_id = ANY(")
            .push_bind(filter.course_styles.clone())
            .push(")");
    }

    builder.push(" GROUP BY c.id");
}

#[async_trait]
impl CourseRepository for PgDb {
    async fn search_course_ids(&self, filter: &CourseSearchFilter) -> Result<Vec<i32>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT c.id");
        push_search_predicates(&mut builder, filter);

        builder.push(" ORDER BY ");
        if let Some(pattern) = filter.like_pattern() {
            // Name matches rank above address-only matches
            builder
                .push("COALESCE(MAX((c.name LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')::int), 0) DESC, ");
        }
        builder
            .push("c.id LIMIT ")
            .push_bind(i64::from(filter.page_size))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let ids = builder
            .build_query_scalar::<i32>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = ids.len(), page = filter.page, "Searched course ids");
        Ok(ids)
    }

    async fn count_courses(&self, filter: &CourseSearchFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM (SELECT c.id");
        push_search_predicates(&mut builder, filter);
        builder.push(") AS matched");

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn course_list_rows(&self, course_ids: &[i32]) -> Result<Vec<CourseAddressRow>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{COURSE_ADDRESS_COLUMNS}{COURSE_ADDRESS_FROM} AND c.id = ANY($1)");
        let rows = sqlx::query_as::<_, CourseAddressRow>(&sql)
            .bind(course_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn course_detail_rows(&self, course_id: i32) -> Result<Vec<CourseDetailRow>> {
        let sql = format!(
            "{COURSE_ADDRESS_COLUMNS}, c.description{COURSE_ADDRESS_FROM} AND c.id = $1"
        );
        let rows = sqlx::query_as::<_, CourseDetailRow>(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn course_images(&self, course_id: i32) -> Result<Vec<ImageRow>> {
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT course_id AS owner_id, url, title, description
             FROM course_image
             WHERE course_id = $1
             ORDER BY sort_order, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn course_intervals(&self, course_id: i32) -> Result<Vec<CourseIntervalRow>> {
        let rows = sqlx::query_as::<_, CourseIntervalRow>(COURSE_INTERVALS)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(course_id, count = rows.len(), "Fetched course intervals");
        Ok(rows)
    }

    async fn interval_images(&self, interval_ids: &[i32]) -> Result<Vec<ImageRow>> {
        if interval_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT course_interval_id AS owner_id, url, title, description
             FROM course_interval_image
             WHERE course_interval_id = ANY($1)
             ORDER BY course_interval_id, sort_order, id",
        )
        .bind(interval_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn difficulties(&self) -> Result<Vec<CourseDifficulty>> {
        let rows = sqlx::query_as::<_, CourseDifficulty>(
            "SELECT id, code, name, level, description FROM course_difficulty ORDER BY level",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn styles(&self) -> Result<Vec<CourseStyle>> {
        let rows = sqlx::query_as::<_, CourseStyle>(
            "SELECT id, code, name, description FROM course_style ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl PlaceRepository for PgDb {
    async fn get_places(&self, place_ids: &[i32]) -> Result<Vec<PlaceRow>> {
        if place_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PlaceRow>(
            "SELECT id, name, ST_AsGeoJSON(geog) AS geom, elevation, land_address, road_address
             FROM place
             WHERE id = ANY($1)",
        )
        .bind(place_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl WeatherAreaRepository for PgDb {
    async fn nearest_mountain_area_code(&self, lat: f64, lon: f64) -> Result<Option<i32>> {
        let code = sqlx::query_scalar::<_, i32>(
            "SELECT code
             FROM kma_mountain_weather_area
             ORDER BY geog <-> ST_SetSRID(ST_MakePoint($1, $2), 4326)
             LIMIT 1",
        )
        .bind(lon)
        .bind(lat)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }
}
