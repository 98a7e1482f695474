//! Database layer (PostgreSQL + PostGIS).
//!
//! Each repository is a trait so services can be exercised without a
//! database; [`PgDb`] is the production adapter for all of them.

pub mod postgres;
pub mod schema;

pub use postgres::PgDb;

use crate::error::Result;
use crate::models::{
    CourseAddressRow, CourseDetailRow, CourseDifficulty, CourseIntervalRow, CourseStyle, ImageRow,
    PlaceRow,
};
use async_trait::async_trait;

/// Course search parameters after validation.
#[derive(Debug, Clone, Default)]
pub struct CourseSearchFilter {
    /// Substring matched against course name and endpoint addresses
    pub word: Option<String>,
    pub difficulties: Vec<i32>,
    pub course_styles: Vec<i32>,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
}

impl CourseSearchFilter {
    /// `LIKE` pattern for `word`, with metacharacters escaped (escape char `\`).
    pub fn like_pattern(&self) -> Option<String> {
        let word = self.word.as_deref().filter(|w| !w.is_empty())?;
        let mut escaped = String::with_capacity(word.len() + 2);
        escaped.push('%');
        for c in word.chars() {
            if matches!(c, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        Some(escaped)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Course queries.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Ids of published courses matching the filter, ranked and paged.
    async fn search_course_ids(&self, filter: &CourseSearchFilter) -> Result<Vec<i32>>;

    /// Number of distinct published courses matching the filter (ignores paging).
    async fn count_courses(&self, filter: &CourseSearchFilter) -> Result<u64>;

    /// Address fan-out rows for the given courses.
    async fn course_list_rows(&self, course_ids: &[i32]) -> Result<Vec<CourseAddressRow>>;

    /// Address fan-out rows with detail columns; empty if missing or unpublished.
    async fn course_detail_rows(&self, course_id: i32) -> Result<Vec<CourseDetailRow>>;

    /// Course images by `sort_order`.
    async fn course_images(&self, course_id: i32) -> Result<Vec<ImageRow>>;

    /// Intervals of a published course in `position` order.
    async fn course_intervals(&self, course_id: i32) -> Result<Vec<CourseIntervalRow>>;

    /// Images of the given intervals, grouped by interval then `sort_order`.
    async fn interval_images(&self, interval_ids: &[i32]) -> Result<Vec<ImageRow>>;

    /// All course difficulties by ascending level.
    async fn difficulties(&self) -> Result<Vec<CourseDifficulty>>;

    /// All course styles in insertion order.
    async fn styles(&self) -> Result<Vec<CourseStyle>>;
}

/// Place lookups.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    async fn get_places(&self, place_ids: &[i32]) -> Result<Vec<PlaceRow>>;
}

/// KMA mountain forecast area lookups.
#[async_trait]
pub trait WeatherAreaRepository: Send + Sync {
    /// Code of the forecast area nearest to the coordinate.
    async fn nearest_mountain_area_code(&self, lat: f64, lon: f64) -> Result<Option<i32>>;
}
