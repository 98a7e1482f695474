// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course models: database rows and API response shapes.
//!
//! Address fields keep the web client's wire names: `loadAddresses` holds
//! road-name (도로명) addresses and `roadAddresses` holds land-lot (지번)
//! addresses.

use crate::geometry::PointResponse;
use crate::models::place::PlaceResponse;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

// ─── Lookups ─────────────────────────────────────────────────

/// Course difficulty lookup row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseDifficulty {
    pub id: i32,
    /// English code name
    pub code: String,
    /// Display name (Korean)
    pub name: String,
    pub level: i16,
    pub description: Option<String>,
}

/// Course style lookup row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseStyle {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Difficulty as embedded in course and interval responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct DifficultySummary {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub level: i16,
}

/// Style as embedded in course responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct StyleSummary {
    pub id: i32,
    pub code: String,
    pub name: String,
}

// ─── Rows ────────────────────────────────────────────────────

/// One row of the course address fan-out.
///
/// A course yields one row per (land, road) address pair across the
/// endpoints of all its intervals, so rows repeat the course columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseAddressRow {
    pub id: i32,
    pub name: String,
    pub difficulty_id: i32,
    pub difficulty_code: String,
    pub difficulty_name: String,
    pub difficulty_level: i16,
    pub course_style_id: i32,
    pub course_style_code: String,
    pub course_style_name: String,
    pub land_address: Option<String>,
    pub road_address: Option<String>,
}

impl CourseAddressRow {
    pub fn difficulty(&self) -> DifficultySummary {
        DifficultySummary {
            id: self.difficulty_id,
            code: self.difficulty_code.clone(),
            name: self.difficulty_name.clone(),
            level: self.difficulty_level,
        }
    }

    pub fn course_style(&self) -> StyleSummary {
        StyleSummary {
            id: self.course_style_id,
            code: self.course_style_code.clone(),
            name: self.course_style_name.clone(),
        }
    }
}

/// Address fan-out row plus the detail-only columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseDetailRow {
    #[sqlx(flatten)]
    pub base: CourseAddressRow,
    pub description: Option<String>,
}

/// An interval as placed in a course, in `position` order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseIntervalRow {
    pub interval_id: i32,
    /// 1-based sequence order within the course
    pub position: i32,
    /// Traversed b → a in this course
    pub is_reversed: bool,
    pub name: String,
    pub description: Option<String>,
    pub forward_description: Option<String>,
    pub reverse_description: Option<String>,
    /// LINESTRING Z as GeoJSON, stored a → b
    pub geom: String,
    pub place_a_id: i32,
    pub place_b_id: i32,
    pub length_m: i32,
    pub duration_ab_minutes: i32,
    pub duration_ba_minutes: i32,
    pub difficulty_id: Option<i32>,
    pub difficulty_code: Option<String>,
    pub difficulty_name: Option<String>,
    pub difficulty_level: Option<i16>,
}

impl CourseIntervalRow {
    /// Interval difficulty, if one is assigned.
    pub fn difficulty(&self) -> Option<DifficultySummary> {
        Some(DifficultySummary {
            id: self.difficulty_id?,
            code: self.difficulty_code.clone()?,
            name: self.difficulty_name.clone()?,
            level: self.difficulty_level?,
        })
    }
}

/// Image row for either a course or an interval (`owner_id`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub owner_id: i32,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct ImageResponse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
}

impl From<ImageRow> for ImageResponse {
    fn from(row: ImageRow) -> Self {
        Self {
            title: row.title,
            description: row.description,
            url: row.url,
        }
    }
}

/// Course entry in search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseSummary {
    pub id: i32,
    pub name: String,
    /// Road-name addresses, deduplicated and sorted
    #[serde(rename = "loadAddresses")]
    pub road_addresses: Vec<String>,
    /// Land-lot addresses, deduplicated and sorted
    #[serde(rename = "roadAddresses")]
    pub land_addresses: Vec<String>,
    pub difficulty: DifficultySummary,
    pub course_style: StyleSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseSearchResponse {
    pub page: u32,
    pub page_size: u32,
    /// Matching courses across all pages
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_pages: u64,
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseDetailResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "loadAddresses")]
    pub road_addresses: Vec<String>,
    #[serde(rename = "roadAddresses")]
    pub land_addresses: Vec<String>,
    pub difficulty: DifficultySummary,
    pub course_style: StyleSummary,
    pub images: Vec<ImageResponse>,
    /// Sum of interval lengths in km, floored to one decimal
    pub total_length_km: f64,
    /// Sum of direction-matched interval durations
    pub total_duration_minutes: i64,
}

/// One interval as traversed within a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseIntervalResponse {
    pub name: String,
    pub description: Option<String>,
    pub images: Vec<ImageResponse>,
    pub difficulty: Option<DifficultySummary>,
    pub start_place: PlaceResponse,
    pub end_place: PlaceResponse,
    /// Track points in traversal order
    pub points: Vec<PointResponse>,
    pub length_m: i32,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct CourseIntervalsResponse {
    pub interval_count: usize,
    pub intervals: Vec<CourseIntervalResponse>,
}
