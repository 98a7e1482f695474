// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course routes: search, detail, intervals and lookups.

use crate::db::CourseSearchFilter;
use crate::error::{AppError, Result};
use crate::models::{
    CourseDetailResponse, CourseDifficulty, CourseIntervalsResponse, CourseSearchResponse,
    CourseStyle,
};
use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u32 = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/courses", get(search_courses))
        .route("/api/v1/courses/difficulties", get(get_difficulties))
        .route("/api/v1/courses/styles", get(get_styles))
        .route("/api/v1/courses/{course_id}", get(get_course_detail))
        .route("/api/v1/courses/{course_id}/intervals", get(get_course_intervals))
}

// ─── Search ──────────────────────────────────────────────────

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Query parameters for course search.
///
/// `difficulty` and `courseStyle` may repeat.
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 50))]
    pub word: Option<String>,
    #[serde(default)]
    pub difficulty: Vec<i32>,
    #[serde(rename = "courseStyle", default)]
    pub course_style: Vec<i32>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(rename = "pageSize", default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
}

impl From<SearchParams> for CourseSearchFilter {
    fn from(params: SearchParams) -> Self {
        Self {
            word: params.word,
            difficulties: params.difficulty,
            course_styles: params.course_style,
            page: params.page,
            page_size: params.page_size,
        }
    }
}

async fn search_courses(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<CourseSearchResponse>> {
    let Query(params) = query.map_err(|e| AppError::BadRequest(e.to_string()))?;
    params.validate()?;

    let filter = CourseSearchFilter::from(params);
    let response = state.course_service.search_courses(&filter).await?;

    tracing::debug!(
        word = ?filter.word,
        total = response.total,
        page = response.page,
        "Course search"
    );

    Ok(Json(response))
}

// ─── Detail ──────────────────────────────────────────────────

fn course_id(path: std::result::Result<Path<i32>, PathRejection>) -> Result<i32> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

async fn get_course_detail(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<CourseDetailResponse>> {
    let course_id = course_id(path)?;
    let detail = state.course_service.get_course_detail(course_id).await?;
    Ok(Json(detail))
}

async fn get_course_intervals(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<CourseIntervalsResponse>> {
    let course_id = course_id(path)?;
    let intervals = state.course_service.get_course_intervals(course_id).await?;
    Ok(Json(intervals))
}

// ─── Lookups ─────────────────────────────────────────────────

async fn get_difficulties(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CourseDifficulty>>> {
    Ok(Json(state.course_service.difficulties().await?))
}

async fn get_styles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<CourseStyle>>> {
    Ok(Json(state.course_service.styles().await?))
}
