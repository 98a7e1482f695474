// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course service: shapes repository rows into API responses.
//!
//! Handles:
//! - Folding the address fan-out into one summary per course
//! - Resolving interval direction (start/end place, point order, description)
//! - Course totals (length, direction-matched duration)

use crate::db::{CourseRepository, CourseSearchFilter, PlaceRepository};
use crate::error::{AppError, Result};
use crate::geometry::{self, PointResponse};
use crate::models::{
    CourseAddressRow, CourseDetailResponse, CourseDifficulty, CourseIntervalResponse,
    CourseIntervalRow, CourseIntervalsResponse, CourseSearchResponse, CourseStyle, CourseSummary,
    ImageResponse, ImageRow, Place, PlaceResponse,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Traversal direction of an interval within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// place_a → place_b, points as stored
    Forward,
    /// place_b → place_a, points reversed
    Reverse,
}

impl Direction {
    pub fn from_reversed(is_reversed: bool) -> Self {
        if is_reversed {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    /// (start, end) place ids.
    pub fn endpoints(self, row: &CourseIntervalRow) -> (i32, i32) {
        match self {
            Self::Forward => (row.place_a_id, row.place_b_id),
            Self::Reverse => (row.place_b_id, row.place_a_id),
        }
    }

    pub fn description(self, row: &CourseIntervalRow) -> Option<String> {
        let directional = match self {
            Self::Forward => &row.forward_description,
            Self::Reverse => &row.reverse_description,
        };
        directional.clone().or_else(|| row.description.clone())
    }

    pub fn duration_minutes(self, row: &CourseIntervalRow) -> i32 {
        match self {
            Self::Forward => row.duration_ab_minutes,
            Self::Reverse => row.duration_ba_minutes,
        }
    }
}

/// Length and duration summed over a course's intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseTotals {
    pub length_m: i64,
    pub duration_minutes: i64,
}

impl CourseTotals {
    pub fn from_intervals(rows: &[CourseIntervalRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| {
            let direction = Direction::from_reversed(row.is_reversed);
            Self {
                length_m: acc.length_m + i64::from(row.length_m),
                duration_minutes: acc.duration_minutes
                    + i64::from(direction.duration_minutes(row)),
            }
        })
    }

    /// Kilometers, floored to one decimal.
    pub fn length_km(&self) -> f64 {
        (self.length_m as f64 / 100.0).floor() / 10.0
    }
}

/// Per-course accumulator for the address fan-out.
struct CourseAccumulator {
    first: CourseAddressRow,
    land_addresses: BTreeSet<String>,
    road_addresses: BTreeSet<String>,
}

impl CourseAccumulator {
    fn new(first: CourseAddressRow) -> Self {
        let mut acc = Self {
            land_addresses: BTreeSet::new(),
            road_addresses: BTreeSet::new(),
            first,
        };
        let (land, road) = (acc.first.land_address.clone(), acc.first.road_address.clone());
        acc.add(land, road);
        acc
    }

    fn add(&mut self, land: Option<String>, road: Option<String>) {
        self.land_addresses.extend(land);
        self.road_addresses.extend(road);
    }

    fn into_summary(self) -> CourseSummary {
        CourseSummary {
            id: self.first.id,
            difficulty: self.first.difficulty(),
            course_style: self.first.course_style(),
            name: self.first.name,
            road_addresses: self.road_addresses.into_iter().collect(),
            land_addresses: self.land_addresses.into_iter().collect(),
        }
    }
}

/// Fold fan-out rows into summaries, in the order of `ranked_ids`.
///
/// Ids with no rows are dropped.
pub fn fold_course_rows(ranked_ids: &[i32], rows: Vec<CourseAddressRow>) -> Vec<CourseSummary> {
    let index: HashMap<i32, usize> = ranked_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();
    let mut slots: Vec<Option<CourseAccumulator>> = ranked_ids.iter().map(|_| None).collect();

    for row in rows {
        let Some(&i) = index.get(&row.id) else {
            continue;
        };
        if let Some(acc) = slots[i].as_mut() {
            acc.add(row.land_address, row.road_address);
        } else {
            slots[i] = Some(CourseAccumulator::new(row));
        }
    }

    slots
        .into_iter()
        .flatten()
        .map(CourseAccumulator::into_summary)
        .collect()
}

/// Build one interval as traversed in its course.
pub fn assemble_interval(
    row: &CourseIntervalRow,
    places: &HashMap<i32, Place>,
    images: Vec<ImageResponse>,
) -> Result<CourseIntervalResponse> {
    let direction = Direction::from_reversed(row.is_reversed);
    let (start_id, end_id) = direction.endpoints(row);
    let place = |id: i32| {
        places.get(&id).map(PlaceResponse::from).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Place {} of interval {} not found",
                id,
                row.interval_id
            ))
        })
    };

    let mut points = geometry::decode_line(&row.geom)?;
    if direction == Direction::Reverse {
        points.reverse();
    }

    Ok(CourseIntervalResponse {
        name: row.name.clone(),
        description: direction.description(row),
        images,
        difficulty: row.difficulty(),
        start_place: place(start_id)?,
        end_place: place(end_id)?,
        points: points.into_iter().map(PointResponse::from).collect(),
        length_m: row.length_m,
        duration_minutes: direction.duration_minutes(row),
    })
}

fn group_images(rows: Vec<ImageRow>) -> HashMap<i32, Vec<ImageResponse>> {
    let mut grouped: HashMap<i32, Vec<ImageResponse>> = HashMap::new();
    for row in rows {
        grouped.entry(row.owner_id).or_default().push(row.into());
    }
    grouped
}

/// Course search, detail and interval assembly.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    places: Arc<dyn PlaceRepository>,
}

impl CourseService {
    pub fn new(courses: Arc<dyn CourseRepository>, places: Arc<dyn PlaceRepository>) -> Self {
        Self { courses, places }
    }

    /// Search published courses; an empty page is not an error.
    pub async fn search_courses(&self, filter: &CourseSearchFilter) -> Result<CourseSearchResponse> {
        let ids = self.courses.search_course_ids(filter).await?;
        let total = self.courses.count_courses(filter).await?;

        let courses = if ids.is_empty() {
            Vec::new()
        } else {
            let rows = self.courses.course_list_rows(&ids).await?;
            fold_course_rows(&ids, rows)
        };

        let page_size = filter.page_size.max(1);
        Ok(CourseSearchResponse {
            page: filter.page,
            page_size: filter.page_size,
            total,
            total_pages: total.div_ceil(u64::from(page_size)),
            courses,
        })
    }

    pub async fn get_course_detail(&self, course_id: i32) -> Result<CourseDetailResponse> {
        let rows = self.courses.course_detail_rows(course_id).await?;
        let Some(first) = rows.first() else {
            return Err(AppError::NotFound(format!("Course {} not found", course_id)));
        };
        let description = first.description.clone();

        let mut summaries = fold_course_rows(
            &[course_id],
            rows.into_iter().map(|row| row.base).collect(),
        );
        let summary = summaries
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))?;

        let images = self.courses.course_images(course_id).await?;
        let intervals = self.courses.course_intervals(course_id).await?;
        let totals = CourseTotals::from_intervals(&intervals);

        Ok(CourseDetailResponse {
            id: summary.id,
            name: summary.name,
            description,
            road_addresses: summary.road_addresses,
            land_addresses: summary.land_addresses,
            difficulty: summary.difficulty,
            course_style: summary.course_style,
            images: images.into_iter().map(ImageResponse::from).collect(),
            total_length_km: totals.length_km(),
            total_duration_minutes: totals.duration_minutes,
        })
    }

    pub async fn get_course_intervals(&self, course_id: i32) -> Result<CourseIntervalsResponse> {
        let rows = self.courses.course_intervals(course_id).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "No intervals for course {}",
                course_id
            )));
        }

        let place_ids: BTreeSet<i32> = rows
            .iter()
            .flat_map(|row| [row.place_a_id, row.place_b_id])
            .collect();
        let place_ids: Vec<i32> = place_ids.into_iter().collect();
        let places = self
            .places
            .get_places(&place_ids)
            .await?
            .into_iter()
            .map(|row| Place::try_from(row).map(|place| (place.id, place)))
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        let interval_ids: Vec<i32> = rows.iter().map(|row| row.interval_id).collect();
        let images = group_images(self.courses.interval_images(&interval_ids).await?);

        let intervals = rows
            .iter()
            .map(|row| {
                // An interval may appear twice in a course; both get its images.
                let interval_images = images.get(&row.interval_id).cloned().unwrap_or_default();
                assemble_interval(row, &places, interval_images)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(course_id, count = intervals.len(), "Assembled course intervals");

        Ok(CourseIntervalsResponse {
            interval_count: intervals.len(),
            intervals,
        })
    }

    /// All course difficulties, easiest first.
    pub async fn difficulties(&self) -> Result<Vec<CourseDifficulty>> {
        let mut difficulties = self.courses.difficulties().await?;
        difficulties.sort_by_key(|d| d.level);
        Ok(difficulties)
    }

    pub async fn styles(&self) -> Result<Vec<CourseStyle>> {
        let mut styles = self.courses.styles().await?;
        styles.sort_by_key(|s| s.id);
        Ok(styles)
    }
}
