// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod course;
pub mod place;
pub mod weather;

pub use course::{
    CourseAddressRow, CourseDetailResponse, CourseDetailRow, CourseDifficulty,
    CourseIntervalResponse, CourseIntervalRow, CourseIntervalsResponse, CourseSearchResponse,
    CourseStyle, CourseSummary, ImageResponse, ImageRow,
};
pub use place::{Place, PlaceResponse, PlaceRow};
pub use weather::{CurrentWeather, CurrentWeatherResponse, MountainForecast};
