// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod course;
pub mod kma;
pub mod weather;

pub use course::CourseService;
pub use kma::KmaClient;
pub use weather::WeatherService;
