// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trailine API: trekking course discovery
//!
//! This crate provides the public API for searching courses, assembling
//! their intervals in walking order, and mountain weather lookups.

pub mod config;
pub mod db;
pub mod error;
pub mod geometry;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{CourseService, WeatherService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub course_service: CourseService,
    pub weather_service: WeatherService,
}
