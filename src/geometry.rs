// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON decoding for PostGIS point and line geometries.
//!
//! Queries select `ST_AsGeoJSON(...)`. The third ordinate of a line position
//! is the elevation in meters.

use geo::{Coord, Point};
use geojson::GeoJson;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single track vertex: WGS84 lon/lat plus optional elevation (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub coord: Coord<f64>,
    pub ele: Option<f64>,
}

impl TrackPoint {
    pub fn lon(&self) -> f64 {
        self.coord.x
    }

    pub fn lat(&self) -> f64 {
        self.coord.y
    }
}

/// Point shape used in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct PointResponse {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
}

impl From<TrackPoint> for PointResponse {
    fn from(p: TrackPoint) -> Self {
        Self {
            lat: p.lat(),
            lon: p.lon(),
            ele: p.ele,
        }
    }
}

/// Decode a point geometry (e.g. `place.geog`).
pub fn decode_point(text: &str) -> Result<Point<f64>, GeometryError> {
    let value = parse_geometry(text)?;
    if !matches!(value, geojson::Value::Point(_)) {
        return Err(GeometryError::UnexpectedType {
            expected: "Point",
            found: type_name(&value),
        });
    }
    Ok(value.try_into()?)
}

/// Decode a line geometry (e.g. `course_interval.geom`) into its vertices.
pub fn decode_line(text: &str) -> Result<Vec<TrackPoint>, GeometryError> {
    match parse_geometry(text)? {
        geojson::Value::LineString(positions) => {
            positions.iter().map(|p| track_point(p)).collect()
        }
        other => Err(GeometryError::UnexpectedType {
            expected: "LineString",
            found: type_name(&other),
        }),
    }
}

fn parse_geometry(text: &str) -> Result<geojson::Value, GeometryError> {
    match text.parse::<GeoJson>()? {
        GeoJson::Geometry(geometry) => Ok(geometry.value),
        GeoJson::Feature(_) | GeoJson::FeatureCollection(_) => Err(GeometryError::NotAGeometry),
    }
}

fn track_point(position: &[f64]) -> Result<TrackPoint, GeometryError> {
    match *position {
        [x, y] => Ok(TrackPoint {
            coord: Coord { x, y },
            ele: None,
        }),
        // A fourth ordinate is a measure and is dropped.
        [x, y, z, ..] => Ok(TrackPoint {
            coord: Coord { x, y },
            ele: Some(z),
        }),
        _ => Err(GeometryError::InvalidPosition(position.len())),
    }
}

fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Errors from geometry decoding.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Expected a GeoJSON geometry, found a feature")]
    NotAGeometry,

    #[error("Expected {expected} geometry, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Position has {0} ordinates, need at least 2")]
    InvalidPosition(usize),
}
