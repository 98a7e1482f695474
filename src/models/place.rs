// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Place model and geometry handling.

use crate::geometry::{self, GeometryError};
use geo::Point;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Place row as selected from the database (`geog` as GeoJSON).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    pub id: i32,
    pub name: String,
    pub geom: String,
    pub elevation: Option<i32>,
    pub land_address: Option<String>,
    pub road_address: Option<String>,
}

/// A geocoded point of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: i32,
    pub name: String,
    /// WGS84 location (x = lon, y = lat)
    pub location: Point<f64>,
    /// Elevation above sea level (m)
    pub elevation: Option<f64>,
    pub land_address: Option<String>,
    pub road_address: Option<String>,
}

impl TryFrom<PlaceRow> for Place {
    type Error = GeometryError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            location: geometry::decode_point(&row.geom)?,
            id: row.id,
            name: row.name,
            elevation: row.elevation.map(f64::from),
            land_address: row.land_address,
            road_address: row.road_address,
        })
    }
}

/// Place as embedded in interval responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/types/generated/")
)]
pub struct PlaceResponse {
    pub id: i32,
    pub name: String,
    /// Road-name address
    #[serde(rename = "loadAddress")]
    pub road_address: Option<String>,
    /// Land-lot address
    #[serde(rename = "roadAddress")]
    pub land_address: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
}

impl From<&Place> for PlaceResponse {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id,
            name: place.name.clone(),
            road_address: place.road_address.clone(),
            land_address: place.land_address.clone(),
            lat: place.location.y(),
            lon: place.location.x(),
            ele: place.elevation,
        }
    }
}
