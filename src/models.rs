//! Data models for the earthquake and tectonic plate GeoJSON feeds.
//!
//! The earthquake structures follow the USGS summary feed format. Plate
//! boundaries are kept as generic GeoJSON so they can be handed back to the
//! page untouched.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::QuakemapError;

/// Top-level GeoJSON response from USGS feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata (absent in hand-made documents)
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` if the document is not a feature collection.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        check_collection_type(&self.type_)
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

impl Metadata {
    /// Get the generation time as a `DateTime<Utc>`.
    #[must_use]
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.generated).single()
    }
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    #[serde(default)]
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure. Extra position elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the position lacks a depth.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.geometry.coordinates.len() < 3 {
            return Err(QuakemapError::Validation(format!(
                "event '{}': expected at least 3 coordinates, got {}",
                self.id,
                self.geometry.coordinates.len()
            )));
        }
        Ok(())
    }

    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.properties.time).single()
    }

    /// Get the last update time as a `DateTime<Utc>`.
    #[must_use]
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.properties.updated).single()
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates.first().copied().unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates.get(1).copied().unwrap_or(0.0)
    }

    /// Get depth in kilometers (positive down).
    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.geometry.coordinates.get(2).copied().unwrap_or(0.0)
    }
}

/// Point geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from the USGS feed. Fields the map does not draw are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Last update time (ms since epoch)
    pub updated: i64,
}

/// GeoJSON document of tectonic plate boundaries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlateCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Boundary segments
    pub features: Vec<PlateFeature>,
}

impl PlateCollection {
    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` if the document is not a feature collection.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        check_collection_type(&self.type_)
    }
}

/// A plate boundary feature. Properties are passed through as-is.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlateFeature {
    #[serde(rename = "type")]
    pub type_: String,

    /// Null for features without a location
    #[serde(default)]
    pub geometry: Option<BoundaryGeometry>,

    #[serde(default)]
    pub properties: serde_json::Value,
}

/// A GeoJSON position; a third element (elevation) is tolerated.
pub type Position = Vec<f64>;

/// Geometries found in plate boundary documents.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl BoundaryGeometry {
    /// Number of positions in this geometry.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        match self {
            Self::Point { .. } => 1,
            Self::LineString { coordinates } => coordinates.len(),
            Self::MultiLineString { coordinates } | Self::Polygon { coordinates } => {
                coordinates.iter().map(Vec::len).sum()
            }
            Self::MultiPolygon { coordinates } => coordinates
                .iter()
                .flat_map(|polygon| polygon.iter().map(Vec::len))
                .sum(),
        }
    }
}

fn check_collection_type(type_: &str) -> Result<(), QuakemapError> {
    if type_ != "FeatureCollection" {
        return Err(QuakemapError::InvalidResponse(format!(
            "expected type 'FeatureCollection', got '{type_}'"
        )));
    }
    Ok(())
}
