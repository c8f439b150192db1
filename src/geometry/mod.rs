//! Geometry types and operations
//!
//! This module provides the opaque geometry handle used by the engine,
//! wrapping the `geo` crate and providing WKT parsing support.

pub mod wkt_parser;

use crate::error::{Result, TileJoinError};
use geo::algorithm::HasDimensions;
use geo::{BoundingRect, Centroid};
use geo_types::{Geometry as GeoGeometry, Point, Rect};
use std::fmt;

/// A 2D geometry handle
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// The underlying geometry (X, Y coordinates)
    pub geom: GeoGeometry<f64>,
}

impl Geometry {
    /// Create a new geometry
    pub fn new(geom: GeoGeometry<f64>) -> Self {
        Self { geom }
    }

    /// Parse from WKT (Well-Known Text) format
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        wkt_parser::parse_wkt(wkt)
    }

    /// Convert to WKT format
    pub fn to_wkt(&self) -> String {
        use wkt::ToWkt;
        self.geom.wkt_string()
    }

    /// Minimum bounding rectangle (envelope) of the geometry
    pub fn envelope(&self) -> Result<Rect<f64>> {
        self.geom.bounding_rect().ok_or_else(|| {
            TileJoinError::GeometryOperationFailed(
                "Could not calculate bounding rectangle".to_string(),
            )
        })
    }

    /// Centroid of the geometry
    pub fn centroid(&self) -> Result<Point<f64>> {
        self.geom.centroid().ok_or_else(|| {
            TileJoinError::GeometryOperationFailed("Could not calculate centroid".to_string())
        })
    }

    /// Check if the geometry is empty
    pub fn is_empty(&self) -> bool {
        self.geom.is_empty()
    }

    /// Get the geometry type name
    pub fn geometry_type(&self) -> &'static str {
        match &self.geom {
            GeoGeometry::Point(_) => "Point",
            GeoGeometry::Line(_) => "Line",
            GeoGeometry::LineString(_) => "LineString",
            GeoGeometry::Polygon(_) => "Polygon",
            GeoGeometry::MultiPoint(_) => "MultiPoint",
            GeoGeometry::MultiLineString(_) => "MultiLineString",
            GeoGeometry::MultiPolygon(_) => "MultiPolygon",
            GeoGeometry::GeometryCollection(_) => "GeometryCollection",
            GeoGeometry::Triangle(_) => "Triangle",
            GeoGeometry::Rect(_) => "Rect",
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wkt())
    }
}
