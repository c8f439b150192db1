//! WKT (Well-Known Text) parser
//!
//! Converts WKT strings into geometry objects.

use crate::error::{Result, TileJoinError};
use crate::geometry::Geometry;
use geo_types::Geometry as GeoGeometry;
use std::str::FromStr;

/// Parse a WKT string into a Geometry
pub fn parse_wkt(wkt_str: &str) -> Result<Geometry> {
    // Use the wkt crate for parsing
    let wkt_parsed: wkt::Wkt<f64> = wkt::Wkt::from_str(wkt_str.trim())
        .map_err(|e| TileJoinError::InvalidWkt(e.to_string()))?;

    // Convert to geo_types geometry using try_into
    let geo_geom: GeoGeometry<f64> = wkt_parsed
        .try_into()
        .map_err(|_| TileJoinError::InvalidWkt("Failed to convert WKT to geometry".to_string()))?;

    Ok(Geometry::new(geo_geom))
}
