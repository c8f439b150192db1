//! Geometric operations
//!
//! Measures (area, distance), constructive operations (buffer, union,
//! intersection), and the great-circle distance used for geographic data.

use crate::error::Result;
use crate::geometry::Geometry;
use geo::algorithm::{Area, BooleanOps, Buffer};
use geo::{Distance, Euclidean, Haversine};
use geo_types::{Geometry as GeoGeometry, MultiPolygon};

/// Area of a geometry; non-areal geometries have area 0
pub fn area(geom: &Geometry) -> Result<f64> {
    Ok(geom.geom.unsigned_area())
}

/// Minimum Euclidean distance between two geometries
pub fn distance(geom1: &Geometry, geom2: &Geometry) -> Result<f64> {
    Ok(Euclidean.distance(&geom1.geom, &geom2.geom))
}

/// Great-circle distance between the centroids of two geometries, with
/// coordinates interpreted as lon/lat degrees (haversine, meters)
pub fn earth_distance(geom1: &Geometry, geom2: &Geometry) -> Result<f64> {
    let p1 = geom1.centroid()?;
    let p2 = geom2.centroid()?;
    Ok(Haversine.distance(p1, p2))
}

/// Expand a geometry by a buffer radius
pub fn buffer(geom: &Geometry, radius: f64) -> Result<Geometry> {
    let buffered: MultiPolygon<f64> = geom.geom.buffer(radius);
    Ok(Geometry::new(GeoGeometry::MultiPolygon(buffered)))
}

/// Intersection of the polygonal content of two geometries
///
/// Non-areal operands contribute nothing, so the result degrades to an empty
/// multipolygon rather than erroring on line or point inputs.
pub fn intersection(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    let result = match (polygonal(&geom1.geom), polygonal(&geom2.geom)) {
        (Some(a), Some(b)) => a.intersection(&b),
        _ => MultiPolygon::new(vec![]),
    };
    Ok(Geometry::new(GeoGeometry::MultiPolygon(result)))
}

/// Union of the polygonal content of two geometries
pub fn union(geom1: &Geometry, geom2: &Geometry) -> Result<Geometry> {
    let result = match (polygonal(&geom1.geom), polygonal(&geom2.geom)) {
        (Some(a), Some(b)) => a.union(&b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => MultiPolygon::new(vec![]),
    };
    Ok(Geometry::new(GeoGeometry::MultiPolygon(result)))
}

/// Project a geometry onto its polygonal content
fn polygonal(geom: &GeoGeometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        GeoGeometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        GeoGeometry::MultiPolygon(mp) => Some(mp.clone()),
        GeoGeometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        GeoGeometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        _ => None,
    }
}
