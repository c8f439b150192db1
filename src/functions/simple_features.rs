//! Simple Features topological relations
//!
//! Binary predicates over pairs of 2D geometries. The DE-9IM based relations
//! (touches, crosses, overlaps, equals) go through `Relate`; the remainder
//! use the dedicated `geo` algorithms.

use crate::error::Result;
use crate::geometry::Geometry;
use geo::{Contains, Intersects, Relate, Within};

/// Test if two geometries spatially intersect
pub fn sf_intersects(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.intersects(&geom2.geom))
}

/// Test if two geometries are spatially disjoint
pub fn sf_disjoint(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(!geom1.geom.intersects(&geom2.geom))
}

/// Test if two geometries touch on their boundaries without interior overlap
pub fn sf_touches(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.relate(&geom2.geom).is_touches())
}

/// Test if two geometries cross
pub fn sf_crosses(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.relate(&geom2.geom).is_crosses())
}

/// Test if the first geometry contains the second
pub fn sf_contains(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.contains(&geom2.geom))
}

/// Test if the first geometry is within the second
pub fn sf_within(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.is_within(&geom2.geom))
}

/// Test if two geometries overlap: their interiors intersect but neither
/// contains the other
pub fn sf_overlaps(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.relate(&geom2.geom).is_overlaps())
}

/// Test if two geometries are topologically equal
pub fn sf_equals(geom1: &Geometry, geom2: &Geometry) -> Result<bool> {
    Ok(geom1.geom.relate(&geom2.geom).is_equal_topo())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(wkt: &str) -> Geometry {
        Geometry::from_wkt(wkt).unwrap()
    }

    #[test]
    fn test_intersects_and_disjoint() {
        let a = g("POLYGON((0 0, 4 0, 4 4, 0 4, 0 0))");
        let b = g("POLYGON((2 2, 6 2, 6 6, 2 6, 2 2))");
        let c = g("POLYGON((10 10, 11 10, 11 11, 10 11, 10 10))");

        assert!(sf_intersects(&a, &b).unwrap());
        assert!(!sf_intersects(&a, &c).unwrap());
        assert!(sf_disjoint(&a, &c).unwrap());
        assert!(!sf_disjoint(&a, &b).unwrap());
    }

    #[test]
    fn test_touches() {
        let a = g("POLYGON((0 0, 5 0, 5 5, 0 5, 0 0))");
        let adjacent = g("POLYGON((5 0, 10 0, 10 5, 5 5, 5 0))");
        let separate = g("POLYGON((6 0, 11 0, 11 5, 6 5, 6 0))");

        assert!(sf_touches(&a, &adjacent).unwrap());
        assert!(!sf_touches(&a, &separate).unwrap());
    }

    #[test]
    fn test_crosses() {
        let road = g("LINESTRING(0 5, 10 5)");
        let region = g("POLYGON((2 2, 8 2, 8 8, 2 8, 2 2))");

        assert!(sf_crosses(&road, &region).unwrap());
    }

    #[test]
    fn test_contains_and_within() {
        let city = g("POLYGON((0 0, 100 0, 100 100, 0 100, 0 0))");
        let building = g("POLYGON((10 10, 20 10, 20 20, 10 20, 10 10))");

        assert!(sf_contains(&city, &building).unwrap());
        assert!(sf_within(&building, &city).unwrap());
        assert!(!sf_within(&city, &building).unwrap());
    }

    #[test]
    fn test_overlaps() {
        let a = g("POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))");
        let b = g("POLYGON((5 5, 15 5, 15 15, 5 15, 5 5))");
        let inside = g("POLYGON((1 1, 2 1, 2 2, 1 2, 1 1))");

        assert!(sf_overlaps(&a, &b).unwrap());
        assert!(!sf_overlaps(&a, &inside).unwrap());
    }

    #[test]
    fn test_equals() {
        let a = g("POLYGON((0 0, 5 0, 5 5, 0 5, 0 0))");
        let same = g("POLYGON((0 0, 5 0, 5 5, 0 5, 0 0))");
        let other = g("POLYGON((1 1, 6 1, 6 6, 1 6, 1 1))");

        assert!(sf_equals(&a, &same).unwrap());
        assert!(!sf_equals(&a, &other).unwrap());
    }
}
