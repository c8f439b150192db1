//! Relational predicate evaluation and derived match statistics

use geo::Intersects;
use geo_types::Rect;

use crate::engine::operator::{JoinPredicate, QueryOp, QueryScratch};
use crate::error::{Result, TileJoinError};
use crate::functions::geometric_operations::{area, distance, earth_distance, intersection, union};
use crate::functions::simple_features::{
    sf_contains, sf_crosses, sf_disjoint, sf_equals, sf_intersects, sf_overlaps, sf_touches,
    sf_within,
};
use crate::geometry::Geometry;

/// Evaluate the configured predicate for one candidate pair
///
/// `a` is the evaluation-side geometry: already expanded by the buffer
/// radius when one is set, with `a_env` its (expanded) envelope. Envelopes
/// are tested first; an envelope miss can only match `disjoint`, since
/// envelope disjointness implies geometry disjointness.
pub fn evaluate(
    op: &QueryOp,
    a: &Geometry,
    b: &Geometry,
    a_env: &Rect<f64>,
    b_env: &Rect<f64>,
) -> Result<bool> {
    if !a_env.intersects(b_env) {
        return Ok(op.join_predicate == JoinPredicate::Disjoint);
    }
    match op.join_predicate {
        JoinPredicate::Intersects => sf_intersects(a, b),
        JoinPredicate::Touches => sf_touches(a, b),
        JoinPredicate::Crosses => sf_crosses(a, b),
        JoinPredicate::Contains => sf_contains(a, b),
        JoinPredicate::Within => sf_within(a, b),
        JoinPredicate::Overlaps => sf_overlaps(a, b),
        JoinPredicate::Disjoint => sf_disjoint(a, b),
        JoinPredicate::Equals => sf_equals(a, b),
        // the buffered A side turns the distance test into an intersection test
        JoinPredicate::Dwithin => sf_intersects(a, b),
        JoinPredicate::Nearest | JoinPredicate::Nearest2 => Err(TileJoinError::Config(
            "nearest predicates dispatch to the k-NN evaluator".to_string(),
        )),
    }
}

/// Distance between two geometries under the operator's metric
pub fn metric_distance(op: &QueryOp, a: &Geometry, b: &Geometry) -> Result<f64> {
    if op.earth_distance {
        earth_distance(a, b)
    } else {
        distance(a, b)
    }
}

/// Populate the derived statistics referenced by the output fields
///
/// Computed on the original (unbuffered) geometries, on match only, and only
/// for the statistics the projection will read.
pub fn populate_match_stats(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    a: &Geometry,
    b: &Geometry,
) -> Result<()> {
    if op.needs_area_stats() {
        scratch.area_1 = area(a)?;
        scratch.area_2 = area(b)?;
        scratch.intersect_area = area(&intersection(a, b)?)?;
        scratch.union_area = area(&union(a, b)?)?;
        scratch.jaccard = if scratch.union_area > 0.0 {
            scratch.intersect_area / scratch.union_area
        } else {
            0.0
        };
        let denominator = scratch.area_1 + scratch.area_2;
        scratch.dice = if denominator > 0.0 {
            2.0 * scratch.intersect_area / denominator
        } else {
            0.0
        };
    }
    if op.needs_distance_stat() {
        scratch.distance = metric_distance(op, a, b)?;
    }
    Ok(())
}
