//! k-nearest-neighbor evaluation over one tile

use std::cmp::Ordering;
use std::io::Write;

use crate::engine::operator::{QueryOp, QueryScratch, Sid};
use crate::engine::predicate::{metric_distance, populate_match_stats};
use crate::engine::projector::write_row;
use crate::engine::{TileBuffer, TileObject};
use crate::error::Result;
use crate::index::TileIndex;

/// Neighbors of a single A object: up to `k` rows in ascending distance
/// order, ties broken by ascending B local id
///
/// Candidates are drawn from the index's nearest-neighbor iteration seeded
/// at the object's centroid, then re-ranked by the configured metric.
pub(crate) fn probe<W: Write>(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    a: &TileObject,
    exclude: Option<usize>,
    second: &[TileObject],
    index: &TileIndex,
    output: &mut W,
) -> Result<u64> {
    let center = a.geom.centroid()?;

    let mut ranked: Vec<(f64, usize)> = Vec::with_capacity(op.k);
    for local_id in index.nearest_neighbors([center.x(), center.y()]) {
        if exclude == Some(local_id) {
            continue;
        }
        ranked.push((metric_distance(op, &a.geom, &second[local_id].geom)?, local_id));
        if ranked.len() == op.k {
            break;
        }
    }
    ranked.sort_by(|lhs, rhs| {
        lhs.0
            .partial_cmp(&rhs.0)
            .unwrap_or(Ordering::Equal)
            .then(lhs.1.cmp(&rhs.1))
    });

    let mut pairs = 0;
    for (dist, local_id) in ranked {
        let b = &second[local_id];
        populate_match_stats(op, scratch, &a.geom, &b.geom)?;
        scratch.distance = dist;
        write_row(output, op, scratch, &a.fields, &b.fields, true)?;
        pairs += 1;
    }
    Ok(pairs)
}

/// k-NN join over one tile: outer loop over the A side in insertion order
///
/// A self-join excludes the identity pair; the next-nearest neighbors fill
/// the k slots instead.
pub fn join_bucket_knn<W: Write>(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    buffer: &TileBuffer,
    index: &TileIndex,
    output: &mut W,
) -> Result<u64> {
    let second = buffer.side(op.sid_second());
    let self_join = op.join_cardinality == 1;

    let mut pairs = 0;
    for (local_id, a) in buffer.side(Sid::One).iter().enumerate() {
        let exclude = if self_join { Some(local_id) } else { None };
        pairs += probe(op, scratch, a, exclude, second, index, output)?;
    }
    Ok(pairs)
}
