//! Spatial-join evaluation over one tile

use std::io::Write;

use crate::engine::operator::{JoinPredicate, QueryOp, QueryScratch, Sid};
use crate::engine::predicate::{evaluate, populate_match_stats};
use crate::engine::projector::write_row;
use crate::engine::{TileBuffer, TileObject};
use crate::error::Result;
use crate::functions::geometric_operations::buffer as buffer_geometry;
use crate::index::TileIndex;

/// Probe the second side with a single A object, emitting matched rows
///
/// Candidates come from an envelope query against the index, except for
/// `disjoint`, which must consider every B object: an envelope miss is
/// exactly a disjoint match the index would never return. Candidates are
/// visited in ascending local-id order.
pub(crate) fn probe<W: Write>(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    a: &TileObject,
    second: &[TileObject],
    index: &TileIndex,
    output: &mut W,
    emit_second_default: bool,
) -> Result<u64> {
    let expanded = if op.expansion_distance > 0.0 {
        Some(buffer_geometry(&a.geom, op.expansion_distance)?)
    } else {
        None
    };
    let (eval_geom, eval_env) = match &expanded {
        Some(geom) => (geom, geom.envelope()?),
        None => (&a.geom, a.env),
    };

    let candidates: Vec<usize> = if op.join_predicate == JoinPredicate::Disjoint {
        (0..second.len()).collect()
    } else {
        index.query_envelope(&eval_env)
    };

    let mut pairs = 0;
    for local_id in candidates {
        let b = &second[local_id];
        if evaluate(op, eval_geom, &b.geom, &eval_env, &b.env)? {
            populate_match_stats(op, scratch, &a.geom, &b.geom)?;
            write_row(output, op, scratch, &a.fields, &b.fields, emit_second_default)?;
            pairs += 1;
        }
    }
    // the transient expanded geometry is dropped here
    Ok(pairs)
}

/// Join one tile: outer loop over the A side in insertion order
///
/// A self-join probes the same buffer it indexes; both `(a, b)` and `(b, a)`
/// are emitted, as is the identity pair.
pub fn join_bucket_spjoin<W: Write>(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    buffer: &TileBuffer,
    index: &TileIndex,
    output: &mut W,
) -> Result<u64> {
    let second = buffer.side(op.sid_second());
    let mut pairs = 0;
    for a in buffer.side(Sid::One) {
        pairs += probe(op, scratch, a, second, index, output, true)?;
    }
    Ok(pairs)
}
