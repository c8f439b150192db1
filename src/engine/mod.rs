//! Bucket execution: streaming tile assembly and per-tile query dispatch
//!
//! Records arrive on standard input grouped by tile id. The executor buffers
//! one tile at a time, builds a spatial index over the second dataset,
//! evaluates the configured join or k-NN query, and releases the tile before
//! reading on. Peak memory is bounded by the largest tile plus index
//! overhead; the upstream partitioner is responsible for sizing tiles.

pub mod cache;
pub mod knn;
pub mod operator;
pub mod predicate;
pub mod projector;
pub mod record;
pub mod spjoin;

use std::io::{BufRead, Write};

use geo_types::Rect;
use tracing::debug;

use crate::engine::operator::{QueryOp, QueryScratch, Sid};
use crate::engine::record::parse_record;
use crate::error::{Result, TileJoinError};
use crate::geometry::Geometry;
use crate::index::TileIndex;

/// Output field separator (process-wide)
pub const FIELD_SEPARATOR: char = '\t';
/// Output record terminator (process-wide)
pub const LINE_TERMINATOR: char = '\n';

/// One buffered object: parsed geometry, its envelope, and the raw fields
#[derive(Debug, Clone)]
pub struct TileObject {
    pub geom: Geometry,
    pub env: Rect<f64>,
    pub fields: Vec<String>,
}

impl TileObject {
    pub fn new(geom: Geometry, fields: Vec<String>) -> Result<Self> {
        let env = geom.envelope()?;
        Ok(Self { geom, env, fields })
    }
}

/// Per-tile object buffers, one per set id
///
/// Ordinal position within a side is the object's local id; the index
/// builder and both evaluators address objects through these ordinals.
#[derive(Debug, Default)]
pub struct TileBuffer {
    sides: [Vec<TileObject>; 2],
}

impl TileBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sid: Sid, object: TileObject) {
        self.sides[sid.slot()].push(object);
    }

    pub fn side(&self, sid: Sid) -> &[TileObject] {
        &self.sides[sid.slot()]
    }

    /// Release the buffered sides, lowest set id first, up to `max_card`
    /// sides; a cache-resident second side survives the tile
    pub fn release(&mut self, cardinality: u8, max_card: u8) {
        for slot in 0..usize::from(cardinality.min(max_card)) {
            self.sides[slot].clear();
        }
    }
}

/// Counters reported at end of run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    /// Tiles processed
    pub tiles: u64,
    /// Result rows emitted
    pub rows: u64,
}

/// Reading-loop state: which tile is currently being filled
enum StreamState {
    Idle,
    Filling(String),
}

/// Streaming executor: groups input records into tiles and joins each tile
pub struct BucketExecutor<'a> {
    op: &'a QueryOp,
}

impl<'a> BucketExecutor<'a> {
    pub fn new(op: &'a QueryOp) -> Self {
        Self { op }
    }

    /// Consume `input` to exhaustion, emitting result rows to `output`
    ///
    /// A tile is flushed (joined and released) when the first record of a
    /// different tile id arrives, and once more at end of stream for what
    /// remains in memory.
    pub fn execute<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<ExecSummary> {
        let mut buffer = TileBuffer::new();
        let mut scratch = QueryScratch::default();
        let mut state = StreamState::Idle;
        let mut summary = ExecSummary::default();

        debug!("bucket info: [id] |A|x|B|=|R|");

        for line in input.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record = parse_record(&line)?;

            let shape_idx = self.op.shape_idx(record.sid);
            let wkt = record.fields.get(shape_idx).ok_or_else(|| {
                TileJoinError::Schema(format!("missing geometry field at position {shape_idx}"))
            })?;
            if wkt.is_empty() {
                // objects with missing geometry are skipped
                continue;
            }
            let geom = Geometry::from_wkt(wkt)?;

            state = match state {
                StreamState::Idle => StreamState::Filling(record.tile_id.clone()),
                StreamState::Filling(tile_id) if tile_id != record.tile_id => {
                    summary.rows +=
                        self.flush_tile(&tile_id, &mut buffer, &mut scratch, &mut output)?;
                    summary.tiles += 1;
                    StreamState::Filling(record.tile_id.clone())
                }
                filling => filling,
            };
            buffer.push(record.sid, TileObject::new(geom, record.fields)?);
        }

        // the last tile is whatever remains in memory at end of stream
        if let StreamState::Filling(tile_id) = state {
            summary.rows += self.flush_tile(&tile_id, &mut buffer, &mut scratch, &mut output)?;
            summary.tiles += 1;
        }

        Ok(summary)
    }

    /// Join the buffered tile, report its bucket stats, release its memory
    fn flush_tile<W: Write>(
        &self,
        tile_id: &str,
        buffer: &mut TileBuffer,
        scratch: &mut QueryScratch,
        output: &mut W,
    ) -> Result<u64> {
        scratch.tile_id.clear();
        scratch.tile_id.push_str(tile_id);

        let pairs = join_bucket(self.op, scratch, buffer, output)?;
        debug!(
            "T[{}] |{}|x|{}|=|{}|",
            tile_id,
            buffer.side(Sid::One).len(),
            buffer.side(self.op.sid_second()).len(),
            pairs
        );

        buffer.release(self.op.join_cardinality, self.max_card_release());
        Ok(pairs)
    }

    /// Sides eligible for per-tile release; a cache-resident second side
    /// must live for the entire run
    fn max_card_release(&self) -> u8 {
        if self.op.use_cache_file {
            1
        } else {
            2
        }
    }
}

/// Evaluate one tile: k-NN for the nearest predicates, spatial join otherwise
///
/// The index over the second side is built here and dropped, together with
/// its backing storage, before the caller releases the object buffers.
pub(crate) fn join_bucket<W: Write>(
    op: &QueryOp,
    scratch: &mut QueryScratch,
    buffer: &TileBuffer,
    output: &mut W,
) -> Result<u64> {
    let second = buffer.side(op.sid_second());
    if second.is_empty() {
        // nothing to join against; not an error
        return Ok(0);
    }

    let envelopes: Vec<Rect<f64>> = second.iter().map(|object| object.env).collect();
    let index = TileIndex::bulk_load(&envelopes)?;

    if op.join_predicate.is_nearest() {
        knn::join_bucket_knn(op, scratch, buffer, &index, output)
    } else {
        spjoin::join_bucket_spjoin(op, scratch, buffer, &index, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::operator::JoinPredicate;
    use std::io::Cursor;

    fn op(predicate: JoinPredicate) -> QueryOp {
        QueryOp {
            join_cardinality: 2,
            shape_idx_1: 2,
            shape_idx_2: 2,
            join_predicate: predicate,
            expansion_distance: 0.0,
            k: 1,
            earth_distance: false,
            output_fields: vec![],
            use_cache_file: false,
            cache_file_path: None,
        }
    }

    fn run(op: &QueryOp, input: &str) -> (ExecSummary, String) {
        let mut out = Vec::new();
        let summary = BucketExecutor::new(op)
            .execute(Cursor::new(input), &mut out)
            .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_tile_boundaries_flush_before_append() {
        let input = "\
T1\t1\tPOLYGON((0 0, 2 0, 2 2, 0 2, 0 0))\n\
T1\t2\tPOLYGON((1 1, 3 1, 3 3, 1 3, 1 1))\n\
T2\t1\tPOLYGON((0 0, 1 0, 1 1, 0 1, 0 0))\n\
T2\t2\tPOLYGON((5 5, 6 5, 6 6, 5 6, 5 5))\n";
        let (summary, output) = run(&op(JoinPredicate::Intersects), input);

        assert_eq!(summary.tiles, 2);
        assert_eq!(summary.rows, 1);
        // only the T1 pair intersects; T2 objects never see T1 objects
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("T1\t1\t"));
    }

    #[test]
    fn test_empty_b_side_emits_nothing() {
        let input = "T1\t1\tPOINT(0 0)\n";
        let (summary, output) = run(&op(JoinPredicate::Intersects), input);

        assert_eq!(summary.tiles, 1);
        assert_eq!(summary.rows, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_empty_geometry_records_are_skipped() {
        let input = "T1\t1\t\nT1\t2\tPOINT(0 0)\n";
        let (summary, output) = run(&op(JoinPredicate::Intersects), input);

        assert_eq!(summary.tiles, 1);
        assert!(output.is_empty());
    }

    #[test]
    fn test_unknown_sid_is_fatal() {
        let input = "T1\t3\tPOINT(0 0)\n";
        let mut out = Vec::new();
        let op = op(JoinPredicate::Intersects);
        let err = BucketExecutor::new(&op).execute(Cursor::new(input), &mut out);
        assert!(matches!(err, Err(TileJoinError::Schema(_))));
    }

    #[test]
    fn test_bad_wkt_is_fatal() {
        let input = "T1\t1\tPOLYGON((0 0, 1 1\n";
        let mut out = Vec::new();
        let op = op(JoinPredicate::Intersects);
        let err = BucketExecutor::new(&op).execute(Cursor::new(input), &mut out);
        assert!(matches!(err, Err(TileJoinError::InvalidWkt(_))));
    }

    #[test]
    fn test_release_keeps_cache_side() {
        let mut buffer = TileBuffer::new();
        let geom = Geometry::from_wkt("POINT(0 0)").unwrap();
        buffer.push(Sid::One, TileObject::new(geom.clone(), vec![]).unwrap());
        buffer.push(Sid::Two, TileObject::new(geom, vec![]).unwrap());

        buffer.release(2, 1);
        assert!(buffer.side(Sid::One).is_empty());
        assert_eq!(buffer.side(Sid::Two).len(), 1);

        buffer.release(2, 2);
        assert!(buffer.side(Sid::Two).is_empty());
    }
}
