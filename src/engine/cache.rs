//! Cache-file execution: dataset B loaded once from a side file
//!
//! The whole input stream is treated as one logical tile. With a single
//! cached object the engine runs a window fast path that never builds an
//! index; with two or more it builds the index once and probes it per
//! streamed record. Cached geometries live for the entire run.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use tracing::debug;

use crate::engine::operator::{QueryOp, QueryScratch};
use crate::engine::predicate::{evaluate, populate_match_stats};
use crate::engine::projector::write_row;
use crate::engine::{knn, spjoin, ExecSummary, TileObject, FIELD_SEPARATOR};
use crate::error::{Result, TileJoinError};
use crate::functions::geometric_operations::buffer as buffer_geometry;
use crate::geometry::Geometry;
use crate::index::TileIndex;
use geo_types::Rect;

/// Executor for runs whose second dataset comes from a cache file
pub struct CacheFileExecutor<'a> {
    op: &'a QueryOp,
}

impl<'a> CacheFileExecutor<'a> {
    pub fn new(op: &'a QueryOp) -> Self {
        Self { op }
    }

    /// Load the cache file, then stream dataset A from `input`
    ///
    /// Returns the number of emitted rows; the stream counts as one tile.
    pub fn execute<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<ExecSummary> {
        let second = self.load_cache()?;

        // one logical tile whose tile id is undefined
        let mut scratch = QueryScratch::default();

        let rows = if second.len() == 1 && !self.op.join_predicate.is_nearest() {
            self.run_window(&second[0], input, &mut scratch, &mut output)?
        } else {
            self.run_indexed(&second, input, &mut scratch, &mut output)?
        };

        Ok(ExecSummary { tiles: 1, rows })
    }

    /// Read every cache line into the second-side buffer
    fn load_cache(&self) -> Result<Vec<TileObject>> {
        let path = self.op.cache_file_path.as_ref().ok_or_else(|| {
            TileJoinError::Config("cache-file mode requires a cache file path".to_string())
        })?;
        let file = File::open(path)
            .map_err(|e| TileJoinError::Cache(format!("cannot open {}: {e}", path.display())))?;

        let mut second = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| TileJoinError::Cache(e.to_string()))?;
            if line.is_empty() {
                continue;
            }
            if let Some(object) = self.parse_object(&line, self.op.shape_idx_2)? {
                second.push(object);
            }
        }
        if second.is_empty() {
            return Err(TileJoinError::Cache("no cache geometry".to_string()));
        }
        debug!("read {} objects from the cache file", second.len());
        Ok(second)
    }

    /// Single-window fast path: no index construction
    fn run_window<R: BufRead, W: Write>(
        &self,
        window: &TileObject,
        input: R,
        scratch: &mut QueryScratch,
        output: &mut W,
    ) -> Result<u64> {
        let mut rows = 0;
        for line in input.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let Some(a) = self.parse_object(&line, self.op.shape_idx_1)? else {
                continue;
            };

            let expanded = if self.op.expansion_distance > 0.0 {
                Some(buffer_geometry(&a.geom, self.op.expansion_distance)?)
            } else {
                None
            };
            let (eval_geom, eval_env) = match &expanded {
                Some(geom) => (geom, geom.envelope()?),
                None => (&a.geom, a.env),
            };

            if evaluate(self.op, eval_geom, &window.geom, &eval_env, &window.env)? {
                populate_match_stats(self.op, scratch, &a.geom, &window.geom)?;
                write_row(output, self.op, scratch, &a.fields, &window.fields, false)?;
                rows += 1;
            }
        }
        Ok(rows)
    }

    /// Indexed path: build the index once, probe it per streamed record
    fn run_indexed<R: BufRead, W: Write>(
        &self,
        second: &[TileObject],
        input: R,
        scratch: &mut QueryScratch,
        output: &mut W,
    ) -> Result<u64> {
        let envelopes: Vec<Rect<f64>> = second.iter().map(|object| object.env).collect();
        let index = TileIndex::bulk_load(&envelopes)?;

        let mut rows = 0;
        for line in input.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let Some(a) = self.parse_object(&line, self.op.shape_idx_1)? else {
                continue;
            };

            rows += if self.op.join_predicate.is_nearest() {
                knn::probe(self.op, scratch, &a, None, second, &index, output)?
            } else {
                spjoin::probe(self.op, scratch, &a, second, &index, output, true)?
            };
        }
        Ok(rows)
    }

    /// Parse one cache-mode record; lines carry no tile or set id
    ///
    /// Returns `None` for records with an empty geometry field.
    fn parse_object(&self, line: &str, shape_idx: usize) -> Result<Option<TileObject>> {
        let fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_string).collect();
        let wkt = fields.get(shape_idx).ok_or_else(|| {
            TileJoinError::Schema(format!("missing geometry field at position {shape_idx}"))
        })?;
        if wkt.is_empty() {
            return Ok(None);
        }
        let geom = Geometry::from_wkt(wkt)?;
        Ok(Some(TileObject::new(geom, fields)?))
    }
}
