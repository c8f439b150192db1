//! Command-line interface for the engine binary

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use crate::engine::cache::CacheFileExecutor;
use crate::engine::operator::{JoinPredicate, OutputField, QueryOp};
use crate::engine::{BucketExecutor, ExecSummary};
use crate::error::Result;

/// Tile-partitioned spatial join and nearest-neighbor engine
///
/// Reads tab-separated, tile-partitioned geometry records on standard input
/// and writes matching pairs to standard output. Diagnostics go to standard
/// error.
#[derive(Parser, Debug)]
#[command(name = "tilejoin")]
#[command(about = "Tile-partitioned spatial join and nearest-neighbor engine")]
#[command(version)]
pub struct Cli {
    /// Join cardinality: 1 for a self-join, 2 for a two-dataset join
    #[arg(long, default_value_t = 2)]
    pub cardinality: u8,

    /// Geometry field position in dataset 1 records
    #[arg(long, default_value_t = 2)]
    pub shape_idx_1: usize,

    /// Geometry field position in dataset 2 records
    #[arg(long, default_value_t = 2)]
    pub shape_idx_2: usize,

    /// Join predicate: intersects, touches, crosses, contains, within,
    /// overlaps, disjoint, equals, dwithin, nearest, nearest2
    #[arg(short = 'p', long)]
    pub predicate: JoinPredicate,

    /// Buffer radius applied to the A side before predicate evaluation;
    /// doubles as the dwithin distance
    #[arg(long, default_value_t = 0.0)]
    pub expansion_distance: f64,

    /// Neighbors per object for the nearest predicates
    #[arg(short = 'k', long, default_value_t = 1)]
    pub k: usize,

    /// Rank and report great-circle instead of Euclidean distances
    #[arg(long)]
    pub earth_distance: bool,

    /// Output projection, e.g. a:0,b:2,stat:jaccard; defaults to all raw
    /// fields of both sides
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<OutputField>,

    /// Load dataset 2 from this file instead of the input stream
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Build the operator and run the configured executor over stdin/stdout
pub fn run(cli: Cli) -> Result<ExecSummary> {
    let op = build_query_op(&cli)?;

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut output = BufWriter::new(stdout);

    let started = Instant::now();
    let summary = if op.use_cache_file {
        CacheFileExecutor::new(&op).execute(stdin, &mut output)?
    } else {
        BucketExecutor::new(&op).execute(stdin, &mut output)?
    };
    output.flush()?;

    info!(
        tiles = summary.tiles,
        rows = summary.rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "query complete"
    );
    Ok(summary)
}

fn build_query_op(cli: &Cli) -> Result<QueryOp> {
    QueryOp {
        join_cardinality: cli.cardinality,
        shape_idx_1: cli.shape_idx_1,
        shape_idx_2: cli.shape_idx_2,
        join_predicate: cli.predicate,
        expansion_distance: cli.expansion_distance,
        k: cli.k,
        earth_distance: cli.earth_distance,
        output_fields: cli.fields.clone(),
        use_cache_file: cli.cache_file.is_some(),
        cache_file_path: cli.cache_file.clone(),
    }
    .validated()
}
