//! Query operator configuration and per-tile scratch state
//!
//! The operator is immutable for the duration of a run; the scratch carries
//! the derived values the output projection may reference for the pair
//! currently being reported.

use crate::error::{Result, TileJoinError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Set identifier distinguishing dataset A (`1`) from dataset B (`2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sid {
    One,
    Two,
}

impl Sid {
    /// Parse the mandatory set-id field at record position 1
    pub fn from_field(field: &str) -> Result<Self> {
        match field.trim() {
            "1" => Ok(Sid::One),
            "2" => Ok(Sid::Two),
            other => Err(TileJoinError::Schema(format!("wrong sid: {other}"))),
        }
    }

    /// Zero-based side slot in a tile buffer
    pub fn slot(self) -> usize {
        match self {
            Sid::One => 0,
            Sid::Two => 1,
        }
    }
}

/// Relational join predicates plus the two nearest-neighbor dispatch tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPredicate {
    Intersects,
    Touches,
    Crosses,
    Contains,
    Within,
    Overlaps,
    Disjoint,
    Equals,
    /// Minimum distance within the expansion distance
    Dwithin,
    Nearest,
    Nearest2,
}

impl JoinPredicate {
    /// True for the predicates dispatching to the k-NN evaluator
    pub fn is_nearest(self) -> bool {
        matches!(self, JoinPredicate::Nearest | JoinPredicate::Nearest2)
    }
}

impl FromStr for JoinPredicate {
    type Err = TileJoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "intersects" => Ok(Self::Intersects),
            "touches" => Ok(Self::Touches),
            "crosses" => Ok(Self::Crosses),
            "contains" => Ok(Self::Contains),
            "within" => Ok(Self::Within),
            "overlaps" => Ok(Self::Overlaps),
            "disjoint" => Ok(Self::Disjoint),
            "equals" => Ok(Self::Equals),
            "dwithin" => Ok(Self::Dwithin),
            "nearest" => Ok(Self::Nearest),
            "nearest2" | "nearest_2" => Ok(Self::Nearest2),
            other => Err(TileJoinError::Config(format!(
                "unknown join predicate: {other}"
            ))),
        }
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Intersects => "intersects",
            Self::Touches => "touches",
            Self::Crosses => "crosses",
            Self::Contains => "contains",
            Self::Within => "within",
            Self::Overlaps => "overlaps",
            Self::Disjoint => "disjoint",
            Self::Equals => "equals",
            Self::Dwithin => "dwithin",
            Self::Nearest => "nearest",
            Self::Nearest2 => "nearest2",
        };
        write!(f, "{name}")
    }
}

/// Derived statistic codes available to the output projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedStat {
    Area1,
    Area2,
    UnionArea,
    IntersectArea,
    Jaccard,
    Dice,
    TileId,
    MinDistance,
}

impl FromStr for DerivedStat {
    type Err = TileJoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "area_1" | "area_a" => Ok(Self::Area1),
            "area_2" | "area_b" => Ok(Self::Area2),
            "union_area" => Ok(Self::UnionArea),
            "intersect_area" => Ok(Self::IntersectArea),
            "jaccard" => Ok(Self::Jaccard),
            "dice" => Ok(Self::Dice),
            "tile_id" => Ok(Self::TileId),
            "min_distance" => Ok(Self::MinDistance),
            other => Err(TileJoinError::Config(format!(
                "unknown derived statistic: {other}"
            ))),
        }
    }
}

/// One output column: a raw field position of either input, or a derived
/// statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    First(usize),
    Second(usize),
    Stat(DerivedStat),
}

impl FromStr for OutputField {
    type Err = TileJoinError;

    fn from_str(s: &str) -> Result<Self> {
        let (tag, value) = s.split_once(':').ok_or_else(|| {
            TileJoinError::Config(format!(
                "output field '{s}' must look like a:<idx>, b:<idx>, or stat:<name>"
            ))
        })?;
        match tag.to_lowercase().as_str() {
            "a" | "1" => Ok(Self::First(parse_position(value)?)),
            "b" | "2" => Ok(Self::Second(parse_position(value)?)),
            "stat" => Ok(Self::Stat(value.parse()?)),
            other => Err(TileJoinError::Config(format!(
                "unknown output field source: {other}"
            ))),
        }
    }
}

fn parse_position(value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| TileJoinError::Config(format!("invalid field position: {value}")))
}

/// Immutable query operator for the duration of a run
#[derive(Debug, Clone)]
pub struct QueryOp {
    /// 1 for a self-join, 2 for a two-dataset join
    pub join_cardinality: u8,
    /// Geometry field position in dataset 1 records
    pub shape_idx_1: usize,
    /// Geometry field position in dataset 2 records
    pub shape_idx_2: usize,
    pub join_predicate: JoinPredicate,
    /// Buffer radius applied to the A side before predicate evaluation;
    /// doubles as the dwithin distance. 0 disables buffering.
    pub expansion_distance: f64,
    /// Neighbors retained per object by the k-NN evaluator
    pub k: usize,
    /// Rank and report great-circle instead of Euclidean distances
    pub earth_distance: bool,
    /// Output projection; empty means all raw fields of both sides
    pub output_fields: Vec<OutputField>,
    pub use_cache_file: bool,
    pub cache_file_path: Option<PathBuf>,
}

impl QueryOp {
    /// Check the operator before any input is read
    pub fn validated(self) -> Result<Self> {
        if !(1..=2).contains(&self.join_cardinality) {
            return Err(TileJoinError::Config(format!(
                "join cardinality {} does not match engine capacity",
                self.join_cardinality
            )));
        }
        if self.k < 1 {
            return Err(TileJoinError::Config("k must be at least 1".to_string()));
        }
        if !self.expansion_distance.is_finite() || self.expansion_distance < 0.0 {
            return Err(TileJoinError::Config(format!(
                "invalid expansion distance: {}",
                self.expansion_distance
            )));
        }
        if self.use_cache_file && self.cache_file_path.is_none() {
            return Err(TileJoinError::Config(
                "cache-file mode requires a cache file path".to_string(),
            ));
        }
        Ok(self)
    }

    /// The side the second logical dataset resolves to; a self-join runs
    /// both sides of the join against dataset 1
    pub fn sid_second(&self) -> Sid {
        if self.join_cardinality == 1 {
            Sid::One
        } else {
            Sid::Two
        }
    }

    /// Geometry field position for records of the given side
    pub fn shape_idx(&self, sid: Sid) -> usize {
        match sid {
            Sid::One => self.shape_idx_1,
            Sid::Two => self.shape_idx_2,
        }
    }

    /// True when any listed output field references an area statistic
    pub fn needs_area_stats(&self) -> bool {
        use DerivedStat::*;
        self.output_fields.iter().any(|field| {
            matches!(
                field,
                OutputField::Stat(Area1 | Area2 | UnionArea | IntersectArea | Jaccard | Dice)
            )
        })
    }

    /// True when the minimum-distance statistic is referenced
    pub fn needs_distance_stat(&self) -> bool {
        self.output_fields
            .iter()
            .any(|field| matches!(field, OutputField::Stat(DerivedStat::MinDistance)))
    }
}

/// Per-tile derived values available to the output projection
#[derive(Debug, Clone, Default)]
pub struct QueryScratch {
    pub area_1: f64,
    pub area_2: f64,
    pub union_area: f64,
    pub intersect_area: f64,
    pub jaccard: f64,
    pub dice: f64,
    pub distance: f64,
    pub tile_id: String,
}
