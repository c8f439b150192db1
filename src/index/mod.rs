//! Per-tile spatial indexing
//!
//! R-tree index over the local ids of one tile side, bulk loaded once per
//! tile and dropped together with its backing storage at tile end. Bulk
//! loading uses Sort-Tile-Recursive packing; the R*-variant split constants
//! below play the role of leaf capacity, index capacity, and fill factor.

use crate::error::{Result, TileJoinError};
use geo_types::Rect;
use rstar::{
    Envelope, PointDistance, RStarInsertionStrategy, RTree, RTreeObject, RTreeParams, AABB,
};

/// Node parameters for the per-tile R*-tree
pub struct TileTreeParams;

impl RTreeParams for TileTreeParams {
    const MIN_SIZE: usize = 20;
    const MAX_SIZE: usize = 50;
    const REINSERTION_COUNT: usize = 10;
    type DefaultInsertionStrategy = RStarInsertionStrategy;
}

/// An index entry carrying a tile-local id and its cached envelope
#[derive(Debug, Clone, PartialEq)]
pub struct TileEntry {
    /// Ordinal position of the object within its tile side
    pub local_id: usize,
    envelope: AABB<[f64; 2]>,
}

impl TileEntry {
    fn new(local_id: usize, rect: &Rect<f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self {
            local_id,
            envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]),
        }
    }
}

impl RTreeObject for TileEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for TileEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope.distance_2(point)
    }
}

/// A bulk-loaded spatial index over one tile side's geometries
pub struct TileIndex {
    tree: RTree<TileEntry, TileTreeParams>,
}

impl TileIndex {
    /// Bulk load an index from the envelopes of a tile side
    ///
    /// Entry ordinals become the index's local ids. The loaded tree is
    /// validated against the input count before it is handed out.
    pub fn bulk_load(envelopes: &[Rect<f64>]) -> Result<Self> {
        let entries: Vec<TileEntry> = envelopes
            .iter()
            .enumerate()
            .map(|(local_id, rect)| TileEntry::new(local_id, rect))
            .collect();
        let expected = entries.len();

        let tree: RTree<TileEntry, TileTreeParams> = RTree::bulk_load_with_params(entries);
        if tree.size() != expected {
            return Err(TileJoinError::Index(format!(
                "bulk load produced {} entries, expected {expected}",
                tree.size()
            )));
        }

        Ok(Self { tree })
    }

    /// Local ids of entries whose envelopes intersect the query rectangle,
    /// in ascending local-id order
    pub fn query_envelope(&self, rect: &Rect<f64>) -> Vec<usize> {
        let min = rect.min();
        let max = rect.max();
        let aabb = AABB::from_corners([min.x, min.y], [max.x, max.y]);

        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|entry| entry.local_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Local ids ordered by ascending envelope distance from the query point
    pub fn nearest_neighbors(&self, point: [f64; 2]) -> impl Iterator<Item = usize> + '_ {
        self.tree
            .nearest_neighbor_iter(&point)
            .map(|entry| entry.local_id)
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
