//! Spatial index over building envelopes.

use rstar::{RTree, RTreeObject, AABB};

use crate::models::BuildingBoundary;

/// Wrapper for R-tree indexing of a boundary by its declared position
#[derive(Debug, Clone)]
struct IndexedEnvelope {
    order: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over boundary bounding boxes, used to prune candidates before ray casting
pub struct EnvelopeIndex {
    tree: RTree<IndexedEnvelope>,
}

impl EnvelopeIndex {
    /// Build the index; entry `i` refers to `boundaries[i]`
    pub fn build(boundaries: &[BuildingBoundary]) -> Self {
        let entries: Vec<IndexedEnvelope> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(order, b)| {
                let (min_x, min_y, max_x, max_y) = b.bbox()?;
                Some(IndexedEnvelope {
                    order,
                    envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Declared positions of every boundary whose envelope covers the point, ascending
    pub fn candidates(&self, lon: f64, lat: f64) -> Vec<usize> {
        let query_envelope = AABB::from_point([lon, lat]);
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|e| e.order)
            .collect();
        found.sort_unstable();
        found
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
