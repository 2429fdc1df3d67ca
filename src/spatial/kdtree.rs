//! K-d tree construction and storage.
//!
//! ## Purpose
//!
//! This module implements a static k-d tree over a point container. The
//! tree accelerates k-nearest-neighbor, radius, and nearest-point queries
//! from O(n) to roughly O(log n) per query.
//!
//! ## Design notes
//!
//! * **Flattened representation**: nodes are stored depth-first in a
//!   linear vector; the two children of an inner node are adjacent, so a
//!   node stores a single child link.
//! * **Sample permutation**: leaves reference contiguous ranges of a
//!   permutation of point indices, keeping leaf scans cache-friendly and
//!   the point container untouched.
//! * **Balanced splits**: the split dimension is the longest extent of the
//!   current bounding box and the split position is the median, so the
//!   depth stays within [`MAX_DEPTH`] for any input the index can hold.
//!
//! ## Invariants
//!
//! * Every sample index appears in exactly one leaf.
//! * The sample permutation is a bijection over `[0, sample_count)`.
//! * Node depth never exceeds [`MAX_DEPTH`].
//!
//! ## Non-goals
//!
//! * No dynamic insertion or deletion.
//! * No approximate search; queries are exact.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::Equal;
use nalgebra::Vector3;
use num_traits::ToPrimitive;

// Internal dependencies
use crate::primitives::errors::PointFitError;
use crate::primitives::point::Point;
use crate::spatial::query::{
    traverse, KnnVisitor, Neighborhood, NearestVisitor, RangeVisitor,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum tree depth; bounds the traversal stack.
pub const MAX_DEPTH: usize = 32;

/// Default leaf capacity.
pub const DEFAULT_LEAF_SIZE: usize = 32;

// ============================================================================
// Nodes
// ============================================================================

/// A node of the flattened k-d tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KdNode<T> {
    /// A leaf referencing a contiguous range of the sample permutation.
    Leaf {
        /// First sample of the leaf.
        start: usize,
        /// Number of samples in the leaf.
        size: usize,
    },
    /// An inner node splitting space along an axis; children are stored at
    /// `first_child` and `first_child + 1`.
    Inner {
        /// Split axis.
        split_dim: usize,
        /// Split position along the axis.
        split_value: T,
        /// Index of the near child; the far child follows it.
        first_child: usize,
    },
}

// ============================================================================
// KdTree
// ============================================================================

/// A static k-d tree over a point container.
#[derive(Debug, Clone)]
pub struct KdTree<P: Point> {
    points: Vec<P>,
    nodes: Vec<KdNode<P::Scalar>>,
    samples: Vec<usize>,
    leaf_size: usize,
}

impl<P: Point> KdTree<P> {
    /// Build a tree with the default leaf capacity.
    pub fn new(points: Vec<P>) -> Self {
        Self::build(points, DEFAULT_LEAF_SIZE)
    }

    /// Build a tree with an explicit leaf capacity.
    pub fn with_leaf_size(points: Vec<P>, leaf_size: usize) -> Result<Self, PointFitError> {
        if leaf_size == 0 {
            return Err(PointFitError::InvalidLeafSize(leaf_size));
        }
        Ok(Self::build(points, leaf_size))
    }

    fn build(points: Vec<P>, leaf_size: usize) -> Self {
        let n = points.len();
        let mut samples: Vec<usize> = (0..n).collect();
        let mut nodes = Vec::new();

        if n > 0 {
            nodes.push(KdNode::Leaf { start: 0, size: n });
            build_node(&points, &mut samples, &mut nodes, 0, 0, n, 0, leaf_size);
        }

        Self {
            points,
            nodes,
            samples,
            leaf_size,
        }
    }

    /// Number of indexed samples.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// The indexed point container.
    #[inline]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// The flattened node array.
    #[inline]
    pub fn nodes(&self) -> &[KdNode<P::Scalar>] {
        &self.nodes
    }

    /// Resolve a sample slot to its point index.
    #[inline]
    pub fn point_from_sample(&self, sample: usize) -> usize {
        self.samples[sample]
    }

    /// The leaf capacity the tree was built with.
    #[inline]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The `k` nearest samples to an arbitrary position, ascending by
    /// squared distance.
    ///
    /// When `k` exceeds the sample count, all samples are returned.
    pub fn k_nearest_neighbors(
        &self,
        point: &Vector3<P::Scalar>,
        k: usize,
    ) -> Result<Neighborhood<P::Scalar>, PointFitError> {
        let mut visitor = KnnVisitor::new(k, None);
        traverse(self, point, &mut visitor)?;
        Ok(visitor.into_neighborhood())
    }

    /// The `k` nearest samples to the point at `index`, excluding the
    /// point itself.
    pub fn k_nearest_neighbors_by_index(
        &self,
        index: usize,
        k: usize,
    ) -> Result<Neighborhood<P::Scalar>, PointFitError> {
        self.check_index(index)?;
        let point = self.points[index].pos();
        let mut visitor = KnnVisitor::new(k, Some(index));
        traverse(self, &point, &mut visitor)?;
        Ok(visitor.into_neighborhood())
    }

    /// All samples strictly within `radius` of an arbitrary position.
    pub fn range_neighbors(
        &self,
        point: &Vector3<P::Scalar>,
        radius: P::Scalar,
    ) -> Result<Neighborhood<P::Scalar>, PointFitError> {
        self.check_radius(radius)?;
        let mut visitor = RangeVisitor::new(radius * radius, None);
        traverse(self, point, &mut visitor)?;
        Ok(visitor.into_neighborhood())
    }

    /// All samples strictly within `radius` of the point at `index`,
    /// excluding the point itself.
    pub fn range_neighbors_by_index(
        &self,
        index: usize,
        radius: P::Scalar,
    ) -> Result<Neighborhood<P::Scalar>, PointFitError> {
        self.check_index(index)?;
        self.check_radius(radius)?;
        let point = self.points[index].pos();
        let mut visitor = RangeVisitor::new(radius * radius, Some(index));
        traverse(self, &point, &mut visitor)?;
        Ok(visitor.into_neighborhood())
    }

    /// The sample closest to an arbitrary position.
    pub fn nearest_neighbor(&self, point: &Vector3<P::Scalar>) -> Result<usize, PointFitError> {
        let mut visitor = NearestVisitor::new(None);
        traverse(self, point, &mut visitor)?;
        visitor.best_index().ok_or(PointFitError::NoNeighborFound)
    }

    /// The sample closest to the point at `index`, excluding the point
    /// itself.
    pub fn nearest_neighbor_by_index(&self, index: usize) -> Result<usize, PointFitError> {
        self.check_index(index)?;
        let point = self.points[index].pos();
        let mut visitor = NearestVisitor::new(Some(index));
        traverse(self, &point, &mut visitor)?;
        visitor.best_index().ok_or(PointFitError::NoNeighborFound)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn check_index(&self, index: usize) -> Result<(), PointFitError> {
        if index >= self.points.len() {
            return Err(PointFitError::IndexOutOfBounds {
                index,
                size: self.points.len(),
            });
        }
        Ok(())
    }

    fn check_radius(&self, radius: P::Scalar) -> Result<(), PointFitError> {
        let r = radius.to_f64().unwrap_or(f64::NAN);
        if !r.is_finite() || r < 0.0 {
            return Err(PointFitError::InvalidRadius(r));
        }
        Ok(())
    }
}

// ============================================================================
// Construction
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn build_node<P: Point>(
    points: &[P],
    samples: &mut [usize],
    nodes: &mut Vec<KdNode<P::Scalar>>,
    node_id: usize,
    start: usize,
    end: usize,
    depth: usize,
    leaf_size: usize,
) {
    let count = end - start;
    if count <= leaf_size || depth >= MAX_DEPTH - 1 {
        nodes[node_id] = KdNode::Leaf { start, size: count };
        return;
    }

    // Split along the longest extent of the range's bounding box.
    let first = points[samples[start]].pos();
    let mut min = first;
    let mut max = first;
    for &sample in &samples[start + 1..end] {
        let pos = points[sample].pos();
        for dim in 0..3 {
            if pos[dim] < min[dim] {
                min[dim] = pos[dim];
            }
            if pos[dim] > max[dim] {
                max[dim] = pos[dim];
            }
        }
    }
    let mut split_dim = 0;
    for dim in 1..3 {
        if max[dim] - min[dim] > max[split_dim] - min[split_dim] {
            split_dim = dim;
        }
    }

    // Median partition keeps the tree balanced.
    let mid = count / 2;
    samples[start..end].select_nth_unstable_by(mid, |&a, &b| {
        points[a].pos()[split_dim]
            .partial_cmp(&points[b].pos()[split_dim])
            .unwrap_or(Equal)
    });
    let split_value = points[samples[start + mid]].pos()[split_dim];

    let first_child = nodes.len();
    nodes.push(KdNode::Leaf { start: 0, size: 0 });
    nodes.push(KdNode::Leaf { start: 0, size: 0 });
    nodes[node_id] = KdNode::Inner {
        split_dim,
        split_value,
        first_child,
    };

    build_node(
        points,
        samples,
        nodes,
        first_child,
        start,
        start + mid,
        depth + 1,
        leaf_size,
    );
    build_node(
        points,
        samples,
        nodes,
        first_child + 1,
        start + mid,
        end,
        depth + 1,
        leaf_size,
    );
}
