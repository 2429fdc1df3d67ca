//! Shared traversal machinery and query results.
//!
//! ## Purpose
//!
//! All k-d tree queries run the same iterative best-first descent; only
//! the pruning threshold, skip rule, and per-neighbor action differ. This
//! module implements the descent once over a bounded stack and
//! parameterizes it with a [`TreeVisitor`], then provides the visitors for
//! the public query variants.
//!
//! ## Key concepts
//!
//! * **Descent threshold**: the current best squared distance; subtrees
//!   and samples at or beyond it are pruned.
//! * **Best-first order**: at an inner node the nearer child is processed
//!   first while the farther child stays on the stack with the squared
//!   distance to the splitting plane.
//! * **Cooperative abort**: a visitor returning `true` from `process`
//!   terminates the traversal.
//!
//! ## Invariants
//!
//! * At most two frames are live per visited depth, so a stack of
//!   `2 * MAX_DEPTH` frames never overflows.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BinaryHeap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BinaryHeap;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering;
use nalgebra::Vector3;
use num_traits::Zero;

// Internal dependencies
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::PointFitError;
use crate::primitives::point::Point;
use crate::primitives::stack::BoundedStack;
use crate::spatial::kdtree::{KdNode, KdTree, MAX_DEPTH};

// Capacity of the traversal stack.
const STACK_CAPACITY: usize = 2 * MAX_DEPTH;

// ============================================================================
// Query Result
// ============================================================================

/// Result of a neighborhood query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood<T> {
    /// Point indices of the neighbors.
    pub indices: Vec<usize>,

    /// Squared distance to each neighbor, in the same order.
    pub squared_distances: Vec<T>,
}

impl<T: FloatLinalg> Neighborhood<T> {
    /// Number of neighbors.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true when the neighborhood is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over the neighbor indices.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

// ============================================================================
// Heap Entry
// ============================================================================

/// A point index paired with its squared distance to the query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IndexSquaredDistance<T> {
    pub index: usize,
    pub squared_distance: T,
}

impl<T: FloatLinalg> PartialEq for IndexSquaredDistance<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: FloatLinalg> Eq for IndexSquaredDistance<T> {}

impl<T: FloatLinalg> PartialOrd for IndexSquaredDistance<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: FloatLinalg> Ord for IndexSquaredDistance<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.squared_distance
            .partial_cmp(&other.squared_distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.index.cmp(&other.index))
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Per-query behavior plugged into the shared descent.
pub(crate) trait TreeVisitor<T: FloatLinalg> {
    /// Squared distance pruning subtrees and samples.
    fn descent_threshold(&self) -> T;

    /// Whether a point index must be ignored.
    #[inline]
    fn skip(&self, _index: usize) -> bool {
        false
    }

    /// Handle an admitted neighbor; return `true` to abort the traversal.
    fn process(&mut self, index: usize, sample: usize, squared_distance: T) -> bool;
}

/// One live frame of the descent.
#[derive(Debug, Clone, Copy)]
struct QueryFrame<T> {
    node: usize,
    squared_distance: T,
}

impl<T: FloatLinalg> Default for QueryFrame<T> {
    fn default() -> Self {
        Self {
            node: 0,
            squared_distance: T::zero(),
        }
    }
}

/// Run the iterative best-first descent for one query.
pub(crate) fn traverse<P, V>(
    tree: &KdTree<P>,
    point: &Vector3<P::Scalar>,
    visitor: &mut V,
) -> Result<(), PointFitError>
where
    P: Point,
    V: TreeVisitor<P::Scalar>,
{
    let nodes = tree.nodes();
    let points = tree.points();
    if nodes.is_empty() || tree.sample_count() == 0 {
        return Err(PointFitError::EmptyIndex);
    }

    let mut stack: BoundedStack<QueryFrame<P::Scalar>, STACK_CAPACITY> = BoundedStack::new();
    stack.push(QueryFrame {
        node: 0,
        squared_distance: P::Scalar::zero(),
    });

    while let Some(frame) = stack.pop() {
        if frame.squared_distance >= visitor.descent_threshold() {
            continue;
        }
        match nodes[frame.node] {
            KdNode::Leaf { start, size } => {
                for sample in start..start + size {
                    let index = tree.point_from_sample(sample);
                    if visitor.skip(index) {
                        continue;
                    }
                    let d = (point - points[index].pos()).norm_squared();
                    if d < visitor.descent_threshold() && visitor.process(index, sample, d) {
                        return Ok(());
                    }
                }
            }
            KdNode::Inner {
                split_dim,
                split_value,
                first_child,
            } => {
                // Keep the farther child under the nearer one so the
                // descent stays best-first.
                let offset = point[split_dim] - split_value;
                let (near, far) = if offset < P::Scalar::zero() {
                    (first_child, first_child + 1)
                } else {
                    (first_child + 1, first_child)
                };
                stack.push(QueryFrame {
                    node: far,
                    squared_distance: offset * offset,
                });
                stack.push(QueryFrame {
                    node: near,
                    squared_distance: frame.squared_distance,
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Visitors
// ============================================================================

/// Bounded max-heap visitor for k-nearest queries.
pub(crate) struct KnnVisitor<T: FloatLinalg> {
    k: usize,
    skip: Option<usize>,
    heap: BinaryHeap<IndexSquaredDistance<T>>,
}

impl<T: FloatLinalg> KnnVisitor<T> {
    pub fn new(k: usize, skip: Option<usize>) -> Self {
        Self {
            k,
            skip,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    /// Heap contents in ascending distance order.
    pub fn into_neighborhood(self) -> Neighborhood<T> {
        let sorted = self.heap.into_sorted_vec();
        let mut neighborhood = Neighborhood {
            indices: Vec::with_capacity(sorted.len()),
            squared_distances: Vec::with_capacity(sorted.len()),
        };
        for entry in sorted {
            neighborhood.indices.push(entry.index);
            neighborhood.squared_distances.push(entry.squared_distance);
        }
        neighborhood
    }
}

impl<T: FloatLinalg> TreeVisitor<T> for KnnVisitor<T> {
    #[inline]
    fn descent_threshold(&self) -> T {
        if self.heap.len() < self.k {
            T::fl(f64::INFINITY)
        } else {
            match self.heap.peek() {
                Some(worst) => worst.squared_distance,
                None => T::zero(),
            }
        }
    }

    #[inline]
    fn skip(&self, index: usize) -> bool {
        self.skip == Some(index)
    }

    #[inline]
    fn process(&mut self, index: usize, _sample: usize, squared_distance: T) -> bool {
        self.heap.push(IndexSquaredDistance {
            index,
            squared_distance,
        });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
        false
    }
}

/// Appending visitor for fixed-radius queries.
pub(crate) struct RangeVisitor<T: FloatLinalg> {
    squared_radius: T,
    skip: Option<usize>,
    neighborhood: Neighborhood<T>,
}

impl<T: FloatLinalg> RangeVisitor<T> {
    pub fn new(squared_radius: T, skip: Option<usize>) -> Self {
        Self {
            squared_radius,
            skip,
            neighborhood: Neighborhood::default(),
        }
    }

    pub fn into_neighborhood(self) -> Neighborhood<T> {
        self.neighborhood
    }
}

impl<T: FloatLinalg> TreeVisitor<T> for RangeVisitor<T> {
    #[inline]
    fn descent_threshold(&self) -> T {
        self.squared_radius
    }

    #[inline]
    fn skip(&self, index: usize) -> bool {
        self.skip == Some(index)
    }

    #[inline]
    fn process(&mut self, index: usize, _sample: usize, squared_distance: T) -> bool {
        self.neighborhood.indices.push(index);
        self.neighborhood.squared_distances.push(squared_distance);
        false
    }
}

/// Single-best visitor for nearest-point queries.
pub(crate) struct NearestVisitor<T: FloatLinalg> {
    skip: Option<usize>,
    best: Option<IndexSquaredDistance<T>>,
}

impl<T: FloatLinalg> NearestVisitor<T> {
    pub fn new(skip: Option<usize>) -> Self {
        Self { skip, best: None }
    }

    pub fn best_index(&self) -> Option<usize> {
        self.best.map(|entry| entry.index)
    }
}

impl<T: FloatLinalg> TreeVisitor<T> for NearestVisitor<T> {
    #[inline]
    fn descent_threshold(&self) -> T {
        match self.best {
            Some(entry) => entry.squared_distance,
            None => T::fl(f64::INFINITY),
        }
    }

    #[inline]
    fn skip(&self, index: usize) -> bool {
        self.skip == Some(index)
    }

    #[inline]
    fn process(&mut self, index: usize, _sample: usize, squared_distance: T) -> bool {
        self.best = Some(IndexSquaredDistance {
            index,
            squared_distance,
        });
        false
    }
}
