//! Precomputed k-nearest-neighbor graph.
//!
//! ## Purpose
//!
//! Repeated neighborhood queries at the cloud's own points can amortize
//! the k-d tree descent: this module materializes the `k` nearest
//! neighbors of every point once and answers subsequent queries from the
//! adjacency lists. Range queries expand breadth-style through the graph
//! instead of descending the tree.
//!
//! ## Invariants
//!
//! * Every adjacency list holds exactly `k` entries, sorted by ascending
//!   squared distance, and never contains the point itself.
//! * The graph is immutable after construction.
//!
//! ## Non-goals
//!
//! * Graph range expansion only reaches points connected to the seed
//!   through edges shorter than the radius; it trades exactness for
//!   locality and speed.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::{ToPrimitive, Zero};

// Internal dependencies
use crate::primitives::errors::PointFitError;
use crate::primitives::point::Point;
use crate::spatial::kdtree::KdTree;
use crate::spatial::query::Neighborhood;

// ============================================================================
// KnnGraph
// ============================================================================

/// Precomputed k-nearest-neighbor adjacency over a point cloud.
#[derive(Debug, Clone)]
pub struct KnnGraph<P: Point> {
    k: usize,
    points: Vec<P>,
    indices: Vec<usize>,
}

impl<P: Point> KnnGraph<P> {
    /// Build the graph by querying the tree for every point.
    ///
    /// Requires `1 <= k <= sample_count - 1` so every adjacency list can
    /// hold exactly `k` neighbors.
    pub fn new(tree: &KdTree<P>, k: usize) -> Result<Self, PointFitError> {
        let n = tree.sample_count();
        if n == 0 {
            return Err(PointFitError::EmptyIndex);
        }
        if k == 0 {
            return Err(PointFitError::InvalidNeighborCount(k));
        }
        if k > n - 1 {
            return Err(PointFitError::TooManyGraphNeighbors {
                requested: k,
                available: n - 1,
            });
        }

        let mut indices = Vec::with_capacity(n * k);
        for i in 0..n {
            let neighborhood = tree.k_nearest_neighbors_by_index(i, k)?;
            indices.extend_from_slice(&neighborhood.indices);
        }

        Ok(Self {
            k,
            points: tree.points().to_vec(),
            indices,
        })
    }

    /// Number of points in the graph.
    #[inline]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Neighbors stored per point.
    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    /// The point container the graph was built over.
    #[inline]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// The `k` nearest neighbors of `index`, ascending by squared
    /// distance.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of bounds.
    #[inline]
    pub fn k_nearest_neighbors(&self, index: usize) -> &[usize] {
        &self.indices[index * self.k..(index + 1) * self.k]
    }

    /// Points reachable from `index` through graph edges while staying
    /// strictly within `radius` of the seed position. The seed itself is
    /// excluded.
    pub fn range_neighbors(
        &self,
        index: usize,
        radius: P::Scalar,
    ) -> Result<Neighborhood<P::Scalar>, PointFitError> {
        let n = self.points.len();
        if index >= n {
            return Err(PointFitError::IndexOutOfBounds { index, size: n });
        }
        let r = radius.to_f64().unwrap_or(f64::NAN);
        if !r.is_finite() || r < 0.0 {
            return Err(PointFitError::InvalidRadius(r));
        }

        let seed_pos = self.points[index].pos();
        let squared_radius = radius * radius;

        let mut visited = Vec::new();
        visited.resize(n, false);
        visited[index] = true;

        let mut frontier: Vec<(usize, P::Scalar)> = Vec::new();
        frontier.push((index, P::Scalar::zero()));

        let mut neighborhood = Neighborhood::default();
        while let Some((current, squared_distance)) = frontier.pop() {
            if current != index {
                neighborhood.indices.push(current);
                neighborhood.squared_distances.push(squared_distance);
            }
            for &neighbor in self.k_nearest_neighbors(current) {
                if visited[neighbor] {
                    continue;
                }
                let d = (seed_pos - self.points[neighbor].pos()).norm_squared();
                if d < squared_radius {
                    visited[neighbor] = true;
                    frontier.push((neighbor, d));
                }
            }
        }
        Ok(neighborhood)
    }
}
