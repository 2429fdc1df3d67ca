//! Neighborhood selection and fit orchestration.
//!
//! ## Purpose
//!
//! Entry points tying the pieces together: pick an evaluation point,
//! gather its neighborhood from a k-d tree or a k-nearest-neighbor graph,
//! and drive the fit through its bounded multi-pass protocol. The
//! neighborhood radius is the evaluation radius of the fit's weight
//! functor, so the streamed samples exactly cover the kernel support.
//!
//! ## Concurrency
//!
//! Each call owns its fit and its traversal state; many fits may run
//! concurrently over the same immutable tree or graph.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use nalgebra::Vector3;

// Internal dependencies
use crate::engine::validator::Validator;
use crate::fitting::procedure::FittingProcedure;
use crate::fitting::status::FitResult;
use crate::primitives::errors::PointFitError;
use crate::primitives::point::Point;
use crate::spatial::kdtree::KdTree;
use crate::spatial::knn_graph::KnnGraph;

// ============================================================================
// Tree-Based Fitting
// ============================================================================

/// Fit at an arbitrary position, using the tree samples inside the weight
/// functor's evaluation radius.
pub fn fit_at<P, F>(
    fit: &mut F,
    tree: &KdTree<P>,
    eval_pos: &Vector3<P::Scalar>,
) -> Result<FitResult, PointFitError>
where
    P: Point,
    F: FittingProcedure<P>,
{
    let radius = fit.weight_func().eval_radius();
    Validator::validate_radius(radius)?;

    fit.init(*eval_pos);
    let neighborhood = tree.range_neighbors(eval_pos, radius)?;
    Ok(fit.compute_with_ids(&neighborhood.indices, tree.points()))
}

/// Fit at a cloud point; the point participates in its own neighborhood.
pub fn fit_at_index<P, F>(
    fit: &mut F,
    tree: &KdTree<P>,
    index: usize,
) -> Result<FitResult, PointFitError>
where
    P: Point,
    F: FittingProcedure<P>,
{
    Validator::validate_index(index, tree.points().len())?;
    let eval_pos = tree.points()[index].pos();
    fit_at(fit, tree, &eval_pos)
}

/// Fit at a cloud point over its `k` nearest neighbors, plus the point
/// itself.
///
/// Neighbors outside the weight functor's evaluation radius receive zero
/// weight and are dropped.
pub fn fit_with_knn<P, F>(
    fit: &mut F,
    tree: &KdTree<P>,
    index: usize,
    k: usize,
) -> Result<FitResult, PointFitError>
where
    P: Point,
    F: FittingProcedure<P>,
{
    Validator::validate_index(index, tree.points().len())?;
    Validator::validate_neighbor_count(k)?;

    let eval_pos = tree.points()[index].pos();
    fit.init(eval_pos);

    let neighborhood = tree.k_nearest_neighbors_by_index(index, k)?;
    let mut ids = Vec::with_capacity(neighborhood.len() + 1);
    ids.push(index);
    ids.extend(neighborhood.iter());
    Ok(fit.compute_with_ids(&ids, tree.points()))
}

// ============================================================================
// Graph-Based Fitting
// ============================================================================

/// Fit at a cloud point using the graph range expansion for neighbor
/// selection; the seed participates in its own neighborhood.
pub fn fit_in_graph<P, F>(
    fit: &mut F,
    graph: &KnnGraph<P>,
    index: usize,
) -> Result<FitResult, PointFitError>
where
    P: Point,
    F: FittingProcedure<P>,
{
    Validator::validate_index(index, graph.size())?;
    let radius = fit.weight_func().eval_radius();
    Validator::validate_radius(radius)?;

    let eval_pos = graph.points()[index].pos();
    fit.init(eval_pos);

    let neighborhood = graph.range_neighbors(index, radius)?;
    let mut ids = Vec::with_capacity(neighborhood.len() + 1);
    ids.push(index);
    ids.extend(neighborhood.iter());
    Ok(fit.compute_with_ids(&ids, graph.points()))
}
