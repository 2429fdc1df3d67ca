//! # pointfit-rs — Local differential-geometric analysis of point clouds
//!
//! This crate fits local primitives (planes, quadric patches, parabolic
//! cylinders) at chosen evaluation points of an unstructured point cloud
//! by weighted aggregation of nearby samples, and derives geometric
//! quantities from them: normals, tangent frames, mean, Gaussian, and
//! principal curvatures, and principal curvature directions. It also
//! provides the spatial acceleration structures needed to select those
//! neighbors efficiently: an exact k-d tree and a precomputed
//! k-nearest-neighbor graph.
//!
//! ## How a fit works
//!
//! 1. Pick an evaluation position and a weight kernel with an evaluation
//!    radius.
//! 2. Select the neighborhood (k-d tree range query, k-nearest query, or
//!    graph expansion).
//! 3. Stream the weighted neighbors into a fit object; `finalize` either
//!    completes (`Stable`), requests another pass over the same
//!    neighborhood (`NeedOtherPass`, used by the two-pass quadric patch),
//!    or reports a degeneracy.
//! 4. Query the fitted primitive: projection, potential, curvatures,
//!    principal directions.
//!
//! The driver functions in this crate run steps 2–3 for you.
//!
//! ## Quick Start
//!
//! ```rust
//! use pointfit_rs::prelude::*;
//! use nalgebra::Vector3;
//!
//! // A flat grid of samples with upward normals.
//! let mut points = Vec::new();
//! for i in 0..10 {
//!     for j in 0..10 {
//!         let pos = Vector3::new(i as f64 * 0.1, j as f64 * 0.1, 0.0);
//!         points.push(SamplePoint::with_normal(pos, Vector3::z()));
//!     }
//! }
//!
//! let tree = KdTree::new(points);
//!
//! // The five nearest samples to a probe position.
//! let probe = Vector3::new(0.45, 0.45, 0.2);
//! let neighbors = tree.k_nearest_neighbors(&probe, 5)?;
//! assert_eq!(neighbors.len(), 5);
//!
//! // Fit a plane around the probe.
//! let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.4);
//! let mut fit = MeanPlaneFit::new(weight);
//! let status = fit_at(&mut fit, &tree, &probe)?;
//! assert_eq!(status, FitResult::Stable);
//! assert!(fit.normal().z.abs() > 0.99);
//! # Result::<(), PointFitError>::Ok(())
//! ```
//!
//! ## Error handling
//!
//! Structural misuse — querying an empty index, invalid parameters,
//! out-of-range indices — returns [`PointFitError`](prelude::PointFitError).
//! Recoverable numerical conditions — zero weight mass, rank-deficient
//! neighborhoods — are encoded in the fit state
//! ([`FitResult`](prelude::FitResult)) so callers can skip degenerate
//! evaluation points without unwinding.
//!
//! ## Concurrency
//!
//! Trees and graphs are immutable after construction and safe to share
//! across threads. Every query and every fit owns its mutable state, so
//! the intended parallelism is across evaluation points: one fit object
//! per task, one shared index.
//!
//! ## `no_std`
//!
//! Disable the default `std` feature for `no_std` environments; the crate
//! then depends on `alloc` only.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

/// Re-export of the linear-algebra backend used in the public API.
pub use nalgebra;

// ============================================================================
// Internal Modules
// ============================================================================

// Layer 1: Primitives - errors, the bounded stack, the point abstraction.
mod primitives;

// Layer 2: Math - weight kernels and the linear-algebra bridge.
mod math;

// Layer 3: Spatial - k-d tree, traversal, k-nearest-neighbor graph.
mod spatial;

// Layer 4: Fitting - accumulators, primitives, the fit state machine.
mod fitting;

// Layer 5: Curvature - corrected normal current measures on triangles.
mod curvature;

// Layer 6: Engine - validation and fit orchestration.
mod engine;

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and entry points.
///
/// This module is intended to be wildcard-imported:
///
/// ```
/// use pointfit_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::curvature::cnc::{
        curvatures_from_tensor, mu0, mu1, mu2, mu_xy, SphericalTriangle,
    };
    pub use crate::engine::driver::{fit_at, fit_at_index, fit_in_graph, fit_with_knn};
    pub use crate::engine::validator::Validator;
    pub use crate::fitting::covariance_plane::CovariancePlaneFit;
    pub use crate::fitting::cylinder::ParabolicCylinderFit;
    pub use crate::fitting::mean_plane::MeanPlaneFit;
    pub use crate::fitting::monge::MongePatchFit;
    pub use crate::fitting::plane::{Plane, PlaneFrame};
    pub use crate::fitting::procedure::{FittingProcedure, MAX_PASS_COUNT};
    pub use crate::fitting::quadric::HeightQuadric;
    pub use crate::fitting::status::FitResult;
    pub use crate::math::kernel::{DistWeightFunc, WeightFunction};
    pub use crate::math::linalg::FloatLinalg;
    pub use crate::primitives::errors::PointFitError;
    pub use crate::primitives::point::{Point, SamplePoint};
    pub use crate::spatial::kdtree::{KdNode, KdTree, DEFAULT_LEAF_SIZE, MAX_DEPTH};
    pub use crate::spatial::knn_graph::KnnGraph;
    pub use crate::spatial::query::Neighborhood;
}

// ============================================================================
// Testing re-exports
// ============================================================================

/// Internal modules for development and testing.
///
/// **Warning**: these are implementation details and may change without
/// notice. Do not use in production code.
#[cfg(feature = "dev")]
pub mod internals {
    /// Internal primitive types and utilities.
    pub mod primitives {
        pub use crate::primitives::*;
    }
    /// Internal math functions.
    pub mod math {
        pub use crate::math::*;
    }
    /// Internal spatial structures.
    pub mod spatial {
        pub use crate::spatial::*;
    }
    /// Internal fitting pipeline.
    pub mod fitting {
        pub use crate::fitting::*;
    }
    /// Internal curvature measures.
    pub mod curvature {
        pub use crate::curvature::*;
    }
    /// Internal engine.
    pub mod engine {
        pub use crate::engine::*;
    }
}
