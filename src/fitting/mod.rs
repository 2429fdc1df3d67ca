//! Layer 4: Fitting
//!
//! # Purpose
//!
//! This layer implements the weighted fitting pipeline:
//! - The fit state machine (`FitResult`)
//! - Accumulator layers shared by the primitive fits
//! - Plane and tangent-frame primitives
//! - The primitive fits (covariance plane, mean plane, Monge patch,
//!   parabolic cylinder)
//! - Curvature derivations from quadric height fields
//!
//! A fit is constructed with a weight functor, reset with `init`, fed
//! weighted neighbors, and resolved by `finalize`, which may request
//! another complete pass over the neighborhood.

/// Fit state machine.
pub mod status;

/// Accumulator layers.
pub mod accumulators;

/// Plane primitive and tangent frame.
pub mod plane;

/// Curvature derivations from quadric height fields.
pub mod quadric;

/// The fitting procedure trait and multi-pass protocol.
pub mod procedure;

/// Plane fit from the weighted covariance of positions.
pub mod covariance_plane;

/// Plane fit from the weighted mean of oriented normals.
pub mod mean_plane;

/// Two-pass quadric patch fit.
pub mod monge;

/// Rank-1 restricted quadric (parabolic cylinder) fit.
pub mod cylinder;
