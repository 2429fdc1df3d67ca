//! Layer 5: Curvature
//!
//! # Purpose
//!
//! This layer computes curvature measures on triangulated data: the
//! corrected normal current measures μ₀, μ₁, μ₂ and the anisotropic
//! tensor μ_XY, evaluated per triangle from interpolated per-vertex
//! normals, plus the extraction of principal curvatures and directions
//! from accumulated tensors.

/// Corrected normal current measures on triangles.
pub mod cnc;
