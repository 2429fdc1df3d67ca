//! Linear algebra backend abstraction.
//!
//! ## Purpose
//!
//! This module provides a trait-based bridge between the generic fitting
//! core and the nalgebra backend. The fitting pipeline needs exactly two
//! decompositions: a thin-SVD solve of the 6×6 quadric normal system
//! (robust to rank deficiency) and sorted symmetric eigendecompositions of
//! 2×2 and 3×3 matrices.
//!
//! ## Design notes
//!
//! * Decompositions are pure value-returning primitives; no solver state
//!   leaks into the fitting layer.
//! * Eigenpairs are returned sorted by ascending eigenvalue, with
//!   eigenvector columns permuted to match.
//! * Generic over `FloatLinalg` types (f32 and f64) which delegate to the
//!   nalgebra backend.

// External dependencies
use nalgebra::{Matrix2, Matrix3, Matrix6, RealField, Vector2, Vector3, Vector6};
use num_traits::{FromPrimitive, ToPrimitive};

// ============================================================================
// FloatLinalg Trait
// ============================================================================

/// Scalar trait bridging generic code to the nalgebra backend.
pub trait FloatLinalg:
    RealField + FromPrimitive + ToPrimitive + Copy + Default + core::fmt::Debug + 'static
{
    /// Lift an `f64` constant into the scalar type.
    #[inline]
    fn fl(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::zero)
    }

    /// Solve the 6×6 normal system `A·x = b` by thin SVD.
    ///
    /// Returns `None` when the backend cannot produce a solution.
    fn solve_quadric(a: &Matrix6<Self>, b: &Vector6<Self>) -> Option<Vector6<Self>>;

    /// Eigendecompose a symmetric 2×2 matrix.
    ///
    /// Eigenvalues are ascending; eigenvector columns match.
    fn sym_eigen_2x2(m: &Matrix2<Self>) -> (Vector2<Self>, Matrix2<Self>);

    /// Eigendecompose a symmetric 3×3 matrix.
    ///
    /// Eigenvalues are ascending; eigenvector columns match. Returns
    /// `None` when the iteration fails to converge.
    fn sym_eigen_3x3(m: &Matrix3<Self>) -> Option<(Vector3<Self>, Matrix3<Self>)>;
}

impl FloatLinalg for f64 {
    #[inline]
    fn solve_quadric(a: &Matrix6<Self>, b: &Vector6<Self>) -> Option<Vector6<Self>> {
        nalgebra_backend::solve_quadric(a, b)
    }
    #[inline]
    fn sym_eigen_2x2(m: &Matrix2<Self>) -> (Vector2<Self>, Matrix2<Self>) {
        nalgebra_backend::sym_eigen_2x2(m)
    }
    #[inline]
    fn sym_eigen_3x3(m: &Matrix3<Self>) -> Option<(Vector3<Self>, Matrix3<Self>)> {
        nalgebra_backend::sym_eigen_3x3(m)
    }
}

impl FloatLinalg for f32 {
    #[inline]
    fn solve_quadric(a: &Matrix6<Self>, b: &Vector6<Self>) -> Option<Vector6<Self>> {
        nalgebra_backend::solve_quadric(a, b)
    }
    #[inline]
    fn sym_eigen_2x2(m: &Matrix2<Self>) -> (Vector2<Self>, Matrix2<Self>) {
        nalgebra_backend::sym_eigen_2x2(m)
    }
    #[inline]
    fn sym_eigen_3x3(m: &Matrix3<Self>) -> Option<(Vector3<Self>, Matrix3<Self>)> {
        nalgebra_backend::sym_eigen_3x3(m)
    }
}

// ============================================================================
// Nalgebra Backend Implementation
// ============================================================================

/// Nalgebra-based decompositions.
pub mod nalgebra_backend {
    use super::*;

    // Iteration cap for the symmetric eigensolver.
    const EIGEN_MAX_ITERATIONS: usize = 256;

    /// Solve `A·x = b` for a 6×6 system by thin SVD.
    pub fn solve_quadric<T: RealField + Copy>(
        a: &Matrix6<T>,
        b: &Vector6<T>,
    ) -> Option<Vector6<T>> {
        let svd = (*a).svd(true, true);
        svd.solve(b, T::default_epsilon()).ok()
    }

    /// Sorted symmetric eigendecomposition of a 2×2 matrix.
    pub fn sym_eigen_2x2<T: RealField + Copy>(m: &Matrix2<T>) -> (Vector2<T>, Matrix2<T>) {
        let eig = (*m).symmetric_eigen();
        let vals = eig.eigenvalues;
        let vecs = eig.eigenvectors;
        if vals[0] <= vals[1] {
            (vals, vecs)
        } else {
            (
                Vector2::new(vals[1], vals[0]),
                Matrix2::from_columns(&[vecs.column(1).into_owned(), vecs.column(0).into_owned()]),
            )
        }
    }

    /// Sorted symmetric eigendecomposition of a 3×3 matrix.
    pub fn sym_eigen_3x3<T: RealField + Copy>(
        m: &Matrix3<T>,
    ) -> Option<(Vector3<T>, Matrix3<T>)> {
        let eig = (*m).try_symmetric_eigen(T::default_epsilon(), EIGEN_MAX_ITERATIONS)?;
        let vals = eig.eigenvalues;
        let vecs = eig.eigenvectors;

        let mut order = [0usize, 1, 2];
        order.sort_unstable_by(|&i, &j| {
            vals[i]
                .partial_cmp(&vals[j])
                .unwrap_or(core::cmp::Ordering::Equal)
        });

        let sorted_vals = Vector3::new(vals[order[0]], vals[order[1]], vals[order[2]]);
        let sorted_vecs = Matrix3::from_columns(&[
            vecs.column(order[0]).into_owned(),
            vecs.column(order[1]).into_owned(),
            vecs.column(order[2]).into_owned(),
        ]);
        Some((sorted_vals, sorted_vecs))
    }
}
