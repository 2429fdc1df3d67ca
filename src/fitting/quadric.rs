//! Curvature derivations from quadric height fields.
//!
//! ## Purpose
//!
//! The Monge patch and the parabolic cylinder both express a surface as a
//! height field `h(u, v)` over a tangent frame. This module holds the
//! quadric coefficients of such a field and derives differential
//! quantities at the frame origin: mean, Gaussian, and principal
//! curvatures, and principal directions from the 2×2 shape operator
//! `W = I⁻¹·II`.
//!
//! ## Key concepts
//!
//! * **Clamping**: `H² − K` can dip below zero through numerical noise;
//!   it is clamped at zero before the square root.
//! * **First form regularity**: `det(I) = 1 + h_u² + h_v² ≥ 1`, so the
//!   shape operator always exists.

// External dependencies
use nalgebra::{Matrix2, Vector2, Vector6};

// Internal dependencies
use crate::math::linalg::FloatLinalg;

// ============================================================================
// Height Quadric
// ============================================================================

/// Quadric height field `h(u,v) = c_uu·u² + c_vv·v² + c_uv·uv + c_u·u +
/// c_v·v + c_0` over a tangent frame.
#[derive(Debug, Clone, Copy)]
pub struct HeightQuadric<T: FloatLinalg> {
    /// Coefficient of `u²`.
    pub c_uu: T,
    /// Coefficient of `v²`.
    pub c_vv: T,
    /// Coefficient of `uv`.
    pub c_uv: T,
    /// Coefficient of `u`.
    pub c_u: T,
    /// Coefficient of `v`.
    pub c_v: T,
    /// Constant term.
    pub c_0: T,
}

impl<T: FloatLinalg> HeightQuadric<T> {
    /// Read coefficients from a solved normal system, ordered
    /// `(u², v², uv, u, v, 1)`.
    pub fn from_solution(x: &Vector6<T>) -> Self {
        Self {
            c_uu: x[0],
            c_vv: x[1],
            c_uv: x[2],
            c_u: x[3],
            c_v: x[4],
            c_0: x[5],
        }
    }

    /// Height at `(u, v)`.
    #[inline]
    pub fn height(&self, u: T, v: T) -> T {
        self.c_uu * u * u + self.c_vv * v * v + self.c_uv * u * v + self.c_u * u + self.c_v * v
            + self.c_0
    }

    /// Gradient of the height field at `(u, v)`.
    #[inline]
    pub fn gradient(&self, u: T, v: T) -> Vector2<T> {
        Vector2::new(
            T::fl(2.0) * self.c_uu * u + self.c_uv * v + self.c_u,
            T::fl(2.0) * self.c_vv * v + self.c_uv * u + self.c_v,
        )
    }

    // First and second derivatives at the origin.

    #[inline]
    fn dh_u(&self) -> T {
        self.c_u
    }

    #[inline]
    fn dh_v(&self) -> T {
        self.c_v
    }

    #[inline]
    fn dh_uu(&self) -> T {
        T::fl(2.0) * self.c_uu
    }

    #[inline]
    fn dh_vv(&self) -> T {
        T::fl(2.0) * self.c_vv
    }

    #[inline]
    fn dh_uv(&self) -> T {
        self.c_uv
    }

    /// Mean curvature at the origin.
    pub fn k_mean(&self) -> T {
        let one = T::one();
        let two = T::fl(2.0);
        let du = self.dh_u();
        let dv = self.dh_v();
        let g = one + du * du + dv * dv;
        (self.dh_uu() * (one + dv * dv) + self.dh_vv() * (one + du * du)
            - two * self.dh_uv() * du * dv)
            / (two * g * g.sqrt())
    }

    /// Gaussian curvature at the origin.
    pub fn gaussian_curvature(&self) -> T {
        let du = self.dh_u();
        let dv = self.dh_v();
        let g = T::one() + du * du + dv * dv;
        (self.dh_uu() * self.dh_vv() - self.dh_uv() * self.dh_uv()) / (g * g)
    }

    /// Smallest principal curvature at the origin.
    pub fn kmin(&self) -> T {
        let mean = self.k_mean();
        let gauss = self.gaussian_curvature();
        mean - (mean * mean - gauss).max(T::zero()).sqrt()
    }

    /// Largest principal curvature at the origin.
    pub fn kmax(&self) -> T {
        let mean = self.k_mean();
        let gauss = self.gaussian_curvature();
        mean + (mean * mean - gauss).max(T::zero()).sqrt()
    }

    /// Principal directions at the origin, in frame coordinates, ordered
    /// `(kmin, kmax)`.
    pub fn principal_directions(&self) -> (Vector2<T>, Vector2<T>) {
        let one = T::one();
        let du = self.dh_u();
        let dv = self.dh_v();

        let e = one + du * du;
        let f = du * dv;
        let g = one + dv * dv;
        let det = e * g - f * f;
        let norm = (one + du * du + dv * dv).sqrt();

        let first_inv = Matrix2::new(g, -f, -f, e) / det;
        let second = Matrix2::new(self.dh_uu(), self.dh_uv(), self.dh_uv(), self.dh_vv()) / norm;
        let shape = first_inv * second;

        let (_, vecs) = T::sym_eigen_2x2(&shape);
        (vecs.column(0).into_owned(), vecs.column(1).into_owned())
    }
}
