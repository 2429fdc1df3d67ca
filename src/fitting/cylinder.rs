//! Rank-1 restricted quadric (parabolic cylinder) fit.
//!
//! ## Purpose
//!
//! Restricts the quadric patch to a parabolic cylinder: the height field
//! is `h(u,v) = ½·a·(x·u_q·x) + u_l·x` with `x = (u,v)` and `u_q = e·eᵀ`
//! a rank-1 shape built from the dominant eigenvector of the quadric
//! Hessian. The restriction captures surfaces curving along a single
//! direction and yields a closed-form normal derivative.
//!
//! ## Key concepts
//!
//! * **Restriction**: after the quadric solve, the 2×2 Hessian is
//!   eigendecomposed and only its dominant eigenpair is retained.
//! * **Normal derivative**: `B·diag(1, a·u_q)·Bᵀ` over the principal
//!   basis `B = [n, u, v]`, scaled by the lifted linear part.

// External dependencies
use nalgebra::{ComplexField, Matrix2, Matrix3, Vector2, Vector3};

// Internal dependencies
use crate::fitting::monge::MongePatchFit;
use crate::fitting::procedure::FittingProcedure;
use crate::fitting::quadric::HeightQuadric;
use crate::fitting::status::FitResult;
use crate::math::kernel::DistWeightFunc;
use crate::math::linalg::FloatLinalg;
use crate::primitives::point::Point;

// ============================================================================
// Parabolic Cylinder Fit
// ============================================================================

/// Parabolic cylinder fit over a covariance plane.
#[derive(Debug, Clone)]
pub struct ParabolicCylinderFit<T: FloatLinalg> {
    base: MongePatchFit<T>,
    a: T,
    u_l: Vector2<T>,
    u_q: Matrix2<T>,
    correct_orientation: T,
}

impl<T: FloatLinalg> ParabolicCylinderFit<T> {
    /// Create a fit bound to a weight functor.
    pub fn new(weight: DistWeightFunc<T>) -> Self {
        Self {
            base: MongePatchFit::new(weight),
            a: T::zero(),
            u_l: Vector2::zeros(),
            u_q: Matrix2::zeros(),
            correct_orientation: T::one(),
        }
    }

    /// Current state of the fit.
    #[inline]
    pub fn status(&self) -> FitResult {
        self.base.status()
    }

    /// Curvature magnitude along the bent direction.
    #[inline]
    pub fn alpha(&self) -> T {
        self.a
    }

    /// The restricted height field of the cylinder.
    fn restricted_quadric(&self) -> HeightQuadric<T> {
        let half = T::fl(0.5);
        HeightQuadric {
            c_uu: half * self.a * self.u_q[(0, 0)],
            c_vv: half * self.a * self.u_q[(1, 1)],
            c_uv: self.a * self.u_q[(0, 1)],
            c_u: self.u_l.x,
            c_v: self.u_l.y,
            c_0: T::zero(),
        }
    }

    fn eval_quadratic(&self, x: &Vector2<T>) -> T {
        T::fl(0.5) * self.a * (self.u_q * x).dot(x) + self.u_l.dot(x)
    }

    /// Scalar field of the cylinder at a world position.
    pub fn potential(&self, q: &Vector3<T>) -> T {
        let local = self.base.frame_coords_world(q);
        self.correct_orientation * self.eval_quadratic(&Vector2::new(local.y, local.z)) - local.x
    }

    /// Project a world position onto the cylinder along the frame height
    /// axis.
    pub fn project(&self, q: &Vector3<T>) -> Vector3<T> {
        let mut local = self.base.frame_coords_world(q);
        local.x = self.eval_quadratic(&Vector2::new(local.y, local.z));
        self.base.eval_pos()
            + self
                .base
                .plane_fit()
                .frame()
                .from_frame(self.base.plane_fit().plane(), &local)
    }

    /// Gradient of the cylinder potential at a world position.
    pub fn primitive_gradient(&self, q: &Vector3<T>) -> Vector3<T> {
        let local = self.base.frame_coords_world(q);
        let x = Vector2::new(local.y, local.z);
        let df = self.u_l + self.u_q * x * self.a;
        let frame_gradient =
            Vector3::new(T::one(), -df.x, -df.y) * self.correct_orientation;
        self.base
            .plane_fit()
            .frame()
            .direction_from_frame(self.base.plane_fit().plane(), &frame_gradient)
    }

    /// Derivative of the cylinder normal, expressed in world coordinates
    /// over the principal basis.
    pub fn normal_derivative(&self) -> Matrix3<T> {
        let u = self.kmin_direction();
        let v = self.kmax_direction();
        let n = self.primitive_gradient(&self.base.eval_pos());

        let basis = Matrix3::from_columns(&[n, u, v]);

        let mut dn = Matrix3::zeros();
        dn[(0, 0)] = T::one();
        let dn_2d = self.u_q * self.a;
        dn[(1, 1)] = dn_2d[(0, 0)];
        dn[(1, 2)] = dn_2d[(0, 1)];
        dn[(2, 1)] = dn_2d[(1, 0)];
        dn[(2, 2)] = dn_2d[(1, 1)];

        let lifted_linear = self
            .base
            .plane_fit()
            .frame()
            .direction_from_frame(
                self.base.plane_fit().plane(),
                &Vector3::new(T::one(), self.u_l.x, self.u_l.y),
            );
        (basis * dn * basis.transpose()) / lifted_linear.norm()
    }

    /// Mean curvature at the cylinder origin.
    #[inline]
    pub fn k_mean(&self) -> T {
        self.restricted_quadric().k_mean()
    }

    /// Gaussian curvature at the cylinder origin.
    #[inline]
    pub fn gaussian_curvature(&self) -> T {
        self.restricted_quadric().gaussian_curvature()
    }

    /// Smallest principal curvature at the cylinder origin.
    #[inline]
    pub fn kmin(&self) -> T {
        self.restricted_quadric().kmin()
    }

    /// Largest principal curvature at the cylinder origin.
    #[inline]
    pub fn kmax(&self) -> T {
        self.restricted_quadric().kmax()
    }

    /// World direction of the smallest principal curvature.
    pub fn kmin_direction(&self) -> Vector3<T> {
        let (dir, _) = self.restricted_quadric().principal_directions();
        self.base.lift_tangent(&dir)
    }

    /// World direction of the largest principal curvature.
    pub fn kmax_direction(&self) -> Vector3<T> {
        let (_, dir) = self.restricted_quadric().principal_directions();
        self.base.lift_tangent(&dir)
    }
}

impl<T: FloatLinalg, P: Point<Scalar = T>> FittingProcedure<P> for ParabolicCylinderFit<T> {
    #[inline]
    fn weight_func(&self) -> &DistWeightFunc<T> {
        self.base.weight()
    }

    fn init(&mut self, eval_pos: Vector3<T>) {
        self.base.reset(eval_pos);
        self.a = T::zero();
        self.u_l = Vector2::zeros();
        self.u_q = Matrix2::zeros();
        self.correct_orientation = T::one();
    }

    fn add_local_neighbor(&mut self, w: T, local_q: Vector3<T>, _attributes: &P) -> bool {
        self.base.accumulate(w, &local_q)
    }

    fn finalize(&mut self) -> FitResult {
        let result = self.base.finish();
        if result == FitResult::Stable {
            let quadric = self.base.quadric();
            let two = T::fl(2.0);
            let hessian = Matrix2::new(
                two * quadric.c_uu,
                quadric.c_uv,
                quadric.c_uv,
                two * quadric.c_vv,
            );
            let (values, vectors) = T::sym_eigen_2x2(&hessian);
            let (dominant, direction) =
                if ComplexField::abs(values[1]) >= ComplexField::abs(values[0]) {
                    (values[1], vectors.column(1).into_owned())
                } else {
                    (values[0], vectors.column(0).into_owned())
                };
            self.a = dominant;
            self.u_q = direction * direction.transpose();
            self.u_l = Vector2::new(quadric.c_u, quadric.c_v);
        }
        result
    }

    #[inline]
    fn status(&self) -> FitResult {
        self.base.status()
    }
}
