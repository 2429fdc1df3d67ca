//! Two-pass quadric patch fit.
//!
//! ## Purpose
//!
//! Fits a quadric height field over a tangent frame: the first pass fits a
//! covariance plane, the second accumulates the weighted quadric normal
//! system in the plane's frame and solves it by thin SVD. Curvatures and
//! principal directions derive from the solved coefficients.
//!
//! ## Key concepts
//!
//! * **Two passes**: `finalize` after the first pass answers
//!   `NeedOtherPass`; the caller streams the same neighborhood again
//!   before the second `finalize`.
//! * **Robust solve**: the 6×6 system is solved by thin SVD, so
//!   rank-deficient neighborhoods (e.g. exact planes) still produce a
//!   usable patch.

// External dependencies
use nalgebra::{Matrix6, Vector2, Vector3, Vector6};

// Internal dependencies
use crate::fitting::covariance_plane::CovariancePlaneFit;
use crate::fitting::procedure::FittingProcedure;
use crate::fitting::quadric::HeightQuadric;
use crate::fitting::status::FitResult;
use crate::math::kernel::DistWeightFunc;
use crate::math::linalg::FloatLinalg;
use crate::primitives::point::Point;

// ============================================================================
// Monge Patch Fit
// ============================================================================

/// Quadric height-field fit over a covariance plane.
#[derive(Debug, Clone)]
pub struct MongePatchFit<T: FloatLinalg> {
    base: CovariancePlaneFit<T>,
    a: Matrix6<T>,
    b: Vector6<T>,
    x: Vector6<T>,
    plane_ready: bool,
}

impl<T: FloatLinalg> MongePatchFit<T> {
    /// Create a fit bound to a weight functor.
    pub fn new(weight: DistWeightFunc<T>) -> Self {
        Self {
            base: CovariancePlaneFit::new(weight),
            a: Matrix6::zeros(),
            b: Vector6::zeros(),
            x: Vector6::zeros(),
            plane_ready: false,
        }
    }

    /// Current state of the fit.
    #[inline]
    pub fn status(&self) -> FitResult {
        self.base.status()
    }

    /// The underlying plane fit of the first pass.
    #[inline]
    pub fn plane_fit(&self) -> &CovariancePlaneFit<T> {
        &self.base
    }

    /// The solved quadric coefficients.
    #[inline]
    pub fn quadric(&self) -> HeightQuadric<T> {
        HeightQuadric::from_solution(&self.x)
    }

    /// Mean curvature at the patch origin.
    #[inline]
    pub fn k_mean(&self) -> T {
        self.quadric().k_mean()
    }

    /// Gaussian curvature at the patch origin.
    #[inline]
    pub fn gaussian_curvature(&self) -> T {
        self.quadric().gaussian_curvature()
    }

    /// Smallest principal curvature at the patch origin.
    #[inline]
    pub fn kmin(&self) -> T {
        self.quadric().kmin()
    }

    /// Largest principal curvature at the patch origin.
    #[inline]
    pub fn kmax(&self) -> T {
        self.quadric().kmax()
    }

    /// World direction of the smallest principal curvature.
    pub fn kmin_direction(&self) -> Vector3<T> {
        let (dir, _) = self.quadric().principal_directions();
        self.lift_tangent(&dir)
    }

    /// World direction of the largest principal curvature.
    pub fn kmax_direction(&self) -> Vector3<T> {
        let (_, dir) = self.quadric().principal_directions();
        self.lift_tangent(&dir)
    }

    /// Height residual of a world position against the fitted patch.
    pub fn potential(&self, q: &Vector3<T>) -> T {
        let local = self.frame_coords_world(q);
        self.quadric().height(local.y, local.z) - local.x
    }

    /// Project a world position onto the fitted patch along the frame
    /// height axis.
    pub fn project(&self, q: &Vector3<T>) -> Vector3<T> {
        let mut local = self.frame_coords_world(q);
        local.x = self.quadric().height(local.y, local.z);
        self.base.eval_pos()
            + self
                .base
                .frame()
                .from_frame(self.base.plane(), &local)
    }

    /// Gradient of the patch potential at a world position.
    pub fn primitive_gradient(&self, q: &Vector3<T>) -> Vector3<T> {
        let local = self.frame_coords_world(q);
        let df = self.quadric().gradient(local.y, local.z);
        let frame_gradient = Vector3::new(T::one(), df.x, df.y);
        self.base
            .frame()
            .direction_from_frame(self.base.plane(), &frame_gradient)
    }

    // ========================================================================
    // Pipeline internals (shared with the cylinder fit)
    // ========================================================================

    pub(crate) fn reset(&mut self, eval_pos: Vector3<T>) {
        self.base.reset(eval_pos);
        self.a = Matrix6::zeros();
        self.b = Vector6::zeros();
        self.x = Vector6::zeros();
        self.plane_ready = false;
    }

    pub(crate) fn accumulate(&mut self, w: T, local_q: &Vector3<T>) -> bool {
        if !self.plane_ready {
            return self.base.accumulate(w, local_q);
        }
        // Plane is ready; accumulate the patch in its frame.
        let local = self.base.frame_coords(local_q);
        let h = local.x;
        let u = local.y;
        let v = local.z;
        let p = Vector6::new(u * u, v * v, u * v, u, v, T::one());
        self.a += (p * p.transpose()) * w;
        self.b += p * (w * h);
        true
    }

    pub(crate) fn finish(&mut self) -> FitResult {
        if !self.plane_ready {
            let result = self.base.finish();
            if result == FitResult::Stable {
                self.plane_ready = true;
                self.a = Matrix6::zeros();
                self.b = Vector6::zeros();
                self.base.set_state(FitResult::NeedOtherPass);
            }
            return self.base.status();
        }
        match T::solve_quadric(&self.a, &self.b) {
            Some(solution) => {
                self.x = solution;
                self.base.set_state(FitResult::Stable);
            }
            None => {
                self.base.set_state(FitResult::Unstable);
            }
        }
        self.base.status()
    }

    #[inline]
    pub(crate) fn weight(&self) -> &DistWeightFunc<T> {
        self.base.weight()
    }

    #[inline]
    pub(crate) fn eval_pos(&self) -> Vector3<T> {
        self.base.eval_pos()
    }

    /// Frame coordinates of a world position.
    #[inline]
    pub(crate) fn frame_coords_world(&self, q: &Vector3<T>) -> Vector3<T> {
        self.base.frame_coords(&(q - self.base.eval_pos()))
    }

    /// Lift a tangent-frame direction to a world direction.
    #[inline]
    pub(crate) fn lift_tangent(&self, dir: &Vector2<T>) -> Vector3<T> {
        let frame_dir = Vector3::new(T::zero(), dir.x, dir.y);
        self.base
            .frame()
            .direction_from_frame(self.base.plane(), &frame_dir)
    }
}

impl<T: FloatLinalg, P: Point<Scalar = T>> FittingProcedure<P> for MongePatchFit<T> {
    #[inline]
    fn weight_func(&self) -> &DistWeightFunc<T> {
        self.base.weight()
    }

    fn init(&mut self, eval_pos: Vector3<T>) {
        self.reset(eval_pos);
    }

    fn add_local_neighbor(&mut self, w: T, local_q: Vector3<T>, _attributes: &P) -> bool {
        self.accumulate(w, &local_q)
    }

    fn finalize(&mut self) -> FitResult {
        self.finish()
    }

    #[inline]
    fn status(&self) -> FitResult {
        self.base.status()
    }
}
