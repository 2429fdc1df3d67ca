//! Plane fit from the weighted covariance of positions.
//!
//! ## Purpose
//!
//! Fits a plane without per-point normals: the plane normal is the
//! eigenvector of the smallest eigenvalue of the weighted covariance of
//! neighbor positions, and the plane passes through the barycenter. The
//! remaining eigenvectors provide the tangent frame, so this fit also
//! serves as the first pass of the quadric patch fits.
//!
//! ## Edge cases
//!
//! * Zero weight mass finalizes `Unstable`.
//! * Rank-deficient covariance (collinear or coincident samples)
//!   finalizes `Unstable`.

// External dependencies
use nalgebra::Vector3;

// Internal dependencies
use crate::fitting::accumulators::{Covariance, FitBase, MeanPosition};
use crate::fitting::plane::{Plane, PlaneFrame};
use crate::fitting::procedure::FittingProcedure;
use crate::fitting::status::FitResult;
use crate::math::kernel::DistWeightFunc;
use crate::math::linalg::FloatLinalg;
use crate::primitives::point::Point;

// ============================================================================
// Covariance Plane Fit
// ============================================================================

/// Plane fit from the eigenstructure of the weighted position covariance.
#[derive(Debug, Clone)]
pub struct CovariancePlaneFit<T: FloatLinalg> {
    weight: DistWeightFunc<T>,
    base: FitBase<T>,
    mean: MeanPosition<T>,
    covariance: Covariance<T>,
    plane: Plane<T>,
    frame: PlaneFrame<T>,
}

impl<T: FloatLinalg> CovariancePlaneFit<T> {
    /// Create a fit bound to a weight functor.
    pub fn new(weight: DistWeightFunc<T>) -> Self {
        Self {
            weight,
            base: FitBase::new(),
            mean: MeanPosition::new(),
            covariance: Covariance::new(),
            plane: Plane::new(),
            frame: PlaneFrame::new(),
        }
    }

    /// The weight functor bound to this fit.
    #[inline]
    pub fn weight(&self) -> &DistWeightFunc<T> {
        &self.weight
    }

    /// Current state of the fit.
    #[inline]
    pub fn status(&self) -> FitResult {
        self.base.state
    }

    /// The fitted plane.
    #[inline]
    pub fn plane(&self) -> &Plane<T> {
        &self.plane
    }

    /// The tangent frame of the fitted plane.
    #[inline]
    pub fn frame(&self) -> &PlaneFrame<T> {
        &self.frame
    }

    /// Unit normal of the fitted plane.
    #[inline]
    pub fn normal(&self) -> Vector3<T> {
        self.plane.normal()
    }

    /// Weighted barycenter of the neighborhood, in world coordinates.
    #[inline]
    pub fn barycenter(&self) -> Vector3<T> {
        self.base.eval_pos + self.mean.barycenter(self.base.sum_w)
    }

    /// Signed distance from a world position to the plane.
    #[inline]
    pub fn potential(&self, q: &Vector3<T>) -> T {
        self.plane.signed_distance(&(q - self.base.eval_pos))
    }

    /// Orthogonal projection of a world position onto the plane.
    #[inline]
    pub fn project(&self, q: &Vector3<T>) -> Vector3<T> {
        self.base.eval_pos + self.plane.project(&(q - self.base.eval_pos))
    }

    /// Gradient of the potential; constant over a plane.
    #[inline]
    pub fn primitive_gradient(&self, _q: &Vector3<T>) -> Vector3<T> {
        self.plane.normal()
    }

    // ========================================================================
    // Pipeline internals (shared with the quadric fits)
    // ========================================================================

    pub(crate) fn reset(&mut self, eval_pos: Vector3<T>) {
        self.weight.init(eval_pos);
        self.base.init(eval_pos);
        self.mean.init();
        self.covariance.init();
        self.plane.init();
        self.frame.init();
    }

    pub(crate) fn accumulate(&mut self, w: T, local_q: &Vector3<T>) -> bool {
        self.base.add(w);
        self.mean.add(w, local_q);
        self.covariance.add(w, local_q);
        true
    }

    pub(crate) fn finish(&mut self) -> FitResult {
        if self.base.finalize() == FitResult::Stable {
            let barycenter = self.mean.barycenter(self.base.sum_w);
            let covariance = self.covariance.centered(self.base.sum_w, &barycenter);
            match T::sym_eigen_3x3(&covariance) {
                Some((values, vectors)) => {
                    // The two largest eigenvalues must carry the tangent
                    // spread; otherwise the neighborhood has no plane.
                    let tolerance = values[2] * T::default_epsilon() * T::fl(100.0);
                    if values[2] <= T::zero() || values[1] <= tolerance {
                        self.base.state = FitResult::Unstable;
                    } else {
                        let normal = vectors.column(0).into_owned();
                        if self.plane.set(&normal, &barycenter) {
                            let u = vectors.column(2).into_owned();
                            let n = self.plane.normal();
                            self.frame.u = u;
                            self.frame.v = n.cross(&u);
                        } else {
                            self.base.state = FitResult::Unstable;
                        }
                    }
                }
                None => {
                    self.base.state = FitResult::Unstable;
                }
            }
        }
        self.base.state
    }

    #[inline]
    pub(crate) fn set_state(&mut self, state: FitResult) {
        self.base.state = state;
    }

    #[inline]
    pub(crate) fn eval_pos(&self) -> Vector3<T> {
        self.base.eval_pos
    }

    /// Frame coordinates `(h, u, v)` of a local position.
    #[inline]
    pub(crate) fn frame_coords(&self, local_q: &Vector3<T>) -> Vector3<T> {
        self.frame.to_frame(&self.plane, local_q)
    }
}

impl<T: FloatLinalg, P: Point<Scalar = T>> FittingProcedure<P> for CovariancePlaneFit<T> {
    #[inline]
    fn weight_func(&self) -> &DistWeightFunc<T> {
        &self.weight
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
        self.base.state
    }
}
