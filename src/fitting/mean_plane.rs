//! Plane fit from the weighted mean of oriented normals.
//!
//! ## Purpose
//!
//! When the cloud carries per-point normals, the cheapest plane estimate
//! averages them: the plane normal is the weighted mean normal and the
//! plane passes through the barycenter. The tangent frame is built
//! deterministically from the normal.
//!
//! ## Edge cases
//!
//! * Samples without normals finalize `NotSupported`.
//! * A vanishing mean normal (e.g. opposing orientations) finalizes
//!   `Unstable`.
//! * A plane already provided by an earlier stage is reported as
//!   `ConflictErrorFound`; the plane is nevertheless overwritten, keeping
//!   the historical behavior of the pipeline.

// External dependencies
use nalgebra::Vector3;

// Internal dependencies
use crate::fitting::accumulators::{FitBase, MeanNormal, MeanPosition};
use crate::fitting::plane::{Plane, PlaneFrame};
use crate::fitting::procedure::FittingProcedure;
use crate::fitting::status::FitResult;
use crate::math::kernel::DistWeightFunc;
use crate::math::linalg::FloatLinalg;
use crate::primitives::point::Point;

// ============================================================================
// Mean Plane Fit
// ============================================================================

/// Plane fit averaging oriented per-point normals.
#[derive(Debug, Clone)]
pub struct MeanPlaneFit<T: FloatLinalg> {
    weight: DistWeightFunc<T>,
    base: FitBase<T>,
    mean: MeanPosition<T>,
    mean_normal: MeanNormal<T>,
    plane: Plane<T>,
    frame: PlaneFrame<T>,
}

impl<T: FloatLinalg> MeanPlaneFit<T> {
    /// Create a fit bound to a weight functor.
    pub fn new(weight: DistWeightFunc<T>) -> Self {
        Self {
            weight,
            base: FitBase::new(),
            mean: MeanPosition::new(),
            mean_normal: MeanNormal::new(),
            plane: Plane::new(),
            frame: PlaneFrame::new(),
        }
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
}

impl<T: FloatLinalg, P: Point<Scalar = T>> FittingProcedure<P> for MeanPlaneFit<T> {
    #[inline]
    fn weight_func(&self) -> &DistWeightFunc<T> {
        &self.weight
    }

    fn init(&mut self, eval_pos: Vector3<T>) {
        self.weight.init(eval_pos);
        self.base.init(eval_pos);
        self.mean.init();
        self.mean_normal.init();
        self.plane.init();
        self.frame.init();
    }

    fn add_local_neighbor(&mut self, w: T, local_q: Vector3<T>, attributes: &P) -> bool {
        self.base.add(w);
        self.mean.add(w, &local_q);
        self.mean_normal.add(w, attributes.normal());
        true
    }

    fn finalize(&mut self) -> FitResult {
        if self.base.finalize() == FitResult::Stable {
            if self.mean_normal.missing_normal {
                self.base.state = FitResult::NotSupported;
                return self.base.state;
            }
            if self.plane.is_valid() {
                self.base.state = FitResult::ConflictErrorFound;
            }
            let direction = self.mean_normal.sum_normal / self.base.sum_w;
            let barycenter = self.mean.barycenter(self.base.sum_w);
            if self.plane.set(&direction, &barycenter) {
                self.frame = PlaneFrame::from_normal(&self.plane.normal());
            } else {
                self.base.state = FitResult::Unstable;
            }
        }
        self.base.state
    }

    #[inline]
    fn status(&self) -> FitResult {
        self.base.state
    }
}
