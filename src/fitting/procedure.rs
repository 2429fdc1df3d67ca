//! The fitting procedure trait and multi-pass protocol.
//!
//! ## Purpose
//!
//! Every primitive fit follows the same protocol: bind an evaluation
//! center, stream weighted neighbors, finalize, and possibly repeat when
//! the fit requests another pass. This module defines that protocol once
//! and provides the bounded multi-pass loop on top of it.
//!
//! ## Invariants
//!
//! * State transitions happen only inside `finalize`.
//! * The number of passes is bounded: the provided loop refuses to run
//!   more than [`MAX_PASS_COUNT`] passes even if a fit keeps asking.

// External dependencies
use nalgebra::Vector3;
use num_traits::Zero;

// Internal dependencies
use crate::fitting::status::FitResult;
use crate::math::kernel::DistWeightFunc;
use crate::primitives::point::Point;

/// Upper bound on fitting passes; no shipped fit needs more than two.
pub const MAX_PASS_COUNT: usize = 4;

// ============================================================================
// Fitting Procedure
// ============================================================================

/// A stateful fit consuming weighted neighborhoods of points of type `P`.
pub trait FittingProcedure<P: Point> {
    /// The weight functor bound to this fit.
    fn weight_func(&self) -> &DistWeightFunc<P::Scalar>;

    /// Reset the fit for a new evaluation center.
    fn init(&mut self, eval_pos: Vector3<P::Scalar>);

    /// Fold one weighted neighbor expressed in local coordinates.
    ///
    /// Returns whether the sample was admitted.
    fn add_local_neighbor(
        &mut self,
        w: P::Scalar,
        local_q: Vector3<P::Scalar>,
        attributes: &P,
    ) -> bool;

    /// Close the current pass.
    fn finalize(&mut self) -> FitResult;

    /// Current state of the fit.
    fn status(&self) -> FitResult;

    /// Weight a world-space neighbor and fold it when inside the support.
    #[inline]
    fn add_neighbor(&mut self, attributes: &P) -> bool {
        let (w, local_q) = self.weight_func().eval(&attributes.pos());
        if w > P::Scalar::zero() {
            self.add_local_neighbor(w, local_q, attributes)
        } else {
            false
        }
    }

    /// Run the multi-pass protocol over a fixed neighborhood.
    ///
    /// The same ids are streamed again for every additional pass the fit
    /// requests. The caller must have called `init` beforehand.
    fn compute_with_ids(&mut self, ids: &[usize], points: &[P]) -> FitResult {
        let mut result = FitResult::Undefined;
        for _ in 0..MAX_PASS_COUNT {
            for &index in ids {
                self.add_neighbor(&points[index]);
            }
            result = self.finalize();
            if result != FitResult::NeedOtherPass {
                break;
            }
        }
        result
    }

    /// Run the multi-pass protocol over an entire point container.
    fn compute(&mut self, points: &[P]) -> FitResult {
        let mut result = FitResult::Undefined;
        for _ in 0..MAX_PASS_COUNT {
            for point in points {
                self.add_neighbor(point);
            }
            result = self.finalize();
            if result != FitResult::NeedOtherPass {
                break;
            }
        }
        result
    }
}
