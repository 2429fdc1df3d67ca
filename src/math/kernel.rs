//! Weight kernels and the distance weight functor.
//!
//! ## Purpose
//!
//! A weight kernel maps a normalized squared distance `s = d²/r²` to a
//! nonnegative weight through a monotone nonincreasing profile φ. The
//! [`DistWeightFunc`] wraps a kernel with an evaluation center and radius
//! and converts world positions to local (eval-centered) coordinates for
//! the fitting pipeline.
//!
//! ## Key concepts
//!
//! * **Support**: every kernel returns 0 outside the evaluation radius.
//! * **Continuity**: profiles are continuous and differentiable on the
//!   open support, so fitted primitives vary smoothly with the input.
//! * **Statelessness**: kernels carry no per-neighbor state; the functor
//!   only stores the evaluation center and radius.

// External dependencies
use nalgebra::Vector3;

// Internal dependencies
use crate::math::linalg::FloatLinalg;

// ============================================================================
// Weight Function
// ============================================================================

/// Weight kernel profile applied to normalized squared distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightFunction {
    /// Uniform weighting over the support.
    Constant,

    /// Smooth polynomial profile `(s - 1)²` (default).
    #[default]
    SmoothRbf,

    /// Wendland C² profile `(1 - u)⁴ (4u + 1)` with `u = √s`.
    Wendland,

    /// Truncated Gaussian profile `exp(-9s/2)`, i.e. a standard deviation
    /// of one third of the radius.
    Gaussian,
}

impl WeightFunction {
    /// Evaluate the profile at a normalized squared distance `s ∈ [0, 1]`.
    #[inline]
    pub fn compute_weight<T: FloatLinalg>(&self, s: T) -> T {
        match self {
            WeightFunction::Constant => T::one(),
            WeightFunction::SmoothRbf => {
                let t = s - T::one();
                t * t
            }
            WeightFunction::Wendland => {
                let u = s.sqrt();
                let t = T::one() - u;
                let t2 = t * t;
                t2 * t2 * (T::fl(4.0) * u + T::one())
            }
            WeightFunction::Gaussian => (-T::fl(4.5) * s).exp(),
        }
    }
}

// ============================================================================
// Distance Weight Functor
// ============================================================================

/// Weight functor binding a kernel to an evaluation center and radius.
#[derive(Debug, Clone)]
pub struct DistWeightFunc<T: FloatLinalg> {
    kernel: WeightFunction,
    radius: T,
    eval_pos: Vector3<T>,
}

impl<T: FloatLinalg> DistWeightFunc<T> {
    /// Create a functor for the given kernel and evaluation radius.
    pub fn new(kernel: WeightFunction, radius: T) -> Self {
        Self {
            kernel,
            radius,
            eval_pos: Vector3::zeros(),
        }
    }

    /// Bind the functor to a new evaluation center.
    #[inline]
    pub fn init(&mut self, eval_pos: Vector3<T>) {
        self.eval_pos = eval_pos;
    }

    /// The evaluation center.
    #[inline]
    pub fn eval_pos(&self) -> Vector3<T> {
        self.eval_pos
    }

    /// The evaluation radius (kernel support).
    #[inline]
    pub fn eval_radius(&self) -> T {
        self.radius
    }

    /// Weight a world position.
    ///
    /// Returns the weight and the position expressed relative to the
    /// evaluation center. The weight is zero outside the radius.
    #[inline]
    pub fn eval(&self, pos: &Vector3<T>) -> (T, Vector3<T>) {
        let local = pos - self.eval_pos;
        let r2 = self.radius * self.radius;
        let d2 = local.norm_squared();
        if d2 > r2 {
            (T::zero(), local)
        } else {
            (self.kernel.compute_weight(d2 / r2), local)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
