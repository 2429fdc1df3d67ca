//! Accumulator layers.
//!
//! ## Purpose
//!
//! Primitive fits aggregate weighted neighborhood statistics through small
//! composable accumulators. Each accumulator owns one running sum and
//! knows how to fold a weighted local sample into it; the fits embed the
//! accumulators they need and chain their `init` / `add` / `finalize`
//! calls in a fixed order.
//!
//! ## Key concepts
//!
//! * **Local coordinates**: samples arrive expressed relative to the
//!   evaluation center, as produced by the weight functor.
//! * **Base layer**: [`FitBase`] carries the evaluation center, the weight
//!   mass, the pass counter, and the state machine; every fit embeds it.

// External dependencies
use nalgebra::{Matrix3, Vector3};

// Internal dependencies
use crate::fitting::status::FitResult;
use crate::math::linalg::FloatLinalg;

// ============================================================================
// Base Layer
// ============================================================================

/// Weight-mass accumulator and state machine shared by every fit.
#[derive(Debug, Clone)]
pub struct FitBase<T: FloatLinalg> {
    /// Evaluation center of the current fit.
    pub eval_pos: Vector3<T>,
    /// Accumulated weight mass.
    pub sum_w: T,
    /// Number of completed `finalize` calls since `init`.
    pub pass_count: usize,
    /// Current state.
    pub state: FitResult,
}

impl<T: FloatLinalg> FitBase<T> {
    /// Create an uninitialized base.
    pub fn new() -> Self {
        Self {
            eval_pos: Vector3::zeros(),
            sum_w: T::zero(),
            pass_count: 0,
            state: FitResult::Undefined,
        }
    }

    /// Reset for a new evaluation center.
    pub fn init(&mut self, eval_pos: Vector3<T>) {
        self.eval_pos = eval_pos;
        self.sum_w = T::zero();
        self.pass_count = 0;
        self.state = FitResult::Undefined;
    }

    /// Fold a weighted sample.
    #[inline]
    pub fn add(&mut self, w: T) -> bool {
        self.sum_w += w;
        true
    }

    /// Close the pass: `Stable` when weight mass accumulated, `Unstable`
    /// otherwise.
    pub fn finalize(&mut self) -> FitResult {
        self.pass_count += 1;
        self.state = if self.sum_w > T::zero() {
            FitResult::Stable
        } else {
            FitResult::Unstable
        };
        self.state
    }
}

impl<T: FloatLinalg> Default for FitBase<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Mean Layers
// ============================================================================

/// Weighted sum of local positions.
#[derive(Debug, Clone)]
pub struct MeanPosition<T: FloatLinalg> {
    /// Accumulated `w * p`.
    pub sum_pos: Vector3<T>,
}

impl<T: FloatLinalg> MeanPosition<T> {
    /// Create a zeroed accumulator.
    pub fn new() -> Self {
        Self {
            sum_pos: Vector3::zeros(),
        }
    }

    /// Reset to zero.
    #[inline]
    pub fn init(&mut self) {
        self.sum_pos = Vector3::zeros();
    }

    /// Fold a weighted local sample.
    #[inline]
    pub fn add(&mut self, w: T, local_q: &Vector3<T>) {
        self.sum_pos += local_q * w;
    }

    /// Weighted average position relative to the evaluation center.
    ///
    /// Only meaningful when `sum_w > 0`.
    #[inline]
    pub fn barycenter(&self, sum_w: T) -> Vector3<T> {
        self.sum_pos / sum_w
    }
}

impl<T: FloatLinalg> Default for MeanPosition<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Weighted sum of oriented normals.
#[derive(Debug, Clone)]
pub struct MeanNormal<T: FloatLinalg> {
    /// Accumulated `w * n`.
    pub sum_normal: Vector3<T>,
    /// Whether a sample arrived without a normal.
    pub missing_normal: bool,
}

impl<T: FloatLinalg> MeanNormal<T> {
    /// Create a zeroed accumulator.
    pub fn new() -> Self {
        Self {
            sum_normal: Vector3::zeros(),
            missing_normal: false,
        }
    }

    /// Reset to zero.
    #[inline]
    pub fn init(&mut self) {
        self.sum_normal = Vector3::zeros();
        self.missing_normal = false;
    }

    /// Fold a weighted normal, recording absent attributes.
    #[inline]
    pub fn add(&mut self, w: T, normal: Option<Vector3<T>>) {
        match normal {
            Some(n) => self.sum_normal += n * w,
            None => self.missing_normal = true,
        }
    }
}

impl<T: FloatLinalg> Default for MeanNormal<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Covariance Layer
// ============================================================================

/// Weighted second-moment accumulator of local positions.
///
/// Products are accumulated about the evaluation center and re-centered on
/// the barycenter at finalize time, so a single pass suffices.
#[derive(Debug, Clone)]
pub struct Covariance<T: FloatLinalg> {
    /// Accumulated `w * p * pᵀ`.
    pub sum_prod: Matrix3<T>,
}

impl<T: FloatLinalg> Covariance<T> {
    /// Create a zeroed accumulator.
    pub fn new() -> Self {
        Self {
            sum_prod: Matrix3::zeros(),
        }
    }

    /// Reset to zero.
    #[inline]
    pub fn init(&mut self) {
        self.sum_prod = Matrix3::zeros();
    }

    /// Fold a weighted local sample.
    #[inline]
    pub fn add(&mut self, w: T, local_q: &Vector3<T>) {
        self.sum_prod += (local_q * local_q.transpose()) * w;
    }

    /// Barycenter-centered covariance.
    ///
    /// Only meaningful when `sum_w > 0`.
    #[inline]
    pub fn centered(&self, sum_w: T, barycenter: &Vector3<T>) -> Matrix3<T> {
        self.sum_prod / sum_w - barycenter * barycenter.transpose()
    }
}

impl<T: FloatLinalg> Default for Covariance<T> {
    fn default() -> Self {
        Self::new()
    }
}
