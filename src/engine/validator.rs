//! Input validation.
//!
//! ## Purpose
//!
//! Validation helpers for driver entry points. Checks fail fast and are
//! ordered from cheap to expensive.

// Internal dependencies
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::PointFitError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for driver parameters.
pub struct Validator;

impl Validator {
    /// Validate an evaluation or query radius.
    pub fn validate_radius<T: FloatLinalg>(radius: T) -> Result<(), PointFitError> {
        let r = radius.to_f64().unwrap_or(f64::NAN);
        if !r.is_finite() || r <= 0.0 {
            return Err(PointFitError::InvalidRadius(r));
        }
        Ok(())
    }

    /// Validate a neighbor count.
    pub fn validate_neighbor_count(k: usize) -> Result<(), PointFitError> {
        if k == 0 {
            return Err(PointFitError::InvalidNeighborCount(k));
        }
        Ok(())
    }

    /// Validate a point index against a container size.
    pub fn validate_index(index: usize, size: usize) -> Result<(), PointFitError> {
        if index >= size {
            return Err(PointFitError::IndexOutOfBounds { index, size });
        }
        Ok(())
    }
}
