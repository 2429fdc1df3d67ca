//! Point abstraction and default point type.
//!
//! ## Purpose
//!
//! Spatial indices and fits are generic over the caller's point type. A
//! point must expose a 3-D position; a per-point normal is optional and
//! only required by fits that consume it (the mean-plane fit reports
//! `NotSupported` when normals are missing).
//!
//! ## Design notes
//!
//! * **Caller-owned storage**: point containers are plain slices or
//!   vectors of the caller's type; the crate never copies attributes it
//!   does not need.
//! * **Fixed dimension**: positions are `Vector3`; the scalar type stays
//!   generic over [`FloatLinalg`].

use nalgebra::Vector3;

use crate::math::linalg::FloatLinalg;

// ============================================================================
// Point Trait
// ============================================================================

/// A point sample of an unstructured cloud.
pub trait Point: Clone {
    /// Scalar type of the coordinates.
    type Scalar: FloatLinalg;

    /// Position of the sample.
    fn pos(&self) -> Vector3<Self::Scalar>;

    /// Oriented normal of the sample, when available.
    #[inline]
    fn normal(&self) -> Option<Vector3<Self::Scalar>> {
        None
    }
}

// ============================================================================
// Default Point Type
// ============================================================================

/// A position with an optional oriented normal.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePoint<T: FloatLinalg> {
    /// Position of the sample.
    pub pos: Vector3<T>,
    /// Oriented normal, when known.
    pub normal: Option<Vector3<T>>,
}

impl<T: FloatLinalg> SamplePoint<T> {
    /// Create a sample from a position only.
    pub fn new(pos: Vector3<T>) -> Self {
        Self { pos, normal: None }
    }

    /// Create a sample carrying an oriented normal.
    pub fn with_normal(pos: Vector3<T>, normal: Vector3<T>) -> Self {
        Self {
            pos,
            normal: Some(normal),
        }
    }
}

impl<T: FloatLinalg> Point for SamplePoint<T> {
    type Scalar = T;

    #[inline]
    fn pos(&self) -> Vector3<T> {
        self.pos
    }

    #[inline]
    fn normal(&self) -> Option<Vector3<T>> {
        self.normal
    }
}
