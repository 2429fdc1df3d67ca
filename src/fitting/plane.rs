//! Plane primitive and tangent frame.
//!
//! ## Purpose
//!
//! Planes are the workhorse primitive: they carry the fitted normal, serve
//! as the projection target, and anchor the tangent frame in which quadric
//! patches express their height field.
//!
//! ## Key concepts
//!
//! * **Local coordinates**: planes are stored relative to the evaluation
//!   center; fits convert world positions at their accessor boundary.
//! * **Frame coordinates**: `(h, u, v)` where `h` is the signed height
//!   along the plane normal and `(u, v)` are in-plane coordinates about
//!   the projection of the evaluation center.

// External dependencies
use nalgebra::{ComplexField, Vector3};

// Internal dependencies
use crate::math::linalg::FloatLinalg;

// ============================================================================
// Plane
// ============================================================================

/// An oriented plane `n·q + d = 0` in local (eval-centered) coordinates.
#[derive(Debug, Clone)]
pub struct Plane<T: FloatLinalg> {
    normal: Vector3<T>,
    offset: T,
    valid: bool,
}

impl<T: FloatLinalg> Plane<T> {
    /// Create an unset plane.
    pub fn new() -> Self {
        Self {
            normal: Vector3::zeros(),
            offset: T::zero(),
            valid: false,
        }
    }

    /// Forget the current plane.
    #[inline]
    pub fn init(&mut self) {
        self.normal = Vector3::zeros();
        self.offset = T::zero();
        self.valid = false;
    }

    /// Whether a plane has been provided.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Set the plane from a direction and a point on the plane.
    ///
    /// The direction is normalized; returns `false` (leaving the plane
    /// unset) when it is too short to normalize.
    pub fn set(&mut self, direction: &Vector3<T>, point_on_plane: &Vector3<T>) -> bool {
        match direction.try_normalize(T::default_epsilon()) {
            Some(normal) => {
                self.offset = -normal.dot(point_on_plane);
                self.normal = normal;
                self.valid = true;
                true
            }
            None => {
                self.init();
                false
            }
        }
    }

    /// Unit normal of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<T> {
        self.normal
    }

    /// Signed offset of the plane.
    #[inline]
    pub fn offset(&self) -> T {
        self.offset
    }

    /// Signed distance from a local position to the plane.
    #[inline]
    pub fn signed_distance(&self, local_q: &Vector3<T>) -> T {
        self.normal.dot(local_q) + self.offset
    }

    /// Orthogonal projection of a local position onto the plane.
    #[inline]
    pub fn project(&self, local_q: &Vector3<T>) -> Vector3<T> {
        local_q - self.normal * self.signed_distance(local_q)
    }

    /// Projection of the evaluation center onto the plane; the origin of
    /// the tangent frame.
    #[inline]
    pub fn origin(&self) -> Vector3<T> {
        -self.normal * self.offset
    }
}

impl<T: FloatLinalg> Default for Plane<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Plane Frame
// ============================================================================

/// Orthonormal tangent basis `(u, v)` spanning a plane.
#[derive(Debug, Clone)]
pub struct PlaneFrame<T: FloatLinalg> {
    /// First tangent direction.
    pub u: Vector3<T>,
    /// Second tangent direction.
    pub v: Vector3<T>,
}

impl<T: FloatLinalg> PlaneFrame<T> {
    /// Create a zeroed frame.
    pub fn new() -> Self {
        Self {
            u: Vector3::zeros(),
            v: Vector3::zeros(),
        }
    }

    /// Reset to zero.
    #[inline]
    pub fn init(&mut self) {
        self.u = Vector3::zeros();
        self.v = Vector3::zeros();
    }

    /// Build a deterministic tangent basis for a unit normal.
    ///
    /// The auxiliary direction avoids the normal's dominant axis so the
    /// cross products stay well conditioned.
    pub fn from_normal(normal: &Vector3<T>) -> Self {
        let a = if ComplexField::abs(normal.x) > ComplexField::abs(normal.z) {
            Vector3::new(-normal.y, normal.x, T::zero())
        } else {
            Vector3::new(T::zero(), -normal.z, normal.y)
        };
        let a = a.normalize();
        let u = normal.cross(&a).normalize();
        let v = normal.cross(&u).normalize();
        Self { u, v }
    }

    /// Express a local position in frame coordinates `(h, u, v)`.
    #[inline]
    pub fn to_frame(&self, plane: &Plane<T>, local_q: &Vector3<T>) -> Vector3<T> {
        let h = plane.signed_distance(local_q);
        let in_plane = plane.project(local_q) - plane.origin();
        Vector3::new(h, self.u.dot(&in_plane), self.v.dot(&in_plane))
    }

    /// Map frame coordinates `(h, u, v)` back to a local position.
    #[inline]
    pub fn from_frame(&self, plane: &Plane<T>, huv: &Vector3<T>) -> Vector3<T> {
        plane.origin() + plane.normal() * huv.x + self.u * huv.y + self.v * huv.z
    }

    /// Map a direction expressed in frame coordinates to a local
    /// direction; the translation is omitted.
    #[inline]
    pub fn direction_from_frame(&self, plane: &Plane<T>, huv: &Vector3<T>) -> Vector3<T> {
        plane.normal() * huv.x + self.u * huv.y + self.v * huv.z
    }
}

impl<T: FloatLinalg> Default for PlaneFrame<T> {
    fn default() -> Self {
        Self::new()
    }
}
