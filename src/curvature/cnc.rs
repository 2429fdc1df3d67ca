//! Corrected normal current measures on triangles.
//!
//! ## Purpose
//!
//! Given a triangle and a corrected normal at each vertex, the corrected
//! normal current assigns the triangle an area measure (μ₀), a mean
//! curvature measure (μ₁), a Gaussian curvature measure (μ₂), and an
//! anisotropic curvature tensor (μ_XY). Summing the measures over a
//! triangulated region approximates the region's integrated curvatures.
//!
//! ## Key concepts
//!
//! * **Interpolated normal**: each measure uses the vertex-average normal
//!   `ū = (u_a + u_b + u_c)/3`, optionally unitized.
//! * **Spherical triangle**: with unit normals, μ₂ is the signed area of
//!   the spherical triangle spanned by them, computed through interior
//!   angles of the polar triangle.
//!
//! ## Edge cases
//!
//! * Small or flat spherical triangles measure 0.
//! * A failed eigendecomposition yields zero curvatures and directions.

// External dependencies
use nalgebra::{ComplexField, Matrix3, Vector3};

// Internal dependencies
use crate::math::linalg::FloatLinalg;

// Small constant used to approximate zero.
fn epsilon<T: FloatLinalg>() -> T {
    T::fl(1e-8)
}

// L1 norm of a 3-vector.
fn l1_norm<T: FloatLinalg>(v: &Vector3<T>) -> T {
    ComplexField::abs(v.x) + ComplexField::abs(v.y) + ComplexField::abs(v.z)
}

// Vertex-average normal, optionally unitized.
fn mean_normal<T: FloatLinalg>(
    ua: &Vector3<T>,
    ub: &Vector3<T>,
    uc: &Vector3<T>,
    unit_u: bool,
) -> Vector3<T> {
    let um = (ua + ub + uc) / T::fl(3.0);
    if unit_u {
        let norm = um.norm();
        if norm > T::zero() {
            return um / norm;
        }
    }
    um
}

// ============================================================================
// Spherical Triangle
// ============================================================================

/// A triangle on the unit sphere.
pub struct SphericalTriangle;

impl SphericalTriangle {
    /// Whether the triangle is too small or too flat to measure.
    pub fn is_degenerate<T: FloatLinalg>(
        a: &Vector3<T>,
        b: &Vector3<T>,
        c: &Vector3<T>,
    ) -> bool {
        let d = [(a - b).norm(), (a - c).norm(), (b - c).norm()];
        if d[0] < epsilon() || d[1] < epsilon() || d[2] < epsilon() {
            return true;
        }
        // Flat when the largest edge equals the sum of the other two.
        let mut m = 0;
        if d[1] > d[m] {
            m = 1;
        }
        if d[2] > d[m] {
            m = 2;
        }
        ComplexField::abs(d[m] - d[(m + 1) % 3] - d[(m + 2) % 3]) < epsilon()
    }

    /// The polar triangle, reoriented towards the original vertices.
    pub fn polar_triangle<T: FloatLinalg>(
        a: &Vector3<T>,
        b: &Vector3<T>,
        c: &Vector3<T>,
    ) -> (Vector3<T>, Vector3<T>, Vector3<T>) {
        let mut ap = b.cross(c);
        let mut bp = c.cross(a);
        let mut cp = a.cross(b);
        if ap.dot(a) < T::zero() {
            ap = -ap;
        }
        if bp.dot(b) < T::zero() {
            bp = -bp;
        }
        if cp.dot(c) < T::zero() {
            cp = -cp;
        }
        (ap, bp, cp)
    }

    /// Interior angles at the three vertices.
    pub fn interior_angles<T: FloatLinalg>(
        a: &Vector3<T>,
        b: &Vector3<T>,
        c: &Vector3<T>,
    ) -> (T, T, T) {
        let (ap, bp, cp) = Self::polar_triangle(a, b, c);
        let eps = T::default_epsilon();
        match (
            ap.try_normalize(eps),
            bp.try_normalize(eps),
            cp.try_normalize(eps),
        ) {
            (Some(ta), Some(tb), Some(tc)) => {
                let one = T::one();
                let ca = tb.dot(&tc).clamp(-one, one);
                let cb = tc.dot(&ta).clamp(-one, one);
                let cc = ta.dot(&tb).clamp(-one, one);
                (ca.acos(), cb.acos(), cc.acos())
            }
            _ => (T::zero(), T::zero(), T::zero()),
        }
    }

    /// Unsigned area of the spherical triangle (below 2π).
    pub fn area<T: FloatLinalg>(a: &Vector3<T>, b: &Vector3<T>, c: &Vector3<T>) -> T {
        if Self::is_degenerate(a, b, c) {
            return T::zero();
        }
        let (alpha, beta, gamma) = Self::interior_angles(a, b, c);
        if ComplexField::abs(alpha) < epsilon()
            || ComplexField::abs(beta) < epsilon()
            || ComplexField::abs(gamma) < epsilon()
        {
            T::zero()
        } else {
            T::two_pi() - alpha - beta - gamma
        }
    }

    /// Signed area of the spherical triangle (below 2π).
    pub fn signed_area<T: FloatLinalg>(a: &Vector3<T>, b: &Vector3<T>, c: &Vector3<T>) -> T {
        let area = Self::area(a, b, c);
        let m = a + b + c;
        let x = (b - a).cross(&(c - a));
        if l1_norm(&m) <= epsilon() || l1_norm(&x) <= epsilon() {
            return T::zero();
        }
        if m.dot(&x) < T::zero() {
            -area
        } else {
            area
        }
    }
}

// ============================================================================
// Triangle Measures
// ============================================================================

/// μ₀ measure (area) of triangle `abc` with corrected vertex normals.
pub fn mu0<T: FloatLinalg>(
    a: &Vector3<T>,
    b: &Vector3<T>,
    c: &Vector3<T>,
    ua: &Vector3<T>,
    ub: &Vector3<T>,
    uc: &Vector3<T>,
    unit_u: bool,
) -> T {
    let um = mean_normal(ua, ub, uc, unit_u);
    ((b - a).cross(&(c - a))).dot(&um) * T::fl(0.5)
}

/// μ₁ measure (mean curvature) of triangle `abc` with corrected vertex
/// normals.
pub fn mu1<T: FloatLinalg>(
    a: &Vector3<T>,
    b: &Vector3<T>,
    c: &Vector3<T>,
    ua: &Vector3<T>,
    ub: &Vector3<T>,
    uc: &Vector3<T>,
    unit_u: bool,
) -> T {
    let um = mean_normal(ua, ub, uc, unit_u);
    (um.cross(&(uc - ub)).dot(a) + um.cross(&(ua - uc)).dot(b) + um.cross(&(ub - ua)).dot(c))
        * T::fl(0.25)
}

/// μ₂ measure (Gaussian curvature) of triangle `abc` with corrected
/// vertex normals.
pub fn mu2<T: FloatLinalg>(
    _a: &Vector3<T>,
    _b: &Vector3<T>,
    _c: &Vector3<T>,
    ua: &Vector3<T>,
    ub: &Vector3<T>,
    uc: &Vector3<T>,
    unit_u: bool,
) -> T {
    if unit_u {
        SphericalTriangle::signed_area(ua, ub, uc)
    } else {
        ua.cross(ub).dot(uc) * T::fl(0.5)
    }
}

/// μ_XY measure (anisotropic curvature tensor) of triangle `abc` with
/// corrected vertex normals.
pub fn mu_xy<T: FloatLinalg>(
    a: &Vector3<T>,
    b: &Vector3<T>,
    c: &Vector3<T>,
    ua: &Vector3<T>,
    ub: &Vector3<T>,
    uc: &Vector3<T>,
    unit_u: bool,
) -> Matrix3<T> {
    let um = mean_normal(ua, ub, uc, unit_u);
    let uac = uc - ua;
    let uab = ub - ua;
    let ab = b - a;
    let ac = c - a;

    let mut tensor = Matrix3::zeros();
    let half = T::fl(0.5);
    for i in 0..3 {
        let mut x = Vector3::zeros();
        x[i] = T::one();
        for j in 0..3 {
            tensor[(i, j)] = half * um.dot(&(x.cross(&ab) * uac[j] - x.cross(&ac) * uab[j]));
        }
    }
    tensor
}

/// Principal curvatures and directions from an accumulated μ_XY tensor.
///
/// The tensor is symmetrized and `1000·area·n·nᵀ` added to push the
/// normal direction out of the low eigenvalues; the returned eigenvalues
/// are negated to match the curvature sign convention. A failed
/// eigendecomposition yields zero curvatures and zero directions.
pub fn curvatures_from_tensor<T: FloatLinalg>(
    tensor: &Matrix3<T>,
    area: T,
    normal: &Vector3<T>,
) -> (T, T, Vector3<T>, Vector3<T>) {
    let half = T::fl(0.5);
    let coef = T::fl(1000.0) * area;
    let m = (tensor + tensor.transpose()) * half + (normal * normal.transpose()) * coef;

    match T::sym_eigen_3x3(&m) {
        Some((values, vectors)) => (
            -values[0],
            -values[1],
            vectors.column(0).into_owned(),
            vectors.column(1).into_owned(),
        ),
        None => (
            T::zero(),
            T::zero(),
            Vector3::zeros(),
            Vector3::zeros(),
        ),
    }
}
