//! Orthogonal Procrustes alignment in the plane.
//!
//! Finds the rotation that best maps one point set onto another in the
//! least-squares sense, via the singular value decomposition of the
//! cross-covariance matrix. Reflections are never returned.

use nalgebra::{Matrix2, Vector2};

/// Closest proper rotation to a 2x2 matrix.
///
/// For `m = U * S * V^T` the closest orthogonal matrix is `U * V^T`. If that
/// has determinant -1, the column of `U` for the smallest singular value is
/// negated so the result is a rotation.
pub fn closest_rotation(m: &Matrix2<f64>) -> Matrix2<f64> {
    let svd = m.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Matrix2::identity();
    };

    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let weakest = if svd.singular_values[0] <= svd.singular_values[1] { 0 } else { 1 };
        let mut u_fixed = u;
        u_fixed[(0, weakest)] = -u_fixed[(0, weakest)];
        u_fixed[(1, weakest)] = -u_fixed[(1, weakest)];
        r = u_fixed * v_t;
    }
    r
}

/// Rotation `R` minimising `sum |R * source[i] - target[i]|^2`.
///
/// Both sets must already be centred. Mismatched lengths use the common prefix.
pub fn optimal_rotation(source: &[Vector2<f64>], target: &[Vector2<f64>]) -> Matrix2<f64> {
    let covariance = source
        .iter()
        .zip(target)
        .fold(Matrix2::zeros(), |acc, (s, t)| acc + t * s.transpose());
    closest_rotation(&covariance)
}

/// Rotation matrix for an angle in radians.
#[inline]
pub fn rotation(angle: f64) -> Matrix2<f64> {
    let (sin, cos) = angle.sin_cos();
    Matrix2::new(cos, -sin, sin, cos)
}
