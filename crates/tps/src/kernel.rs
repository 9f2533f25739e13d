//! The thin plate spline radial basis function.
//!
//! U(r²) = r² · ln(r² + ε) is the fundamental solution of the biharmonic
//! equation in two dimensions. It is evaluated on the *squared* distance so
//! no square root is taken in the hot path.

use georef_common::Point2D;

/// Keeps the logarithm argument strictly positive for near-duplicate points.
pub const KERNEL_EPSILON: f64 = 1e-10;

/// TPS kernel value for a squared distance `r2`.
///
/// `tps_kernel(0.0)` is exactly 0.
#[inline]
pub fn tps_kernel(r2: f64) -> f64 {
    if r2 == 0.0 {
        0.0
    } else {
        r2 * (r2 + KERNEL_EPSILON).ln()
    }
}

/// Kernel value between two points.
#[inline]
pub fn kernel_between(a: Point2D, b: Point2D) -> f64 {
    tps_kernel(a.distance_squared(b))
}
