//! Shared test utilities for the georeferencing workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate-equality assertions for scalars and points
//! - Control-point fixtures (known-good, collinear, duplicate)
//! - Seeded control-point generators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_point_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

pub use generators::*;

#[doc(hidden)]
pub use georef_common;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of two `Point2D` values, per component.
///
/// An optional trailing message is printed on failure.
///
/// ```ignore
/// use georef_common::Point2D;
/// use test_utils::assert_point_approx_eq;
///
/// assert_point_approx_eq!(Point2D::new(1.0001, 2.0), Point2D::new(1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_point_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {
        $crate::assert_point_approx_eq!($left, $right, $epsilon, "points differ")
    };
    ($left:expr, $right:expr, $epsilon:expr, $($msg:tt)+) => {{
        let left: $crate::georef_common::Point2D = $left;
        let right: $crate::georef_common::Point2D = $right;
        let epsilon: f64 = $epsilon as f64;
        let dx = (left.x - right.x).abs();
        let dy = (left.y - right.y).abs();
        if !(dx <= epsilon && dy <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`: {}\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `({:?}, {:?})` > epsilon `{:?}`",
                format_args!($($msg)+), left, right, dx, dy, epsilon
            );
        }
    }};
}
