//! Thin plate spline (TPS) warp engine.
//!
//! Given paired control points (source coordinates in one space, target
//! coordinates in another), fits the smooth non-rigid mapping that passes
//! exactly through every pair and minimizes bending energy elsewhere:
//!
//! ```text
//! f(x, y) = a₀ + a₁x + a₂y + Σᵢ wᵢ U(|(x, y) - (xᵢ, yᵢ)|²)
//! U(r²)   = r² ln(r² + ε)
//! ```
//!
//! Fitting happens once per control-point configuration
//! ([`CoefficientSet::compute`]); evaluation ([`CoefficientSet::transform`])
//! is O(n) and allocation-free, so it can run once per rendered pixel.
//!
//! # Example
//!
//! ```
//! use georef_common::Point2D;
//! use tps::CoefficientSet;
//!
//! let source = [
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(10.0, 0.0),
//!     Point2D::new(0.0, 10.0),
//!     Point2D::new(10.0, 10.0),
//! ];
//! let target: Vec<Point2D> = source.iter().map(|p| p.scaled(10.0)).collect();
//!
//! let coeffs = CoefficientSet::compute(&source, &target).unwrap();
//! let p = coeffs.transform(Point2D::new(5.0, 5.0));
//! assert!((p.x - 50.0).abs() < 1e-6 && (p.y - 50.0).abs() < 1e-6);
//! ```

pub mod coefficients;
pub mod grid;
pub mod handle;
pub mod kernel;
pub mod matrix;
pub mod solver;
pub mod system;
pub mod transform;

pub use coefficients::CoefficientSet;
pub use grid::{resample_bilinear, WarpGrid};
pub use handle::WarpHandle;
pub use kernel::tps_kernel;
pub use matrix::Matrix;
pub use solver::solve;
pub use system::{affine_basis, assemble_system, kernel_matrix};
pub use transform::{CoordinateTransform, ThinPlateSpline};
