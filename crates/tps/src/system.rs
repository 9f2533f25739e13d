//! Assembly of the TPS saddle-point system.
//!
//! For n source points the system matrix is
//!
//! ```text
//!     ┌          ┐
//! L = │ K     P  │   K: n×n kernel matrix
//!     │ Pᵀ    0  │   P: n×3 affine basis, rows (1, xᵢ, yᵢ)
//!     └          ┘
//! ```
//!
//! None of these stages can fail; degenerate inputs only show up later as
//! a singular pivot in the solver.

use crate::kernel::kernel_between;
use crate::matrix::Matrix;
use georef_common::Point2D;

/// Number of affine terms (constant, x, y).
pub const AFFINE_TERMS: usize = 3;

/// Pairwise kernel values between source points.
///
/// Symmetric with an exactly zero diagonal.
pub fn kernel_matrix(points: &[Point2D]) -> Matrix {
    let n = points.len();
    let mut k = Matrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let u = kernel_between(points[i], points[j]);
            k.set(i, j, u);
            k.set(j, i, u);
        }
    }
    k
}

/// Affine basis rows `(1, x, y)` for each source point.
pub fn affine_basis(points: &[Point2D]) -> Matrix {
    let mut p = Matrix::zeros(points.len(), AFFINE_TERMS);
    for (i, point) in points.iter().enumerate() {
        p.set(i, 0, 1.0);
        p.set(i, 1, point.x);
        p.set(i, 2, point.y);
    }
    p
}

/// Place K, P and Pᵀ into the `(n+3)×(n+3)` system matrix.
///
/// The bottom-right 3×3 block stays zero.
pub fn assemble_system(k: &Matrix, p: &Matrix) -> Matrix {
    let n = k.rows();
    debug_assert!(k.is_square(), "kernel matrix must be square");
    debug_assert_eq!(p.rows(), n, "affine basis must have one row per point");
    debug_assert_eq!(p.cols(), AFFINE_TERMS);

    let size = n + AFFINE_TERMS;
    let mut l = Matrix::zeros(size, size);

    // Top rows are [K | P]
    for i in 0..n {
        let row = l.row_mut(i);
        row[..n].copy_from_slice(k.row(i));
        row[n..].copy_from_slice(p.row(i));
    }

    // Bottom rows are [Pᵀ | 0]
    let pt = p.transpose();
    for j in 0..AFFINE_TERMS {
        l.row_mut(n + j)[..n].copy_from_slice(pt.row(j));
    }

    debug_assert!(l.is_symmetric(0.0));
    l
}

/// Right-hand side for one output axis: the target coordinates followed by
/// three zeros (the affine orthogonality constraints).
pub fn axis_rhs(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut rhs: Vec<f64> = values.collect();
    rhs.extend_from_slice(&[0.0; AFFINE_TERMS]);
    rhs
}
