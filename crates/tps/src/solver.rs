//! Dense linear solver: Gaussian elimination with partial pivoting.
//!
//! Each call works on a private augmented copy `[A | b]`, so the same
//! system matrix can be solved against several right-hand sides without
//! one call disturbing the next.

use crate::matrix::Matrix;
use georef_common::{GeorefError, GeorefResult};

/// Pivots with magnitude at or below this are treated as zero.
///
/// Absolute rather than relative: map-space kernel entries reach ~1e8 next
/// to the affine block's 1s, and a relative threshold rejects well-posed
/// configurations. Exactly collinear or duplicate points produce pivots of
/// exactly zero.
///
/// The smallest pivot of a TPS system shrinks roughly with the square of
/// the control-point spacing. Metres, kilometres and degrees all work when
/// points are at least ~1e-5 units apart; rescale coordinates whose control
/// points sit closer than that before fitting.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `a · x = b`.
///
/// Fails with [`GeorefError::DimensionMismatch`] when `a` is not square or
/// `b` has the wrong length, and with [`GeorefError::SingularSystem`] when
/// the best available pivot in some column is below [`PIVOT_TOLERANCE`]
/// (or NaN).
#[allow(clippy::needless_range_loop)]
pub fn solve(a: &Matrix, b: &[f64]) -> GeorefResult<Vec<f64>> {
    let n = a.rows();
    if !a.is_square() {
        return Err(GeorefError::DimensionMismatch {
            expected: n,
            actual: a.cols(),
        });
    }
    if b.len() != n {
        return Err(GeorefError::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    // Augmented working copy, last column holds b
    let mut aug = Matrix::zeros(n, n + 1);
    for i in 0..n {
        let row = aug.row_mut(i);
        row[..n].copy_from_slice(a.row(i));
        row[n] = b[i];
    }

    // Forward elimination
    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug.get(col, col).abs();
        for row in (col + 1)..n {
            let val = aug.get(row, col).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val.is_nan() || max_val <= PIVOT_TOLERANCE {
            return Err(GeorefError::SingularSystem {
                column: col,
                pivot: max_val,
            });
        }

        aug.swap_rows(col, max_row);

        let pivot = aug.get(col, col);
        for row in (col + 1)..n {
            let factor = aug.get(row, col) / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..=n {
                let v = aug.get(row, j) - factor * aug.get(col, j);
                aug.set(row, j, v);
            }
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = aug.get(i, n);
        for j in (i + 1)..n {
            sum -= aug.get(i, j) * x[j];
        }
        x[i] = sum / aug.get(i, i);
    }

    Ok(x)
}
