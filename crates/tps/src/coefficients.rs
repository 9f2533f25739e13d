//! Fitting and evaluating thin plate spline coefficients.

use crate::kernel::{kernel_between, tps_kernel};
use crate::solver::solve;
use crate::system::{affine_basis, assemble_system, axis_rhs, kernel_matrix, AFFINE_TERMS};
use georef_common::{GeorefError, GeorefResult, Point2D};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Minimum number of control points; fewer leave the affine block singular.
pub const MIN_CONTROL_POINTS: usize = 3;

/// Fitted TPS coefficients for one control-point configuration.
///
/// Each axis vector has length n + 3: entries `0..n` weight the kernel terms
/// and entries `n, n+1, n+2` are the affine constant, x-slope and y-slope.
/// The source points are kept because evaluation needs the distance from the
/// query point to every control point.
///
/// Immutable once computed. When the control points change, compute a new
/// set; see [`WarpHandle`](crate::WarpHandle) for swapping it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoefficients")]
pub struct CoefficientSet {
    source: Vec<Point2D>,
    coefficients_x: Vec<f64>,
    coefficients_y: Vec<f64>,
}

/// Unchecked serialized form, validated on the way in.
#[derive(Deserialize)]
struct RawCoefficients {
    source: Vec<Point2D>,
    coefficients_x: Vec<f64>,
    coefficients_y: Vec<f64>,
}

impl TryFrom<RawCoefficients> for CoefficientSet {
    type Error = GeorefError;

    fn try_from(raw: RawCoefficients) -> GeorefResult<Self> {
        CoefficientSet::from_parts(raw.source, raw.coefficients_x, raw.coefficients_y)
    }
}

impl CoefficientSet {
    /// Fit coefficients mapping `source[i]` onto `target[i]`.
    ///
    /// # Errors
    /// * [`GeorefError::Configuration`] for mismatched lengths, fewer than
    ///   three points, or non-finite coordinates.
    /// * [`GeorefError::SingularSystem`] for collinear or duplicate source
    ///   points, propagated unchanged from the solver.
    pub fn compute(source: &[Point2D], target: &[Point2D]) -> GeorefResult<Self> {
        validate_control_points(source, target).inspect_err(|e| {
            warn!(error = %e, "Rejected control-point configuration");
        })?;

        let start = Instant::now();
        let n = source.len();

        let k = kernel_matrix(source);
        let p = affine_basis(source);
        let l = assemble_system(&k, &p);

        let rhs_x = axis_rhs(target.iter().map(|t| t.x));
        let rhs_y = axis_rhs(target.iter().map(|t| t.y));

        let solved = solve(&l, &rhs_x).and_then(|cx| solve(&l, &rhs_y).map(|cy| (cx, cy)));
        let (coefficients_x, coefficients_y) = match solved {
            Ok(pair) => pair,
            Err(e) => {
                warn!(points = n, error = %e, "TPS system could not be solved");
                return Err(e);
            }
        };

        let set = Self {
            source: source.to_vec(),
            coefficients_x,
            coefficients_y,
        };

        debug!(
            points = n,
            elapsed_us = start.elapsed().as_micros() as u64,
            bending_energy = set.bending_energy(),
            "Computed TPS coefficients"
        );

        Ok(set)
    }

    /// Rebuild a set from stored parts, checking that every vector has the
    /// length the source points imply.
    pub fn from_parts(
        source: Vec<Point2D>,
        coefficients_x: Vec<f64>,
        coefficients_y: Vec<f64>,
    ) -> GeorefResult<Self> {
        let expected = source.len() + AFFINE_TERMS;
        for actual in [coefficients_x.len(), coefficients_y.len()] {
            if actual != expected {
                return Err(GeorefError::DimensionMismatch { expected, actual });
            }
        }
        Ok(Self {
            source,
            coefficients_x,
            coefficients_y,
        })
    }

    /// Map one query point from source space to target space.
    ///
    /// O(n) with no allocation.
    ///
    /// # Panics
    /// If the coefficient vectors are not `n + 3` long. The constructors
    /// never build such a set.
    #[inline]
    pub fn transform(&self, q: Point2D) -> Point2D {
        let n = self.source.len();
        assert!(
            self.coefficients_x.len() == n + AFFINE_TERMS
                && self.coefficients_y.len() == n + AFFINE_TERMS,
            "coefficient vectors must hold {} entries",
            n + AFFINE_TERMS
        );

        let ax = &self.coefficients_x[n..];
        let ay = &self.coefficients_y[n..];
        let mut x = ax[0] + ax[1] * q.x + ax[2] * q.y;
        let mut y = ay[0] + ay[1] * q.x + ay[2] * q.y;

        for ((&cp, &wx), &wy) in self
            .source
            .iter()
            .zip(&self.coefficients_x[..n])
            .zip(&self.coefficients_y[..n])
        {
            let u = kernel_between(q, cp);
            x += wx * u;
            y += wy * u;
        }

        Point2D::new(x, y)
    }

    /// Transform many points.
    pub fn transform_points(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.iter().map(|&p| self.transform(p)).collect()
    }

    /// Transform many points across the rayon thread pool.
    pub fn transform_points_par(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.par_iter().map(|&p| self.transform(p)).collect()
    }

    /// Magnitude of the bending energy Σᵢ Σⱼ wᵢ wⱼ U(rᵢⱼ²), summed over both axes.
    ///
    /// Zero for a pure affine fit; grows with the amount of local warping.
    pub fn bending_energy(&self) -> f64 {
        let n = self.source.len();
        let wx = self.weights_x();
        let wy = self.weights_y();
        let mut energy = 0.0;

        for i in 0..n {
            for j in (i + 1)..n {
                let u = tps_kernel(self.source[i].distance_squared(self.source[j]));
                energy += 2.0 * (wx[i] * wx[j] + wy[i] * wy[j]) * u;
            }
        }

        energy.abs()
    }

    /// Distance between each transformed source point and its target.
    ///
    /// With a successful fit these are all close to zero.
    pub fn residuals(&self, target: &[Point2D]) -> Vec<f64> {
        self.source
            .iter()
            .zip(target)
            .map(|(&src, &tgt)| self.transform(src).distance(tgt))
            .collect()
    }

    /// Largest control-point residual, 0 for an empty target slice.
    pub fn max_residual(&self, target: &[Point2D]) -> f64 {
        self.residuals(target).into_iter().fold(0.0, f64::max)
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn source_points(&self) -> &[Point2D] {
        &self.source
    }

    /// Full x-axis coefficient vector (length n + 3).
    pub fn coefficients_x(&self) -> &[f64] {
        &self.coefficients_x
    }

    /// Full y-axis coefficient vector (length n + 3).
    pub fn coefficients_y(&self) -> &[f64] {
        &self.coefficients_y
    }

    /// Kernel weights for the x axis.
    pub fn weights_x(&self) -> &[f64] {
        &self.coefficients_x[..self.source.len()]
    }

    /// Kernel weights for the y axis.
    pub fn weights_y(&self) -> &[f64] {
        &self.coefficients_y[..self.source.len()]
    }

    /// Affine terms for x: `[constant, x-slope, y-slope]`.
    pub fn affine_x(&self) -> [f64; 3] {
        let n = self.source.len();
        [
            self.coefficients_x[n],
            self.coefficients_x[n + 1],
            self.coefficients_x[n + 2],
        ]
    }

    /// Affine terms for y: `[constant, x-slope, y-slope]`.
    pub fn affine_y(&self) -> [f64; 3] {
        let n = self.source.len();
        [
            self.coefficients_y[n],
            self.coefficients_y[n + 1],
            self.coefficients_y[n + 2],
        ]
    }
}

/// Checks that run before any matrix is built.
fn validate_control_points(source: &[Point2D], target: &[Point2D]) -> GeorefResult<()> {
    if source.len() != target.len() {
        return Err(GeorefError::configuration(format!(
            "source has {} points but target has {}",
            source.len(),
            target.len()
        )));
    }
    if source.len() < MIN_CONTROL_POINTS {
        return Err(GeorefError::configuration(format!(
            "at least {} control points are required, got {}",
            MIN_CONTROL_POINTS,
            source.len()
        )));
    }
    if let Some(i) = source
        .iter()
        .zip(target)
        .position(|(s, t)| !s.is_finite() || !t.is_finite())
    {
        return Err(GeorefError::configuration(format!(
            "control point {} has a non-finite coordinate",
            i
        )));
    }
    Ok(())
}
