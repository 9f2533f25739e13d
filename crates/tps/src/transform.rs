//! Coordinate transform pairing exposed to rendering code.
//!
//! A rendering pipeline registers a forward/inverse function pair between
//! two coordinate spaces and pulls one coordinate per sample. The TPS warp
//! fills the forward slot. The inverse slot is an identity placeholder:
//! an inverse TPS is not computed.

use crate::coefficients::CoefficientSet;
use georef_common::{GeorefResult, Point2D};

/// Forward/inverse mapping between two planar coordinate spaces.
pub trait CoordinateTransform: Send + Sync {
    /// Map a point from space A (map) to space B (image).
    fn forward(&self, p: Point2D) -> Point2D;

    /// Map a point from space B back to space A.
    fn inverse(&self, p: Point2D) -> Point2D;
}

/// A fitted TPS warp from map space to image space.
///
/// Share it behind an `Arc` (see [`WarpHandle`](crate::WarpHandle)) rather
/// than cloning; a clone copies every coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct ThinPlateSpline {
    coefficients: CoefficientSet,
}

impl ThinPlateSpline {
    /// Fit a warp that maps `source[i]` exactly onto `target[i]`.
    pub fn fit(source: &[Point2D], target: &[Point2D]) -> GeorefResult<Self> {
        CoefficientSet::compute(source, target).map(Self::from_coefficients)
    }

    pub fn from_coefficients(coefficients: CoefficientSet) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }
}

impl CoordinateTransform for ThinPlateSpline {
    #[inline]
    fn forward(&self, p: Point2D) -> Point2D {
        self.coefficients.transform(p)
    }

    /// Identity placeholder. Returns the input unchanged.
    #[inline]
    fn inverse(&self, p: Point2D) -> Point2D {
        p
    }
}
