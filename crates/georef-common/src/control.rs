//! Control point pairs.

use crate::Point2D;
use serde::{Deserialize, Serialize};

/// One map-space point tied to its location on the image.
///
/// `image` is in unscaled pixels; the fitting code multiplies by the
/// image extent's scale before solving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPair {
    pub map: Point2D,
    pub image: Point2D,
}

impl ControlPair {
    pub fn new(map: Point2D, image: Point2D) -> Self {
        Self { map, image }
    }

    pub fn is_finite(&self) -> bool {
        self.map.is_finite() && self.image.is_finite()
    }
}

/// Split pairs into parallel `(map, image)` vectors.
pub fn split_pairs(pairs: &[ControlPair]) -> (Vec<Point2D>, Vec<Point2D>) {
    pairs.iter().map(|p| (p.map, p.image)).unzip()
}
