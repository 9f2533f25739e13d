//! Two-dimensional points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in a planar coordinate space.
///
/// Serialized as a two-element array `[x, y]`, the same shape control points
/// take in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Multiply both coordinates by a scalar.
    pub fn scaled(&self, factor: f64) -> Point2D {
        Point2D::new(self.x * factor, self.y * factor)
    }

    /// Shift by an offset.
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }

    /// Parse a point from an "x,y" string.
    pub fn from_pair_string(s: &str) -> Result<Self, PointParseError> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| PointParseError::InvalidFormat(s.to_string()))?;

        let x = x
            .trim()
            .parse()
            .map_err(|_| PointParseError::InvalidNumber(x.trim().to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| PointParseError::InvalidNumber(y.trim().to_string()))?;

        Ok(Point2D::new(x, y))
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Point2D::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PointParseError {
    #[error("Invalid point format: {0}. Expected 'x,y'")]
    InvalidFormat(String),

    #[error("Invalid number in point: {0}")]
    InvalidNumber(String),
}
