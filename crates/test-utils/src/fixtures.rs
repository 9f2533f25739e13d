//! Common control-point fixtures.
//!
//! Each fixture returns `(source, target)` vectors of equal length.

use georef_common::{ImageExtent, Point2D};

/// Unit square corners scaled by `size`.
pub fn square(size: f64) -> Vec<Point2D> {
    vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(size, 0.0),
        Point2D::new(0.0, size),
        Point2D::new(size, size),
    ]
}

/// Square [0,10]² mapped onto [0,100]²: a uniform scale by 10.
pub fn uniform_scale() -> (Vec<Point2D>, Vec<Point2D>) {
    (square(10.0), square(100.0))
}

/// Three non-collinear points under a known affine map
/// `x' = 1 + 2.4x + 0.3y`, `y' = 2 + 0.1x + 2.8y`.
pub fn affine_triangle() -> (Vec<Point2D>, Vec<Point2D>) {
    let source = vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(10.0, 0.0),
        Point2D::new(0.0, 10.0),
    ];
    let target = source.iter().map(|&p| affine_map(p)).collect();
    (source, target)
}

/// The affine map used by [`affine_triangle`].
pub fn affine_map(p: Point2D) -> Point2D {
    Point2D::new(1.0 + 2.4 * p.x + 0.3 * p.y, 2.0 + 0.1 * p.x + 2.8 * p.y)
}

/// Three points on the x axis.
pub fn collinear_horizontal() -> (Vec<Point2D>, Vec<Point2D>) {
    let source = vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(1.0, 0.0),
        Point2D::new(2.0, 0.0),
    ];
    let target = vec![
        Point2D::new(3.0, 7.0),
        Point2D::new(-1.0, 2.0),
        Point2D::new(5.0, 5.0),
    ];
    (source, target)
}

/// Four points on the diagonal y = x.
pub fn collinear_diagonal() -> (Vec<Point2D>, Vec<Point2D>) {
    let source: Vec<Point2D> = [0.0, 1.0, 2.0, 3.5]
        .iter()
        .map(|&t| Point2D::new(t, t))
        .collect();
    let target = square(5.0);
    (source, target)
}

/// A valid square with its first corner repeated.
pub fn duplicate_point() -> (Vec<Point2D>, Vec<Point2D>) {
    let mut source = square(1.0);
    source.insert(1, source[0]);
    let mut target = square(10.0);
    target.insert(1, Point2D::new(0.5, 0.5));
    (source, target)
}

/// Map-to-image georeference of a scanned street map.
///
/// Source points are EPSG:3857 meters; targets are image pixels times
/// [`STREET_MAP_SCALE`].
pub mod street_map {
    use super::*;

    pub const STREET_MAP_SCALE: f64 = 10.0;

    pub const MAP_POINTS: [[f64; 2]; 4] = [
        [-8370429.490654901, 4867651.87361489],
        [-8370615.538426359, 4869320.508890055],
        [-8368083.461977787, 4869558.814898979],
        [-8368232.9709453685, 4867723.240033842],
    ];

    pub const IMAGE_PIXELS: [[f64; 2]; 4] = [
        [107.12444972569087, 9.280707359384778],
        [57.2517490433864, 504.26537432548855],
        [806.0133025747704, 574.7787658121335],
        [761.0608751969928, 30.782732147959823],
    ];

    /// Pixel size of the scanned image.
    pub fn extent() -> ImageExtent {
        ImageExtent {
            width: 860,
            height: 600,
            scale: STREET_MAP_SCALE,
        }
    }

    pub fn control_points() -> (Vec<Point2D>, Vec<Point2D>) {
        let source = MAP_POINTS.iter().map(|&p| Point2D::from(p)).collect();
        let target = IMAGE_PIXELS
            .iter()
            .map(|&p| Point2D::from(p).scaled(STREET_MAP_SCALE))
            .collect();
        (source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_lengths_match() {
        for (s, t) in [
            uniform_scale(),
            affine_triangle(),
            collinear_horizontal(),
            collinear_diagonal(),
            duplicate_point(),
            street_map::control_points(),
        ] {
            assert_eq!(s.len(), t.len());
        }
    }

    #[test]
    fn test_street_map_targets_inside_extent() {
        let (_, target) = street_map::control_points();
        let bbox = street_map::extent().bbox();
        assert!(target.iter().all(|&p| bbox.contains(p)));
    }
}
