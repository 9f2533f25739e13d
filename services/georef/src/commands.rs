//! Command implementations behind the `georef` binary.

use anyhow::{Context, Result};
use georef_common::{BoundingBox, GeorefResult, Point2D};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use tps::{CoordinateTransform, ThinPlateSpline, WarpGrid};
use tracing::{info, warn};

use crate::config::GeorefConfig;

/// Summary of one fitted warp, printed by `georef fit`.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub control_points: usize,
    pub affine_x: [f64; 3],
    pub affine_y: [f64; 3],
    pub weights_x: Vec<f64>,
    pub weights_y: Vec<f64>,
    pub bending_energy: f64,
    pub max_residual: f64,
}

impl FitReport {
    pub fn new(warp: &ThinPlateSpline, targets: &[Point2D]) -> Self {
        let coeffs = warp.coefficients();
        Self {
            control_points: coeffs.len(),
            affine_x: coeffs.affine_x(),
            affine_y: coeffs.affine_y(),
            weights_x: coeffs.weights_x().to_vec(),
            weights_y: coeffs.weights_y().to_vec(),
            bending_energy: coeffs.bending_energy(),
            max_residual: coeffs.max_residual(targets),
        }
    }
}

/// Fit the configured control points and summarize the result.
pub fn fit(config: &GeorefConfig) -> GeorefResult<FitReport> {
    let warp = config.fit().inspect_err(|e| {
        warn!(error = %e, "Control points rejected");
    })?;
    Ok(FitReport::new(&warp, &config.image_points()))
}

/// Parse `x,y` query points. Blank entries are skipped.
pub fn parse_points<I, S>(inputs: I) -> Result<Vec<Point2D>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .filter(|s| !s.as_ref().trim().is_empty())
        .map(|s| {
            let s = s.as_ref();
            Point2D::from_pair_string(s).with_context(|| format!("Invalid point: {:?}", s))
        })
        .collect()
}

/// Read one `x,y` point per line.
pub fn read_points<R: BufRead>(reader: R) -> Result<Vec<Point2D>> {
    let lines = reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to read points")?;
    parse_points(lines)
}

/// Forward map → image, or the identity inverse when `inverse` is set.
pub fn transform<T: CoordinateTransform>(
    warp: &T,
    points: &[Point2D],
    inverse: bool,
) -> Vec<Point2D> {
    points
        .iter()
        .map(|&p| if inverse { warp.inverse(p) } else { warp.forward(p) })
        .collect()
}

/// Summary of a computed warp grid, printed by `georef grid`.
#[derive(Debug, Clone, Serialize)]
pub struct GridReport {
    pub width: usize,
    pub height: usize,
    pub bbox: [f64; 4],
    pub valid_pixels: usize,
}

/// One grid cell written to the JSON output file.
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
    pub image: Point2D,
}

/// Evaluate the warp over `bbox` and optionally write the valid cells to `output`.
pub fn grid(
    config: &GeorefConfig,
    bbox: BoundingBox,
    width: usize,
    height: usize,
    output: Option<&Path>,
) -> Result<GridReport> {
    anyhow::ensure!(width > 0 && height > 0, "Grid dimensions must be non-zero");

    let warp = config.fit()?;
    let grid = WarpGrid::compute(&warp, bbox, width, height, &config.image);

    let report = GridReport {
        width,
        height,
        bbox: [bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y],
        valid_pixels: grid.valid_count(),
    };

    if let Some(path) = output {
        let cells: Vec<GridCell> = grid
            .iter_valid()
            .map(|(col, row, image)| GridCell { col, row, image })
            .collect();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &cells)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), cells = cells.len(), "Wrote warp grid");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    const SQUARE: &str = r#"
image: { width: 100, height: 100, scale: 1.0 }
control_points:
  - { map: [0.0, 0.0], image: [0.0, 0.0] }
  - { map: [10.0, 0.0], image: [100.0, 0.0] }
  - { map: [0.0, 10.0], image: [0.0, 100.0] }
  - { map: [10.0, 10.0], image: [100.0, 100.0] }
"#;

    #[test]
    fn test_fit_report() {
        let config = parse_config(SQUARE).unwrap();
        let report = fit(&config).unwrap();
        assert_eq!(report.control_points, 4);
        assert_eq!(report.weights_x.len(), 4);
        assert!((report.affine_x[1] - 10.0).abs() < 1e-6);
        assert!((report.affine_y[2] - 10.0).abs() < 1e-6);
        assert!(report.max_residual < 1e-6);
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points(["1,2", " ", "3.5, -4"]).unwrap();
        assert_eq!(points, vec![Point2D::new(1.0, 2.0), Point2D::new(3.5, -4.0)]);
        assert!(parse_points(["1;2"]).is_err());
    }

    #[test]
    fn test_read_points() {
        let input = "5,5\n\n0,10\n";
        let points = read_points(input.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_transform_forward_and_inverse() {
        let config = parse_config(SQUARE).unwrap();
        let warp = config.fit().unwrap();
        let q = [Point2D::new(5.0, 5.0)];

        let fwd = transform(&warp, &q, false);
        assert!((fwd[0].x - 50.0).abs() < 1e-6);
        assert!((fwd[0].y - 50.0).abs() < 1e-6);

        assert_eq!(transform(&warp, &q, true), q.to_vec());
    }

    #[test]
    fn test_grid_rejects_zero_size() {
        let config = parse_config(SQUARE).unwrap();
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(grid(&config, bbox, 0, 4, None).is_err());
    }

    #[test]
    fn test_grid_over_control_area_is_valid() {
        let config = parse_config(SQUARE).unwrap();
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let report = grid(&config, bbox, 8, 8, None).unwrap();
        assert_eq!(report.valid_pixels, 64);
    }
}
