//! Precomputed warp grids for raster reprojection.
//!
//! Rendering an image onto the map evaluates the forward warp once per
//! output pixel. A [`WarpGrid`] does that evaluation up front for a render
//! window: it stores the image-space coordinate for every output pixel plus
//! a validity bitmap marking pixels whose coordinate lands inside the image.
//! Resampling then only needs bilinear interpolation.
//!
//! Image space is y-up like the map: row 0 of a raster is its top edge,
//! at `y = height * scale`.

use crate::transform::CoordinateTransform;
use georef_common::{BoundingBox, ImageExtent, Point2D};
use rayon::prelude::*;
use tracing::debug;

/// Image-space coordinates for each pixel of a `width × height` render window.
#[derive(Debug, Clone)]
pub struct WarpGrid {
    pub width: usize,
    pub height: usize,
    /// Map-space window the grid covers
    pub bbox: BoundingBox,
    /// Flat row-major coordinates: `coords[row * width + col]`
    coords: Vec<Point2D>,
    /// Bit N set when pixel N falls inside the image extent
    valid_bitmap: Vec<u64>,
}

impl WarpGrid {
    /// Evaluate `warp` at the centre of every output pixel covering `bbox`.
    ///
    /// Row 0 is the top of the window (`bbox.max_y`). Rows are computed in
    /// parallel.
    pub fn compute<T: CoordinateTransform>(
        warp: &T,
        bbox: BoundingBox,
        width: usize,
        height: usize,
        image: &ImageExtent,
    ) -> Self {
        let pixel_count = width * height;
        let mut coords = vec![Point2D::new(f64::NAN, f64::NAN); pixel_count];

        if width > 0 {
            coords
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| {
                    let y_ratio = (row as f64 + 0.5) / height as f64;
                    let map_y = bbox.max_y - y_ratio * bbox.height();
                    for (col, slot) in out.iter_mut().enumerate() {
                        let x_ratio = (col as f64 + 0.5) / width as f64;
                        let map_x = bbox.min_x + x_ratio * bbox.width();
                        *slot = warp.forward(Point2D::new(map_x, map_y));
                    }
                });
        }

        let image_bbox = image.bbox();
        let mut valid_bitmap = vec![0u64; pixel_count.div_ceil(64)];
        for (idx, p) in coords.iter().enumerate() {
            if p.is_finite() && image_bbox.contains(*p) {
                valid_bitmap[idx / 64] |= 1u64 << (idx % 64);
            }
        }

        let grid = Self {
            width,
            height,
            bbox,
            coords,
            valid_bitmap,
        };

        debug!(
            width,
            height,
            valid = grid.valid_count(),
            "Computed warp grid"
        );

        grid
    }

    #[inline]
    pub fn is_valid(&self, pixel_idx: usize) -> bool {
        pixel_idx < self.coords.len()
            && (self.valid_bitmap[pixel_idx / 64] & (1u64 << (pixel_idx % 64))) != 0
    }

    /// Image-space coordinate for a pixel, None if it falls outside the image.
    #[inline]
    pub fn get(&self, pixel_idx: usize) -> Option<Point2D> {
        if self.is_valid(pixel_idx) {
            Some(self.coords[pixel_idx])
        } else {
            None
        }
    }

    /// Coordinate at `(col, row)` regardless of validity.
    pub fn coord(&self, col: usize, row: usize) -> Option<Point2D> {
        if col < self.width && row < self.height {
            Some(self.coords[row * self.width + col])
        } else {
            None
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid_bitmap
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Valid pixels as `(col, row, image coordinate)`.
    pub fn iter_valid(&self) -> impl Iterator<Item = (usize, usize, Point2D)> + '_ {
        self.coords
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_valid(*idx))
            .map(|(idx, &p)| (idx % self.width, idx / self.width, p))
    }
}

/// Resample a raw image raster through a warp grid.
///
/// `data` is row-major, `data_width × data_height` pixels, row 0 at the top.
/// Each valid grid pixel is bilinearly interpolated from the four raster
/// pixels around its image-space coordinate; invalid pixels and samples
/// touching a NaN come out as NaN.
pub fn resample_bilinear(
    data: &[f32],
    data_width: usize,
    data_height: usize,
    image: &ImageExtent,
    grid: &WarpGrid,
) -> Vec<f32> {
    let mut output = vec![f32::NAN; grid.len()];
    if data_width == 0 || data_height == 0 || data.len() < data_width * data_height {
        return output;
    }

    let max_i = (data_width - 1) as f64;
    let max_j = (data_height - 1) as f64;
    let top = data_height as f64;

    for (pixel_idx, out) in output.iter_mut().enumerate() {
        let Some(p) = grid.get(pixel_idx) else {
            continue;
        };

        // Image space (y-up) to fractional raster index at pixel centres
        let px = image.image_to_pixel(p);
        let fi = (px.x - 0.5).clamp(0.0, max_i);
        let fj = (top - px.y - 0.5).clamp(0.0, max_j);

        let i1 = fi.floor() as usize;
        let j1 = fj.floor() as usize;
        let i2 = (i1 + 1).min(data_width - 1);
        let j2 = (j1 + 1).min(data_height - 1);

        let di = (fi - i1 as f64) as f32;
        let dj = (fj - j1 as f64) as f32;

        let v11 = data[j1 * data_width + i1];
        let v21 = data[j1 * data_width + i2];
        let v12 = data[j2 * data_width + i1];
        let v22 = data[j2 * data_width + i2];

        if v11.is_nan() || v21.is_nan() || v12.is_nan() || v22.is_nan() {
            continue;
        }

        let v1 = v11 * (1.0 - di) + v21 * di;
        let v2 = v12 * (1.0 - di) + v22 * di;
        *out = v1 * (1.0 - dj) + v2 * dj;
    }

    output
}
