//! Image extents.
//!
//! An image placed on a map is addressed in "image space": pixel coordinates
//! multiplied by a fixed scale factor. The extent of that space is
//! `[0, 0, width * scale, height * scale]`.

use crate::{BoundingBox, GeorefError, GeorefResult, Point2D};
use serde::{Deserialize, Serialize};

/// Pixel dimensions and scale of a georeferenced image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageExtent {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Image-space units per pixel
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl ImageExtent {
    pub fn new(width: u32, height: u32, scale: f64) -> GeorefResult<Self> {
        let extent = Self {
            width,
            height,
            scale,
        };
        extent.validate()?;
        Ok(extent)
    }

    /// Reject zero-sized images and non-positive scales.
    pub fn validate(&self) -> GeorefResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GeorefError::configuration(format!(
                "image extent must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(GeorefError::configuration(format!(
                "image scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    /// The image-space box `[0, 0, width * scale, height * scale]`.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            0.0,
            0.0,
            self.width as f64 * self.scale,
            self.height as f64 * self.scale,
        )
    }

    /// Convert a pixel coordinate to image space.
    pub fn pixel_to_image(&self, pixel: Point2D) -> Point2D {
        pixel.scaled(self.scale)
    }

    /// Convert an image-space coordinate back to fractional pixels.
    pub fn image_to_pixel(&self, p: Point2D) -> Point2D {
        p.scaled(1.0 / self.scale)
    }
}
