//! Georeference configuration loading.
//!
//! A configuration file describes one image placed on the map: the pixel
//! extent of the image, the control pairs tying map coordinates to image
//! pixels, and optional per-point debug adjustments. `${VAR}` and
//! `${VAR:-default}` references are expanded from the environment before the
//! YAML is parsed.

use anyhow::{Context, Result};
use georef_common::{ControlPair, GeorefError, GeorefResult, ImageExtent, Point2D};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tps::ThinPlateSpline;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeorefConfig {
    pub image: ImageExtent,
    pub control_points: Vec<ControlPair>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

/// Pixel offset added to one control pair's image point before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub index: usize,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

impl GeorefConfig {
    /// Check the extent, the control pairs and every adjustment index.
    pub fn validate(&self) -> GeorefResult<()> {
        self.image.validate()?;

        if self.control_points.len() < tps::coefficients::MIN_CONTROL_POINTS {
            return Err(GeorefError::configuration(format!(
                "control_points: at least {} pairs required, got {}",
                tps::coefficients::MIN_CONTROL_POINTS,
                self.control_points.len()
            )));
        }

        if let Some(idx) = self.control_points.iter().position(|p| !p.is_finite()) {
            return Err(GeorefError::configuration(format!(
                "control_points[{}]: coordinates must be finite",
                idx
            )));
        }

        for adj in &self.adjustments {
            if adj.index >= self.control_points.len() {
                return Err(GeorefError::configuration(format!(
                    "adjustments: index {} out of range for {} control points",
                    adj.index,
                    self.control_points.len()
                )));
            }
            if !(adj.dx.is_finite() && adj.dy.is_finite()) {
                return Err(GeorefError::configuration(format!(
                    "adjustments: offset for index {} must be finite",
                    adj.index
                )));
            }
        }

        Ok(())
    }

    /// Map-space source points, in file order.
    pub fn map_points(&self) -> Vec<Point2D> {
        self.control_points.iter().map(|p| p.map).collect()
    }

    /// Image-space target points: pixel + adjustment, then multiplied by the
    /// image scale.
    pub fn image_points(&self) -> Vec<Point2D> {
        let mut pixels: Vec<Point2D> = self.control_points.iter().map(|p| p.image).collect();
        for adj in &self.adjustments {
            if let Some(p) = pixels.get_mut(adj.index) {
                *p = p.offset(adj.dx, adj.dy);
            }
        }
        pixels
            .into_iter()
            .map(|p| self.image.pixel_to_image(p))
            .collect()
    }

    /// Validate and fit the map → image warp.
    pub fn fit(&self) -> GeorefResult<ThinPlateSpline> {
        self.validate()?;
        ThinPlateSpline::fit(&self.map_points(), &self.image_points())
    }
}

/// Read, expand and parse a configuration file, then validate it.
pub fn load_config(path: &Path) -> Result<GeorefConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    info!(
        path = %path.display(),
        control_points = config.control_points.len(),
        adjustments = config.adjustments.len(),
        "Loaded georeference config"
    );

    Ok(config)
}

/// Parse configuration text. Environment references are expanded first.
pub fn parse_config(content: &str) -> Result<GeorefConfig> {
    let expanded = expand_env_vars(content)?;
    let config: GeorefConfig = serde_yaml::from_str(&expanded).map_err(GeorefError::from)?;
    config.validate()?;
    debug!(
        width = config.image.width,
        height = config.image.height,
        scale = config.image.scale,
        "Parsed image extent"
    );
    Ok(config)
}

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut var_expr = String::new();
        let mut depth = 1;
        while depth > 0 {
            match chars.next() {
                Some('{') => {
                    depth += 1;
                    var_expr.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth > 0 {
                        var_expr.push('}');
                    }
                }
                Some(c) => var_expr.push(c),
                None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
            }
        }

        result.push_str(&resolve_var_expr(&var_expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        },
        None => std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr.trim())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
image:
  width: 100
  height: 50
  scale: 2.0
control_points:
  - map: [0.0, 0.0]
    image: [0.0, 0.0]
  - map: [10.0, 0.0]
    image: [100.0, 0.0]
  - map: [0.0, 10.0]
    image: [0.0, 50.0]
"#;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.image.width, 100);
        assert_eq!(config.control_points.len(), 3);
        assert!(config.adjustments.is_empty());
        assert_eq!(config.image_points()[1], Point2D::new(200.0, 0.0));
    }

    #[test]
    fn test_scale_defaults_to_one() {
        let yaml = MINIMAL.replace("  scale: 2.0\n", "");
        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.image.scale, 1.0);
        assert_eq!(config.image_points()[2], Point2D::new(0.0, 50.0));
    }

    #[test]
    fn test_adjustment_applied_before_scaling() {
        let yaml = format!("{}adjustments:\n  - index: 1\n    dx: 1.5\n    dy: -2.0\n", MINIMAL);
        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.image_points()[1], Point2D::new(203.0, -4.0));
        assert_eq!(config.image_points()[0], Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_adjustment_index_out_of_range() {
        let yaml = format!("{}adjustments:\n  - index: 3\n    dx: 1.0\n", MINIMAL);
        let err = parse_config(&yaml).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{}", err);
    }

    #[test]
    fn test_too_few_control_points() {
        let yaml = r#"
image: { width: 10, height: 10 }
control_points:
  - { map: [0.0, 0.0], image: [0.0, 0.0] }
  - { map: [1.0, 0.0], image: [1.0, 0.0] }
"#;
        let err = parse_config(yaml).unwrap_err();
        let georef = err.downcast_ref::<GeorefError>().unwrap();
        assert!(georef.is_degenerate());
    }

    #[test]
    fn test_missing_field_rejected() {
        let yaml = "control_points: []\n";
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn test_zero_extent_rejected() {
        let yaml = MINIMAL.replace("width: 100", "width: 0");
        assert!(parse_config(&yaml).is_err());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("GEOREF_TEST_IMAGE_WIDTH", "640");
        let yaml = MINIMAL.replace("width: 100", "width: ${GEOREF_TEST_IMAGE_WIDTH}");
        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.image.width, 640);
    }

    #[test]
    fn test_env_default() {
        let yaml = MINIMAL.replace("scale: 2.0", "scale: ${GEOREF_TEST_UNSET_SCALE:-4.0}");
        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.image.scale, 4.0);
    }

    #[test]
    fn test_env_missing_var() {
        let err = expand_env_vars("width: ${GEOREF_TEST_DEFINITELY_UNSET}").unwrap_err();
        assert!(err.to_string().contains("GEOREF_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_env_unclosed() {
        assert!(expand_env_vars("width: ${OOPS").is_err());
    }

    #[test]
    fn test_plain_dollar_untouched() {
        assert_eq!(expand_env_vars("cost: $5").unwrap(), "cost: $5");
    }

    #[test]
    fn test_fit_reproduces_targets() {
        let config = parse_config(MINIMAL).unwrap();
        let warp = config.fit().unwrap();
        let residual = warp.coefficients().max_residual(&config.image_points());
        assert!(residual < 1e-6, "residual {}", residual);
    }
}
