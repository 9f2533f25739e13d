//! Georeferencing service library.
//!
//! Loads a control-point configuration, fits the thin plate spline warp and
//! produces reports for the `georef` binary. Exposed as a library so the
//! pieces can be tested without spawning the binary.

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{load_config, GeorefConfig};
