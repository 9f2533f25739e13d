//! Common types shared across the georeferencing workspace.

pub mod bbox;
pub mod control;
pub mod error;
pub mod extent;
pub mod point;

pub use bbox::BoundingBox;
pub use control::{split_pairs, ControlPair};
pub use error::{GeorefError, GeorefResult};
pub use extent::ImageExtent;
pub use point::Point2D;
