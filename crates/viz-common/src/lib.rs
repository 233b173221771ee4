//! Common types and utilities shared across the geoviz crates.

pub mod color;
pub mod color_cache;
pub mod error;
pub mod point;

pub use color::{convert_color, parse_css_color, ColorInput, Rgba};
pub use color_cache::ColorCache;
pub use error::{VizError, VizResult};
pub use point::Point3;
