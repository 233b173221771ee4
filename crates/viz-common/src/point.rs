//! Points in a feature-local coordinate reference system.

use serde::{Deserialize, Serialize};

/// A vertex position `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point on the z = 0 plane.
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Linear interpolation: `self * (1 - f) + other * f`, componentwise.
    pub fn lerp(&self, other: &Point3, f: f64) -> Point3 {
        Point3 {
            x: self.x * (1.0 - f) + other.x * f,
            y: self.y * (1.0 - f) + other.y * f,
            z: self.z * (1.0 - f) + other.z * f,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<(f64, f64)> for Point3 {
    fn from((x, y): (f64, f64)) -> Self {
        Point3::xy(x, y)
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Point3::new(x, y, z)
    }
}
