//! Common test fixtures for geoviz tests.
//!
//! This module provides pre-defined grids, display sizes and JSON specs that
//! represent common mesh and isoline scenarios.

/// Common regular grid definitions.
pub mod grid {
    /// One degree global grid with columns starting at the prime meridian
    pub const GLOBAL_1DEG: GridSpec = GridSpec {
        width: 360,
        height: 181,
        x0: 0.0,
        y0: -90.0,
        dx: 1.0,
        dy: 1.0,
    };

    /// Five columns crossing the antimeridian (170 to 210)
    pub const ANTIMERIDIAN_5: GridSpec = GridSpec {
        width: 5,
        height: 2,
        x0: 170.0,
        y0: 0.0,
        dx: 10.0,
        dy: 10.0,
    };

    /// Simple 10x10 grid inside the valid longitude range
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        width: 10,
        height: 10,
        x0: -10.0,
        y0: -10.0,
        dx: 2.0,
        dy: 2.0,
    };

    /// Regular grid definition: origin and spacing.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub x0: f64,
        pub y0: f64,
        pub dx: f64,
        pub dy: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid points.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the x of the last column, before any wrapping.
        pub fn last_x(&self) -> f64 {
            self.x0 + self.dx * (self.width as f64 - 1.0)
        }

        /// Returns the angular span covered by the columns.
        pub fn span(&self) -> f64 {
            self.dx * self.width as f64
        }
    }
}

/// JSON specs in the camelCase form accepted by the spec loaders.
pub mod specs {
    /// Antimeridian-crossing grid with arithmetic positions
    pub const MESH_WRAPPED_GRID: &str = r#"{
        "gridWidth": 5,
        "gridHeight": 2,
        "x0": 170,
        "y0": 0,
        "dx": 10,
        "dy": 10,
        "wrapLongitude": true
    }"#;

    /// Two explicit quads sharing an edge
    pub const MESH_EXPLICIT_SQUARES: &str = r#"{
        "elements": [[0, 1, 4, 3], [1, 2, 5, 4]],
        "elementPacking": "square"
    }"#;

    /// Temperature-like stepped ramp with transparent out-of-range colors
    pub const COLOR_RANGE_STEPPED: &str = r##"{
        "min": 0,
        "max": 30,
        "stepped": true,
        "colorRange": ["#0000ff", "rgb(0, 255, 0)", "red"],
        "opacityRange": [1, 0.5],
        "minColor": "black",
        "minOpacity": 0,
        "maxColor": "white",
        "maxOpacity": 1
    }"##;

    /// Non-uniform band boundaries for a three-color smooth ramp
    pub const COLOR_RANGE_VALUES: &str = r##"{
        "colorRange": ["#000000", "#808080", "#ffffff"],
        "rangeValues": [0, 10, 100, 1000]
    }"##;

    /// Contours every 5 units with heavy lines every 25
    pub const ISOLINE_SPACED: &str = r#"{
        "spacing": 5,
        "levels": [5],
        "label": 1,
        "labelSpacing": 150,
        "labelViewport": 0
    }"#;
}

/// Common display sizes in pixels.
pub mod display {
    /// A typical browser viewport
    pub const VIEWPORT: (f64, f64) = (1024.0, 768.0);
}
