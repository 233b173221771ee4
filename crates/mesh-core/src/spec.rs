//! Specification objects for meshes, color ranges and isolines.
//!
//! All specs deserialize from JSON using the camelCase keys of the
//! JavaScript-facing API (`gridWidth`, `colorRange`, `labelSpacing`, ...).
//! Missing keys take their defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use viz_common::{ColorInput, VizResult};

fn load_json<T: DeserializeOwned>(json_str: &str) -> VizResult<T> {
    Ok(serde_json::from_str(json_str)?)
}

fn load_file<T: DeserializeOwned>(path: &str) -> VizResult<T> {
    let content = std::fs::read_to_string(path)?;
    load_json(&content)
}

macro_rules! impl_spec_loading {
    ($($spec:ty),+) => {$(
        impl $spec {
            /// Load from a JSON string.
            pub fn from_json(json_str: &str) -> VizResult<Self> {
                load_json(json_str)
            }

            /// Load from a JSON file.
            pub fn from_file(path: &str) -> VizResult<Self> {
                load_file(path)
            }
        }
    )+};
}

impl_spec_loading!(MeshSpec, ColorRangeSpec, IsolineSpec);

// ============================================================================
// Mesh
// ============================================================================

/// Explicit element connectivity: nested per-element index lists or one flat
/// packed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Elements {
    Nested(Vec<Vec<usize>>),
    Flat(Vec<usize>),
}

/// How a flat element list is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementPacking {
    #[default]
    Auto,
    Triangle,
    Square,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeshSpec {
    pub elements: Option<Elements>,
    pub element_packing: ElementPacking,
    pub grid_width: Option<usize>,
    pub grid_height: Option<usize>,
    pub x0: Option<f64>,
    pub y0: Option<f64>,
    pub dx: Option<f64>,
    pub dy: Option<f64>,
    pub wrap_longitude: bool,
}

impl Default for MeshSpec {
    fn default() -> Self {
        Self {
            elements: None,
            element_packing: ElementPacking::Auto,
            grid_width: None,
            grid_height: None,
            x0: None,
            y0: None,
            dx: None,
            dy: None,
            wrap_longitude: true,
        }
    }
}

impl MeshSpec {
    /// An implicit grid of the given dimensions.
    pub fn grid(width: usize, height: usize) -> Self {
        Self {
            grid_width: Some(width),
            grid_height: Some(height),
            ..Self::default()
        }
    }

    /// Explicit element connectivity.
    pub fn with_elements(elements: Elements) -> Self {
        Self {
            elements: Some(elements),
            ..Self::default()
        }
    }

    /// Compute grid positions arithmetically instead of through the position
    /// accessor.
    pub fn with_origin(mut self, x0: f64, y0: f64, dx: f64, dy: f64) -> Self {
        self.x0 = Some(x0);
        self.y0 = Some(y0);
        self.dx = Some(dx);
        self.dy = Some(dy);
        self
    }

    pub fn with_packing(mut self, packing: ElementPacking) -> Self {
        self.element_packing = packing;
        self
    }

    pub fn with_wrap_longitude(mut self, wrap: bool) -> Self {
        self.wrap_longitude = wrap;
        self
    }
}

// ============================================================================
// Color range
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorRangeSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_color: ColorInput,
    pub min_opacity: f64,
    pub max_color: ColorInput,
    pub max_opacity: f64,
    pub stepped: bool,
    pub color_range: Vec<ColorInput>,
    pub opacity_range: Option<Vec<f64>>,
    pub range_values: Option<Vec<f64>>,
}

impl Default for ColorRangeSpec {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            min_color: "black".into(),
            min_opacity: 0.0,
            max_color: "black".into(),
            max_opacity: 0.0,
            stepped: false,
            color_range: Self::default_color_range(),
            opacity_range: None,
            range_values: None,
        }
    }
}

impl ColorRangeSpec {
    /// Blue → cyan → green → yellow → red.
    pub fn default_color_range() -> Vec<ColorInput> {
        ["#0000ff", "#00ffff", "#00ff00", "#ffff00", "#ff0000"]
            .into_iter()
            .map(ColorInput::from)
            .collect()
    }

    pub fn with_colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorInput>,
    {
        self.color_range = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_range_values(mut self, values: Vec<f64>) -> Self {
        self.range_values = Some(values);
        self
    }

    pub fn with_stepped(mut self, stepped: bool) -> Self {
        self.stepped = stepped;
        self
    }
}

// ============================================================================
// Isolines
// ============================================================================

/// Which thresholds get a label.
///
/// `true`/`false` labels every or no threshold; a number labels thresholds
/// whose level is at least that number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelRule {
    Enabled(bool),
    MinLevel(u32),
}

impl Default for LabelRule {
    fn default() -> Self {
        LabelRule::MinLevel(1)
    }
}

impl LabelRule {
    pub fn accepts(&self, level: u32) -> bool {
        match *self {
            LabelRule::Enabled(enabled) => enabled,
            LabelRule::MinLevel(min) => level >= min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsolineSpec {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Approximate number of thresholds when they are generated.
    pub count: usize,
    /// Round generated spacing to a 1/2/5 multiple of a power of ten.
    pub autofit: bool,
    /// Explicit distance between thresholds.
    pub spacing: Option<f64>,
    /// Explicit thresholds; overrides count/autofit/spacing.
    pub values: Option<Vec<f64>>,
    /// Repeating divisors used to bucket thresholds into levels.
    pub levels: Vec<u32>,
    pub label: LabelRule,
    /// Target distance between labels along a line, in pixels.
    pub label_spacing: f64,
    /// Fraction of the label spacing used to shift the first label.
    pub label_offset: f64,
    /// Extra margin around the viewport, in pixels, where labels are still
    /// placed. Zero or negative places labels everywhere.
    pub label_viewport: f64,
    pub label_auto_update: bool,
}

impl Default for IsolineSpec {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            count: 15,
            autofit: true,
            spacing: None,
            values: None,
            levels: vec![5, 5],
            label: LabelRule::default(),
            label_spacing: 200.0,
            label_offset: 0.0,
            label_viewport: 10000.0,
            label_auto_update: true,
        }
    }
}

impl IsolineSpec {
    /// Exactly these thresholds.
    pub fn with_values(values: Vec<f64>) -> Self {
        Self {
            values: Some(values),
            ..Self::default()
        }
    }

    /// `count` thresholds evenly distributed strictly inside the value range.
    pub fn uniform(count: usize) -> Self {
        Self {
            count,
            autofit: false,
            ..Self::default()
        }
    }

    /// Thresholds at every multiple of `spacing`.
    pub fn with_spacing(spacing: f64) -> Self {
        Self {
            spacing: Some(spacing),
            ..Self::default()
        }
    }
}
