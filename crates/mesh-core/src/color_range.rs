//! Mapping of scalar values onto a color lookup table.
//!
//! Raw values are scaled to a fractional index into `color_map`. Indices run
//! from `0` to `steps`, where `steps` is the number of colors for stepped
//! (banded) coloring and one less for smooth coloring. Indices below zero
//! take `min_color` and indices past `steps` take `max_color` at lookup
//! time.

use viz_common::{ColorCache, ColorInput, Rgba};

use crate::mesh::{Mesh, VALUE_KEY};
use crate::spec::ColorRangeSpec;

/// Result of mapping raw values through a color range.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapping {
    pub min_value: f64,
    pub max_value: f64,
    /// Scale from raw value to color-table index.
    pub factor: f64,
    pub color_map: Vec<Rgba>,
    pub min_color: Rgba,
    pub max_color: Rgba,
    pub stepped: bool,
    /// Non-uniform band boundaries, when valid ones were supplied.
    pub range_values: Option<Vec<f64>>,
    /// Fractional color-table index per input value.
    pub values: Vec<f64>,
}

impl ColorMapping {
    /// Largest in-range index.
    pub fn steps(&self) -> f64 {
        self.color_map.len() as f64 - if self.stepped { 0.0 } else { 1.0 }
    }

    /// Color-table index of a raw value.
    pub fn index_of(&self, value: f64) -> f64 {
        if let Some(range_values) = &self.range_values {
            if value >= self.min_value && value <= self.max_value {
                return range_index(range_values, value);
            }
        }
        (value - self.min_value) * self.factor
    }

    /// Color of a color-table index as a renderer would look it up.
    pub fn color_at(&self, index: f64) -> Rgba {
        let steps = self.steps();
        if !(index >= 0.0) {
            return self.min_color;
        }
        if index > steps {
            return self.max_color;
        }

        let Some(last) = self.color_map.len().checked_sub(1) else {
            return self.max_color;
        };
        let i = (index.floor() as usize).min(last);
        if self.stepped || i == last {
            self.color_map[i]
        } else {
            self.color_map[i].lerp(&self.color_map[i + 1], index - i as f64)
        }
    }

    /// Color of a raw value.
    pub fn color_of(&self, value: f64) -> Rgba {
        self.color_at(self.index_of(value))
    }

    /// Bake the table into 8-bit RGBA texels: the min color, `table_size`
    /// samples at the centers of equal slices of `[0, steps]`, then the max
    /// color.
    pub fn to_rgba8(&self, table_size: usize) -> Vec<u8> {
        let steps = self.steps();
        let mut texels = Vec::with_capacity((table_size + 2) * 4);
        texels.extend_from_slice(&self.min_color.to_rgba8());
        for i in 0..table_size {
            let index = (i as f64 + 0.5) / table_size as f64 * steps;
            texels.extend_from_slice(&self.color_at(index).to_rgba8());
        }
        texels.extend_from_slice(&self.max_color.to_rgba8());
        texels
    }
}

/// Fractional index of `value` between the bracketing range boundaries.
fn range_index(range_values: &[f64], value: f64) -> f64 {
    let k = (1..range_values.len())
        .find(|&k| value <= range_values[k])
        .unwrap_or(range_values.len() - 1);
    let low = range_values[k - 1];
    let span = range_values[k] - low;
    let fraction = if span > 0.0 { (value - low) / span } else { 0.0 };
    (k - 1) as f64 + fraction
}

/// A mesh together with the color mapping of its `value` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMappedMesh {
    pub mesh: Mesh,
    pub mapping: ColorMapping,
}

/// Maps values through color range specs, caching parsed color strings.
#[derive(Debug, Clone, Default)]
pub struct ColorRangeMapper {
    cache: ColorCache,
}

impl ColorRangeMapper {
    pub fn new(color_cache_size: usize) -> Self {
        Self {
            cache: ColorCache::new(color_cache_size),
        }
    }

    pub fn with_cache(cache: ColorCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ColorCache {
        &self.cache
    }

    pub fn map_values(&mut self, raw_values: &[f64], spec: &ColorRangeSpec) -> ColorMapping {
        let color_inputs = if spec.color_range.is_empty() {
            tracing::warn!("empty colorRange, using the default color range");
            ColorRangeSpec::default_color_range()
        } else {
            spec.color_range.clone()
        };

        let opacity = spec.opacity_range.as_deref().unwrap_or(&[]);
        let mut color_map: Vec<Rgba> = color_inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let a = opacity.get(i).copied().unwrap_or(1.0);
                self.convert(input).with_alpha(a)
            })
            .collect();

        let min_color = self.convert(&spec.min_color).with_alpha(spec.min_opacity);
        let max_color = self.convert(&spec.max_color).with_alpha(spec.max_opacity);

        let explicit_min = spec.min.filter(|v| v.is_finite());
        let explicit_max = spec.max.filter(|v| v.is_finite());
        let (mut min_value, mut max_value) = match (explicit_min, explicit_max) {
            (Some(min), Some(max)) => (min, max),
            (min, max) => {
                let (data_min, data_max) = scan_min_max(raw_values).unwrap_or((0.0, 0.0));
                (min.unwrap_or(data_min), max.unwrap_or(data_max))
            }
        };

        let mut range_values = spec
            .range_values
            .as_ref()
            .filter(|rv| valid_range_values(rv, color_map.len(), spec.stepped))
            .cloned();
        if spec.range_values.is_some() && range_values.is_none() {
            tracing::warn!(
                colors = color_map.len(),
                stepped = spec.stepped,
                "discarding invalid rangeValues, using uniform spacing"
            );
        }
        if let Some(rv) = &range_values {
            min_value = rv[0];
            max_value = rv[rv.len() - 1];
        }

        let mut range = max_value - min_value;
        if range == 0.0 || !range.is_finite() {
            color_map.truncate(1);
            range = 1.0;
            range_values = None;
        }

        let steps = color_map.len() as f64 - if spec.stepped { 0.0 } else { 1.0 };
        let factor = steps / range;

        let mut mapping = ColorMapping {
            min_value,
            max_value,
            factor,
            color_map,
            min_color,
            max_color,
            stepped: spec.stepped,
            range_values,
            values: Vec::new(),
        };
        mapping.values = raw_values.iter().map(|&v| mapping.index_of(v)).collect();

        tracing::debug!(
            num_values = raw_values.len(),
            min_value = mapping.min_value,
            max_value = mapping.max_value,
            colors = mapping.color_map.len(),
            stepped = mapping.stepped,
            range_values = mapping.range_values.is_some(),
            "mapped color range"
        );
        mapping
    }

    /// Color-map a mesh by its `value` array. Empty meshes pass through with
    /// an empty mapping.
    pub fn color_mesh(&mut self, mesh: Mesh, spec: &ColorRangeSpec) -> ColorMappedMesh {
        let raw: &[f64] = if mesh.num_vertices == 0 {
            &[]
        } else {
            mesh.value(VALUE_KEY).unwrap_or(&[])
        };
        let mapping = self.map_values(raw, spec);
        ColorMappedMesh { mesh, mapping }
    }

    fn convert(&mut self, input: &ColorInput) -> Rgba {
        match self.cache.convert(input) {
            Ok(color) => color,
            Err(err) => {
                tracing::warn!(error = %err, "unusable color, using black");
                Rgba::BLACK
            }
        }
    }
}

/// Minimum and maximum of the finite values, in one pass.
pub fn scan_min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Boundaries must be finite and weakly increasing. Stepped mappings take one
/// per color, smooth mappings one more than the colors.
fn valid_range_values(range_values: &[f64], colors: usize, stepped: bool) -> bool {
    let expected = if stepped { colors } else { colors + 1 };
    range_values.len() == expected
        && expected >= 2
        && range_values.iter().all(|v| v.is_finite())
        && range_values.windows(2).all(|w| w[0] <= w[1])
}
