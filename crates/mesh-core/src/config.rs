//! Process-level defaults for the mesh/isoline core.

use serde::{Deserialize, Serialize};
use viz_common::color_cache::DEFAULT_COLOR_CACHE_SIZE;

use crate::spec::IsolineSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Maximum number of parsed color strings kept per mapper.
    pub color_cache_size: usize,

    /// Default label spacing along isolines, in pixels.
    pub label_spacing: f64,

    /// Default label viewport margin, in pixels.
    pub label_viewport: f64,

    /// Default number of generated isoline thresholds.
    pub isoline_count: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let isoline = IsolineSpec::default();
        Self {
            color_cache_size: DEFAULT_COLOR_CACHE_SIZE,
            label_spacing: isoline.label_spacing,
            label_viewport: isoline.label_viewport,
            isoline_count: isoline.count,
        }
    }
}

impl CoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GEOVIZ_COLOR_CACHE_SIZE") {
            if let Ok(size) = val.parse() {
                config.color_cache_size = size;
            }
        }

        if let Ok(val) = std::env::var("GEOVIZ_LABEL_SPACING") {
            if let Ok(spacing) = val.parse::<f64>() {
                if spacing.is_finite() {
                    config.label_spacing = spacing;
                }
            }
        }

        if let Ok(val) = std::env::var("GEOVIZ_LABEL_VIEWPORT") {
            if let Ok(margin) = val.parse::<f64>() {
                if margin.is_finite() {
                    config.label_viewport = margin;
                }
            }
        }

        if let Ok(val) = std::env::var("GEOVIZ_ISOLINE_COUNT") {
            if let Ok(count) = val.parse() {
                config.isoline_count = count;
            }
        }

        config
    }

    /// An isoline spec seeded with these defaults.
    pub fn isoline_spec(&self) -> IsolineSpec {
        IsolineSpec {
            count: self.isoline_count,
            label_spacing: self.label_spacing,
            label_viewport: self.label_viewport,
            ..IsolineSpec::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_isoline_defaults() {
        let config = CoreConfig::default();
        let spec = config.isoline_spec();
        assert_eq!(spec, IsolineSpec::default());
        assert_eq!(config.color_cache_size, DEFAULT_COLOR_CACHE_SIZE);
    }
}
