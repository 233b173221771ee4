//! Bounded memoization cache for color string parsing.
//!
//! Parsing the same color strings over and over is common when specs are
//! rebuilt on every style change. The cache is owned by whoever converts the
//! colors; it is never process-global. When it grows past its capacity it is
//! cleared wholesale.

use crate::color::{convert_color, parse_css_color, ColorInput, Rgba};
use crate::VizResult;
use std::collections::HashMap;

/// Default maximum number of cached color strings.
pub const DEFAULT_COLOR_CACHE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct ColorCache {
    entries: HashMap<String, Rgba>,
    capacity: usize,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR_CACHE_SIZE)
    }
}

impl ColorCache {
    /// Create a cache holding at most `capacity` entries. A capacity of zero
    /// disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Convert a color, consulting the cache for string inputs.
    pub fn convert(&mut self, input: &ColorInput) -> VizResult<Rgba> {
        let ColorInput::Css(key) = input else {
            return convert_color(input);
        };

        if let Some(color) = self.entries.get(key) {
            return Ok(*color);
        }

        let color = parse_css_color(key)?;
        if self.capacity > 0 {
            if self.entries.len() >= self.capacity {
                tracing::trace!(capacity = self.capacity, "color cache full, clearing");
                self.entries.clear();
            }
            self.entries.insert(key.clone(), color);
        }
        Ok(color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
