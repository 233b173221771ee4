//! Label placement along isolines.
//!
//! Labels are distributed evenly along each labeled line in display space:
//! a line of display length `L` gets `floor(L / spacing)` labels, spread so
//! they exactly fill the line. Positions are reported in map coordinates
//! together with the display-space tangent angle.

use viz_common::Point3;

use crate::isoline::Isoline;
use crate::spec::IsolineSpec;

/// Minimum zoom change that always triggers label placement.
pub const REFRESH_ZOOM_DELTA: f64 = 2.0;

/// Projection from map coordinates to display pixels.
pub trait DisplayTransform {
    /// Display position of a map point, `y` growing downward.
    fn gcs_to_display(&self, point: &Point3) -> (f64, f64);

    /// Viewport `(width, height)` in pixels.
    fn size(&self) -> (f64, f64);

    /// Map rotation in radians.
    fn rotation(&self) -> f64;
}

/// A simple affine map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapState {
    /// Map coordinates shown at the viewport center.
    pub center: Point3,
    /// Pixels per map unit.
    pub scale: f64,
    pub size: (f64, f64),
    /// Clockwise rotation of the map on screen, in radians.
    pub rotation: f64,
}

impl MapState {
    pub fn new(center: Point3, scale: f64, size: (f64, f64)) -> Self {
        Self {
            center,
            scale,
            size,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Zoom level, one level per doubling of the scale.
    pub fn zoom(&self) -> f64 {
        self.scale.log2()
    }
}

impl DisplayTransform for MapState {
    fn gcs_to_display(&self, point: &Point3) -> (f64, f64) {
        let dx = (point.x - self.center.x) * self.scale;
        let dy = (point.y - self.center.y) * self.scale;
        let (sin, cos) = self.rotation.sin_cos();
        (
            self.size.0 / 2.0 + dx * cos + dy * sin,
            self.size.1 / 2.0 + dx * sin - dy * cos,
        )
    }

    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOptions {
    /// Target distance between labels in pixels.
    pub spacing: f64,
    /// Phase of the first label, as a fraction of the spacing.
    pub offset: f64,
    /// Labels further than this outside the viewport are skipped. Zero or
    /// negative disables culling.
    pub viewport_margin: f64,
    /// Subtract the map rotation from label angles.
    pub compensate_rotation: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self::from_spec(&IsolineSpec::default())
    }
}

impl LabelOptions {
    pub fn from_spec(spec: &IsolineSpec) -> Self {
        Self {
            spacing: spec.label_spacing,
            offset: spec.label_offset,
            viewport_margin: spec.label_viewport,
            compensate_rotation: true,
        }
    }
}

/// A label anchor in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Index of the labeled line.
    pub line: usize,
    /// Text angle in radians.
    pub rotation: f64,
}

/// Normalize a label offset into `[0, 1)`, centering the default of zero.
pub fn normalize_offset(offset: f64) -> f64 {
    if !offset.is_finite() {
        return 0.5;
    }
    let shifted = offset + 0.5;
    shifted - shifted.floor()
}

/// Place labels along every labeled line.
pub fn place_labels<T: DisplayTransform + ?Sized>(
    lines: &[Isoline],
    map: &T,
    options: &LabelOptions,
) -> Vec<LabelPosition> {
    let mut positions = Vec::new();
    if !(options.spacing > 0.0) || !options.spacing.is_finite() {
        return positions;
    }

    let (width, height) = map.size();
    let margin = options.viewport_margin;
    let in_view = |x: f64, y: f64| {
        margin <= 0.0
            || (x >= -margin && x <= width + margin && y >= -margin && y <= height + margin)
    };
    let rotation_offset = if options.compensate_rotation {
        map.rotation()
    } else {
        0.0
    };

    for (line_index, line) in lines.iter().enumerate() {
        if line.label.is_none() || line.points.len() < 2 {
            continue;
        }

        let display: Vec<(f64, f64)> = line.points.iter().map(|p| map.gcs_to_display(p)).collect();
        let lengths: Vec<f64> = display
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1))
            .collect();
        let total: f64 = lengths.iter().sum();

        let count = (total / options.spacing).floor();
        if !(count >= 1.0) {
            continue;
        }
        let count = count as usize;
        let local_spacing = total / count as f64;
        let offset = normalize_offset(options.offset + 0.5 * line.position as f64);

        let mut placed = 0;
        let mut accumulated = 0.0;
        for (i, &length) in lengths.iter().enumerate() {
            let (x1, y1) = display[i];
            let (x2, y2) = display[i + 1];
            loop {
                if placed >= count {
                    break;
                }
                let target = local_spacing * (offset + placed as f64);
                if target > accumulated + length {
                    break;
                }
                placed += 1;

                let t = if length > 0.0 {
                    (target - accumulated) / length
                } else {
                    0.0
                };
                let x = x1 + (x2 - x1) * t;
                let y = y1 + (y2 - y1) * t;
                if !in_view(x, y) {
                    continue;
                }

                let anchor = line.points[i].lerp(&line.points[i + 1], t);
                positions.push(LabelPosition {
                    x: anchor.x,
                    y: anchor.y,
                    z: anchor.z,
                    line: line_index,
                    rotation: (y2 - y1).atan2(x2 - x1) - rotation_offset,
                });
            }
            accumulated += length;
        }
    }

    tracing::debug!(
        lines = lines.len(),
        labels = positions.len(),
        spacing = options.spacing,
        "placed isoline labels"
    );
    positions
}

// ============================================================================
// Refresh policy
// ============================================================================

/// The parts of a view that decide whether labels must be placed again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub zoom: f64,
    /// View center in pixels at `zoom`.
    pub center_px: (f64, f64),
    pub size: (f64, f64),
}

impl ViewSnapshot {
    pub fn of(map: &MapState) -> Self {
        Self {
            zoom: map.zoom(),
            center_px: (map.center.x * map.scale, map.center.y * map.scale),
            size: map.size,
        }
    }
}

/// Decides when labels placed for one view are stale.
///
/// Placement is repeated when the zoom changes by at least two levels, or
/// when panning and resizing together could bring the viewport within two
/// label spacings of the edge of the margin labels were placed for.
#[derive(Debug, Clone, Default)]
pub struct LabelRefresh {
    last: Option<ViewSnapshot>,
}

impl LabelRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, view: ViewSnapshot) {
        self.last = Some(view);
    }

    pub fn last(&self) -> Option<&ViewSnapshot> {
        self.last.as_ref()
    }

    pub fn needs_update(&self, view: &ViewSnapshot, options: &LabelOptions) -> bool {
        let Some(last) = &self.last else {
            return true;
        };
        if last == view {
            return false;
        }
        if (view.zoom - last.zoom).abs() >= REFRESH_ZOOM_DELTA {
            return true;
        }
        if options.viewport_margin > 0.0 {
            let moved = (view.center_px.0 - last.center_px.0)
                .abs()
                .max((view.center_px.1 - last.center_px.1).abs());
            let resized = (view.size.0 - last.size.0)
                .abs()
                .max((view.size.1 - last.size.1).abs());
            return moved + resized > options.viewport_margin - 2.0 * options.spacing;
        }
        false
    }
}

/// Places labels and tracks when they need placing again.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    pub options: LabelOptions,
    pub auto_update: bool,
    refresh: LabelRefresh,
}

impl LabelPlacer {
    pub fn new(options: LabelOptions) -> Self {
        Self {
            options,
            auto_update: true,
            refresh: LabelRefresh::new(),
        }
    }

    pub fn from_spec(spec: &IsolineSpec) -> Self {
        Self {
            auto_update: spec.label_auto_update,
            ..Self::new(LabelOptions::from_spec(spec))
        }
    }

    pub fn place(&mut self, lines: &[Isoline], map: &MapState) -> Vec<LabelPosition> {
        self.refresh.record(ViewSnapshot::of(map));
        place_labels(lines, map, &self.options)
    }

    /// True when the view has changed enough to place labels again. Always
    /// false with auto update disabled, except before the first placement.
    pub fn needs_update(&self, map: &MapState) -> bool {
        if self.refresh.last().is_none() {
            return true;
        }
        self.auto_update && self.refresh.needs_update(&ViewSnapshot::of(map), &self.options)
    }
}
