//! Isoline extraction using marching triangles/squares over a [`Mesh`].
//!
//! For every threshold each element's corners are classified as low
//! (`value <= threshold`) or high, and a fixed table gives the segments
//! crossing the element. Segment endpoints are identified by the mesh edge
//! they cross, keyed as `(low vertex, high vertex)`, so neighbouring elements
//! produce identical keys and segments can be joined into chains by exact
//! key equality before any coordinates are computed.

use std::collections::{HashMap, VecDeque};

use viz_common::Point3;

use crate::color_range::scan_min_max;
use crate::mesh::{Mesh, MeshShape, VALUE_KEY};
use crate::spec::IsolineSpec;

/// Upper bound on generated thresholds per extraction.
pub const MAX_THRESHOLDS: usize = 10_000;

const MAX_LABEL_DECIMALS: usize = 10;

/// A mesh edge crossed by an isoline: `(low vertex, high vertex)`.
pub type EdgeKey = (u32, u32);

/// Segments per triangle pattern, as `(exit edge, entry edge)`.
///
/// Bit `k` of the pattern is set when corner `k` is high; edge `k` joins
/// corner `k` to corner `k + 1`. Each maximal run of high corners yields one
/// segment from the edge where the run is left to the edge where it is
/// entered, so for counter-clockwise elements the low side is on the right.
const TRIANGLE_SEGMENTS: [&[(usize, usize)]; 8] = [
    &[],
    &[(0, 2)],
    &[(1, 0)],
    &[(1, 2)],
    &[(2, 1)],
    &[(0, 1)],
    &[(2, 0)],
    &[],
];

/// Segments per square pattern. Saddles (`0101`, `1010`) keep the two high
/// corners apart.
const SQUARE_SEGMENTS: [&[(usize, usize)]; 16] = [
    &[],
    &[(0, 3)],
    &[(1, 0)],
    &[(1, 3)],
    &[(2, 1)],
    &[(0, 3), (2, 1)],
    &[(2, 0)],
    &[(2, 3)],
    &[(3, 2)],
    &[(0, 2)],
    &[(1, 0), (3, 2)],
    &[(1, 2)],
    &[(3, 1)],
    &[(0, 1)],
    &[(3, 0)],
    &[],
];

/// An isoline threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEntry {
    pub value: f64,
    /// Styling bucket; higher levels occur at sparser positions.
    pub level: u32,
    /// Index of the threshold among the generated thresholds.
    pub position: i64,
    pub label: Option<String>,
}

/// One joined polyline of a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolinePath {
    pub points: Vec<Point3>,
    pub closed: bool,
}

/// A polyline carrying the threshold it was extracted for.
#[derive(Debug, Clone, PartialEq)]
pub struct Isoline {
    pub points: Vec<Point3>,
    pub value: f64,
    pub level: u32,
    pub position: i64,
    pub label: Option<String>,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IsolineResult {
    pub values: Vec<ValueEntry>,
    pub lines: Vec<Isoline>,
    pub has_labels: bool,
    pub min_value: f64,
    pub max_value: f64,
}

impl IsolineResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

type LabelTextFn<'a> = Box<dyn Fn(&ValueEntry) -> String + 'a>;
type LabelFilterFn<'a> = Box<dyn Fn(&ValueEntry) -> bool + 'a>;

/// Computes thresholds for a mesh and extracts one set of isolines per
/// threshold.
pub struct IsolineExtractor<'a> {
    value_key: String,
    label_text: Option<LabelTextFn<'a>>,
    label_filter: Option<LabelFilterFn<'a>>,
}

impl Default for IsolineExtractor<'_> {
    fn default() -> Self {
        Self {
            value_key: VALUE_KEY.to_string(),
            label_text: None,
            label_filter: None,
        }
    }
}

impl<'a> IsolineExtractor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contour the mesh array named `key` instead of `value`.
    pub fn value_key(mut self, key: impl Into<String>) -> Self {
        self.value_key = key.into();
        self
    }

    /// Format label text. Replaces the numeric default.
    pub fn label_text<F>(mut self, label_text: F) -> Self
    where
        F: Fn(&ValueEntry) -> String + 'a,
    {
        self.label_text = Some(Box::new(label_text));
        self
    }

    /// Decide which thresholds are labeled. Replaces `IsolineSpec::label`.
    pub fn label_filter<F>(mut self, label_filter: F) -> Self
    where
        F: Fn(&ValueEntry) -> bool + 'a,
    {
        self.label_filter = Some(Box::new(label_filter));
        self
    }

    /// Thresholds for `values` along with the value range they were derived
    /// from.
    pub fn value_list(&self, values: &[f64], spec: &IsolineSpec) -> (Vec<ValueEntry>, f64, f64) {
        let explicit_min = spec.min.filter(|v| v.is_finite());
        let explicit_max = spec.max.filter(|v| v.is_finite());
        let (min_value, max_value) = match (explicit_min, explicit_max) {
            (Some(min), Some(max)) => (min, max),
            (min, max) => match scan_min_max(values) {
                Some((data_min, data_max)) => {
                    (min.unwrap_or(data_min), max.unwrap_or(data_max))
                }
                None => return (Vec::new(), 0.0, 0.0),
            },
        };

        let mut decimals = None;
        let thresholds: Vec<(f64, i64)> = if let Some(explicit) = &spec.values {
            explicit
                .iter()
                .enumerate()
                .filter(|(_, &v)| v.is_finite() && v >= min_value && v <= max_value)
                .map(|(i, &v)| (v, i as i64))
                .collect()
        } else if spec.spacing.is_none() && !spec.autofit {
            let step = (max_value - min_value) / (spec.count + 1) as f64;
            decimals = Some(step_decimals(step));
            uniform_thresholds(min_value, max_value, spec.count)
        } else {
            let spacing = spec
                .spacing
                .filter(|s| s.is_finite() && *s > 0.0)
                .unwrap_or_else(|| nice_spacing(max_value - min_value, spec.count));
            decimals = Some(spacing_decimals(spacing));
            spaced_thresholds(min_value, max_value, spacing)
        };

        let entries: Vec<ValueEntry> = thresholds
            .into_iter()
            .map(|(value, position)| {
                let mut entry = ValueEntry {
                    value,
                    level: level_for(position, &spec.levels),
                    position,
                    label: None,
                };
                let labeled = match &self.label_filter {
                    Some(filter) => filter(&entry),
                    None => spec.label.accepts(entry.level),
                };
                if labeled {
                    entry.label = Some(match &self.label_text {
                        Some(label_text) => label_text(&entry),
                        None => format_value(entry.value, decimals),
                    });
                }
                entry
            })
            .collect();

        (entries, min_value, max_value)
    }

    pub fn extract(&self, mesh: &Mesh, spec: &IsolineSpec) -> IsolineResult {
        let values = match mesh.value(&self.value_key) {
            Some(values) if mesh.num_vertices >= 3 && mesh.num_elements > 0 => values,
            _ => return IsolineResult::default(),
        };

        let (entries, min_value, max_value) = self.value_list(values, spec);
        let mut lines = Vec::new();
        for entry in &entries {
            let paths = isolines_for_value(mesh, values, entry.value);
            tracing::trace!(
                value = entry.value,
                level = entry.level,
                chains = paths.len(),
                "extracted isoline threshold"
            );
            lines.extend(paths.into_iter().map(|path| Isoline {
                points: path.points,
                value: entry.value,
                level: entry.level,
                position: entry.position,
                label: entry.label.clone(),
                closed: path.closed,
            }));
        }

        let has_labels = entries.iter().any(|e| e.label.is_some());
        tracing::debug!(
            thresholds = entries.len(),
            lines = lines.len(),
            has_labels,
            min_value,
            max_value,
            "extracted isolines"
        );
        IsolineResult {
            values: entries,
            lines,
            has_labels,
            min_value,
            max_value,
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// `count` thresholds evenly distributed strictly inside `(min, max)`.
fn uniform_thresholds(min: f64, max: f64, count: usize) -> Vec<(f64, i64)> {
    let delta = max - min;
    if !(delta > 0.0) {
        return Vec::new();
    }
    let count = cap_thresholds(count);
    (1..=count)
        .map(|i| (min + delta * i as f64 / (count + 1) as f64, i as i64))
        .collect()
}

/// Multiples of `spacing` strictly inside `(min, max)`, positioned by
/// multiple.
fn spaced_thresholds(min: f64, max: f64, spacing: f64) -> Vec<(f64, i64)> {
    if !(max - min > 0.0) || !(spacing > 0.0) {
        return Vec::new();
    }
    let first = (min / spacing).floor() as i64 + 1;
    let last = (max / spacing).ceil() as i64 - 1;
    if last < first {
        return Vec::new();
    }
    let count = cap_thresholds((last - first + 1) as usize);
    (first..first + count as i64)
        .map(|k| (k as f64 * spacing, k))
        .filter(|&(v, _)| v > min && v < max)
        .collect()
}

fn cap_thresholds(count: usize) -> usize {
    if count > MAX_THRESHOLDS {
        tracing::warn!(
            requested = count,
            max = MAX_THRESHOLDS,
            "too many isoline thresholds, truncating"
        );
        MAX_THRESHOLDS
    } else {
        count
    }
}

/// A 1, 2 or 5 multiple of a power of ten close to `delta / (count * 2/3)`.
pub fn nice_spacing(delta: f64, count: usize) -> f64 {
    let target = delta / (count.max(1) as f64 * 2.0 / 3.0);
    if !(target.is_finite() && target > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(target.log10().floor());
    let normalized = target / magnitude;
    let nice = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .min_by(|a: &f64, b: &f64| (normalized - a).abs().total_cmp(&(normalized - b).abs()))
        .unwrap_or(1.0);
    nice * magnitude
}

/// Level of a threshold: one more for each cumulative product of `levels`
/// that divides `position`.
pub fn level_for(position: i64, levels: &[u32]) -> u32 {
    let mut level = 0;
    let mut product: i64 = 1;
    for &divisor in levels {
        if divisor == 0 {
            break;
        }
        product = match product.checked_mul(divisor as i64) {
            Some(p) => p,
            None => break,
        };
        if position.rem_euclid(product) != 0 {
            break;
        }
        level += 1;
    }
    level
}

/// Decimal places needed to print multiples of `spacing`.
pub fn spacing_decimals(spacing: f64) -> usize {
    if !(spacing.is_finite() && spacing > 0.0) {
        return 0;
    }
    (0..=MAX_LABEL_DECIMALS)
        .find(|&d| {
            let scaled = spacing * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-9 * scaled.max(1.0)
        })
        .unwrap_or(MAX_LABEL_DECIMALS)
}

/// Decimal places for labels of thresholds `step` apart: exact when the step
/// terminates early, otherwise two significant digits of the step.
pub fn step_decimals(step: f64) -> usize {
    if !(step.is_finite() && step > 0.0) {
        return 0;
    }
    let significant = (1.0 - step.log10().floor()).clamp(0.0, MAX_LABEL_DECIMALS as f64) as usize;
    spacing_decimals(step).min(significant)
}

fn format_value(value: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(decimals) => {
            let text = format!("{:.*}", decimals, value);
            // "-0.0" and friends
            if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
                text[1..].to_string()
            } else {
                text
            }
        }
        None => value.to_string(),
    }
}

// ============================================================================
// Marching sweep
// ============================================================================

/// Extract the joined polylines of one threshold.
pub fn isolines_for_value(mesh: &Mesh, values: &[f64], threshold: f64) -> Vec<IsolinePath> {
    if mesh.num_vertices < 3 || mesh.num_elements == 0 || values.len() < mesh.num_vertices {
        return Vec::new();
    }

    let high: Vec<bool> = values[..mesh.num_vertices]
        .iter()
        .map(|&v| v > threshold)
        .collect();

    let mut chains = ChainSet::default();
    for element in 0..mesh.num_elements {
        let Some((corners, count)) = element_corners(mesh, element) else {
            continue;
        };
        let corners = &corners[..count];
        if corners.iter().any(|&c| !values[c as usize].is_finite()) {
            continue;
        }

        let pattern = corners
            .iter()
            .enumerate()
            .filter(|(_, &c)| high[c as usize])
            .fold(0usize, |acc, (k, _)| acc | (1 << k));
        let table: &[(usize, usize)] = if count == 4 {
            SQUARE_SEGMENTS[pattern]
        } else {
            TRIANGLE_SEGMENTS[pattern]
        };

        for &(exit, entry) in table {
            let start = edge_key(corners, exit, &high);
            let end = edge_key(corners, entry, &high);
            chains.add_segment(start, end);
        }
    }

    chains
        .into_chains()
        .filter_map(|keys| materialize(mesh, values, threshold, &keys))
        .collect()
}

/// Corners of an element in cyclic order. Square elements are recovered from
/// their two packed triangles.
fn element_corners(mesh: &Mesh, element: usize) -> Option<([u32; 4], usize)> {
    let e = mesh.element(element);
    match mesh.shape {
        MeshShape::Triangle => Some(([e[0], e[1], e[2], 0], 3)),
        MeshShape::Square => {
            let (p1, p2) = (e[1], e[2]);
            let opposite = e[3..6].iter().copied().find(|&v| v != p1 && v != p2)?;
            Some(([e[0], p1, opposite, p2], 4))
        }
    }
}

fn edge_key(corners: &[u32], edge: usize, high: &[bool]) -> EdgeKey {
    let a = corners[edge];
    let b = corners[(edge + 1) % corners.len()];
    if high[a as usize] {
        (b, a)
    } else {
        (a, b)
    }
}

fn materialize(mesh: &Mesh, values: &[f64], threshold: f64, keys: &[EdgeKey]) -> Option<IsolinePath> {
    let mut points: Vec<Point3> = Vec::with_capacity(keys.len());
    for &(low, high) in keys {
        let (low, high) = (low as usize, high as usize);
        let f = (threshold - values[low]) / (values[high] - values[low]);
        let point = mesh.position(low).lerp(&mesh.position(high), f);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    if points.len() < 2 {
        return None;
    }
    let closed = points.first() == points.last();
    Some(IsolinePath { points, closed })
}

// ============================================================================
// Chain joining
// ============================================================================

/// Open chains indexed by their first and last edge keys.
#[derive(Debug, Default)]
struct ChainSet {
    chains: Vec<Option<VecDeque<EdgeKey>>>,
    starts: HashMap<EdgeKey, usize>,
    ends: HashMap<EdgeKey, usize>,
}

impl ChainSet {
    fn add_segment(&mut self, start: EdgeKey, end: EdgeKey) {
        let before = self.ends.remove(&start);
        let after = self.starts.remove(&end);

        match (before, after) {
            (Some(a), Some(b)) if a == b => {
                // Closes a ring; closed chains leave the index.
                if let Some(chain) = self.chains[a].as_mut() {
                    chain.push_back(end);
                }
            }
            (Some(a), Some(b)) => {
                let Some(tail) = self.chains[b].take() else {
                    return;
                };
                let tail_end = tail.back().copied();
                if let Some(chain) = self.chains[a].as_mut() {
                    chain.extend(tail);
                }
                if let Some(tail_end) = tail_end {
                    if self.ends.get(&tail_end) == Some(&b) {
                        self.ends.insert(tail_end, a);
                    }
                }
            }
            (Some(a), None) => {
                if let Some(chain) = self.chains[a].as_mut() {
                    chain.push_back(end);
                }
                self.ends.insert(end, a);
            }
            (None, Some(b)) => {
                if let Some(chain) = self.chains[b].as_mut() {
                    chain.push_front(start);
                }
                self.starts.insert(start, b);
            }
            (None, None) => {
                let id = self.chains.len();
                self.chains.push(Some(VecDeque::from([start, end])));
                self.starts.insert(start, id);
                self.ends.insert(end, id);
            }
        }
    }

    fn into_chains(self) -> impl Iterator<Item = Vec<EdgeKey>> {
        self.chains.into_iter().flatten().map(Vec::from)
    }
}
