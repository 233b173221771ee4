//! Canonical triangulated mesh generation.
//!
//! A [`MeshBuilder`] normalizes heterogeneous input into one representation:
//! a flat vertex position buffer, a flat element index buffer and per-vertex
//! value arrays. Input is either explicit element connectivity over the data
//! items, or an implicit rectangular grid.
//!
//! Grid meshes store each square as two triangles sharing the `v01`-`v10`
//! diagonal: `v00, v01, v10, v10, v01, v11`. Explicit squares
//! `[v0, v1, v2, v3]` are stored as `v0, v1, v3, v2, v3, v1`.
//!
//! When a grid has arithmetic positions (`x0`, `y0`, `dx`, `dy`) and its
//! longitudes leave `[-180, 180]`, columns are wrapped into range and the
//! column pair around the antimeridian is duplicated so the mesh covers the
//! seam without a quad spanning the whole map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use viz_common::Point3;

use crate::spec::{ElementPacking, Elements, MeshSpec};

/// Key of the per-vertex array consumed by color mapping and isolines.
pub const VALUE_KEY: &str = "value";

/// Tolerance, in degrees, for treating a grid as spanning a full turn.
pub const FULL_TURN_TOLERANCE: f64 = 0.01;

type PositionFn<'a, D> = Box<dyn Fn(&D, usize) -> Point3 + 'a>;
type UsedFn<'a, D> = Box<dyn Fn(&D, usize) -> bool + 'a>;
type ValueFn<'a, D> = Box<dyn Fn(&D, usize, &Point3) -> f64 + 'a>;
type SpecFn<'a, D> = Box<dyn Fn(&[D]) -> MeshSpec + 'a>;

/// Element layout of a built mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshShape {
    Triangle,
    /// Quads packed as two triangles.
    Square,
}

impl MeshShape {
    pub fn vertices_per_element(&self) -> usize {
        match self {
            MeshShape::Triangle => 3,
            MeshShape::Square => 6,
        }
    }
}

/// The canonical mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub shape: MeshShape,
    /// Vertex indices, `vertices_per_element` per element.
    pub elements: Vec<u32>,
    /// Data index of each vertex. `None` is the identity mapping.
    pub index: Option<Vec<usize>>,
    /// `x, y, z` per vertex.
    pub pos: Vec<f64>,
    /// Per-vertex arrays from the value accessors, keyed by accessor name.
    pub values: HashMap<String, Vec<f64>>,
    pub num_vertices: usize,
    pub num_elements: usize,
    pub vertices_per_element: usize,
}

impl Mesh {
    /// A mesh with no vertices and no elements.
    pub fn empty(shape: MeshShape) -> Self {
        Self {
            shape,
            elements: Vec::new(),
            index: None,
            pos: Vec::new(),
            values: HashMap::new(),
            num_vertices: 0,
            num_elements: 0,
            vertices_per_element: shape.vertices_per_element(),
        }
    }

    /// True when there is nothing to draw or contour.
    pub fn is_empty(&self) -> bool {
        self.num_vertices == 0 || self.num_elements == 0
    }

    pub fn value(&self, key: &str) -> Option<&[f64]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// Position of a vertex. Panics if `vertex >= num_vertices`.
    pub fn position(&self, vertex: usize) -> Point3 {
        let i = vertex * 3;
        Point3::new(self.pos[i], self.pos[i + 1], self.pos[i + 2])
    }

    /// Index of the data item a vertex was built from.
    pub fn data_index(&self, vertex: usize) -> usize {
        match &self.index {
            Some(index) => index[vertex],
            None => vertex,
        }
    }

    /// The indices of one element.
    pub fn element(&self, element: usize) -> &[u32] {
        let vpe = self.vertices_per_element;
        &self.elements[element * vpe..(element + 1) * vpe]
    }
}

/// Builds a [`Mesh`] from a slice of data items.
///
/// ```ignore
/// let mesh = MeshBuilder::new(&samples, |s: &Sample, _| Point3::xy(s.lon, s.lat))
///     .spec(MeshSpec::grid(360, 181))
///     .used(|s, _| s.value.is_finite())
///     .value("value", |s, _, _| s.value)
///     .build();
/// ```
pub struct MeshBuilder<'a, D> {
    data: &'a [D],
    position: PositionFn<'a, D>,
    spec: MeshSpec,
    spec_fn: Option<SpecFn<'a, D>>,
    used: Option<UsedFn<'a, D>>,
    value_fns: Vec<(String, ValueFn<'a, D>)>,
}

impl<'a, D> MeshBuilder<'a, D> {
    pub fn new<P>(data: &'a [D], position: P) -> Self
    where
        P: Fn(&D, usize) -> Point3 + 'a,
    {
        Self {
            data,
            position: Box::new(position),
            spec: MeshSpec::default(),
            spec_fn: None,
            used: None,
            value_fns: Vec::new(),
        }
    }

    pub fn spec(mut self, spec: MeshSpec) -> Self {
        self.spec = spec;
        self.spec_fn = None;
        self
    }

    /// Derive the spec from the whole dataset, once per build.
    pub fn spec_from_data<F>(mut self, spec_fn: F) -> Self
    where
        F: Fn(&[D]) -> MeshSpec + 'a,
    {
        self.spec_fn = Some(Box::new(spec_fn));
        self
    }

    /// Only keep vertices whose item passes this predicate.
    pub fn used<F>(mut self, used: F) -> Self
    where
        F: Fn(&D, usize) -> bool + 'a,
    {
        self.used = Some(Box::new(used));
        self
    }

    /// Evaluate `value_fn` for every vertex into the array named `key`.
    pub fn value<F>(mut self, key: impl Into<String>, value_fn: F) -> Self
    where
        F: Fn(&D, usize, &Point3) -> f64 + 'a,
    {
        let key = key.into();
        self.value_fns.retain(|(k, _)| *k != key);
        self.value_fns.push((key, Box::new(value_fn)));
        self
    }

    pub fn build(&self) -> Mesh {
        let spec = match &self.spec_fn {
            Some(spec_fn) => spec_fn(self.data),
            None => self.spec.clone(),
        };

        let mut layout = match &spec.elements {
            Some(elements) => explicit_layout(self.data.len(), elements, spec.element_packing),
            None => grid_layout(self.data.len(), &spec),
        };

        let kept = match &self.used {
            Some(used) => self.cull_unused(&mut layout, used),
            None => None,
        };

        let mesh = self.populate(layout, kept);
        tracing::debug!(
            data_len = self.data.len(),
            shape = ?mesh.shape,
            num_vertices = mesh.num_vertices,
            num_elements = mesh.num_elements,
            value_keys = self.value_fns.len(),
            "built mesh"
        );
        mesh
    }

    /// Drop vertices rejected by `used`, compacting the ones after the first
    /// rejected vertex and dropping every element that touches a rejected
    /// vertex. Returns the surviving layout vertices, or `None` when every
    /// vertex is used.
    fn cull_unused(&self, layout: &mut Layout, used: &UsedFn<'a, D>) -> Option<Vec<usize>> {
        let is_used = |vertex: usize| {
            let di = layout.data_index(vertex);
            used(&self.data[di], di)
        };

        let first_unused = (0..layout.num_pts).find(|&v| !is_used(v))?;

        let mut kept: Vec<usize> = (0..first_unused).collect();
        let mut remap: Vec<Option<u32>> = vec![None; layout.num_pts - first_unused];
        for vertex in first_unused + 1..layout.num_pts {
            if is_used(vertex) {
                remap[vertex - first_unused] = Some(kept.len() as u32);
                kept.push(vertex);
            }
        }

        let vpe = layout.shape.vertices_per_element();
        let mut elements = Vec::with_capacity(layout.elements.len());
        let mut scratch = Vec::with_capacity(vpe);
        for element in layout.elements.chunks_exact(vpe) {
            scratch.clear();
            for &v in element {
                let v = v as usize;
                let mapped = if v < first_unused {
                    Some(v as u32)
                } else {
                    remap[v - first_unused]
                };
                match mapped {
                    Some(m) => scratch.push(m),
                    None => break,
                }
            }
            if scratch.len() == vpe {
                elements.extend_from_slice(&scratch);
            }
        }

        tracing::trace!(
            before = layout.num_pts,
            after = kept.len(),
            first_unused,
            "culled unused vertices"
        );
        layout.elements = elements;
        Some(kept)
    }

    fn populate(&self, layout: Layout, kept: Option<Vec<usize>>) -> Mesh {
        let num_vertices = kept.as_ref().map_or(layout.num_pts, Vec::len);
        let source = |vertex: usize| kept.as_ref().map_or(vertex, |k| k[vertex]);

        let index = match &kept {
            Some(kept) => Some(kept.iter().map(|&v| layout.data_index(v)).collect()),
            None => layout.index.clone(),
        };

        let mut pos = Vec::with_capacity(num_vertices * 3);
        let mut columns: Vec<Vec<f64>> = self
            .value_fns
            .iter()
            .map(|_| Vec::with_capacity(num_vertices))
            .collect();

        for vertex in 0..num_vertices {
            let layout_vertex = source(vertex);
            let di = layout.data_index(layout_vertex);
            let item = &self.data[di];
            let p = match &layout.grid {
                Some(grid) => grid.position(layout_vertex),
                None => (self.position)(item, di),
            };
            pos.extend_from_slice(&[p.x, p.y, p.z]);
            for ((_, value_fn), column) in self.value_fns.iter().zip(columns.iter_mut()) {
                column.push(value_fn(item, di, &p));
            }
        }

        let values = self
            .value_fns
            .iter()
            .map(|(key, _)| key.clone())
            .zip(columns)
            .collect();

        let vertices_per_element = layout.shape.vertices_per_element();
        Mesh {
            shape: layout.shape,
            num_elements: layout.elements.len() / vertices_per_element,
            elements: layout.elements,
            index,
            pos,
            values,
            num_vertices,
            vertices_per_element,
        }
    }
}

/// Vertex and element layout before culling and value population.
struct Layout {
    shape: MeshShape,
    elements: Vec<u32>,
    /// Data index per vertex; `None` is the identity mapping.
    index: Option<Vec<usize>>,
    num_pts: usize,
    /// Present when grid positions are computed arithmetically.
    grid: Option<GridPositions>,
}

impl Layout {
    fn data_index(&self, vertex: usize) -> usize {
        match &self.index {
            Some(index) => index[vertex],
            None => vertex,
        }
    }
}

/// Arithmetic grid positions: one x per (possibly duplicated) column.
struct GridPositions {
    width: usize,
    xs: Vec<f64>,
    y0: f64,
    dy: f64,
}

impl GridPositions {
    fn position(&self, vertex: usize) -> Point3 {
        let row = vertex / self.width;
        let col = vertex % self.width;
        Point3::xy(self.xs[col], self.y0 + self.dy * row as f64)
    }
}

// ============================================================================
// Explicit elements
// ============================================================================

fn explicit_layout(num_pts: usize, elements: &Elements, packing: ElementPacking) -> Layout {
    let mut packed: Vec<u32> = Vec::new();
    let in_range = |vs: &[usize]| vs.iter().all(|&v| v < num_pts);

    let square = match elements {
        Elements::Nested(list) => {
            let square = match packing {
                ElementPacking::Square => true,
                ElementPacking::Triangle => false,
                ElementPacking::Auto => !list.is_empty() && list.iter().all(|e| e.len() >= 4),
            };
            for element in list {
                if element.len() >= 4 {
                    if in_range(&element[..4]) {
                        push_square(&mut packed, &element[..4]);
                    }
                } else if element.len() == 3 && !square && in_range(element.as_slice()) {
                    packed.extend(element.iter().map(|&v| v as u32));
                }
            }
            square
        }
        Elements::Flat(list) => {
            let square = match packing {
                ElementPacking::Square => true,
                ElementPacking::Triangle => false,
                ElementPacking::Auto => list.len() % 4 == 0 && list.len() % 3 != 0,
            };
            if square {
                for element in list.chunks_exact(4).filter(|e| in_range(*e)) {
                    push_square(&mut packed, element);
                }
            } else {
                for element in list.chunks_exact(3).filter(|e| in_range(*e)) {
                    packed.extend(element.iter().map(|&v| v as u32));
                }
            }
            square
        }
    };

    Layout {
        shape: if square { MeshShape::Square } else { MeshShape::Triangle },
        elements: packed,
        index: None,
        num_pts,
        grid: None,
    }
}

/// `[v0, v1, v2, v3]` in winding order becomes `v0 v1 v3` + `v2 v3 v1`.
fn push_square(packed: &mut Vec<u32>, corners: &[usize]) {
    let [v0, v1, v2, v3] = [corners[0], corners[1], corners[2], corners[3]].map(|v| v as u32);
    packed.extend_from_slice(&[v0, v1, v3, v2, v3, v1]);
}

// ============================================================================
// Implicit grids
// ============================================================================

/// Resolve grid dimensions against the number of data items.
///
/// A missing dimension is derived from the other; with neither, the grid is
/// as square as possible. The height shrinks if the grid would need more
/// items than exist.
pub fn grid_dimensions(
    num_data: usize,
    grid_width: Option<usize>,
    grid_height: Option<usize>,
) -> (usize, usize) {
    let width = grid_width.filter(|&w| w > 0);
    let height = grid_height.filter(|&h| h > 0);

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, num_data / w),
        (None, Some(h)) => (num_data / h, h),
        (None, None) => {
            let w = (num_data as f64).sqrt().floor() as usize;
            (w, if w > 0 { num_data / w } else { 0 })
        }
    };

    if width.saturating_mul(height) > num_data {
        (width, if width > 0 { num_data / width } else { 0 })
    } else {
        (width, height)
    }
}

#[derive(Debug, Clone, Copy)]
struct GridOrigin {
    x0: f64,
    y0: f64,
    dx: f64,
    dy: f64,
}

impl GridOrigin {
    fn from_spec(spec: &MeshSpec) -> Option<Self> {
        let (x0, y0, dx, dy) = (spec.x0?, spec.y0?, spec.dx?, spec.dy?);
        let finite = [x0, y0, dx, dy].iter().all(|v| v.is_finite());
        (finite && dx != 0.0 && dy != 0.0).then_some(Self { x0, y0, dx, dy })
    }
}

fn grid_layout(num_data: usize, spec: &MeshSpec) -> Layout {
    let (grid_w, grid_h) = grid_dimensions(num_data, spec.grid_width, spec.grid_height);
    let origin = GridOrigin::from_spec(spec);

    let mut width = grid_w;
    let mut columns: Option<Vec<usize>> = None;
    let mut skip_columns: Vec<usize> = Vec::new();
    let grid = origin.map(|o| {
        let mut xs: Vec<f64> = (0..grid_w).map(|i| o.x0 + o.dx * i as f64).collect();
        if spec.wrap_longitude {
            if let Some(wrapped) = wrap_columns(o.x0, o.dx, grid_w) {
                width = wrapped.xs.len();
                xs = wrapped.xs;
                columns = Some(wrapped.columns);
                skip_columns = wrapped.skip_columns;
            }
        }
        GridPositions {
            width,
            xs,
            y0: o.y0,
            dy: o.dy,
        }
    });

    let num_pts = width * grid_h;
    let mut elements = Vec::new();
    if width >= 2 && grid_h >= 2 {
        elements.reserve((width - 1) * (grid_h - 1) * 6);
        for row in 0..grid_h - 1 {
            for col in 0..width - 1 {
                if skip_columns.contains(&col) {
                    continue;
                }
                let idx = (row * width + col) as u32;
                let w = width as u32;
                elements.extend_from_slice(&[idx, idx + 1, idx + w, idx + w, idx + 1, idx + w + 1]);
            }
        }
    }

    let index = columns.map(|columns| {
        (0..num_pts)
            .map(|v| (v / width) * grid_w + columns[v % width])
            .collect()
    });

    Layout {
        shape: MeshShape::Square,
        elements,
        index,
        num_pts,
        grid,
    }
}

/// Column layout of a grid after longitude wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedColumns {
    /// x of each output column. Seam duplicates sit one full turn past the
    /// column they copy, outside `[-180, 180]`.
    pub xs: Vec<f64>,
    /// Data column each output column reads from.
    pub columns: Vec<usize>,
    /// Output columns whose quad to the next column must not be drawn.
    pub skip_columns: Vec<usize>,
}

/// Wrap grid columns into `[-180, 180]`, duplicating the two columns around
/// every seam on the far side of it. Returns `None` when the grid needs no
/// wrapping.
pub fn wrap_columns(x0: f64, dx: f64, grid_w: usize) -> Option<WrappedColumns> {
    if grid_w == 0 || !x0.is_finite() || !(dx.abs() < 180.0) {
        return None;
    }

    let last = x0 + dx * (grid_w - 1) as f64;
    let outside = |x: f64| !(-180.0..=180.0).contains(&x);
    let full_turn = ((grid_w as f64 * dx).abs() - 360.0).abs() < FULL_TURN_TOLERANCE;
    if !(outside(x0) || outside(last) || full_turn) {
        return None;
    }

    let mut xs: Vec<f64> = Vec::with_capacity(grid_w + 3);
    let mut columns: Vec<usize> = Vec::with_capacity(grid_w + 3);
    let mut skip_columns = Vec::new();

    for i in 0..grid_w {
        let x = wrap_longitude(x0 + dx * i as f64);
        if let (Some(&prev_x), Some(&prev_col)) = (xs.last(), columns.last()) {
            if (x - prev_x).abs() > 180.0 {
                let shift = if x > prev_x { -360.0 } else { 360.0 };
                skip_columns.push(xs.len());
                // This column continued on the previous column's side.
                xs.push(x + shift);
                columns.push(i);
                // The previous column continued on this column's side.
                xs.push(prev_x - shift);
                columns.push(prev_col);
            }
        }
        xs.push(x);
        columns.push(i);
    }

    if full_turn {
        xs.push(wrap_longitude(x0 + dx * grid_w as f64));
        columns.push(0);
    }

    Some(WrappedColumns {
        xs,
        columns,
        skip_columns,
    })
}

/// Wrap a longitude into `[-180, 180]`, leaving in-range values untouched.
pub fn wrap_longitude(x: f64) -> f64 {
    if (-180.0..=180.0).contains(&x) || !x.is_finite() {
        return x;
    }
    let wrapped = (x + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && x > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(170.0), 170.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), 180.0);
        assert_eq!(wrap_longitude(-540.0), -180.0);
    }

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(grid_dimensions(12, Some(4), None), (4, 3));
        assert_eq!(grid_dimensions(12, None, Some(2)), (6, 2));
        assert_eq!(grid_dimensions(10, None, None), (3, 3));
        assert_eq!(grid_dimensions(10, Some(4), Some(4)), (4, 2));
        assert_eq!(grid_dimensions(0, None, None), (0, 0));
        assert_eq!(grid_dimensions(5, Some(0), None), (2, 2));
    }

    #[test]
    fn test_wrap_columns_not_needed_inside_range() {
        assert!(wrap_columns(-10.0, 1.0, 20).is_none());
        assert!(wrap_columns(0.0, 200.0, 3).is_none());
    }

    #[test]
    fn test_wrap_columns_seam() {
        let wrapped = wrap_columns(170.0, 10.0, 5).unwrap();
        assert_eq!(wrapped.xs, vec![170.0, 180.0, 190.0, -180.0, -170.0, -160.0, -150.0]);
        assert_eq!(wrapped.columns, vec![0, 1, 2, 1, 2, 3, 4]);
        assert_eq!(wrapped.skip_columns, vec![2]);
    }

    #[test]
    fn test_wrap_columns_seam_between_columns() {
        let wrapped = wrap_columns(175.0, 10.0, 3).unwrap();
        assert_eq!(wrapped.xs, vec![175.0, 185.0, -185.0, -175.0, -165.0]);
        assert_eq!(wrapped.columns, vec![0, 1, 0, 1, 2]);
        assert_eq!(wrapped.skip_columns, vec![1]);
    }

    #[test]
    fn test_wrap_columns_full_turn_adds_closing_column() {
        let wrapped = wrap_columns(-180.0, 90.0, 4).unwrap();
        assert_eq!(wrapped.xs, vec![-180.0, -90.0, 0.0, 90.0, 180.0]);
        assert_eq!(wrapped.columns, vec![0, 1, 2, 3, 0]);
        assert!(wrapped.skip_columns.is_empty());
    }

    #[test]
    fn test_push_square_diagonal() {
        let mut packed = Vec::new();
        push_square(&mut packed, &[10, 11, 12, 13]);
        assert_eq!(packed, vec![10, 11, 13, 12, 13, 11]);
    }
}
