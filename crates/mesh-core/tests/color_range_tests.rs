//! Integration tests for color range mapping.

use mesh_core::{ColorRangeMapper, ColorRangeSpec, Mesh, MeshBuilder, MeshShape, MeshSpec, VALUE_KEY};
use test_utils::{assert_approx_eq, create_test_grid, fixtures, grid_samples, Sample};
use viz_common::{Point3, Rgba};

fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

// ============================================================================
// Value scaling
// ============================================================================

#[test]
fn test_linear_mapping_is_monotonic() {
    let mut mapper = ColorRangeMapper::default();
    let values = ramp(101);
    let mapping = mapper.map_values(&values, &ColorRangeSpec::default());

    assert_eq!(mapping.min_value, 0.0);
    assert_eq!(mapping.max_value, 100.0);
    assert_eq!(mapping.color_map.len(), 5);
    assert_approx_eq!(mapping.factor, 4.0 / 100.0, 1e-12);
    assert!(mapping.values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(mapping.values[0], 0.0);
    assert_approx_eq!(mapping.values[100], 4.0, 1e-12);
}

#[test]
fn test_degenerate_range_collapses_color_map() {
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[5.0, 5.0, 5.0], &ColorRangeSpec::default());

    assert_eq!(mapping.color_map.len(), 1);
    assert!(mapping.factor.is_finite());
    assert!(mapping.values.iter().all(|&v| v == 0.0));
    assert_eq!(mapping.color_of(5.0), mapping.color_map[0]);
}

#[test]
fn test_empty_values_map_to_zero_range() {
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[], &ColorRangeSpec::default());

    assert_eq!(mapping.min_value, 0.0);
    assert_eq!(mapping.max_value, 0.0);
    assert_eq!(mapping.color_map.len(), 1);
    assert!(mapping.values.is_empty());
}

#[test]
fn test_partial_explicit_range() {
    let mut mapper = ColorRangeMapper::default();
    let spec = ColorRangeSpec {
        min: Some(-50.0),
        ..ColorRangeSpec::default()
    };
    let mapping = mapper.map_values(&[0.0, 10.0, f64::NAN, 50.0], &spec);

    assert_eq!(mapping.min_value, -50.0);
    assert_eq!(mapping.max_value, 50.0);
    assert!(mapping.values[2].is_nan());
}

// ============================================================================
// Stepped colors and out-of-range colors
// ============================================================================

#[test]
fn test_stepped_bands_from_json() {
    let spec = ColorRangeSpec::from_json(fixtures::specs::COLOR_RANGE_STEPPED).unwrap();
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[-1.0, 15.0, 25.0, 30.0, 31.0], &spec);

    assert!(mapping.stepped);
    assert_eq!(mapping.steps(), 3.0);
    assert_approx_eq!(mapping.factor, 0.1, 1e-12);

    let colors: Vec<Rgba> = mapping.values.iter().map(|&i| mapping.color_at(i)).collect();
    assert_eq!(colors[0], Rgba::new(0.0, 0.0, 0.0, 0.0));
    assert_eq!(colors[1], Rgba::new(0.0, 1.0, 0.0, 0.5));
    assert_eq!(colors[2], Rgba::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(colors[3], Rgba::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(colors[4], Rgba::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn test_smooth_colors_interpolate() {
    let spec = ColorRangeSpec::default()
        .with_colors(["#000000", "#ffffff"])
        .with_range(0.0, 10.0);
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[2.5], &spec);

    let color = mapping.color_of(2.5);
    assert_approx_eq!(color.r, 0.25, 1e-12);
    assert_approx_eq!(color.g, 0.25, 1e-12);
    assert_eq!(color.a, 1.0);
}

#[test]
fn test_unparseable_color_falls_back_to_black() {
    let spec = ColorRangeSpec::default().with_colors(["not-a-color", "#ffffff"]);
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&ramp(3), &spec);

    assert_eq!(mapping.color_map[0], Rgba::BLACK);
    assert_eq!(mapping.color_map[1], Rgba::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn test_empty_color_range_uses_default_ramp() {
    let spec = ColorRangeSpec::default().with_colors(Vec::<&str>::new());
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&ramp(3), &spec);

    assert_eq!(mapping.color_map.len(), 5);
    assert_eq!(mapping.color_map[0], Rgba::new(0.0, 0.0, 1.0, 1.0));
}

// ============================================================================
// rangeValues
// ============================================================================

#[test]
fn test_range_values_accepted() {
    let spec = ColorRangeSpec::from_json(fixtures::specs::COLOR_RANGE_VALUES).unwrap();
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[5.0, 55.0, 100.0, 550.0], &spec);

    assert_eq!(
        mapping.range_values.as_deref(),
        Some(&[0.0, 10.0, 100.0, 1000.0][..])
    );
    assert_eq!(mapping.min_value, 0.0);
    assert_eq!(mapping.max_value, 1000.0);
    assert_approx_eq!(mapping.values[0], 0.5, 1e-12);
    assert_approx_eq!(mapping.values[1], 1.5, 1e-12);
    assert_approx_eq!(mapping.values[2], 2.0, 1e-12);
    assert_approx_eq!(mapping.values[3], 2.5, 1e-12);

    let grey = 128.0 / 255.0;
    assert_approx_eq!(mapping.color_of(5.0).r, grey / 2.0, 1e-12);
}

#[test]
fn test_range_values_stepped_one_boundary_per_color() {
    let mut mapper = ColorRangeMapper::default();
    let spec = ColorRangeSpec::default()
        .with_colors(["red", "lime", "blue"])
        .with_stepped(true)
        .with_range_values(vec![0.0, 10.0, 100.0]);
    let mapping = mapper.map_values(&[50.0], &spec);

    assert!(mapping.range_values.is_some());
    assert_eq!((mapping.min_value, mapping.max_value), (0.0, 100.0));
    assert_eq!(mapping.color_of(5.0), Rgba::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(mapping.color_of(50.0), Rgba::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(mapping.color_of(100.0), Rgba::new(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn test_invalid_range_values_discarded() {
    let mut mapper = ColorRangeMapper::default();

    let wrong_length = ColorRangeSpec::default()
        .with_colors(["red", "lime", "blue"])
        .with_stepped(true)
        .with_range_values(vec![0.0, 1.0, 10.0, 100.0]);
    let mapping = mapper.map_values(&[2.0, 4.0], &wrong_length);
    assert!(mapping.range_values.is_none());
    assert_eq!((mapping.min_value, mapping.max_value), (2.0, 4.0));

    let not_monotonic = ColorRangeSpec::default()
        .with_colors(["red", "lime", "blue"])
        .with_range_values(vec![0.0, 10.0, 5.0, 20.0]);
    let mapping = mapper.map_values(&[2.0, 4.0], &not_monotonic);
    assert!(mapping.range_values.is_none());
}

// ============================================================================
// Lookup table and meshes
// ============================================================================

#[test]
fn test_rgba8_table_has_out_of_range_texels() {
    let spec = ColorRangeSpec::from_json(fixtures::specs::COLOR_RANGE_STEPPED).unwrap();
    let mut mapper = ColorRangeMapper::default();
    let mapping = mapper.map_values(&[], &spec);

    let table = mapping.to_rgba8(6);
    assert_eq!(table.len(), 8 * 4);
    assert_eq!(&table[..4], &[0, 0, 0, 0]);
    assert_eq!(&table[4..8], &[0, 0, 255, 255]);
    assert_eq!(&table[table.len() - 4..], &[255, 255, 255, 255]);
}

#[test]
fn test_color_mesh() {
    let samples = grid_samples(&create_test_grid(3, 3), 3, 0.0, 0.0, 1.0, 1.0);
    let mesh = MeshBuilder::new(&samples, |s: &Sample, _| Point3::xy(s.x, s.y))
        .spec(MeshSpec::grid(3, 3))
        .value(VALUE_KEY, |s, _, _| s.value)
        .build();

    let mut mapper = ColorRangeMapper::new(16);
    let colored = mapper.color_mesh(mesh, &ColorRangeSpec::default());

    assert_eq!(colored.mapping.values.len(), colored.mesh.num_vertices);
    assert_eq!(colored.mapping.min_value, 0.0);
    assert_eq!(colored.mapping.max_value, 2002.0);
}

#[test]
fn test_color_empty_mesh() {
    let mut mapper = ColorRangeMapper::default();
    let colored = mapper.color_mesh(Mesh::empty(MeshShape::Square), &ColorRangeSpec::default());

    assert_eq!(colored.mesh, Mesh::empty(MeshShape::Square));
    assert!(colored.mapping.values.is_empty());
}

#[test]
fn test_mapper_caches_color_strings() {
    let mut mapper = ColorRangeMapper::new(100);
    mapper.map_values(&ramp(4), &ColorRangeSpec::default());
    // Five ramp colors plus black for min/max.
    assert_eq!(mapper.cache().len(), 6);

    mapper.map_values(&ramp(4), &ColorRangeSpec::default());
    assert_eq!(mapper.cache().len(), 6);
}
