//! Benchmarks for isoline extraction and label placement.
//!
//! Run with: cargo bench --package mesh-core --bench isoline_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_core::isoline::isolines_for_value;
use mesh_core::{
    place_labels, IsolineExtractor, IsolineSpec, LabelOptions, MapState, Mesh, MeshBuilder,
    MeshSpec, VALUE_KEY,
};
use rand::Rng;
use test_utils::{create_bump_grid, create_wave_grid, grid_samples, Sample};
use viz_common::Point3;

fn build_mesh(values: &[f64], width: usize, height: usize) -> Mesh {
    let samples = grid_samples(values, width, 0.0, 0.0, 1.0, 1.0);
    let mesh = MeshBuilder::new(&samples, |s: &Sample, _| Point3::xy(s.x, s.y))
        .spec(MeshSpec::grid(width, height))
        .value(VALUE_KEY, |s, _, _| s.value)
        .build();
    mesh
}

/// Smooth field: few, long isolines.
fn smooth_mesh(width: usize, height: usize) -> Mesh {
    build_mesh(&create_wave_grid(width, height), width, height)
}

/// Jittered field: many short isolines and saddles.
fn noisy_mesh(width: usize, height: usize) -> Mesh {
    let mut rng = rand::thread_rng();
    let values: Vec<f64> = create_wave_grid(width, height)
        .into_iter()
        .map(|v| v + rng.gen_range(-0.3..0.3))
        .collect();
    build_mesh(&values, width, height)
}

// =============================================================================
// SINGLE THRESHOLD BENCHMARKS
// =============================================================================

fn bench_isolines_for_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("isolines_for_value");

    let sizes = [(64, 64), (256, 256), (512, 512)];

    for (width, height) in sizes {
        let smooth = smooth_mesh(width, height);
        let noisy = noisy_mesh(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        for (name, mesh) in [("smooth", &smooth), ("noisy", &noisy)] {
            let values = mesh.value(VALUE_KEY).unwrap_or_default();
            group.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", width, height)),
                &values,
                |b, values| {
                    b.iter(|| isolines_for_value(mesh, black_box(values), black_box(0.0)));
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// FULL EXTRACTION BENCHMARKS
// =============================================================================

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    let mesh = noisy_mesh(256, 256);
    let extractor = IsolineExtractor::new();

    let specs = [
        ("uniform_5", IsolineSpec::uniform(5)),
        ("autofit_15", IsolineSpec::default()),
        ("spacing_0.1", IsolineSpec::with_spacing(0.1)),
    ];

    for (name, spec) in specs {
        group.bench_with_input(BenchmarkId::new("noisy_256x256", name), &spec, |b, spec| {
            b.iter(|| extractor.extract(black_box(&mesh), spec));
        });
    }

    group.finish();
}

// =============================================================================
// LABEL PLACEMENT BENCHMARKS
// =============================================================================

fn bench_place_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_labels");

    let (width, height) = (201, 201);
    let mesh = build_mesh(&create_bump_grid(width, height, 100.0), width, height);
    let spec = IsolineSpec {
        label: mesh_core::LabelRule::Enabled(true),
        ..IsolineSpec::with_spacing(2.0)
    };
    let lines = IsolineExtractor::new().extract(&mesh, &spec).lines;

    for scale in [1.0, 8.0, 64.0] {
        let map = MapState::new(Point3::xy(100.0, 100.0), scale, (1024.0, 768.0));
        for margin in [0.0, 200.0] {
            let options = LabelOptions {
                viewport_margin: margin,
                ..LabelOptions::from_spec(&spec)
            };
            group.bench_with_input(
                BenchmarkId::new(format!("margin_{}", margin), scale),
                &options,
                |b, options| {
                    b.iter(|| place_labels(black_box(&lines), &map, options));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_isolines_for_value,
    bench_extract,
    bench_place_labels,
);
criterion_main!(benches);
