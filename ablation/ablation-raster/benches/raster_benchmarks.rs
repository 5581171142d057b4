//! Benchmarks for rasterization and margin fields.
//!
//! Run with: cargo bench -p ablation-raster
//!
//! The windowed/whole-grid pair shows what bounding the distance transform
//! to the needle's neighborhood saves on a clinical-sized volume.

#![allow(missing_docs, clippy::unwrap_used)]

use ablation_grid::{AffineMapper, GridGeometry, SpatialUnit};
use ablation_raster::{Centerline, MarginBands, margin_field, rasterize};
use ablation_types::GeometryConfig;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nalgebra::Point3;

/// A 256 x 256 x 128 grid of 0.8 x 0.8 x 2.5 mm voxels.
fn clinical_grid() -> (GridGeometry, AffineMapper) {
    let geometry =
        GridGeometry::from_spacing([256, 256, 128], [0.8, 0.8, 2.5], SpatialUnit::Millimeter)
            .unwrap();
    let mapper = AffineMapper::new(&geometry).unwrap();
    (geometry, mapper)
}

fn oblique_centerline(geometry: &GridGeometry, mapper: &AffineMapper) -> Centerline {
    rasterize(
        &Point3::new(60.0, 70.0, 100.0),
        &Point3::new(110.0, 120.0, 160.0),
        mapper,
        geometry,
    )
    .unwrap()
}

fn bench_rasterize(c: &mut Criterion) {
    let (geometry, mapper) = clinical_grid();
    let mut group = c.benchmark_group("rasterize");

    for length in [10.0, 50.0, 150.0] {
        group.bench_with_input(BenchmarkId::new("oblique", length), &length, |b, &length| {
            let entry = Point3::new(20.0, 20.0, 20.0);
            let target = Point3::new(20.0 + length, 20.0 + length * 0.5, 20.0 + length * 0.3);
            b.iter(|| rasterize(black_box(&entry), black_box(&target), &mapper, &geometry));
        });
    }

    group.finish();
}

fn bench_margin_field(c: &mut Criterion) {
    let (geometry, mapper) = clinical_grid();
    let centerline = oblique_centerline(&geometry, &mapper);
    let bands = MarginBands::new(&GeometryConfig::new(10, 15).unwrap());
    let mut group = c.benchmark_group("margin_field");
    group.sample_size(10);

    group.bench_function("windowed", |b| {
        b.iter(|| margin_field(black_box(&centerline), bands.field_bound(), &geometry, 1.0));
    });

    group.bench_function("whole_grid", |b| {
        b.iter(|| margin_field(black_box(&centerline), 1e6, &geometry, 1.0));
    });

    group.finish();
}

criterion_group!(benches, bench_rasterize, bench_margin_field);
criterion_main!(benches);
