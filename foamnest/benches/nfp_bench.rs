use std::f64::consts::PI;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use itertools::Itertools;

use foamnest::geometry::Transformation;
use foamnest::geometry::geo_traits::Transformable;
use foamnest::geometry::overlap::polygons_overlap;
use foamnest::geometry::primitives::{Point, SPolygon};
use foamnest::nfp::{convex_decomposition, no_fit_polygon};

criterion_main!(benches);
criterion_group!(benches, decomposition_bench, nfp_bench, overlap_bench);

const N_SPIKES: [usize; 4] = [4, 8, 16, 32];

/// Star shaped (non-convex) polygon with `n_spikes` spikes
fn star(n_spikes: usize, r_outer: f64, r_inner: f64) -> SPolygon {
    let points = (0..2 * n_spikes)
        .map(|i| {
            let angle = PI * i as f64 / n_spikes as f64;
            let r = if i % 2 == 0 { r_outer } else { r_inner };
            Point(r * angle.cos(), r * angle.sin())
        })
        .collect_vec();
    SPolygon::try_new(points).unwrap()
}

fn decomposition_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("convex_decomposition");
    for n in N_SPIKES {
        let shape = star(n, 10.0, 4.0);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| convex_decomposition(&shape).unwrap())
        });
    }
    group.finish();
}

/// Outer no-fit polygon of two stars, the orbiting one rotated by 45°
fn nfp_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("no_fit_polygon");
    for n in N_SPIKES {
        let stationary = convex_decomposition(&star(n, 10.0, 4.0)).unwrap();
        let rot = Transformation::from_rotation(45f64.to_radians());
        let orbiting = convex_decomposition(&star(n, 6.0, 3.0))
            .unwrap()
            .into_iter()
            .map(|p| p.transform_clone(&rot))
            .collect_vec();
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| no_fit_polygon(&stationary, &orbiting).unwrap())
        });
    }
    group.finish();
}

/// Exact overlap test of two touching stars
fn overlap_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygons_overlap");
    for n in N_SPIKES {
        let a = star(n, 10.0, 4.0);
        let b = a.transform_clone(&Transformation::from_translation((20.0, 0.0)));
        group.bench_function(BenchmarkId::from_parameter(n), |bencher| {
            bencher.iter(|| polygons_overlap(&a, &b))
        });
    }
    group.finish();
}
