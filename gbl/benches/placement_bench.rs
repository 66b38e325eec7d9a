use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::prelude::SmallRng;

use foamnest::entities::Instance;
use foamnest::io::import::import_instance;
use foamnest::nfp::NfpCache;
use gbl::config::PlacementConfig;
use gbl::io::read_instance;
use gbl::opt::candidate::Candidate;
use gbl::opt::placement::PlacementSolver;

criterion_main!(benches);
criterion_group!(benches, placement_bench);

const INSTANCES: [&str; 2] = ["foam_orders", "foam_overflow"];

fn load(name: &str) -> Instance {
    let path = format!("../assets/{name}.json");
    let ext_instance = read_instance(Path::new(&path)).unwrap();
    import_instance(&ext_instance).unwrap()
}

/// Decoding of random candidates, with a cold and with a warm no-fit polygon cache
fn placement_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("bottom_left_layout");
    for name in INSTANCES {
        let instance = load(name);
        let mut rng = SmallRng::seed_from_u64(0);
        let candidate = Candidate::random(&instance, &instance.feasible_instances(), 0.1, &mut rng);

        group.bench_function(BenchmarkId::new("cold_cache", name), |b| {
            b.iter(|| {
                let cache = NfpCache::new();
                let solver = PlacementSolver::new(&instance, &cache, PlacementConfig::default(), None);
                solver.layout(&candidate).unwrap()
            })
        });

        let cache = NfpCache::new();
        let solver = PlacementSolver::new(&instance, &cache, PlacementConfig::default(), None);
        group.bench_function(BenchmarkId::new("warm_cache", name), |b| {
            b.iter(|| solver.layout(&candidate).unwrap())
        });
    }
    group.finish();
}
