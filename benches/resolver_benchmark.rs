use std::fs;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use visage::StyleCatalog;

fn store_with(category: &str, count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    let partition = dir.path().join(category);
    fs::create_dir_all(&partition).unwrap();
    for i in 0..count {
        fs::write(partition.join(format!("style_{:04}.jpg", i)), b"x").unwrap();
    }
    dir
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resolve");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Scaling with partition size
    for count in [10, 100, 1000] {
        let dir = store_with("oval", count);
        let catalog = StyleCatalog::new(dir.path(), false);
        let mut rng = StdRng::seed_from_u64(7);

        group.bench_function(format!("assets_{}", count), |b| {
            b.iter(|| {
                catalog
                    .resolve_with(black_box("oval"), None, 3, &mut rng)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("List");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let dir = store_with("round", 500);
    let catalog = StyleCatalog::new(dir.path(), false);

    group.bench_function("list_500", |b| {
        b.iter(|| catalog.list(black_box("round"), None).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_list);
criterion_main!(benches);
