//! Benchmarks for library grouping and default API selection.
//!
//! These benchmarks run the resolver over synthetic API path lists shaped
//! like a googleapis checkout: many services, a few versions each, with a
//! share of them claimed by explicit libraries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use librarian_migrate::config::Library;
use librarian_migrate::naming::{derive_library_name, GroupingPolicy};
use librarian_migrate::phases::grouping;
use librarian_migrate::version::select_default_api;
use std::collections::BTreeMap;

const VERSIONS: [&str; 4] = ["v1", "v1beta1", "v2", "v2alpha"];

/// `services` services with every version in [`VERSIONS`].
fn generate_paths(services: usize) -> Vec<String> {
    (0..services)
        .flat_map(|i| VERSIONS.iter().map(move |v| format!("google/cloud/service{}/{}", i, v)))
        .collect()
}

/// Claims every tenth service under a non-canonical name.
fn generate_libraries(services: usize) -> Vec<Library> {
    (0..services)
        .step_by(10)
        .map(|i| {
            let mut library = Library::named(format!("svc{}", i));
            library.set_api_paths([format!("google/cloud/service{}/v1", i)]);
            library
        })
        .collect()
}

fn bench_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    for services in [100, 500, 1000] {
        let paths = generate_paths(services);
        let libraries = generate_libraries(services);
        let overrides = BTreeMap::new();

        group.bench_with_input(BenchmarkId::new("service", services), &paths, |b, paths| {
            b.iter(|| {
                grouping::execute(
                    GroupingPolicy::Service,
                    black_box(paths),
                    black_box(&libraries),
                    &overrides,
                )
            })
        });
        group.bench_with_input(BenchmarkId::new("channel", services), &paths, |b, paths| {
            b.iter(|| {
                grouping::execute(
                    GroupingPolicy::Channel,
                    black_box(paths),
                    black_box(&libraries),
                    &overrides,
                )
            })
        });
    }

    group.finish();
}

fn bench_naming(c: &mut Criterion) {
    let paths = generate_paths(1000);
    let mut group = c.benchmark_group("naming");

    group.bench_function("derive_library_name", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(derive_library_name(GroupingPolicy::Service, black_box(path)));
            }
        })
    });

    group.bench_function("select_default_api", |b| {
        b.iter(|| {
            for chunk in paths.chunks(VERSIONS.len()) {
                black_box(select_default_api(black_box(chunk)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_grouping, bench_naming);
criterion_main!(benches);
