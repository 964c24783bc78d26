//! Routing benchmarks.
//!
//! Run with: `cargo bench -p heron-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heron_router::{MatchOptions, RouteTable};
use http::Method;

fn build_table(num_routes: usize) -> RouteTable<()> {
    let mut table = RouteTable::new();

    for i in 0..num_routes / 3 {
        table
            .get(&format!("/api/v1/resource{i}"), format!("Resource{i}.list"))
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        table
            .get(&format!("/api/v1/resource{i}/:id[\\d]"), format!("Resource{i}.show"))
            .unwrap();
    }

    for i in 0..num_routes / 3 {
        table
            .get(
                &format!("/api/v1/org/:org/resource{i}/:tab{{info|stats}}"),
                format!("OrgResource{i}.tab"),
            )
            .unwrap();
    }

    table
}

fn bench_static_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("static_match", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/v1/resource30", Some(&Method::GET)).unwrap());
        });
    });
}

fn bench_param_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("param_match", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/v1/resource25/12345", Some(&Method::GET)).unwrap());
        });
    });
}

fn bench_alternation_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("alternation_match", |b| {
        b.iter(|| {
            black_box(
                table
                    .resolve("/api/v1/org/acme-corp/resource10/stats", Some(&Method::GET))
                    .unwrap(),
            );
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("miss", |b| {
        b.iter(|| {
            black_box(table.resolve("/api/v1/nonexistent/path", Some(&Method::GET)).unwrap());
        });
    });
}

fn bench_route_count_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_count_scaling");

    for count in [10, 100, 500] {
        let table = build_table(count);
        let last = count / 3 - 1;
        let path = format!("/api/v1/resource{last}/42");

        group.bench_with_input(BenchmarkId::from_parameter(count), &path, |b, path| {
            b.iter(|| black_box(table.resolve(path, Some(&Method::GET)).unwrap()));
        });
    }
    group.finish();
}

fn bench_matcher_rebuild(c: &mut Criterion) {
    c.bench_function("matcher_rebuild_100", |b| {
        b.iter(|| {
            let table = build_table(100);
            black_box(table.resolve("/api/v1/resource0", None).unwrap().is_some());
        });
    });
}

fn bench_decode_off(c: &mut Criterion) {
    let mut table = RouteTable::<()>::with_options(MatchOptions::default().with_decode_uri(false));
    table.get("/files/:name", "File.show").unwrap();

    c.bench_function("decode_off_match", |b| {
        b.iter(|| black_box(table.resolve("/files/report.pdf", None).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_alternation_match,
    bench_miss,
    bench_route_count_scaling,
    bench_matcher_rebuild,
    bench_decode_off,
);
criterion_main!(benches);
