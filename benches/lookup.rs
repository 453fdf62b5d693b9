#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use vpack::{validate, Buffer, Builder, BuilderOptions, DecodeLimits};

fn int_array(n: i64) -> Buffer {
    let mut b = Builder::new();
    b.open_array().unwrap();
    for i in 0..n {
        b.add(i).unwrap();
    }
    b.close().unwrap();
    b.finish().unwrap()
}

fn object(options: BuilderOptions) -> Buffer {
    let mut b = Builder::with_options(options);
    b.open_object().unwrap();
    for i in 0..64_i64 {
        b.add_entry(&format!("k{i:03}"), i).unwrap();
    }
    b.close().unwrap();
    b.finish().unwrap()
}

fn bench_lookup(c: &mut Criterion) {
    let array = int_array(1000);
    c.bench_function("at_indexed_1000", |b| {
        b.iter(|| {
            let v = array.slice().at(black_box(500)).unwrap();
            black_box(v.get_int().unwrap());
        })
    });

    let sorted = object(BuilderOptions::indexed_sorted());
    c.bench_function("get_sorted_64", |b| {
        b.iter(|| {
            let v = sorted.slice().get(black_box("k047")).unwrap();
            black_box(v);
        })
    });

    let unsorted = object(BuilderOptions::default());
    c.bench_function("get_unsorted_64", |b| {
        b.iter(|| {
            let v = unsorted.slice().get(black_box("k047")).unwrap();
            black_box(v);
        })
    });

    let unindexed = object(BuilderOptions {
        build_unindexed_objects: true,
        ..BuilderOptions::default()
    });
    c.bench_function("get_compact_64", |b| {
        b.iter(|| {
            let v = unindexed.slice().get(black_box("k047")).unwrap();
            black_box(v);
        })
    });
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_array_1000", |b| {
        b.iter(|| black_box(int_array(black_box(1000))))
    });

    c.bench_function("build_object_sorted_64", |b| {
        b.iter(|| black_box(object(BuilderOptions::indexed_sorted())))
    });

    let medium = object(BuilderOptions::indexed_sorted());
    let limits = DecodeLimits::for_bytes(medium.len());
    c.bench_function("validate_object_64", |b| {
        b.iter(|| {
            validate(black_box(medium.as_bytes()), limits).unwrap();
        })
    });
}

criterion_group!(benches, bench_lookup, bench_build);
criterion_main!(benches);
