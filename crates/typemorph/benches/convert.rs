// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion Benchmarks
//!
//! Measures:
//! - Cached scalar dispatch (integer to text, text to integer)
//! - Sequence traversal with per-element conversion
//! - Record to loose map and back

#![allow(clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use typemorph::dynamic::{
    map_of, sequence_of, DynamicData, DynamicValue, PrimitiveKind, TypeDescriptor,
    TypeDescriptorBuilder,
};
use typemorph::Mapper;

// ============================================================================
// Benchmark 1: Scalar dispatch
// ============================================================================

fn bench_scalar(c: &mut Criterion) {
    let mapper = Mapper::new();
    let number = DynamicData::from_native(1_234_567i64);
    let text = DynamicData::from_native("1234567".to_string());
    let mut text_dst = DynamicData::new(&TypeDescriptor::builtin(PrimitiveKind::String));
    let mut number_dst = DynamicData::new(&TypeDescriptor::builtin(PrimitiveKind::I64));

    let mut group = c.benchmark_group("scalar");
    group.bench_function("i64_to_string", |b| {
        b.iter(|| mapper.convert(black_box(&number), &mut text_dst).unwrap());
    });
    group.bench_function("string_to_i64", |b| {
        b.iter(|| mapper.convert(black_box(&text), &mut number_dst).unwrap());
    });
    group.bench_function("i64_identity", |b| {
        b.iter(|| mapper.convert(black_box(&number), &mut number_dst).unwrap());
    });
    group.finish();
}

// ============================================================================
// Benchmark 2: Sequence traversal
// ============================================================================

fn bench_sequences(c: &mut Criterion) {
    let mapper = Mapper::new();
    let src_ty = sequence_of(TypeDescriptor::builtin(PrimitiveKind::I32));
    let dst_ty = sequence_of(TypeDescriptor::builtin(PrimitiveKind::F64));

    let mut group = c.benchmark_group("sequence");
    for len in [16usize, 256, 4096] {
        let items = (0..len).map(|i| DynamicValue::I32(i as i32)).collect();
        let src = DynamicData::from_value(&src_ty, DynamicValue::Sequence(items)).unwrap();
        let mut dst = DynamicData::new(&dst_ty);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("i32_to_f64", len), &src, |b, src| {
            b.iter(|| mapper.convert(black_box(src), &mut dst).unwrap());
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark 3: Records
// ============================================================================

fn bench_records(c: &mut Criterion) {
    let mapper = Mapper::new();
    let record = Arc::new(
        TypeDescriptorBuilder::new("Reading")
            .field("sensor", PrimitiveKind::U32)
            .field("value", PrimitiveKind::F64)
            .string_field("unit")
            .tagged_field(
                "site",
                TypeDescriptor::builtin(PrimitiveKind::String),
                "map",
                "meta.site",
            )
            .build(),
    );
    let loose = map_of(TypeDescriptor::builtin(PrimitiveKind::String), TypeDescriptor::any());

    let mut src = DynamicData::new(&record);
    src.set("sensor", 42u32).unwrap();
    src.set("value", 21.5f64).unwrap();
    src.set("unit", "C".to_string()).unwrap();
    src.set("site", "north".to_string()).unwrap();
    let mut map = DynamicData::new(&loose);
    mapper.convert(&src, &mut map).unwrap();

    let mut group = c.benchmark_group("record");
    group.bench_function("record_to_map", |b| {
        b.iter(|| {
            let mut dst = DynamicData::new(&loose);
            mapper.convert(black_box(&src), &mut dst).unwrap();
            dst
        });
    });
    group.bench_function("map_to_record", |b| {
        let mut dst = DynamicData::new(&record);
        b.iter(|| mapper.convert(black_box(&map), &mut dst).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_scalar, bench_sequences, bench_records);
criterion_main!(benches);
