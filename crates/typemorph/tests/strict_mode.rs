// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Strict nominal typing.
//!
//! With `strict_types`, built-in rules refuse scalar and sequence pairs of
//! different types. Records and maps are walked as usual and their members
//! checked one by one.

use std::sync::Arc;
use typemorph::dynamic::{
    map_of, named, sequence_of, DynamicData, DynamicValue, PrimitiveKind, TypeDescriptor,
    TypeDescriptorBuilder,
};
use typemorph::{ErrorKind, Mapper};

fn strict() -> Mapper {
    Mapper::builder().strict_types(true).build()
}

fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
    TypeDescriptor::builtin(kind)
}

#[test]
fn test_scalar_kinds_must_match() {
    let mapper = strict();
    let err = mapper
        .convert_native::<i32>(&DynamicData::from_native(true))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);
    assert_eq!(err.from_type().name(), "bool");
    assert_eq!(err.to_type().name(), "i32");

    let err = mapper
        .convert_native::<i64>(&DynamicData::from_native(1i32))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);

    assert_eq!(mapper.convert_native::<i32>(&DynamicData::from_native(5i32)).unwrap(), 5);
}

#[test]
fn test_aliases_are_distinct_types() {
    let mapper = strict();
    let id = named("Id", &prim(PrimitiveKind::I64));
    let src = DynamicData::from_value(&id, DynamicValue::I64(3)).unwrap();
    let err = mapper.convert_native::<i64>(&src).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);

    // The same alias on both sides is fine.
    let mut dst = DynamicData::new(&id);
    mapper.convert(&src, &mut dst).unwrap();
    assert_eq!(dst.value(), &DynamicValue::I64(3));
}

#[test]
fn test_sequences_must_match() {
    let mapper = strict();
    let src = DynamicData::from_value(
        &sequence_of(prim(PrimitiveKind::I32)),
        DynamicValue::Sequence(vec![DynamicValue::I32(1)]),
    )
    .unwrap();
    let mut dst = DynamicData::new(&sequence_of(prim(PrimitiveKind::I64)));
    let err = mapper.convert(&src, &mut dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);
    assert_eq!(dst.len().unwrap(), 0);
}

#[test]
fn test_records_and_maps_check_members() {
    let mapper = strict();
    let a = Arc::new(
        TypeDescriptorBuilder::new("A")
            .field("x", PrimitiveKind::I32)
            .string_field("label")
            .build(),
    );
    let b = Arc::new(
        TypeDescriptorBuilder::new("B")
            .field("x", PrimitiveKind::I32)
            .string_field("label")
            .build(),
    );
    let mut src = DynamicData::new(&a);
    src.set("x", 8i32).unwrap();
    src.set("label", "eight".to_string()).unwrap();

    let mut dst = DynamicData::new(&b);
    mapper.convert(&src, &mut dst).unwrap();
    assert_eq!(dst.get::<i32>("x").unwrap(), 8);

    let mut map = DynamicData::new(&map_of(prim(PrimitiveKind::String), TypeDescriptor::any()));
    mapper.convert(&src, &mut map).unwrap();
    let mut back = DynamicData::new(&a);
    mapper.convert(&map, &mut back).unwrap();
    assert_eq!(back.get::<String>("label").unwrap(), "eight");

    let wide = Arc::new(TypeDescriptorBuilder::new("Wide").field("x", PrimitiveKind::I64).build());
    let mut dst = DynamicData::new(&wide);
    let err = mapper.convert(&src, &mut dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StrictTypeMismatch);
    assert_eq!(err.from_type().name(), "i32");
}

#[test]
fn test_lenient_mode_is_the_default() {
    let mapper = Mapper::new();
    assert!(!mapper.config().strict_types);
    assert_eq!(mapper.convert_native::<i32>(&DynamicData::from_native(true)).unwrap(), 1);
}
