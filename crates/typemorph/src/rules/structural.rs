// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence, array and map traversal.
//!
//! Every element is converted through [`Mapper::convert_value`], so nested
//! values get the full resolution chain. The first failing element aborts
//! the traversal; elements already written stay written.

use crate::classify::is_plain;
use crate::dynamic::{DynamicValue, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Source, Target};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) fn resolve(src: &TypeDescriptor, dst: &TypeDescriptor) -> Option<Routine> {
    match (src.kind(), dst.kind()) {
        (TypeKind::Sequence(_) | TypeKind::Array(_), TypeKind::Sequence(_)) => {
            Some(Routine::new("sequence", sequence_to_sequence))
        }
        (TypeKind::Sequence(_) | TypeKind::Array(_), TypeKind::Array(_)) => {
            Some(Routine::new("array", sequence_to_array))
        }
        (TypeKind::Map(_), TypeKind::Map(_)) => Some(Routine::new("map", map_to_map)),
        _ => None,
    }
}

fn elements<'a>(
    source: &Source<'a>,
    target: &Target<'_>,
) -> Result<(&'a Arc<TypeDescriptor>, &'a [DynamicValue]), ConversionError> {
    let invalid = || ConversionError::invalid_source(source.ty(), target.ty());
    let ty = source.ty().element_type().ok_or_else(invalid)?;
    let items = source.value().as_slice().ok_or_else(invalid)?;
    Ok((ty, items))
}

/// Converts into existing destination elements, growing the destination
/// when it is shorter and zeroing whatever is left over past the source.
fn sequence_to_sequence(
    mapper: &Mapper,
    source: Source<'_>,
    target: Target<'_>,
) -> Result<(), ConversionError> {
    let (src_elem, items) = elements(&source, &target)?;
    let (to, slot) = target.into_parts();
    let dst_elem = to
        .element_type()
        .ok_or_else(|| ConversionError::invalid_destination(source.ty(), to))?;
    let DynamicValue::Sequence(out) = slot else {
        return Err(ConversionError::invalid_destination(source.ty(), to));
    };

    if out.len() < items.len() {
        out.resize_with(items.len(), || DynamicValue::zero(dst_elem));
    }
    convert_elements(mapper, src_elem, items, dst_elem, out)?;
    for leftover in &mut out[items.len()..] {
        *leftover = DynamicValue::zero(dst_elem);
    }
    Ok(())
}

fn sequence_to_array(
    mapper: &Mapper,
    source: Source<'_>,
    target: Target<'_>,
) -> Result<(), ConversionError> {
    let (src_elem, items) = elements(&source, &target)?;
    let (to, slot) = target.into_parts();
    let TypeKind::Array(arr) = to.kind() else {
        return Err(ConversionError::invalid_destination(source.ty(), to));
    };
    if items.len() != arr.length {
        return Err(ConversionError::length_mismatch(source.ty(), to).with_reason(format!(
            "expected {} elements, got {}",
            arr.length,
            items.len()
        )));
    }
    let DynamicValue::Array(out) = slot else {
        return Err(ConversionError::invalid_destination(source.ty(), to));
    };
    out.resize_with(arr.length, || DynamicValue::zero(&arr.element_type));
    convert_elements(mapper, src_elem, items, &arr.element_type, out)
}

fn convert_elements(
    mapper: &Mapper,
    src_elem: &Arc<TypeDescriptor>,
    items: &[DynamicValue],
    dst_elem: &Arc<TypeDescriptor>,
    out: &mut [DynamicValue],
) -> Result<(), ConversionError> {
    if src_elem == dst_elem && is_plain(src_elem) {
        out[..items.len()].clone_from_slice(items);
        return Ok(());
    }
    for (item, slot) in items.iter().zip(out.iter_mut()) {
        mapper.convert_value(src_elem, item, dst_elem, slot)?;
    }
    Ok(())
}

/// Existing destination entries are converted into; missing ones are
/// converted from a fresh zero value and inserted.
fn map_to_map(mapper: &Mapper, source: Source<'_>, target: Target<'_>) -> Result<(), ConversionError> {
    let (to, slot) = target.into_parts();
    let (TypeKind::Map(src_map), TypeKind::Map(dst_map)) = (source.ty().kind(), to.kind()) else {
        return Err(ConversionError::invalid_destination(source.ty(), to));
    };
    let entries = source
        .value()
        .as_map()
        .ok_or_else(|| ConversionError::invalid_source(source.ty(), to))?;
    let DynamicValue::Map(out) = slot else {
        return Err(ConversionError::invalid_destination(source.ty(), to));
    };

    let same_keys = src_map.key_type == dst_map.key_type;
    let copy_values = src_map.value_type == dst_map.value_type && is_plain(&src_map.value_type);
    for (key, value) in entries {
        let key = if same_keys {
            key.clone()
        } else {
            let mut converted = DynamicValue::zero(&dst_map.key_type);
            mapper.convert_value(&src_map.key_type, key, &dst_map.key_type, &mut converted)?;
            converted
        };
        if copy_values {
            out.insert(key, value.clone());
            continue;
        }
        insert_converted(mapper, &src_map.value_type, value, &dst_map.value_type, out, key)?;
    }
    Ok(())
}

/// Convert `value` into the entry at `key`, creating it when absent.
pub(crate) fn insert_converted(
    mapper: &Mapper,
    src_ty: &Arc<TypeDescriptor>,
    value: &DynamicValue,
    dst_ty: &Arc<TypeDescriptor>,
    out: &mut HashMap<DynamicValue, DynamicValue>,
    key: DynamicValue,
) -> Result<(), ConversionError> {
    if let Some(existing) = out.get_mut(&key) {
        return mapper.convert_value(src_ty, value, dst_ty, existing);
    }
    let mut fresh = DynamicValue::zero(dst_ty);
    mapper.convert_value(src_ty, value, dst_ty, &mut fresh)?;
    out.insert(key, fresh);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{array_of, map_of, optional_of, sequence_of, DynamicData, PrimitiveKind};
    use crate::error::ErrorKind;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        TypeDescriptor::builtin(kind)
    }

    #[test]
    fn test_shorter_source_zeroes_leftovers() {
        let mapper = Mapper::new();
        let src = DynamicData::from_value(
            &sequence_of(prim(PrimitiveKind::I32)),
            DynamicValue::Sequence(vec![DynamicValue::I32(1), DynamicValue::I32(2)]),
        )
        .unwrap();
        let mut dst = DynamicData::from_value(
            &sequence_of(prim(PrimitiveKind::I64)),
            DynamicValue::Sequence((1..=5).map(|i| DynamicValue::I64(i * 10)).collect()),
        )
        .unwrap();
        mapper.convert(&src, &mut dst).unwrap();
        assert_eq!(
            dst.value().as_slice().unwrap(),
            [1i64, 2, 0, 0, 0].map(DynamicValue::I64)
        );
    }

    #[test]
    fn test_longer_source_grows_destination() {
        let mapper = Mapper::new();
        let src = DynamicData::from_value(
            &sequence_of(prim(PrimitiveKind::U8)),
            DynamicValue::Sequence((0..5).map(DynamicValue::U8).collect()),
        )
        .unwrap();
        let mut dst = DynamicData::from_value(
            &sequence_of(prim(PrimitiveKind::String)),
            DynamicValue::Sequence(vec!["x".into(), "y".into()]),
        )
        .unwrap();
        mapper.convert(&src, &mut dst).unwrap();
        assert_eq!(dst.len().unwrap(), 5);
        assert_eq!(dst.get_element(4).unwrap(), &DynamicValue::from("4"));
    }

    #[test]
    fn test_array_length_must_match() {
        let mapper = Mapper::new();
        let src = DynamicData::from_value(
            &sequence_of(prim(PrimitiveKind::I32)),
            DynamicValue::Sequence(vec![DynamicValue::I32(1)]),
        )
        .unwrap();
        let mut dst = DynamicData::new(&array_of(prim(PrimitiveKind::I64), 2));
        let err = mapper.convert(&src, &mut dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn test_map_converts_into_existing_entries() {
        let mapper = Mapper::new();
        let src_ty = map_of(prim(PrimitiveKind::String), prim(PrimitiveKind::I32));
        let mut entries = HashMap::new();
        entries.insert(DynamicValue::from("a"), DynamicValue::I32(1));
        entries.insert(DynamicValue::from("b"), DynamicValue::I32(2));
        let src = DynamicData::from_value(&src_ty, DynamicValue::Map(entries)).unwrap();

        // "a" holds an optional, which is written through; "b" holds a
        // scalar, which is replaced.
        let dst_ty = map_of(prim(PrimitiveKind::String), TypeDescriptor::any());
        let opt = optional_of(prim(PrimitiveKind::U64));
        let mut dst = DynamicData::new(&dst_ty);
        dst.insert_entry(
            DynamicValue::from("a"),
            DynamicValue::Any(Some(Box::new(
                DynamicData::from_value(&opt, DynamicValue::Optional(None)).unwrap(),
            ))),
        )
        .unwrap();
        dst.insert_entry(
            DynamicValue::from("b"),
            DynamicValue::Any(Some(Box::new(DynamicData::from_native(0u64)))),
        )
        .unwrap();
        mapper.convert(&src, &mut dst).unwrap();

        let occupant = |key: &str| match dst.get_entry(&DynamicValue::from(key)).unwrap() {
            Some(DynamicValue::Any(Some(data))) => (data.type_name().to_string(), data.value().clone()),
            other => panic!("unexpected entry {:?}", other),
        };
        assert_eq!(
            occupant("a"),
            (
                "".to_string(),
                DynamicValue::Optional(Some(Box::new(DynamicValue::U64(1))))
            )
        );
        assert_eq!(occupant("b"), ("i32".to_string(), DynamicValue::I32(2)));
    }

    #[test]
    fn test_map_keys_are_converted() {
        let mapper = Mapper::new();
        let src_ty = map_of(prim(PrimitiveKind::I32), prim(PrimitiveKind::Bool));
        let mut entries = HashMap::new();
        entries.insert(DynamicValue::I32(7), DynamicValue::Bool(true));
        let src = DynamicData::from_value(&src_ty, DynamicValue::Map(entries)).unwrap();
        let mut dst = DynamicData::new(&map_of(prim(PrimitiveKind::String), prim(PrimitiveKind::U8)));
        mapper.convert(&src, &mut dst).unwrap();
        assert_eq!(
            dst.get_entry(&DynamicValue::from("7")).unwrap(),
            Some(&DynamicValue::U8(1))
        );
    }
}
