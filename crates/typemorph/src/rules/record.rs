// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record conversions: record <-> string-keyed map, record <-> record.
//!
//! Field plans are built from the cached field descriptors when the pair is
//! resolved, so routines never look at tags.

use super::structural::insert_converted;
use crate::classify::StructuralKind;
use crate::dynamic::{DynamicData, DynamicValue, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::fields::FieldDescriptor;
use crate::mapper::{resolve_source, resolve_target, Mapper, Routine};
use std::collections::HashMap;
use std::sync::Arc;

/// One converted member: where it sits and which map keys lead to it.
struct FieldPlan {
    index: usize,
    ty: Arc<TypeDescriptor>,
    name: String,
    keys: Vec<DynamicValue>,
}

pub(crate) fn resolve(
    mapper: &Mapper,
    src: &Arc<TypeDescriptor>,
    dst: &Arc<TypeDescriptor>,
) -> Option<Routine> {
    match (src.kind(), dst.kind()) {
        (TypeKind::Map(map), TypeKind::Struct(_)) => Some(if has_text_keys(&map.key_type) {
            map_to_record(plan(mapper, dst))
        } else {
            key_error(src, dst)
        }),
        (TypeKind::Struct(_), TypeKind::Map(map)) => Some(if has_text_keys(&map.key_type) {
            record_to_map(plan(mapper, src))
        } else {
            key_error(src, dst)
        }),
        (TypeKind::Struct(_), TypeKind::Struct(_)) if src == dst => {
            Some(same_record(plan(mapper, src)))
        }
        (TypeKind::Struct(_), TypeKind::Struct(_)) => Some(record_to_record(correlate(
            plan(mapper, src),
            plan(mapper, dst),
        ))),
        _ => None,
    }
}

fn has_text_keys(key: &TypeDescriptor) -> bool {
    StructuralKind::of(key) == StructuralKind::Text
}

fn key_error(src: &Arc<TypeDescriptor>, dst: &Arc<TypeDescriptor>) -> Routine {
    Routine::failing(
        "record-key",
        ConversionError::unsupported(src, dst).with_reason("map key must be a string"),
    )
}

/// Non-skipped members of `desc`.
fn plan(mapper: &Mapper, desc: &Arc<TypeDescriptor>) -> Vec<FieldPlan> {
    let members = desc.members().unwrap_or_default();
    mapper
        .field_descriptors(desc)
        .iter()
        .filter(|f| !f.skip)
        .filter_map(|f: &FieldDescriptor| {
            let member = members.get(f.index)?;
            Some(FieldPlan {
                index: f.index,
                ty: Arc::clone(&member.type_desc),
                name: f.name.clone(),
                keys: f.path.iter().map(|s| DynamicValue::String(s.clone())).collect(),
            })
        })
        .collect()
}

/// Source and destination members sharing an external name.
fn correlate(src: Vec<FieldPlan>, dst: Vec<FieldPlan>) -> Vec<(FieldPlan, FieldPlan)> {
    let mut by_name: HashMap<String, FieldPlan> =
        src.into_iter().map(|f| (f.name.clone(), f)).collect();
    dst.into_iter()
        .filter_map(|d| by_name.remove(&d.name).map(|s| (s, d)))
        .collect()
}

fn struct_values<'a>(value: &'a DynamicValue) -> Option<&'a [DynamicValue]> {
    match value {
        DynamicValue::Struct(values) => Some(values),
        _ => None,
    }
}

/// Only keys present in the source map are written. Null entries count as
/// absent.
fn map_to_record(fields: Vec<FieldPlan>) -> Routine {
    Routine::new("map-to-record", move |mapper, source, target| {
        let (to, slot) = target.into_parts();
        let DynamicValue::Struct(out) = slot else {
            return Err(ConversionError::invalid_destination(source.ty(), to));
        };
        for field in &fields {
            let Some((value_ty, value)) = lookup(source.ty(), source.value(), &field.keys) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let member = out
                .get_mut(field.index)
                .ok_or_else(|| ConversionError::invalid_destination(source.ty(), to))?;
            mapper.convert_value(value_ty, value, &field.ty, member)?;
        }
        Ok(())
    })
}

/// Follow `keys` through nested maps. Anything missing, or not a map on
/// the way down, is absent.
fn lookup<'a>(
    ty: &'a Arc<TypeDescriptor>,
    value: &'a DynamicValue,
    keys: &[DynamicValue],
) -> Option<(&'a Arc<TypeDescriptor>, &'a DynamicValue)> {
    let (first, rest) = keys.split_first()?;
    let TypeKind::Map(map) = ty.kind() else {
        return None;
    };
    let found = value.as_map()?.get(first)?;
    if rest.is_empty() {
        return Some((&map.value_type, found));
    }
    let (inner_ty, inner) = resolve_source(&map.value_type, found)?;
    lookup(inner_ty, inner, rest)
}

/// One entry per member; dotted names create nested maps on the way.
fn record_to_map(fields: Vec<FieldPlan>) -> Routine {
    Routine::new("record-to-map", move |mapper, source, target| {
        let values = struct_values(source.value())
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        let (to, slot) = target.into_parts();
        let DynamicValue::Map(out) = slot else {
            return Err(ConversionError::invalid_destination(source.ty(), to));
        };
        for field in &fields {
            let Some(value) = values.get(field.index) else {
                return Err(ConversionError::invalid_source(source.ty(), to));
            };
            let Some((leaf, parents)) = field.keys.split_last() else {
                continue;
            };
            let (map_ty, entries) = descend(mapper, to, &mut *out, parents).map_err(|seg| {
                ConversionError::invalid_destination(source.ty(), to).with_reason(format!(
                    "'{}' in '{}' is not a string-keyed map",
                    seg, field.name
                ))
            })?;
            let TypeKind::Map(map) = map_ty.kind() else {
                return Err(ConversionError::invalid_destination(source.ty(), to));
            };
            insert_converted(mapper, &field.ty, value, &map.value_type, entries, leaf.clone())?;
        }
        Ok(())
    })
}

/// Walk (and create) the intermediate maps named by `parents`. On failure
/// returns the offending segment.
fn descend<'a>(
    mapper: &Mapper,
    mut ty: &'a Arc<TypeDescriptor>,
    mut entries: &'a mut HashMap<DynamicValue, DynamicValue>,
    parents: &[DynamicValue],
) -> Result<(&'a Arc<TypeDescriptor>, &'a mut HashMap<DynamicValue, DynamicValue>), String> {
    for key in parents {
        let segment = || key.as_str().unwrap_or_default().to_string();
        let TypeKind::Map(map) = ty.kind() else {
            return Err(segment());
        };
        let slot = entries
            .entry(key.clone())
            .or_insert_with(|| DynamicValue::zero(&map.value_type));
        // An empty `any` slot gets a map shaped like its parent.
        if matches!(slot, DynamicValue::Any(None)) {
            *slot = DynamicValue::Any(Some(Box::new(DynamicData {
                descriptor: Arc::clone(ty),
                value: DynamicValue::Map(HashMap::new()),
            })));
        }
        let (next_ty, next) =
            resolve_target(mapper.registry(), &map.value_type, slot).ok_or_else(segment)?;
        match (next_ty.kind(), next) {
            (TypeKind::Map(inner), DynamicValue::Map(inner_entries))
                if has_text_keys(&inner.key_type) =>
            {
                ty = next_ty;
                entries = inner_entries;
            }
            _ => return Err(segment()),
        }
    }
    Ok((ty, entries))
}

fn same_record(fields: Vec<FieldPlan>) -> Routine {
    Routine::new("record-copy", move |mapper, source, target| {
        let values = struct_values(source.value())
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        let (to, slot) = target.into_parts();
        let DynamicValue::Struct(out) = slot else {
            return Err(ConversionError::invalid_destination(source.ty(), to));
        };
        for field in &fields {
            match (values.get(field.index), out.get_mut(field.index)) {
                (Some(value), Some(member)) => {
                    mapper.convert_value(&field.ty, value, &field.ty, member)?
                }
                _ => return Err(ConversionError::invalid_source(source.ty(), to)),
            }
        }
        Ok(())
    })
}

/// Members without a counterpart on the other side are ignored.
fn record_to_record(pairs: Vec<(FieldPlan, FieldPlan)>) -> Routine {
    Routine::new("record", move |mapper, source, target| {
        let values = struct_values(source.value())
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        let (to, slot) = target.into_parts();
        let DynamicValue::Struct(out) = slot else {
            return Err(ConversionError::invalid_destination(source.ty(), to));
        };
        for (from, into) in &pairs {
            let value = values
                .get(from.index)
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), to))?;
            let member = out
                .get_mut(into.index)
                .ok_or_else(|| ConversionError::invalid_destination(source.ty(), to))?;
            mapper.convert_value(&from.ty, value, &into.ty, member)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{map_of, PrimitiveKind, TypeDescriptorBuilder};
    use crate::error::ErrorKind;

    fn prim(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        TypeDescriptor::builtin(kind)
    }

    fn string_map(value: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        map_of(prim(PrimitiveKind::String), value)
    }

    fn any_entry(data: DynamicData) -> DynamicValue {
        DynamicValue::Any(Some(Box::new(data)))
    }

    #[test]
    fn test_tagged_record_to_map() {
        let record = Arc::new(
            TypeDescriptorBuilder::new("Swapped")
                .tagged_field("Foo", prim(PrimitiveKind::I32), "map", "bar")
                .tagged_field("Bar", prim(PrimitiveKind::I32), "map", "foo")
                .build(),
        );
        let mut src = DynamicData::new(&record);
        src.set("Foo", 42i32).unwrap();
        src.set("Bar", 1337i32).unwrap();
        let mut dst = DynamicData::new(&string_map(prim(PrimitiveKind::I64)));

        Mapper::new().convert(&src, &mut dst).unwrap();
        assert_eq!(dst.len().unwrap(), 2);
        assert_eq!(dst.get_entry(&"bar".into()).unwrap(), Some(&DynamicValue::I64(42)));
        assert_eq!(dst.get_entry(&"foo".into()).unwrap(), Some(&DynamicValue::I64(1337)));
    }

    #[test]
    fn test_map_to_record_leaves_absent_fields() {
        let record = Arc::new(
            TypeDescriptorBuilder::new("Pair")
                .field("a", PrimitiveKind::U8)
                .field("b", PrimitiveKind::U8)
                .build(),
        );
        let mut src = DynamicData::new(&string_map(TypeDescriptor::any()));
        src.insert_entry("a", any_entry(DynamicData::from_native("7".to_string())))
            .unwrap();
        let mut dst = DynamicData::new(&record);
        dst.set("b", 9u8).unwrap();

        Mapper::new().convert(&src, &mut dst).unwrap();
        assert_eq!(dst.get::<u8>("a").unwrap(), 7);
        assert_eq!(dst.get::<u8>("b").unwrap(), 9);
    }

    #[test]
    fn test_nested_paths_round_trip() {
        let record = Arc::new(
            TypeDescriptorBuilder::new("Server")
                .tagged_field("host", prim(PrimitiveKind::String), "map", "net.host")
                .tagged_field("port", prim(PrimitiveKind::U16), "map", "net.port")
                .tagged_field("secret", prim(PrimitiveKind::String), "map", "-")
                .build(),
        );
        let mapper = Mapper::new();
        let mut src = DynamicData::new(&record);
        src.set("host", "localhost".to_string()).unwrap();
        src.set("port", 8080u16).unwrap();
        src.set("secret", "hunter2".to_string()).unwrap();

        let mut map = DynamicData::new(&string_map(TypeDescriptor::any()));
        mapper.convert(&src, &mut map).unwrap();
        assert_eq!(map.len().unwrap(), 1);
        let Some(DynamicValue::Any(Some(net))) = map.get_entry(&"net".into()).unwrap() else {
            panic!("expected a nested map");
        };
        assert_eq!(net.len().unwrap(), 2);

        let mut back = DynamicData::new(&record);
        mapper.convert(&map, &mut back).unwrap();
        assert_eq!(back.get::<String>("host").unwrap(), "localhost");
        assert_eq!(back.get::<u16>("port").unwrap(), 8080);
        assert_eq!(back.get::<String>("secret").unwrap(), "");
    }

    #[test]
    fn test_non_string_keys_are_rejected() {
        let record = Arc::new(TypeDescriptorBuilder::new("R").field("a", PrimitiveKind::I32).build());
        let src = DynamicData::new(&record);
        let mut dst = DynamicData::new(&map_of(prim(PrimitiveKind::I32), prim(PrimitiveKind::I32)));
        let err = Mapper::new().convert(&src, &mut dst).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.reason(), Some("map key must be a string"));
    }

    #[test]
    fn test_records_correlate_by_external_name() {
        let a = Arc::new(
            TypeDescriptorBuilder::new("A")
                .field("id", PrimitiveKind::I64)
                .field("only_a", PrimitiveKind::Bool)
                .tagged_field("label", prim(PrimitiveKind::String), "map", "name")
                .build(),
        );
        let b = Arc::new(
            TypeDescriptorBuilder::new("B")
                .field("name", PrimitiveKind::String)
                .field("only_b", PrimitiveKind::Bool)
                .field("id", PrimitiveKind::String)
                .build(),
        );
        let mut src = DynamicData::new(&a);
        src.set("id", 5i64).unwrap();
        src.set("only_a", true).unwrap();
        src.set("label", "five".to_string()).unwrap();
        let mut dst = DynamicData::new(&b);

        Mapper::new().convert(&src, &mut dst).unwrap();
        assert_eq!(dst.get::<String>("id").unwrap(), "5");
        assert_eq!(dst.get::<String>("name").unwrap(), "five");
        assert!(!dst.get::<bool>("only_b").unwrap());
    }

    #[test]
    fn test_same_record_skips_excluded_fields() {
        let record = Arc::new(
            TypeDescriptorBuilder::new("S")
                .field("kept", PrimitiveKind::I32)
                .tagged_field("dropped", prim(PrimitiveKind::I32), "map", "-")
                .build(),
        );
        let mut src = DynamicData::new(&record);
        src.set("kept", 1i32).unwrap();
        src.set("dropped", 2i32).unwrap();
        let mut dst = DynamicData::new(&record);
        dst.set("dropped", 3i32).unwrap();

        Mapper::new().convert(&src, &mut dst).unwrap();
        assert_eq!(dst.get::<i32>("kept").unwrap(), 1);
        assert_eq!(dst.get::<i32>("dropped").unwrap(), 3);
    }
}
