// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON bridge.
//!
//! [`from_json`] turns a document into loosely typed dynamic data (`any`
//! slots, `[]any`, `map[string]any`) ready to be converted into a declared
//! type; [`to_json`] renders any dynamic data back.

use crate::dynamic::{DynamicData, DynamicValue, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::Mapper;
use serde_json::{Map, Number, Value};
use std::sync::{Arc, OnceLock};

fn any_sequence() -> Arc<TypeDescriptor> {
    static DESC: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
    Arc::clone(DESC.get_or_init(|| Arc::new(TypeDescriptor::sequence(TypeDescriptor::any()))))
}

fn any_map() -> Arc<TypeDescriptor> {
    static DESC: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
    Arc::clone(DESC.get_or_init(|| {
        Arc::new(TypeDescriptor::map(
            TypeDescriptor::builtin(PrimitiveKind::String),
            TypeDescriptor::any(),
        ))
    }))
}

fn json_descriptor() -> Arc<TypeDescriptor> {
    static DESC: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
    Arc::clone(DESC.get_or_init(|| Arc::new(TypeDescriptor::named("json", &TypeDescriptor::any()))))
}

/// Dynamic form of a JSON document.
///
/// `null` becomes an empty `any` slot. Integers become `i64`, or `u64`
/// above `i64::MAX`; other numbers become `f64`.
pub fn from_json(value: &Value) -> DynamicData {
    match value {
        Value::Null => DynamicData {
            descriptor: TypeDescriptor::any(),
            value: DynamicValue::Any(None),
        },
        Value::Bool(b) => DynamicData::from_native(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DynamicData::from_native(i)
            } else if let Some(u) = n.as_u64() {
                DynamicData::from_native(u)
            } else {
                DynamicData::from_native(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => DynamicData::from_native(s.clone()),
        Value::Array(items) => DynamicData {
            descriptor: any_sequence(),
            value: DynamicValue::Sequence(items.iter().map(any_slot).collect()),
        },
        Value::Object(entries) => DynamicData {
            descriptor: any_map(),
            value: DynamicValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| (DynamicValue::String(k.clone()), any_slot(v)))
                    .collect(),
            ),
        },
    }
}

fn any_slot(value: &Value) -> DynamicValue {
    match value {
        Value::Null => DynamicValue::Any(None),
        other => DynamicValue::Any(Some(Box::new(from_json(other)))),
    }
}

/// JSON rendering of `data`.
///
/// Records render as objects keyed by member name. Map keys and host
/// values that are not strings render through their string conversion.
pub fn to_json(data: &DynamicData) -> Result<Value, ConversionError> {
    render(&data.descriptor, &data.value)
}

fn render(ty: &Arc<TypeDescriptor>, value: &DynamicValue) -> Result<Value, ConversionError> {
    let unsupported = || ConversionError::unsupported(ty, &json_descriptor());
    Ok(match (ty.kind(), value) {
        (_, DynamicValue::Optional(None) | DynamicValue::Any(None)) => Value::Null,
        (TypeKind::Optional(inner), DynamicValue::Optional(Some(v))) => render(inner, v)?,
        (_, DynamicValue::Any(Some(data))) => render(&data.descriptor, &data.value)?,
        (_, DynamicValue::Bool(b)) => Value::Bool(*b),
        (_, DynamicValue::String(s)) => Value::String(s.clone()),
        (_, DynamicValue::F32(f)) => float(f.to_string().parse().unwrap_or(f64::NAN))
            .ok_or_else(|| unsupported().with_reason("non-finite float"))?,
        (_, DynamicValue::F64(f)) => {
            float(*f).ok_or_else(|| unsupported().with_reason("non-finite float"))?
        }
        (TypeKind::Primitive(_), v) => match v.as_i128() {
            Some(n) if n < 0 => Value::from(n as i64),
            Some(n) => Value::from(n as u64),
            None => return Err(unsupported()),
        },
        (
            TypeKind::Sequence(_) | TypeKind::Array(_),
            DynamicValue::Sequence(items) | DynamicValue::Array(items),
        ) => {
            let element = ty.element_type().ok_or_else(unsupported)?;
            Value::Array(
                items
                    .iter()
                    .map(|item| render(element, item))
                    .collect::<Result<_, _>>()?,
            )
        }
        (TypeKind::Map(map), DynamicValue::Map(entries)) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(text(&map.key_type, key)?, render(&map.value_type, value)?);
            }
            Value::Object(object)
        }
        (TypeKind::Struct(members), DynamicValue::Struct(values)) => {
            let mut object = Map::new();
            for (member, value) in members.iter().zip(values) {
                object.insert(member.name.clone(), render(&member.type_desc, value)?);
            }
            Value::Object(object)
        }
        (TypeKind::Opaque(_), _) => Value::String(text(ty, value)?),
        _ => return Err(unsupported()),
    })
}

fn float(f: f64) -> Option<Value> {
    Number::from_f64(f).map(Value::Number)
}

/// String form of a scalar or host value, through the default mapper.
fn text(ty: &Arc<TypeDescriptor>, value: &DynamicValue) -> Result<String, ConversionError> {
    if let DynamicValue::String(s) = value {
        return Ok(s.clone());
    }
    let string = TypeDescriptor::builtin(PrimitiveKind::String);
    let mut out = DynamicValue::String(String::new());
    Mapper::prototype().convert_value(ty, value, &string, &mut out)?;
    match out {
        DynamicValue::String(s) => Ok(s),
        _ => Err(ConversionError::invalid_destination(ty, &string)),
    }
}
