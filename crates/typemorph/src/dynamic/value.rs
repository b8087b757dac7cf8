// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value representation.

use crate::dynamic::{DynamicData, Opaque, OpaqueObject, PrimitiveKind, TypeDescriptor, TypeKind};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A dynamically-typed value.
///
/// Values compare and hash by representation: floats by bit pattern, so
/// any value can key a [`DynamicValue::Map`].
#[derive(Debug, Clone)]
pub enum DynamicValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// Dynamic-length sequence.
    Sequence(Vec<DynamicValue>),
    /// Fixed-length array.
    Array(Vec<DynamicValue>),
    /// Associative map.
    Map(HashMap<DynamicValue, DynamicValue>),
    /// Record members, in declaration order.
    Struct(Vec<DynamicValue>),
    /// Nullable box.
    Optional(Option<Box<DynamicValue>>),
    /// Slot holding a value together with its own type.
    Any(Option<Box<DynamicData>>),
    /// Host type.
    Opaque(Box<dyn OpaqueObject>),
}

impl DynamicValue {
    /// Zero value of `desc`.
    pub fn zero(desc: &TypeDescriptor) -> Self {
        match desc.kind() {
            TypeKind::Primitive(p) => Self::zero_primitive(*p),
            TypeKind::Struct(members) => {
                Self::Struct(members.iter().map(|m| Self::zero(&m.type_desc)).collect())
            }
            TypeKind::Sequence(_) => Self::Sequence(Vec::new()),
            TypeKind::Array(arr) => {
                Self::Array((0..arr.length).map(|_| Self::zero(&arr.element_type)).collect())
            }
            TypeKind::Map(_) => Self::Map(HashMap::new()),
            TypeKind::Optional(_) => Self::Optional(None),
            TypeKind::Any => Self::Any(None),
            TypeKind::Opaque(o) => Self::Opaque(o.zero()),
        }
    }

    fn zero_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Bool(false),
            PrimitiveKind::U8 => Self::U8(0),
            PrimitiveKind::U16 => Self::U16(0),
            PrimitiveKind::U32 => Self::U32(0),
            PrimitiveKind::U64 => Self::U64(0),
            PrimitiveKind::I8 => Self::I8(0),
            PrimitiveKind::I16 => Self::I16(0),
            PrimitiveKind::I32 => Self::I32(0),
            PrimitiveKind::I64 => Self::I64(0),
            PrimitiveKind::F32 => Self::F32(0.0),
            PrimitiveKind::F64 => Self::F64(0.0),
            PrimitiveKind::String => Self::String(String::new()),
        }
    }

    /// Wrap a host value.
    pub fn opaque<T: Opaque>(value: T) -> Self {
        Self::Opaque(Box::new(value))
    }

    /// Check that this value has the shape `desc` describes.
    pub fn conforms_to(&self, desc: &TypeDescriptor) -> bool {
        match (desc.kind(), self) {
            (TypeKind::Primitive(p), v) => v.primitive_kind() == Some(*p),
            (TypeKind::Struct(members), Self::Struct(fields)) => {
                members.len() == fields.len()
                    && members
                        .iter()
                        .zip(fields)
                        .all(|(m, f)| f.conforms_to(&m.type_desc))
            }
            (TypeKind::Sequence(seq), Self::Sequence(items)) => {
                items.iter().all(|i| i.conforms_to(&seq.element_type))
            }
            (TypeKind::Array(arr), Self::Array(items)) => {
                items.len() == arr.length && items.iter().all(|i| i.conforms_to(&arr.element_type))
            }
            (TypeKind::Map(map), Self::Map(entries)) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(&map.key_type) && v.conforms_to(&map.value_type)),
            (TypeKind::Optional(inner), Self::Optional(slot)) => {
                slot.as_deref().map_or(true, |v| v.conforms_to(inner))
            }
            (TypeKind::Any, Self::Any(_)) => true,
            (TypeKind::Opaque(o), Self::Opaque(obj)) => obj.opaque_type_id() == o.type_id(),
            _ => false,
        }
    }

    /// Primitive kind of a scalar value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::String(_) => PrimitiveKind::String,
            _ => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer value, widened.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Self::U8(v) => v as i128,
            Self::U16(v) => v as i128,
            Self::U32(v) => v as i128,
            Self::U64(v) => v as i128,
            Self::I8(v) => v as i128,
            Self::I16(v) => v as i128,
            Self::I32(v) => v as i128,
            Self::I64(v) => v as i128,
            _ => return None,
        })
    }

    /// Any float value, widened.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a sequence or array.
    pub fn as_slice(&self) -> Option<&[DynamicValue]> {
        match self {
            Self::Sequence(items) | Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<DynamicValue, DynamicValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Bytes of a sequence or array of `u8` values.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        self.as_slice()?
            .iter()
            .map(|v| match v {
                Self::U8(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Downcast a host value.
    pub fn as_opaque<T: Opaque>(&self) -> Option<&T> {
        match self {
            Self::Opaque(obj) => (**obj).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Empty optional or empty `any` slot.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Optional(None) | Self::Any(None))
    }
}

impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b))
            | (Self::Array(a), Self::Array(b))
            | (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            (Self::Any(a), Self::Any(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a.eq_object(&**b),
            _ => false,
        }
    }
}

impl Eq for DynamicValue {}

impl Hash for DynamicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::String(v) => v.hash(state),
            Self::Sequence(items) | Self::Array(items) | Self::Struct(items) => items.hash(state),
            // Entry order is unspecified; the length is order-independent.
            Self::Map(entries) => entries.len().hash(state),
            Self::Optional(v) => v.hash(state),
            Self::Any(v) => v.hash(state),
            Self::Opaque(obj) => obj.hash_object(state),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for DynamicValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        })*
    };
}

scalar_from! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}
