// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Values paired with their descriptors.

use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Failures of the typed accessors on [`DynamicData`].
#[derive(Debug, thiserror::Error)]
pub enum DynamicDataError {
    #[error("no member named '{0}'")]
    FieldNotFound(String),
    #[error("value does not fit {expected}: {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("{0}")]
    InvalidOperation(String),
    #[error("element {index} past the end ({length} elements)")]
    IndexOutOfBounds { index: usize, length: usize },
}

/// A value together with the descriptor of its type.
#[derive(Debug, Clone)]
pub struct DynamicData {
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) value: DynamicValue,
}

impl DynamicData {
    /// Zero value of `descriptor`.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor: Arc::clone(descriptor),
            value: DynamicValue::zero(descriptor),
        }
    }

    /// Pairs `value` with `descriptor`, rejecting values of another shape.
    pub fn from_value(
        descriptor: &Arc<TypeDescriptor>,
        value: DynamicValue,
    ) -> Result<Self, DynamicDataError> {
        if !value.conforms_to(descriptor) {
            return Err(DynamicDataError::TypeMismatch {
                expected: descriptor.to_string(),
                got: format!("{:?}", value),
            });
        }
        Ok(Self {
            descriptor: Arc::clone(descriptor),
            value,
        })
    }

    /// Wrap a native value with its built-in descriptor.
    pub fn from_native<T: NativeValue>(value: T) -> Self {
        Self {
            descriptor: T::descriptor(),
            value: value.into_dynamic(),
        }
    }

    pub fn to_native<T: NativeValue>(&self) -> Result<T, DynamicDataError> {
        T::from_dynamic(&self.value)
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Name of the descriptor, empty for unnamed composites.
    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut DynamicValue {
        &mut self.value
    }

    /// Descriptor and mutable value at once.
    pub fn parts_mut(&mut self) -> (&Arc<TypeDescriptor>, &mut DynamicValue) {
        (&self.descriptor, &mut self.value)
    }

    pub fn into_value(self) -> DynamicValue {
        self.value
    }

    /// Reads member `name` as a native value.
    pub fn get<T: FromDynamicValue>(&self, name: &str) -> Result<T, DynamicDataError> {
        T::from_dynamic(self.get_field(name)?)
    }

    /// Overwrites member `name`. The value is not checked against the member type.
    pub fn set<T: IntoDynamicValue>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), DynamicDataError> {
        let slot = self.get_field_mut(name)?;
        *slot = value.into_dynamic();
        Ok(())
    }

    pub fn get_field(&self, name: &str) -> Result<&DynamicValue, DynamicDataError> {
        let index = self.member_index(name)?;
        match &self.value {
            DynamicValue::Struct(fields) => fields
                .get(index)
                .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string())),
            _ => Err(DynamicDataError::InvalidOperation(
                "value is not a record".into(),
            )),
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Result<&mut DynamicValue, DynamicDataError> {
        let index = self.member_index(name)?;
        match &mut self.value {
            DynamicValue::Struct(fields) => fields
                .get_mut(index)
                .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string())),
            _ => Err(DynamicDataError::InvalidOperation(
                "value is not a record".into(),
            )),
        }
    }

    fn member_index(&self, name: &str) -> Result<usize, DynamicDataError> {
        self.descriptor
            .member_index(name)
            .ok_or_else(|| DynamicDataError::FieldNotFound(name.to_string()))
    }

    /// Element `index` of a sequence or array.
    pub fn get_element(&self, index: usize) -> Result<&DynamicValue, DynamicDataError> {
        match &self.value {
            DynamicValue::Sequence(seq) | DynamicValue::Array(seq) => {
                seq.get(index).ok_or(DynamicDataError::IndexOutOfBounds {
                    index,
                    length: seq.len(),
                })
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "value has no elements".into(),
            )),
        }
    }

    /// Appends to a growable sequence. Arrays keep their length.
    pub fn push_element(&mut self, value: DynamicValue) -> Result<(), DynamicDataError> {
        match &mut self.value {
            DynamicValue::Sequence(seq) => {
                seq.push(value);
                Ok(())
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "value is not a growable sequence".into(),
            )),
        }
    }

    /// Element count of a sequence or array, entry count of a map.
    pub fn len(&self) -> Result<usize, DynamicDataError> {
        match &self.value {
            DynamicValue::Sequence(seq) | DynamicValue::Array(seq) => Ok(seq.len()),
            DynamicValue::Map(entries) => Ok(entries.len()),
            _ => Err(DynamicDataError::InvalidOperation(
                "value has no length".into(),
            )),
        }
    }

    pub fn is_empty(&self) -> Result<bool, DynamicDataError> {
        self.len().map(|l| l == 0)
    }

    /// Look up a map entry by key.
    pub fn get_entry(&self, key: &DynamicValue) -> Result<Option<&DynamicValue>, DynamicDataError> {
        match &self.value {
            DynamicValue::Map(entries) => Ok(entries.get(key)),
            _ => Err(DynamicDataError::InvalidOperation(
                "value is not a map".into(),
            )),
        }
    }

    /// Insert a map entry.
    pub fn insert_entry(
        &mut self,
        key: impl IntoDynamicValue,
        value: impl IntoDynamicValue,
    ) -> Result<(), DynamicDataError> {
        match &mut self.value {
            DynamicValue::Map(entries) => {
                entries.insert(key.into_dynamic(), value.into_dynamic());
                Ok(())
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "value is not a map".into(),
            )),
        }
    }

    /// `(member name, value)` pairs in declaration order. Empty unless a record.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        let members = self.descriptor.members().unwrap_or(&[]);
        let values = match &self.value {
            DynamicValue::Struct(fields) => fields.as_slice(),
            _ => &[],
        };
        members.iter().map(|m| m.name.as_str()).zip(values)
    }

    pub fn elements(&self) -> impl Iterator<Item = &DynamicValue> {
        self.value.as_slice().unwrap_or(&[]).iter()
    }
}

impl PartialEq for DynamicData {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.value == other.value
    }
}

impl Eq for DynamicData {}

impl Hash for DynamicData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for DynamicData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.descriptor, self.value)
    }
}

/// Read back out of a [`DynamicValue`].
pub trait FromDynamicValue: Sized {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError>;
}

pub trait IntoDynamicValue {
    fn into_dynamic(self) -> DynamicValue;
}

/// A Rust type with a built-in descriptor.
pub trait NativeValue: FromDynamicValue + IntoDynamicValue {
    fn descriptor() -> Arc<TypeDescriptor>;
}

macro_rules! impl_native {
    ($ty:ty, $variant:ident) => {
        impl FromDynamicValue for $ty {
            fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
                match value {
                    DynamicValue::$variant(v) => Ok(*v),
                    other => Err(DynamicDataError::TypeMismatch {
                        expected: PrimitiveKind::$variant.name().to_string(),
                        got: format!("{:?}", other),
                    }),
                }
            }
        }

        impl IntoDynamicValue for $ty {
            fn into_dynamic(self) -> DynamicValue {
                DynamicValue::$variant(self)
            }
        }

        impl NativeValue for $ty {
            fn descriptor() -> Arc<TypeDescriptor> {
                TypeDescriptor::builtin(PrimitiveKind::$variant)
            }
        }
    };
}

impl_native!(bool, Bool);
impl_native!(u8, U8);
impl_native!(u16, U16);
impl_native!(u32, U32);
impl_native!(u64, U64);
impl_native!(i8, I8);
impl_native!(i16, I16);
impl_native!(i32, I32);
impl_native!(i64, I64);
impl_native!(f32, F32);
impl_native!(f64, F64);

impl FromDynamicValue for String {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        match value {
            DynamicValue::String(s) => Ok(s.clone()),
            other => Err(DynamicDataError::TypeMismatch {
                expected: "string".to_string(),
                got: format!("{:?}", other),
            }),
        }
    }
}

impl IntoDynamicValue for String {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::String(self)
    }
}

impl NativeValue for String {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::builtin(PrimitiveKind::String)
    }
}

impl IntoDynamicValue for &str {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::String(self.to_string())
    }
}

impl FromDynamicValue for Vec<u8> {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        value.as_bytes().ok_or_else(|| DynamicDataError::TypeMismatch {
            expected: "[]u8".to_string(),
            got: format!("{:?}", value),
        })
    }
}

impl IntoDynamicValue for Vec<u8> {
    fn into_dynamic(self) -> DynamicValue {
        DynamicValue::Sequence(self.into_iter().map(DynamicValue::U8).collect())
    }
}

impl NativeValue for Vec<u8> {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::bytes()
    }
}

impl IntoDynamicValue for DynamicValue {
    fn into_dynamic(self) -> DynamicValue {
        self
    }
}

impl FromDynamicValue for DynamicValue {
    fn from_dynamic(value: &DynamicValue) -> Result<Self, DynamicDataError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::TypeDescriptorBuilder;

    #[test]
    fn test_record_members_by_name() {
        let desc = Arc::new(
            TypeDescriptorBuilder::new("Sample")
                .field("x", PrimitiveKind::I32)
                .field("y", PrimitiveKind::F64)
                .string_field("name")
                .build(),
        );

        let mut data = DynamicData::new(&desc);
        data.set("x", 42i32).unwrap();
        data.set("y", 3.14f64).unwrap();
        data.set("name", "sample").unwrap();

        assert_eq!(data.get::<i32>("x").unwrap(), 42);
        assert_eq!(data.get::<f64>("y").unwrap(), 3.14);
        assert_eq!(data.get::<String>("name").unwrap(), "sample");
        assert!(matches!(
            data.get::<i32>("missing"),
            Err(DynamicDataError::FieldNotFound(_))
        ));
        assert!(matches!(
            data.get::<i64>("x"),
            Err(DynamicDataError::TypeMismatch { .. })
        ));

        let names: Vec<&str> = data.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["x", "y", "name"]);
    }

    #[test]
    fn test_from_value_checks_shape() {
        let desc = TypeDescriptor::builtin(PrimitiveKind::U16);
        assert!(DynamicData::from_value(&desc, DynamicValue::U16(1)).is_ok());
        assert!(DynamicData::from_value(&desc, DynamicValue::U32(1)).is_err());
    }

    #[test]
    fn test_native_round_trip() {
        let data = DynamicData::from_native(vec![1u8, 2, 3]);
        assert_eq!(data.descriptor(), &TypeDescriptor::bytes());
        assert_eq!(data.to_native::<Vec<u8>>().unwrap(), vec![1, 2, 3]);
        assert_eq!(data.len().unwrap(), 3);
        assert_eq!(data.get_element(1).unwrap(), &DynamicValue::U8(2));
        assert!(data.get_element(3).is_err());
    }

    #[test]
    fn test_map_entries() {
        let desc = Arc::new(TypeDescriptor::map(
            TypeDescriptor::builtin(PrimitiveKind::String),
            TypeDescriptor::builtin(PrimitiveKind::I64),
        ));
        let mut data = DynamicData::new(&desc);
        data.insert_entry("a", 1i64).unwrap();
        assert_eq!(
            data.get_entry(&"a".into()).unwrap(),
            Some(&DynamicValue::I64(1))
        );
        assert!(data.push_element(DynamicValue::I64(2)).is_err());
    }
}
