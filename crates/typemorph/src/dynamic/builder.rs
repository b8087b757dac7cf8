// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for record descriptors.

use crate::dynamic::{MemberDescriptor, PrimitiveKind, TypeDescriptor};
use std::sync::Arc;

/// Builder for record TypeDescriptor instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    members: Vec<MemberDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a record type.
    ///
    /// An empty name builds an anonymous record, which is a plain type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a primitive field.
    pub fn field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field_with_type(name, TypeDescriptor::builtin(kind))
    }

    /// Add a field with a type descriptor.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.members.push(MemberDescriptor::new(name, type_desc));
        self
    }

    /// Add a field carrying one tag, e.g. `("map", "id")`.
    pub fn tagged_field(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
        tag_key: impl Into<String>,
        tag_value: impl Into<String>,
    ) -> Self {
        self.members
            .push(MemberDescriptor::new(name, type_desc).tag(tag_key, tag_value));
        self
    }

    /// Add a pre-built member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String)
    }

    /// Add a sequence field.
    pub fn sequence_field(self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        let type_desc = sequence_of(TypeDescriptor::builtin(element_kind));
        self.field_with_type(name, type_desc)
    }

    /// Add an array field.
    pub fn array_field(
        self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        length: usize,
    ) -> Self {
        let type_desc = array_of(TypeDescriptor::builtin(element_kind), length);
        self.field_with_type(name, type_desc)
    }

    /// Add a map field.
    pub fn map_field(
        self,
        name: impl Into<String>,
        key: Arc<TypeDescriptor>,
        value: Arc<TypeDescriptor>,
    ) -> Self {
        self.field_with_type(name, map_of(key, value))
    }

    /// Add an optional field.
    pub fn optional_field(self, name: impl Into<String>, inner: Arc<TypeDescriptor>) -> Self {
        self.field_with_type(name, optional_of(inner))
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.members)
    }
}

/// `[]element`.
pub fn sequence_of(element: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::sequence(element))
}

/// `[length]element`.
pub fn array_of(element: Arc<TypeDescriptor>, length: usize) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::array(element, length))
}

/// `map[key]value`.
pub fn map_of(key: Arc<TypeDescriptor>, value: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::map(key, value))
}

/// `?inner`.
pub fn optional_of(inner: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::optional(inner))
}

/// Nominal alias of `base`.
pub fn named(name: impl Into<String>, base: &TypeDescriptor) -> Arc<TypeDescriptor> {
    Arc::new(TypeDescriptor::named(name, base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::TypeKind;

    #[test]
    fn test_builder_basic() {
        let desc = TypeDescriptorBuilder::new("Point")
            .field("x", PrimitiveKind::F64)
            .field("y", PrimitiveKind::F64)
            .build();

        assert_eq!(desc.name(), "Point");
        assert!(desc.is_struct());
        assert_eq!(desc.members().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_builder_collections() {
        let desc = TypeDescriptorBuilder::new("Sample")
            .sequence_field("values", PrimitiveKind::I32)
            .array_field("digest", PrimitiveKind::U8, 4)
            .map_field(
                "meta",
                TypeDescriptor::builtin(PrimitiveKind::String),
                TypeDescriptor::any(),
            )
            .optional_field("note", TypeDescriptor::builtin(PrimitiveKind::String))
            .build();

        let values = desc.member("values").unwrap();
        assert!(matches!(values.type_desc.kind(), TypeKind::Sequence(_)));

        let digest = desc.member("digest").unwrap();
        assert!(digest.type_desc.is_byte_sequence());
        assert_eq!(digest.type_desc.to_string(), "[4]u8");

        let meta = desc.member("meta").unwrap();
        assert_eq!(meta.type_desc.to_string(), "map[string]any");

        let note = desc.member("note").unwrap();
        assert_eq!(note.type_desc.to_string(), "?string");
    }

    #[test]
    fn test_tagged_field() {
        let desc = TypeDescriptorBuilder::new("Tagged")
            .tagged_field("Foo", TypeDescriptor::builtin(PrimitiveKind::I64), "map", "bar")
            .build();
        assert_eq!(desc.member("Foo").unwrap().tag_value("map"), Some("bar"));
    }

    #[test]
    fn test_named_alias() {
        let base = TypeDescriptor::builtin(PrimitiveKind::Bool);
        let alias = named("MyBool", &base);
        assert_eq!(alias.primitive_kind(), Some(PrimitiveKind::Bool));
        assert_ne!(alias, base);
    }
}
