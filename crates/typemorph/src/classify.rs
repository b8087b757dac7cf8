// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type classification.
//!
//! A *plain* type is a built-in scalar or an unnamed container shape; it can
//! never carry custom conversion behavior. Everything else (named types,
//! wrappers, host types) is *extensible*.

use crate::dynamic::{PrimitiveKind, TypeDescriptor, TypeKind};

/// Closed set of shapes the built-in rule table matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    Text,
    Sequence,
    Array,
    Map,
    Record,
    Optional,
    Any,
    Opaque,
}

impl StructuralKind {
    pub fn of(desc: &TypeDescriptor) -> Self {
        match desc.kind() {
            TypeKind::Primitive(p) => match p {
                PrimitiveKind::Bool => Self::Bool,
                PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
                    Self::Signed
                }
                PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
                    Self::Unsigned
                }
                PrimitiveKind::F32 | PrimitiveKind::F64 => Self::Float,
                PrimitiveKind::String => Self::Text,
            },
            TypeKind::Sequence(_) => Self::Sequence,
            TypeKind::Array(_) => Self::Array,
            TypeKind::Map(_) => Self::Map,
            TypeKind::Struct(_) => Self::Record,
            TypeKind::Optional(_) => Self::Optional,
            TypeKind::Any => Self::Any,
            TypeKind::Opaque(_) => Self::Opaque,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Signed | Self::Unsigned | Self::Float | Self::Text
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Signed | Self::Unsigned | Self::Float)
    }
}

/// Built-in scalar, or an unnamed sequence, array, map or record.
pub fn is_plain(desc: &TypeDescriptor) -> bool {
    match desc.kind() {
        TypeKind::Primitive(_) => !desc.is_named(),
        TypeKind::Sequence(_) | TypeKind::Array(_) | TypeKind::Map(_) | TypeKind::Struct(_) => {
            !desc.is_named()
        }
        TypeKind::Optional(_) | TypeKind::Any | TypeKind::Opaque(_) => false,
    }
}

pub fn is_extensible(desc: &TypeDescriptor) -> bool {
    !is_plain(desc)
}

/// Optional and `any` layers, which the resolver unwraps.
pub fn is_wrapper(desc: &TypeDescriptor) -> bool {
    matches!(desc.kind(), TypeKind::Optional(_) | TypeKind::Any)
}

/// Values of this type convert themselves into other types.
pub fn has_convert_out(desc: &TypeDescriptor) -> bool {
    matches!(desc.kind(), TypeKind::Opaque(o) if o.has_convert_out())
}

/// Values of this type fill themselves from other types.
pub fn has_convert_in(desc: &TypeDescriptor) -> bool {
    matches!(desc.kind(), TypeKind::Opaque(o) if o.has_convert_in())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{named, sequence_of, TypeDescriptorBuilder};

    #[test]
    fn test_builtin_scalars_are_plain() {
        for kind in PrimitiveKind::ALL {
            assert!(is_plain(&TypeDescriptor::builtin(kind)), "{:?}", kind);
        }
    }

    #[test]
    fn test_aliases_are_extensible() {
        let alias = named("MyBool", &TypeDescriptor::builtin(PrimitiveKind::Bool));
        assert!(is_extensible(&alias));
        assert_eq!(StructuralKind::of(&alias), StructuralKind::Bool);
    }

    #[test]
    fn test_containers() {
        let seq = sequence_of(TypeDescriptor::builtin(PrimitiveKind::I32));
        assert!(is_plain(&seq));
        assert!(is_extensible(&named("Ints", &seq)));

        let anon = TypeDescriptorBuilder::new("").field("a", PrimitiveKind::I8).build();
        assert!(is_plain(&anon));
        let record = TypeDescriptorBuilder::new("R").field("a", PrimitiveKind::I8).build();
        assert!(!is_plain(&record));
        assert_eq!(StructuralKind::of(&record), StructuralKind::Record);
    }

    #[test]
    fn test_wrappers() {
        let any = TypeDescriptor::any();
        assert!(is_wrapper(&any));
        assert!(is_extensible(&any));
        let opt = TypeDescriptor::optional(TypeDescriptor::builtin(PrimitiveKind::I8));
        assert!(is_wrapper(&opt));
        assert!(!has_convert_out(&opt));
    }

    #[test]
    fn test_structural_kinds() {
        assert_eq!(
            StructuralKind::of(&TypeDescriptor::builtin(PrimitiveKind::U16)),
            StructuralKind::Unsigned
        );
        assert!(StructuralKind::Float.is_numeric());
        assert!(StructuralKind::Text.is_scalar());
        assert!(!StructuralKind::Map.is_scalar());
    }
}
