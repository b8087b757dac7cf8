// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is both the structural shape of a type and its
//! nominal identity. Two descriptors are equal only when name and shape
//! agree, so a user alias `Celsius = f64` never compares equal to the
//! built-in `f64`.

use crate::dynamic::{Opaque, OpaqueDescriptor};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
}

impl PrimitiveKind {
    /// Every primitive kind, in declaration order.
    pub const ALL: [PrimitiveKind; 12] = [
        Self::Bool,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::String,
    ];

    /// Fixed width in bytes. Strings have none.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::String => None,
        }
    }

    /// Canonical name of the built-in type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
        }
    }

    /// Look up a kind by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Record with named members.
    Struct(Vec<MemberDescriptor>),
    /// Sequence (dynamic length).
    Sequence(SequenceDescriptor),
    /// Array (fixed length).
    Array(ArrayDescriptor),
    /// Associative map.
    Map(MapDescriptor),
    /// Nullable box around another type.
    Optional(Arc<TypeDescriptor>),
    /// Slot that may hold a value of any type.
    Any,
    /// Host type carried as a trait object.
    Opaque(OpaqueDescriptor),
}

/// Name, shape and a precomputed fingerprint for fast comparison.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    fingerprint: u64,
}

impl TypeDescriptor {
    /// Descriptor of `kind` called `name`. Unnamed primitives take their canonical name.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let mut name = name.into();
        if let (true, TypeKind::Primitive(p)) = (name.is_empty(), &kind) {
            name = p.name().to_string();
        }
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        kind.hash(&mut hasher);
        Self {
            name,
            kind,
            fingerprint: hasher.finish(),
        }
    }

    /// Primitive descriptor.
    ///
    /// An empty name or the canonical name yields the built-in type; any
    /// other name declares a nominal alias.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Record with `members` in declaration order.
    pub fn struct_type(name: impl Into<String>, members: Vec<MemberDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(members))
    }

    /// Unnamed sequence of `element`.
    pub fn sequence(element: Arc<TypeDescriptor>) -> Self {
        Self::new("", TypeKind::Sequence(SequenceDescriptor::new(element)))
    }

    /// Unnamed fixed-length array of `element`.
    pub fn array(element: Arc<TypeDescriptor>, length: usize) -> Self {
        Self::new("", TypeKind::Array(ArrayDescriptor::new(element, length)))
    }

    /// Unnamed map from `key` to `value`.
    pub fn map(key: Arc<TypeDescriptor>, value: Arc<TypeDescriptor>) -> Self {
        Self::new("", TypeKind::Map(MapDescriptor::new(key, value)))
    }

    /// Unnamed optional wrapper.
    pub fn optional(inner: Arc<TypeDescriptor>) -> Self {
        Self::new("", TypeKind::Optional(inner))
    }

    /// Host type `T`, named `name`.
    pub fn opaque<T: Opaque>(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Opaque(OpaqueDescriptor::of::<T>()))
    }

    /// Nominal alias: same shape as `base`, different identity.
    pub fn named(name: impl Into<String>, base: &TypeDescriptor) -> Self {
        Self::new(name, base.kind.clone())
    }

    /// Shared descriptor of a built-in primitive.
    pub fn builtin(kind: PrimitiveKind) -> Arc<TypeDescriptor> {
        static BUILTINS: OnceLock<Vec<Arc<TypeDescriptor>>> = OnceLock::new();
        let table = BUILTINS.get_or_init(|| {
            PrimitiveKind::ALL
                .iter()
                .map(|k| Arc::new(Self::primitive(k.name(), *k)))
                .collect()
        });
        Arc::clone(&table[kind.index()])
    }

    /// Shared descriptor of the universal `any` slot.
    pub fn any() -> Arc<TypeDescriptor> {
        static ANY: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        Arc::clone(ANY.get_or_init(|| Arc::new(Self::new("", TypeKind::Any))))
    }

    /// Shared descriptor of `[]u8`.
    pub fn bytes() -> Arc<TypeDescriptor> {
        static BYTES: OnceLock<Arc<TypeDescriptor>> = OnceLock::new();
        Arc::clone(
            BYTES.get_or_init(|| Arc::new(Self::sequence(Self::builtin(PrimitiveKind::U8)))),
        )
    }

    /// Type name (empty for unnamed shapes).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// True when the descriptor carries a name other than a canonical primitive name.
    pub fn is_named(&self) -> bool {
        match &self.kind {
            TypeKind::Primitive(p) => self.name != p.name(),
            _ => !self.name.is_empty(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Get members if this is a struct.
    pub fn members(&self) -> Option<&[MemberDescriptor]> {
        match &self.kind {
            TypeKind::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Get member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members()?.iter().find(|m| m.name == name)
    }

    /// Get member index by name.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members()?.iter().position(|m| m.name == name)
    }

    /// Element type of a sequence or array.
    pub fn element_type(&self) -> Option<&Arc<TypeDescriptor>> {
        match &self.kind {
            TypeKind::Sequence(seq) => Some(&seq.element_type),
            TypeKind::Array(arr) => Some(&arr.element_type),
            _ => None,
        }
    }

    /// Sequence or array whose elements are 8-bit unsigned integers.
    pub fn is_byte_sequence(&self) -> bool {
        self.element_type()
            .and_then(|e| e.primitive_kind())
            .is_some_and(|k| k == PrimitiveKind::U8)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.fingerprint == other.fingerprint
                && self.name == other.name
                && self.kind == other.kind)
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            return f.write_str(&self.name);
        }
        match &self.kind {
            TypeKind::Primitive(p) => f.write_str(p.name()),
            TypeKind::Sequence(seq) => write!(f, "[]{}", seq.element_type),
            TypeKind::Array(arr) => write!(f, "[{}]{}", arr.length, arr.element_type),
            TypeKind::Map(map) => write!(f, "map[{}]{}", map.key_type, map.value_type),
            TypeKind::Optional(inner) => write!(f, "?{}", inner),
            TypeKind::Any => f.write_str("any"),
            TypeKind::Opaque(o) => f.write_str(o.type_name()),
            TypeKind::Struct(members) => {
                f.write_str("struct{")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", m.name, m.type_desc)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Declared member of a record type.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct MemberDescriptor {
    /// Member name.
    pub name: String,
    /// Member type.
    pub type_desc: Arc<TypeDescriptor>,
    /// Tag table, keyed by tag name (`map`, `json`, ...).
    pub tags: BTreeMap<String, String>,
}

impl MemberDescriptor {
    /// Create a new member descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
            tags: BTreeMap::new(),
        }
    }

    /// Attach a tag value.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct SequenceDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
}

impl SequenceDescriptor {
    pub fn new(element_type: Arc<TypeDescriptor>) -> Self {
        Self { element_type }
    }
}

/// Array type descriptor.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Fixed length.
    pub length: usize,
}

impl ArrayDescriptor {
    pub fn new(element_type: Arc<TypeDescriptor>, length: usize) -> Self {
        Self {
            element_type,
            length,
        }
    }
}

/// Map type descriptor.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct MapDescriptor {
    pub key_type: Arc<TypeDescriptor>,
    pub value_type: Arc<TypeDescriptor>,
}

impl MapDescriptor {
    pub fn new(key_type: Arc<TypeDescriptor>, value_type: Arc<TypeDescriptor>) -> Self {
        Self {
            key_type,
            value_type,
        }
    }
}
