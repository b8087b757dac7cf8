// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host types carried inside dynamic values.
//!
//! A host type implements [`Opaque`]; storage goes through the object-safe
//! [`OpaqueObject`], which every `Opaque` type gets for free. Opaque types
//! are the only ones that can describe their own conversions, by returning
//! a capability from [`Opaque::as_convert_out`] or [`Opaque::as_convert_in`].

use crate::extension::{ConvertIn, ConvertOut};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A host type that can live inside a [`DynamicValue`](crate::dynamic::DynamicValue).
pub trait Opaque:
    Any + Clone + PartialEq + Hash + fmt::Debug + Default + Send + Sync
{
    /// Outbound self-describing conversion, if the type supports it.
    fn as_convert_out(&self) -> Option<&dyn ConvertOut> {
        None
    }

    /// Inbound self-describing conversion, if the type supports it.
    fn as_convert_in(&mut self) -> Option<&mut dyn ConvertIn> {
        None
    }
}

/// Object-safe view of an [`Opaque`] value.
pub trait OpaqueObject: Any + fmt::Debug + Send + Sync {
    fn clone_object(&self) -> Box<dyn OpaqueObject>;
    fn eq_object(&self, other: &dyn OpaqueObject) -> bool;
    fn hash_object(&self, state: &mut dyn Hasher);
    fn opaque_type_id(&self) -> TypeId;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn capability_out(&self) -> Option<&dyn ConvertOut>;
    fn capability_in(&mut self) -> Option<&mut dyn ConvertIn>;
}

impl<T: Opaque> OpaqueObject for T {
    fn clone_object(&self) -> Box<dyn OpaqueObject> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn OpaqueObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn hash_object(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn opaque_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn capability_out(&self) -> Option<&dyn ConvertOut> {
        self.as_convert_out()
    }

    fn capability_in(&mut self) -> Option<&mut dyn ConvertIn> {
        self.as_convert_in()
    }
}

impl Clone for Box<dyn OpaqueObject> {
    fn clone(&self) -> Self {
        (**self).clone_object()
    }
}

/// Type-level description of a host type: identity, capabilities, zero value.
#[derive(Clone, Copy)]
pub struct OpaqueDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    convert_out: bool,
    convert_in: bool,
    zero: fn() -> Box<dyn OpaqueObject>,
}

impl OpaqueDescriptor {
    /// Describe host type `T`.
    pub fn of<T: Opaque>() -> Self {
        let mut sample = T::default();
        let convert_out = sample.as_convert_out().is_some();
        let convert_in = sample.as_convert_in().is_some();
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            convert_out,
            convert_in,
            zero: zero_object::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust path of the host type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Values of this type can convert themselves into other types.
    pub fn has_convert_out(&self) -> bool {
        self.convert_out
    }

    /// Values of this type can fill themselves from other types.
    pub fn has_convert_in(&self) -> bool {
        self.convert_in
    }

    /// Fresh default value.
    pub fn zero(&self) -> Box<dyn OpaqueObject> {
        (self.zero)()
    }
}

fn zero_object<T: Opaque>() -> Box<dyn OpaqueObject> {
    Box::new(T::default())
}

impl fmt::Debug for OpaqueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueDescriptor")
            .field("type_name", &self.type_name)
            .field("convert_out", &self.convert_out)
            .field("convert_in", &self.convert_in)
            .finish()
    }
}

impl PartialEq for OpaqueDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for OpaqueDescriptor {}

impl Hash for OpaqueDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Hash)]
    struct Plain(u32);

    impl Opaque for Plain {}

    #[test]
    fn test_descriptor_without_capabilities() {
        let desc = OpaqueDescriptor::of::<Plain>();
        assert!(!desc.has_convert_out());
        assert!(!desc.has_convert_in());
        assert_eq!(desc.type_id(), TypeId::of::<Plain>());
        assert!(desc.type_name().ends_with("Plain"));
    }

    #[test]
    fn test_object_equality_and_clone() {
        let a: Box<dyn OpaqueObject> = Box::new(Plain(7));
        let b = a.clone();
        assert!(a.eq_object(b.as_ref()));
        assert!(!a.eq_object(&Plain(8)));
        assert_eq!(b.as_any().downcast_ref::<Plain>(), Some(&Plain(7)));
    }

    #[test]
    fn test_zero_is_default() {
        let zero = OpaqueDescriptor::of::<Plain>().zero();
        assert_eq!(zero.as_any().downcast_ref::<Plain>(), Some(&Plain(0)));
    }
}
