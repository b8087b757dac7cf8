// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime descriptions of types and the values that inhabit them.
//!
//! The mapper never sees Rust types directly. Every value it reads or
//! writes is a [`DynamicValue`] next to the [`TypeDescriptor`] that says how
//! to interpret it.
//!
//! - [`TypeDescriptor`]: names, kinds and record members
//! - [`DynamicData`]: a value bound to its descriptor, with member access
//! - [`TypeDescriptorBuilder`]: records assembled field by field
//! - [`Opaque`]: host types carried through conversions untouched
//!
//! ```rust
//! use typemorph::dynamic::{DynamicData, PrimitiveKind, TypeDescriptorBuilder};
//! use std::sync::Arc;
//!
//! let listener = Arc::new(
//!     TypeDescriptorBuilder::new("Listener")
//!         .string_field("host")
//!         .field("port", PrimitiveKind::U16)
//!         .build(),
//! );
//!
//! let mut data = DynamicData::new(&listener);
//! data.set("host", "0.0.0.0").unwrap();
//! data.set("port", 8443u16).unwrap();
//! assert_eq!(data.get::<u16>("port").unwrap(), 8443);
//! assert_eq!(data.type_name(), "Listener");
//! ```

mod builder;
mod dynamic_data;
mod opaque;
mod type_descriptor;
mod value;

pub use builder::{array_of, map_of, named, optional_of, sequence_of, TypeDescriptorBuilder};
pub use dynamic_data::{
    DynamicData, DynamicDataError, FromDynamicValue, IntoDynamicValue, NativeValue,
};
pub use opaque::{Opaque, OpaqueDescriptor, OpaqueObject};
pub use type_descriptor::{
    ArrayDescriptor, MapDescriptor, MemberDescriptor, PrimitiveKind, SequenceDescriptor,
    TypeDescriptor, TypeKind,
};
pub use value::DynamicValue;

#[cfg(test)]
mod tests;
