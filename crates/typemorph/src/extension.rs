// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Self-describing conversion capabilities.
//!
//! A host type opts in by implementing one or both traits and returning
//! itself from [`Opaque::as_convert_out`](crate::dynamic::Opaque::as_convert_out)
//! or [`Opaque::as_convert_in`](crate::dynamic::Opaque::as_convert_in).
//! When both sides of a conversion are capable, the outbound side wins.
//!
//! ```rust
//! use typemorph::dynamic::{DynamicValue, Opaque, PrimitiveKind, TypeDescriptor};
//! use typemorph::extension::ConvertOut;
//! use typemorph::{ConversionError, DynamicData, Mapper, Target};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Default, PartialEq, Hash)]
//! struct Celsius(i32);
//!
//! impl ConvertOut for Celsius {
//!     fn convert_out(&self, mapper: &Mapper, target: Target<'_>) -> Result<(), ConversionError> {
//!         let (ty, value) = target.into_parts();
//!         let text = TypeDescriptor::builtin(PrimitiveKind::String);
//!         mapper.convert_value(&text, &DynamicValue::from(format!("{}C", self.0)), ty, value)
//!     }
//! }
//!
//! impl Opaque for Celsius {
//!     fn as_convert_out(&self) -> Option<&dyn ConvertOut> {
//!         Some(self)
//!     }
//! }
//!
//! let desc = Arc::new(TypeDescriptor::opaque::<Celsius>("Celsius"));
//! let src = DynamicData::from_value(&desc, DynamicValue::opaque(Celsius(21))).unwrap();
//! let mut dst = DynamicData::from_native(String::new());
//! Mapper::new().convert(&src, &mut dst).unwrap();
//! assert_eq!(dst.to_native::<String>().unwrap(), "21C");
//! ```

use crate::error::ConversionError;
use crate::mapper::{Mapper, Source, Target};

/// Outbound conversion: the value writes itself into a destination.
pub trait ConvertOut {
    fn convert_out(&self, mapper: &Mapper, target: Target<'_>) -> Result<(), ConversionError>;
}

/// Inbound conversion: the value fills itself from a source.
pub trait ConvertIn {
    fn convert_in(&mut self, mapper: &Mapper, source: Source<'_>) -> Result<(), ConversionError>;
}
