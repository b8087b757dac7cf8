// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in conversion providers.
//!
//! Registered by [`MapperBuilder::with_default_providers`](crate::MapperBuilder::with_default_providers)
//! and present in [`Mapper::prototype`](crate::Mapper::prototype).

/// Shared descriptor and native value glue for a provider-owned host type.
macro_rules! host_value {
    ($ty:ident, $name:literal) => {
        impl $ty {
            #[doc = concat!("Shared descriptor, named `", $name, "`.")]
            pub fn descriptor() -> std::sync::Arc<$crate::dynamic::TypeDescriptor> {
                static DESCRIPTOR: std::sync::OnceLock<std::sync::Arc<$crate::dynamic::TypeDescriptor>> =
                    std::sync::OnceLock::new();
                std::sync::Arc::clone(DESCRIPTOR.get_or_init(|| {
                    std::sync::Arc::new($crate::dynamic::TypeDescriptor::opaque::<$ty>($name))
                }))
            }
        }

        impl $crate::dynamic::Opaque for $ty {}

        impl $crate::dynamic::FromDynamicValue for $ty {
            fn from_dynamic(
                value: &$crate::dynamic::DynamicValue,
            ) -> Result<Self, $crate::dynamic::DynamicDataError> {
                value.as_opaque::<$ty>().cloned().ok_or_else(|| {
                    $crate::dynamic::DynamicDataError::TypeMismatch {
                        expected: $name.to_string(),
                        got: format!("{:?}", value),
                    }
                })
            }
        }

        impl $crate::dynamic::IntoDynamicValue for $ty {
            fn into_dynamic(self) -> $crate::dynamic::DynamicValue {
                $crate::dynamic::DynamicValue::opaque(self)
            }
        }

        impl $crate::dynamic::NativeValue for $ty {
            fn descriptor() -> std::sync::Arc<$crate::dynamic::TypeDescriptor> {
                $ty::descriptor()
            }
        }
    };
}

mod bigint;
mod decimal;
mod rational;
mod time;

pub use bigint::{BigInteger, BigIntegerProvider};
pub use decimal::{Decimal, DecimalProvider};
pub use rational::{Rational, RationalProvider};
pub use time::{Timestamp, TimestampProvider};

use crate::dynamic::{DynamicValue, Opaque, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Source, Target};
use crate::registry::Registry;
use std::sync::Arc;

/// Register every built-in provider into `registry`.
pub fn register_defaults(registry: &mut Registry) {
    registry.register(Timestamp::descriptor(), TimestampProvider);
    registry.register(BigInteger::descriptor(), BigIntegerProvider);
    registry.register(Decimal::descriptor(), DecimalProvider);
    registry.register(Rational::descriptor(), RationalProvider);
    log::debug!("[registry] default providers registered ({} types)", registry.len());
}

fn copy_routine(name: &'static str) -> Routine {
    Routine::new(name, |_, source, mut target| {
        target.set(source.value().clone());
        Ok(())
    })
}

/// The host value held by `source`.
fn held<'a, T: Opaque>(
    source: &Source<'a>,
    to: &Arc<TypeDescriptor>,
) -> Result<&'a T, ConversionError> {
    source
        .value()
        .as_opaque::<T>()
        .ok_or_else(|| ConversionError::invalid_source(source.ty(), to))
}

/// Write `value` of type `ty` into `target` through the engine.
fn forward(
    mapper: &Mapper,
    ty: &Arc<TypeDescriptor>,
    value: DynamicValue,
    target: Target<'_>,
) -> Result<(), ConversionError> {
    let (to, slot) = target.into_parts();
    mapper.convert_value(ty, &value, to, slot)
}

/// Convert `source` into a fresh value of type `ty` through the engine.
fn pull(
    mapper: &Mapper,
    source: &Source<'_>,
    ty: &Arc<TypeDescriptor>,
) -> Result<DynamicValue, ConversionError> {
    let mut value = DynamicValue::zero(ty);
    mapper.convert_value(source.ty(), source.value(), ty, &mut value)?;
    Ok(value)
}
