// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integers of unbounded size.
//!
//! Fixed-width numbers convert when the value fits the destination. Text
//! accepts the integer literal syntax of the scalar rules at any size.
//! Byte sequences hold the unsigned magnitude in the configured byte order.
//! Other host types go through `i64`.

use super::{copy_routine, forward, held, pull, Decimal, Rational};
use crate::classify::StructuralKind;
use crate::config::ByteOrder;
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Target};
use crate::registry::Provider;
use crate::rules::{float_value, int_parts, int_value, write_bytes};
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use std::fmt;
use std::sync::Arc;

/// An arbitrary-precision signed integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BigInteger(pub BigInt);

host_value!(BigInteger, "bigint");

impl BigInteger {
    /// Parse a decimal, `0x`, `0o` or `0b` literal of any size.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, radix, digits) = int_parts(text).ok()?;
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
        Some(Self(if negative { -magnitude } else { magnitude }))
    }

    /// Integer part of `f`, rounded toward zero.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        BigInt::from_f64(f.trunc()).map(Self)
    }

    fn magnitude_bytes(&self, order: ByteOrder) -> Vec<u8> {
        if self.0.is_zero() {
            return Vec::new();
        }
        let (_, bytes) = match order {
            ByteOrder::BigEndian => self.0.to_bytes_be(),
            ByteOrder::LittleEndian => self.0.to_bytes_le(),
        };
        bytes
    }
}

impl From<i64> for BigInteger {
    fn from(value: i64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<BigInt> for BigInteger {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Provider for [`BigInteger`], in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntegerProvider;

impl Provider for BigIntegerProvider {
    fn routine(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        let own = BigInteger::descriptor();
        match (**src == *own, **dst == *own) {
            (true, true) => Some(copy_routine("bigint-copy")),
            (true, false) => outbound(dst),
            (false, true) => inbound(src),
            (false, false) => None,
        }
    }
}

fn set(target: &mut Target<'_>, n: BigInt) {
    target.set(DynamicValue::opaque(BigInteger(n)));
}

fn outbound(dst: &Arc<TypeDescriptor>) -> Option<Routine> {
    if dst.is_byte_sequence() {
        return Some(Routine::new("bigint-to-bytes", |mapper, source, target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            if n.0.sign() == Sign::Minus {
                return Err(ConversionError::overflow(source.ty(), target.ty())
                    .with_reason("negative values have no byte form"));
            }
            write_bytes(n.magnitude_bytes(mapper.config().byte_order), source.ty(), target)
        }));
    }
    if **dst == *Decimal::descriptor() {
        return Some(Routine::new("bigint-to-decimal", |_, source, mut target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            target.set(DynamicValue::opaque(Decimal::from(n.clone())));
            Ok(())
        }));
    }
    if **dst == *Rational::descriptor() {
        return Some(Routine::new("bigint-to-rational", |_, source, mut target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            target.set(DynamicValue::opaque(Rational::from(n.clone())));
            Ok(())
        }));
    }
    let routine = match StructuralKind::of(dst) {
        StructuralKind::Bool => Routine::new("bigint-to-bool", |_, source, mut target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            target.set(DynamicValue::Bool(!n.0.is_zero()));
            Ok(())
        }),
        StructuralKind::Signed | StructuralKind::Unsigned => {
            let kind = dst.primitive_kind()?;
            Routine::new("bigint-to-int", move |_, source, mut target| {
                let n = held::<BigInteger>(&source, target.ty())?;
                let value = n
                    .0
                    .to_i128()
                    .and_then(|n| int_value(kind, n))
                    .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
                target.set(value);
                Ok(())
            })
        }
        StructuralKind::Float => {
            let kind = dst.primitive_kind()?;
            Routine::new("bigint-to-float", move |_, source, mut target| {
                let n = held::<BigInteger>(&source, target.ty())?;
                let value = n
                    .0
                    .to_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| float_value(kind, f))
                    .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
                target.set(value);
                Ok(())
            })
        }
        StructuralKind::Text => Routine::new("bigint-to-text", |_, source, mut target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            target.set(DynamicValue::String(n.to_string()));
            Ok(())
        }),
        StructuralKind::Opaque => Routine::new("bigint-indirect", |mapper, source, target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            let small = n
                .0
                .to_i64()
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            let ty = TypeDescriptor::builtin(PrimitiveKind::I64);
            forward(mapper, &ty, DynamicValue::I64(small), target)
        }),
        _ => return None,
    };
    Some(routine)
}

fn inbound(src: &Arc<TypeDescriptor>) -> Option<Routine> {
    if src.is_byte_sequence() {
        return Some(Routine::new("bytes-to-bigint", |mapper, source, mut target| {
            let bytes = source
                .value()
                .as_bytes()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            let n = match mapper.config().byte_order {
                ByteOrder::BigEndian => BigInt::from_bytes_be(Sign::Plus, &bytes),
                ByteOrder::LittleEndian => BigInt::from_bytes_le(Sign::Plus, &bytes),
            };
            set(&mut target, n);
            Ok(())
        }));
    }
    if **src == *Decimal::descriptor() {
        return Some(Routine::new("decimal-to-bigint", |_, source, mut target| {
            let d = held::<Decimal>(&source, target.ty())?;
            set(&mut target, d.truncated());
            Ok(())
        }));
    }
    if **src == *Rational::descriptor() {
        return Some(Routine::new("rational-to-bigint", |_, source, mut target| {
            let r = held::<Rational>(&source, target.ty())?;
            set(&mut target, r.0.to_integer());
            Ok(())
        }));
    }
    let routine = match StructuralKind::of(src) {
        StructuralKind::Bool => Routine::new("bool-to-bigint", |_, source, mut target| {
            let b = source
                .value()
                .as_bool()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            set(&mut target, BigInt::from(u8::from(b)));
            Ok(())
        }),
        StructuralKind::Signed | StructuralKind::Unsigned => {
            Routine::new("int-to-bigint", |_, source, mut target| {
                let n = source
                    .value()
                    .as_i128()
                    .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
                set(&mut target, BigInt::from(n));
                Ok(())
            })
        }
        StructuralKind::Float => Routine::new("float-to-bigint", |_, source, mut target| {
            let n = source
                .value()
                .as_f64()
                .and_then(BigInteger::from_f64)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            target.set(DynamicValue::opaque(n));
            Ok(())
        }),
        StructuralKind::Text => Routine::new("text-to-bigint", |_, source, mut target| {
            let text = source
                .value()
                .as_str()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            let n = BigInteger::parse(text).ok_or_else(|| {
                ConversionError::parse_failure(source.ty(), target.ty())
                    .with_reason(format!("'{}' is not an integer", text))
            })?;
            target.set(DynamicValue::opaque(n));
            Ok(())
        }),
        StructuralKind::Opaque => Routine::new("indirect-bigint", |mapper, source, mut target| {
            let ty = TypeDescriptor::builtin(PrimitiveKind::I64);
            let n = pull(mapper, &source, &ty)?
                .as_i128()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            set(&mut target, BigInt::from(n));
            Ok(())
        }),
        _ => return None,
    };
    Some(routine)
}
