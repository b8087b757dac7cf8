// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exact fractions.
//!
//! Text is `numerator/denominator`, a plain integer or a decimal number.
//! A two-element sequence or array holds the numerator and denominator.
//! Everything else goes through [`Decimal`].

use super::{copy_routine, forward, held, pull, BigInteger, Decimal};
use crate::classify::StructuralKind;
use crate::dynamic::{DynamicValue, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Source};
use crate::registry::Provider;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::fmt;
use std::sync::Arc;

/// An arbitrary-precision fraction, always in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational(pub BigRational);

host_value!(Rational, "rational");

impl Rational {
    /// Parse `3/4`, `-12` or `0.75`. A zero denominator does not parse.
    pub fn parse(text: &str) -> Option<Self> {
        match text.split_once('/') {
            Some((numer, denom)) => {
                let numer = BigInteger::parse(numer.trim())?;
                let denom = BigInteger::parse(denom.trim())?;
                Self::from_parts(numer.0, denom.0)
            }
            None => BigInteger::parse(text.trim())
                .map(Self::from)
                .or_else(|| Decimal::parse(text).map(|d| Self(d.to_rational()))),
        }
    }

    pub fn from_parts(numer: BigInt, denom: BigInt) -> Option<Self> {
        if denom.is_zero() {
            return None;
        }
        Some(Self(BigRational::new(numer, denom)))
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self(BigRational::zero())
    }
}

impl From<BigInteger> for Rational {
    fn from(value: BigInteger) -> Self {
        Self(BigRational::from_integer(value.0))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Provider for [`Rational`], in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RationalProvider;

impl Provider for RationalProvider {
    fn routine(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        let own = Rational::descriptor();
        match (**src == *own, **dst == *own) {
            (true, true) => Some(copy_routine("rational-copy")),
            (true, false) => outbound(dst),
            (false, true) => inbound(src),
            (false, false) => None,
        }
    }
}

fn outbound(dst: &Arc<TypeDescriptor>) -> Option<Routine> {
    if **dst == *BigInteger::descriptor() {
        return Some(Routine::new("rational-to-bigint", |_, source, mut target| {
            let r = held::<Rational>(&source, target.ty())?;
            target.set(DynamicValue::opaque(BigInteger(r.0.to_integer())));
            Ok(())
        }));
    }
    let routine = match StructuralKind::of(dst) {
        StructuralKind::Text => Routine::new("rational-to-text", |_, source, mut target| {
            let r = held::<Rational>(&source, target.ty())?;
            target.set(DynamicValue::String(r.to_string()));
            Ok(())
        }),
        StructuralKind::Sequence | StructuralKind::Array => {
            Routine::new("rational-to-pair", |mapper, source, mut target| {
                let r = held::<Rational>(&source, target.ty())?;
                let ty = target.ty();
                let (element, fixed) = match ty.kind() {
                    TypeKind::Sequence(seq) => (&seq.element_type, false),
                    TypeKind::Array(arr) if arr.length == 2 => (&arr.element_type, true),
                    _ => {
                        return Err(ConversionError::length_mismatch(source.ty(), ty)
                            .with_reason("a fraction has two parts"))
                    }
                };
                let from = BigInteger::descriptor();
                let mut items = Vec::with_capacity(2);
                for part in [r.0.numer(), r.0.denom()] {
                    let mut slot = DynamicValue::zero(element);
                    let value = DynamicValue::opaque(BigInteger(part.clone()));
                    mapper.convert_value(&from, &value, element, &mut slot)?;
                    items.push(slot);
                }
                target.set(if fixed {
                    DynamicValue::Array(items)
                } else {
                    DynamicValue::Sequence(items)
                });
                Ok(())
            })
        }
        StructuralKind::Record | StructuralKind::Map => return None,
        _ => Routine::new("rational-indirect", |mapper, source, target| {
            let r = held::<Rational>(&source, target.ty())?;
            let value = DynamicValue::opaque(Decimal::from_rational(&r.0));
            forward(mapper, &Decimal::descriptor(), value, target)
        }),
    };
    Some(routine)
}

fn inbound(src: &Arc<TypeDescriptor>) -> Option<Routine> {
    let routine = match StructuralKind::of(src) {
        StructuralKind::Text => Routine::new("text-to-rational", |_, source, mut target| {
            let text = source
                .value()
                .as_str()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            let r = Rational::parse(text).ok_or_else(|| {
                ConversionError::parse_failure(source.ty(), target.ty())
                    .with_reason(format!("'{}' is not a fraction", text))
            })?;
            target.set(DynamicValue::opaque(r));
            Ok(())
        }),
        StructuralKind::Sequence | StructuralKind::Array => {
            Routine::new("pair-to-rational", |mapper, source, mut target| {
                let (numer, denom) = pair(mapper, &source, target.ty())?;
                let r = Rational::from_parts(numer, denom).ok_or_else(|| {
                    ConversionError::invalid_source(source.ty(), target.ty())
                        .with_reason("zero denominator")
                })?;
                target.set(DynamicValue::opaque(r));
                Ok(())
            })
        }
        StructuralKind::Record | StructuralKind::Map => return None,
        _ => Routine::new("indirect-rational", |mapper, source, mut target| {
            let d = pull(mapper, &source, &Decimal::descriptor())?;
            let d = d
                .as_opaque::<Decimal>()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            target.set(DynamicValue::opaque(Rational(d.to_rational())));
            Ok(())
        }),
    };
    Some(routine)
}

fn pair(
    mapper: &Mapper,
    source: &Source<'_>,
    to: &Arc<TypeDescriptor>,
) -> Result<(BigInt, BigInt), ConversionError> {
    let element = source
        .ty()
        .element_type()
        .ok_or_else(|| ConversionError::invalid_source(source.ty(), to))?;
    let items = match source.value() {
        DynamicValue::Sequence(items) | DynamicValue::Array(items) => items,
        _ => return Err(ConversionError::invalid_source(source.ty(), to)),
    };
    if items.len() != 2 {
        return Err(ConversionError::length_mismatch(source.ty(), to)
            .with_reason(format!("expected 2 parts, got {}", items.len())));
    }
    let into = BigInteger::descriptor();
    let mut parts = items.iter().map(|item| {
        let mut slot = DynamicValue::zero(&into);
        mapper.convert_value(element, item, &into, &mut slot)?;
        slot.as_opaque::<BigInteger>()
            .map(|n| n.0.clone())
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), to))
    });
    match (parts.next(), parts.next()) {
        (Some(numer), Some(denom)) => Ok((numer?, denom?)),
        _ => Err(ConversionError::invalid_source(source.ty(), to)),
    }
}
