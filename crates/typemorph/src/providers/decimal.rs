// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decimal numbers of unbounded precision.
//!
//! Integers and text convert exactly. Floats enter through their shortest
//! decimal form. Conversions to fixed-width numbers truncate toward zero
//! and fail when the result does not fit. Other host types go through `f64`.

use super::{copy_routine, forward, held, pull, BigInteger, Rational};
use crate::classify::StructuralKind;
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine, Target};
use crate::registry::Provider;
use crate::rules::{float_value, int_value};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// An arbitrary-precision decimal number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(pub BigDecimal);

host_value!(Decimal, "decimal");

impl Decimal {
    /// Parse plain or exponent notation, such as `-12.50` or `1.5e-3`.
    pub fn parse(text: &str) -> Option<Self> {
        BigDecimal::from_str(text.trim()).ok().map(Self)
    }

    /// Shortest decimal form of a finite `f`.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        Self::parse(&f.to_string())
    }

    /// Integer part, rounded toward zero.
    pub fn truncated(&self) -> BigInt {
        let (digits, _) = self.0.with_scale(0).into_bigint_and_exponent();
        digits
    }

    /// Exact fraction of this value.
    pub fn to_rational(&self) -> BigRational {
        let (digits, scale) = self.0.as_bigint_and_exponent();
        let power = BigInt::from(10).pow(scale.unsigned_abs() as u32);
        if scale >= 0 {
            BigRational::new(digits, power)
        } else {
            BigRational::from_integer(digits * power)
        }
    }

    /// `r` divided out to the default decimal precision.
    pub fn from_rational(r: &BigRational) -> Self {
        let numer = BigDecimal::new(r.numer().clone(), 0);
        let denom = BigDecimal::new(r.denom().clone(), 0);
        Self(numer / denom)
    }

    fn to_f64(&self) -> Option<f64> {
        self.0.to_f64().filter(|f| f.is_finite())
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self(BigDecimal::zero())
    }
}

// Equal values with different scales hash alike.
impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.normalized().to_string().hash(state);
    }
}

impl From<BigInteger> for Decimal {
    fn from(value: BigInteger) -> Self {
        Self(BigDecimal::new(value.0, 0))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Provider for [`Decimal`], in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalProvider;

impl Provider for DecimalProvider {
    fn routine(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        let own = Decimal::descriptor();
        match (**src == *own, **dst == *own) {
            (true, true) => Some(copy_routine("decimal-copy")),
            (true, false) => outbound(dst),
            (false, true) => inbound(src),
            (false, false) => None,
        }
    }
}

fn set(target: &mut Target<'_>, d: Decimal) {
    target.set(DynamicValue::opaque(d));
}

fn outbound(dst: &Arc<TypeDescriptor>) -> Option<Routine> {
    if **dst == *BigInteger::descriptor() {
        return Some(Routine::new("decimal-to-bigint", |_, source, mut target| {
            let d = held::<Decimal>(&source, target.ty())?;
            target.set(DynamicValue::opaque(BigInteger(d.truncated())));
            Ok(())
        }));
    }
    if **dst == *Rational::descriptor() {
        return Some(Routine::new("decimal-to-rational", |_, source, mut target| {
            let d = held::<Decimal>(&source, target.ty())?;
            target.set(DynamicValue::opaque(Rational(d.to_rational())));
            Ok(())
        }));
    }
    let routine = match StructuralKind::of(dst) {
        StructuralKind::Bool => Routine::new("decimal-to-bool", |_, source, mut target| {
            let d = held::<Decimal>(&source, target.ty())?;
            target.set(DynamicValue::Bool(!d.0.is_zero()));
            Ok(())
        }),
        StructuralKind::Signed | StructuralKind::Unsigned => {
            let kind = dst.primitive_kind()?;
            Routine::new("decimal-to-int", move |_, source, mut target| {
                let d = held::<Decimal>(&source, target.ty())?;
                let value = d
                    .truncated()
                    .to_i128()
                    .and_then(|n| int_value(kind, n))
                    .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
                target.set(value);
                Ok(())
            })
        }
        StructuralKind::Float => {
            let kind = dst.primitive_kind()?;
            Routine::new("decimal-to-float", move |_, source, mut target| {
                let d = held::<Decimal>(&source, target.ty())?;
                let value = d
                    .to_f64()
                    .and_then(|f| float_value(kind, f))
                    .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
                target.set(value);
                Ok(())
            })
        }
        StructuralKind::Text => Routine::new("decimal-to-text", |_, source, mut target| {
            let d = held::<Decimal>(&source, target.ty())?;
            target.set(DynamicValue::String(d.to_string()));
            Ok(())
        }),
        StructuralKind::Opaque => Routine::new("decimal-indirect", |mapper, source, target| {
            let d = held::<Decimal>(&source, target.ty())?;
            let f = d
                .to_f64()
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            let ty = TypeDescriptor::builtin(PrimitiveKind::F64);
            forward(mapper, &ty, DynamicValue::F64(f), target)
        }),
        _ => return None,
    };
    Some(routine)
}

fn inbound(src: &Arc<TypeDescriptor>) -> Option<Routine> {
    if **src == *BigInteger::descriptor() {
        return Some(Routine::new("bigint-to-decimal", |_, source, mut target| {
            let n = held::<BigInteger>(&source, target.ty())?;
            set(&mut target, Decimal::from(n.clone()));
            Ok(())
        }));
    }
    if **src == *Rational::descriptor() {
        return Some(Routine::new("rational-to-decimal", |_, source, mut target| {
            let r = held::<Rational>(&source, target.ty())?;
            set(&mut target, Decimal::from_rational(&r.0));
            Ok(())
        }));
    }
    let routine = match StructuralKind::of(src) {
        StructuralKind::Bool => Routine::new("bool-to-decimal", |_, source, mut target| {
            let b = source
                .value()
                .as_bool()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            set(&mut target, Decimal(BigDecimal::new(BigInt::from(u8::from(b)), 0)));
            Ok(())
        }),
        StructuralKind::Signed | StructuralKind::Unsigned => {
            Routine::new("int-to-decimal", |_, source, mut target| {
                let n = source
                    .value()
                    .as_i128()
                    .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
                set(&mut target, Decimal(BigDecimal::new(BigInt::from(n), 0)));
                Ok(())
            })
        }
        StructuralKind::Float => Routine::new("float-to-decimal", |_, source, mut target| {
            let d = source
                .value()
                .as_f64()
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            set(&mut target, d);
            Ok(())
        }),
        StructuralKind::Text => Routine::new("text-to-decimal", |_, source, mut target| {
            let text = source
                .value()
                .as_str()
                .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
            let d = Decimal::parse(text).ok_or_else(|| {
                ConversionError::parse_failure(source.ty(), target.ty())
                    .with_reason(format!("'{}' is not a decimal number", text))
            })?;
            set(&mut target, d);
            Ok(())
        }),
        StructuralKind::Opaque => Routine::new("indirect-decimal", |mapper, source, mut target| {
            let ty = TypeDescriptor::builtin(PrimitiveKind::F64);
            let d = pull(mapper, &source, &ty)?
                .as_f64()
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ConversionError::overflow(source.ty(), target.ty()))?;
            set(&mut target, d);
            Ok(())
        }),
        _ => return None,
    };
    Some(routine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicData;
    use crate::error::ErrorKind;
    use crate::providers::Timestamp;

    fn mapper() -> Mapper {
        Mapper::builder().with_default_providers().build()
    }

    fn dec(text: &str) -> DynamicData {
        DynamicData::from_native(Decimal::parse(text).unwrap())
    }

    #[test]
    fn test_text_is_exact() {
        let mapper = mapper();
        let src = DynamicData::from_native("0.1000000000000000000000000001".to_string());
        let d: Decimal = mapper.convert_native(&src).unwrap();
        let text: String = mapper.convert_native(&DynamicData::from_native(d)).unwrap();
        assert_eq!(text, "0.1000000000000000000000000001");

        let bad = DynamicData::from_native("1.2.3".to_string());
        let err = mapper.convert_native::<Decimal>(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_integers_truncate_and_range_check() {
        let mapper = mapper();
        assert_eq!(mapper.convert_native::<i32>(&dec("-12.99")).unwrap(), -12);
        assert_eq!(mapper.convert_native::<u8>(&dec("255.5")).unwrap(), 255);
        let err = mapper.convert_native::<u8>(&dec("256")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        let err = mapper.convert_native::<u32>(&dec("-0.5e1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);

        let d: Decimal = mapper.convert_native(&DynamicData::from_native(i64::MIN)).unwrap();
        assert_eq!(d, Decimal::parse("-9223372036854775808").unwrap());
    }

    #[test]
    fn test_floats() {
        let mapper = mapper();
        let d: Decimal = mapper.convert_native(&DynamicData::from_native(0.1f64)).unwrap();
        assert_eq!(d, Decimal::parse("0.1").unwrap());
        assert_eq!(mapper.convert_native::<f64>(&dec("2.5")).unwrap(), 2.5);

        let err = mapper
            .convert_native::<Decimal>(&DynamicData::from_native(f64::INFINITY))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        let err = mapper.convert_native::<f32>(&dec("1e39")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
        let err = mapper.convert_native::<f64>(&dec("1e400")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn test_big_numbers_and_fractions() {
        let mapper = mapper();
        let n: BigInteger = mapper
            .convert_native(&dec("123456789012345678901234567890.9"))
            .unwrap();
        assert_eq!(n.to_string(), "123456789012345678901234567890");

        let r: Rational = mapper.convert_native(&dec("-1.25")).unwrap();
        assert_eq!(r, Rational::parse("-5/4").unwrap());
        let r: Rational = mapper.convert_native(&dec("3e2")).unwrap();
        assert_eq!(r, Rational::parse("300").unwrap());

        let d: Decimal = mapper
            .convert_native(&DynamicData::from_native(BigInteger::from(-3)))
            .unwrap();
        assert_eq!(d, Decimal::parse("-3").unwrap());
    }

    #[test]
    fn test_scale_does_not_matter() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |d: &Decimal| {
            let mut h = DefaultHasher::new();
            d.hash(&mut h);
            h.finish()
        };
        let a = Decimal::parse("1.50").unwrap();
        let b = Decimal::parse("1.5").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_timestamp_and_declined_kinds() {
        let mapper = mapper();
        let ts: Timestamp = mapper.convert_native(&dec("1.5")).unwrap();
        assert_eq!(ts.0.timestamp_subsec_nanos(), 500_000_000);

        let err = mapper.convert_native::<Vec<u8>>(&dec("1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
