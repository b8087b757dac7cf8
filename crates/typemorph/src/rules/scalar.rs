// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar coercions: bool, integers, floats and text.
//!
//! Every pair of primitive kinds has a routine. Range checks happen before
//! anything is written; out-of-range values are errors, never truncated.

use super::literal::{self, LiteralError};
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::Routine;
use std::sync::Arc;

pub(crate) fn resolve(src: &TypeDescriptor, dst: &TypeDescriptor) -> Option<Routine> {
    let from = src.primitive_kind()?;
    let to = dst.primitive_kind()?;
    Some(Routine::new(routine_name(from, to), move |_, source, mut target| {
        let value = coerce(source.value(), to, source.ty(), target.ty())?;
        target.set(value);
        Ok(())
    }))
}

fn routine_name(from: PrimitiveKind, to: PrimitiveKind) -> &'static str {
    match (from, to) {
        (PrimitiveKind::String, PrimitiveKind::String) => "text",
        (PrimitiveKind::String, _) => "parse",
        (_, PrimitiveKind::String) => "format",
        (PrimitiveKind::Bool, _) | (_, PrimitiveKind::Bool) => "bool",
        _ => "numeric",
    }
}

/// Convert one scalar value to kind `to`.
pub(crate) fn coerce(
    value: &DynamicValue,
    to: PrimitiveKind,
    from_ty: &Arc<TypeDescriptor>,
    to_ty: &Arc<TypeDescriptor>,
) -> Result<DynamicValue, ConversionError> {
    let overflow = || ConversionError::overflow(from_ty, to_ty);
    match value {
        DynamicValue::Bool(b) => match to {
            PrimitiveKind::String => Ok(DynamicValue::String(b.to_string())),
            _ => from_int(*b as i128, to).ok_or_else(overflow),
        },
        DynamicValue::String(text) => parse_text(text, to, from_ty, to_ty),
        DynamicValue::F32(f) => {
            if to == PrimitiveKind::String {
                return Ok(DynamicValue::String(f.to_string()));
            }
            from_float(*f as f64, to).ok_or_else(overflow)
        }
        DynamicValue::F64(f) => from_float(*f, to).ok_or_else(overflow),
        other => match other.as_i128() {
            Some(n) => from_int(n, to).ok_or_else(overflow),
            None => Err(ConversionError::invalid_source(from_ty, to_ty)),
        },
    }
}

fn from_int(n: i128, to: PrimitiveKind) -> Option<DynamicValue> {
    match to {
        PrimitiveKind::Bool => Some(DynamicValue::Bool(n != 0)),
        PrimitiveKind::String => Some(DynamicValue::String(n.to_string())),
        PrimitiveKind::F32 => Some(DynamicValue::F32(n as f32)),
        PrimitiveKind::F64 => Some(DynamicValue::F64(n as f64)),
        int => int_value(int, n),
    }
}

fn from_float(f: f64, to: PrimitiveKind) -> Option<DynamicValue> {
    match to {
        PrimitiveKind::Bool => Some(DynamicValue::Bool(f != 0.0)),
        PrimitiveKind::String => Some(DynamicValue::String(f.to_string())),
        PrimitiveKind::F32 => float_value(PrimitiveKind::F32, f),
        PrimitiveKind::F64 => Some(DynamicValue::F64(f)),
        int => int_value(int, float_to_int(f, int)?),
    }
}

fn parse_text(
    text: &str,
    to: PrimitiveKind,
    from_ty: &Arc<TypeDescriptor>,
    to_ty: &Arc<TypeDescriptor>,
) -> Result<DynamicValue, ConversionError> {
    let literal_error = |err: LiteralError| match err {
        LiteralError::Syntax => ConversionError::parse_failure(from_ty, to_ty)
            .with_reason(format!("invalid {} literal {:?}", to.name(), text)),
        LiteralError::Range => ConversionError::overflow(from_ty, to_ty),
    };
    match to {
        PrimitiveKind::String => Ok(DynamicValue::String(text.to_string())),
        PrimitiveKind::Bool => match text {
            "true" => Ok(DynamicValue::Bool(true)),
            "false" => Ok(DynamicValue::Bool(false)),
            _ => Err(ConversionError::parse_failure(from_ty, to_ty)
                .with_reason(format!("invalid bool literal {:?}", text))),
        },
        PrimitiveKind::F32 | PrimitiveKind::F64 => {
            let f = literal::parse_float(text).map_err(literal_error)?;
            float_value(to, f).ok_or_else(|| ConversionError::overflow(from_ty, to_ty))
        }
        int => {
            let n = literal::parse_int(text).map_err(literal_error)?;
            int_value(int, n).ok_or_else(|| ConversionError::overflow(from_ty, to_ty))
        }
    }
}

/// `n` as an integer of kind `kind`, if it fits.
pub(crate) fn int_value(kind: PrimitiveKind, n: i128) -> Option<DynamicValue> {
    Some(match kind {
        PrimitiveKind::I8 => DynamicValue::I8(i8::try_from(n).ok()?),
        PrimitiveKind::I16 => DynamicValue::I16(i16::try_from(n).ok()?),
        PrimitiveKind::I32 => DynamicValue::I32(i32::try_from(n).ok()?),
        PrimitiveKind::I64 => DynamicValue::I64(i64::try_from(n).ok()?),
        PrimitiveKind::U8 => DynamicValue::U8(u8::try_from(n).ok()?),
        PrimitiveKind::U16 => DynamicValue::U16(u16::try_from(n).ok()?),
        PrimitiveKind::U32 => DynamicValue::U32(u32::try_from(n).ok()?),
        PrimitiveKind::U64 => DynamicValue::U64(u64::try_from(n).ok()?),
        _ => return None,
    })
}

/// `f` as a float of kind `kind`. Finite values beyond `f32` range do not fit.
pub(crate) fn float_value(kind: PrimitiveKind, f: f64) -> Option<DynamicValue> {
    match kind {
        PrimitiveKind::F32 => {
            if f.is_finite() && f.abs() > f32::MAX as f64 {
                None
            } else {
                Some(DynamicValue::F32(f as f32))
            }
        }
        PrimitiveKind::F64 => Some(DynamicValue::F64(f)),
        _ => None,
    }
}

/// Truncate toward zero, rejecting values outside the integer range first.
fn float_to_int(f: f64, kind: PrimitiveKind) -> Option<i128> {
    if !f.is_finite() || (kind.is_unsigned() && f < 0.0) {
        return None;
    }
    let truncated = f.trunc();
    if truncated.abs() >= 1e38 {
        return None;
    }
    Some(truncated as i128)
}
