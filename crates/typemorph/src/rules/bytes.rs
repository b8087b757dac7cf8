// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-sequence conversions.
//!
//! 32- and 64-bit numbers encode to exactly their width in the configured
//! byte order; narrower numbers have no byte form. Text converts to and
//! from its UTF-8 bytes.

use crate::classify::StructuralKind;
use crate::config::ByteOrder;
use crate::dynamic::{DynamicValue, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::{Routine, Target};
use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};
use std::sync::Arc;

pub(crate) fn resolve(
    src: &TypeDescriptor,
    dst: &TypeDescriptor,
    order: ByteOrder,
) -> Option<Routine> {
    let from = StructuralKind::of(src);
    let to = StructuralKind::of(dst);
    if from.is_numeric() && dst.is_byte_sequence() {
        return encodable(src).then(|| encode_routine(order));
    }
    if src.is_byte_sequence() && to.is_numeric() {
        let kind = dst.primitive_kind()?;
        return encodable(dst).then(|| decode_routine(kind, order));
    }
    match (from, to) {
        (StructuralKind::Text, _) if dst.is_byte_sequence() => Some(text_to_bytes()),
        (_, StructuralKind::Text) if src.is_byte_sequence() => Some(bytes_to_text()),
        _ => None,
    }
}

fn encodable(desc: &TypeDescriptor) -> bool {
    desc.primitive_kind()
        .and_then(|k| k.size())
        .is_some_and(|width| width >= 4)
}

fn encode_routine(order: ByteOrder) -> Routine {
    Routine::new("encode", move |_, source, target| {
        let bytes = match order {
            ByteOrder::BigEndian => encode::<BigEndian>(source.value()),
            ByteOrder::LittleEndian => encode::<LittleEndian>(source.value()),
        }
        .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        write_bytes(bytes, source.ty(), target)
    })
}

fn decode_routine(kind: PrimitiveKind, order: ByteOrder) -> Routine {
    Routine::new("decode", move |_, source, mut target| {
        let bytes = source
            .value()
            .as_bytes()
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        let width = kind.size().unwrap_or_default();
        if bytes.len() != width {
            return Err(ConversionError::length_mismatch(source.ty(), target.ty())
                .with_reason(format!("expected {} bytes, got {}", width, bytes.len())));
        }
        let value = match order {
            ByteOrder::BigEndian => decode::<BigEndian>(kind, &bytes),
            ByteOrder::LittleEndian => decode::<LittleEndian>(kind, &bytes),
        }
        .ok_or_else(|| ConversionError::unsupported(source.ty(), target.ty()))?;
        target.set(value);
        Ok(())
    })
}

fn text_to_bytes() -> Routine {
    Routine::new("text-to-bytes", |_, source, target| {
        let text = source
            .value()
            .as_str()
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        write_bytes(text.as_bytes().to_vec(), source.ty(), target)
    })
}

fn bytes_to_text() -> Routine {
    Routine::new("bytes-to-text", |_, source, mut target| {
        let bytes = source
            .value()
            .as_bytes()
            .ok_or_else(|| ConversionError::invalid_source(source.ty(), target.ty()))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            ConversionError::parse_failure(source.ty(), target.ty()).with_reason(e.to_string())
        })?;
        target.set(DynamicValue::String(text));
        Ok(())
    })
}

/// Store `bytes` into a `u8` sequence (replaced) or array (exact length).
pub(crate) fn write_bytes(
    bytes: Vec<u8>,
    from: &Arc<TypeDescriptor>,
    mut target: Target<'_>,
) -> Result<(), ConversionError> {
    let items = bytes.into_iter().map(DynamicValue::U8).collect::<Vec<_>>();
    match target.ty().kind() {
        TypeKind::Sequence(_) => target.set(DynamicValue::Sequence(items)),
        TypeKind::Array(arr) if arr.length == items.len() => target.set(DynamicValue::Array(items)),
        TypeKind::Array(arr) => {
            return Err(ConversionError::length_mismatch(from, target.ty()).with_reason(format!(
                "expected {} bytes, got {}",
                arr.length,
                items.len()
            )))
        }
        _ => return Err(ConversionError::invalid_destination(from, target.ty())),
    }
    Ok(())
}

fn encode<E: Endian>(value: &DynamicValue) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; 8];
    let width = match *value {
        DynamicValue::I32(v) => {
            E::write_i32(&mut buf, v);
            4
        }
        DynamicValue::U32(v) => {
            E::write_u32(&mut buf, v);
            4
        }
        DynamicValue::F32(v) => {
            E::write_f32(&mut buf, v);
            4
        }
        DynamicValue::I64(v) => {
            E::write_i64(&mut buf, v);
            8
        }
        DynamicValue::U64(v) => {
            E::write_u64(&mut buf, v);
            8
        }
        DynamicValue::F64(v) => {
            E::write_f64(&mut buf, v);
            8
        }
        _ => return None,
    };
    buf.truncate(width);
    Some(buf)
}

fn decode<E: Endian>(kind: PrimitiveKind, bytes: &[u8]) -> Option<DynamicValue> {
    Some(match kind {
        PrimitiveKind::I32 => DynamicValue::I32(E::read_i32(bytes)),
        PrimitiveKind::U32 => DynamicValue::U32(E::read_u32(bytes)),
        PrimitiveKind::F32 => DynamicValue::F32(E::read_f32(bytes)),
        PrimitiveKind::I64 => DynamicValue::I64(E::read_i64(bytes)),
        PrimitiveKind::U64 => DynamicValue::U64(E::read_u64(bytes)),
        PrimitiveKind::F64 => DynamicValue::F64(E::read_f64(bytes)),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_widths() {
        assert_eq!(
            encode::<BigEndian>(&DynamicValue::U32(0x0102_0304)),
            Some(vec![1, 2, 3, 4])
        );
        assert_eq!(
            encode::<LittleEndian>(&DynamicValue::U32(0x0102_0304)),
            Some(vec![4, 3, 2, 1])
        );
        assert_eq!(
            encode::<BigEndian>(&DynamicValue::I64(-1)),
            Some(vec![0xff; 8])
        );
        assert_eq!(encode::<BigEndian>(&DynamicValue::U16(1)), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            decode::<BigEndian>(PrimitiveKind::F32, &1.5f32.to_be_bytes()),
            Some(DynamicValue::F32(1.5))
        );
        assert_eq!(
            decode::<LittleEndian>(PrimitiveKind::I64, &(-2i64).to_le_bytes()),
            Some(DynamicValue::I64(-2))
        );
    }

    #[test]
    fn test_narrow_numbers_have_no_byte_form() {
        let bytes = TypeDescriptor::bytes();
        let u16_ty = TypeDescriptor::builtin(PrimitiveKind::U16);
        assert!(resolve(&u16_ty, &bytes, ByteOrder::BigEndian).is_none());
        assert!(resolve(&bytes, &u16_ty, ByteOrder::BigEndian).is_none());
        let bool_ty = TypeDescriptor::builtin(PrimitiveKind::Bool);
        assert!(resolve(&bool_ty, &bytes, ByteOrder::BigEndian).is_none());
        let u32_ty = TypeDescriptor::builtin(PrimitiveKind::U32);
        assert!(resolve(&u32_ty, &bytes, ByteOrder::BigEndian).is_some());
    }
}
