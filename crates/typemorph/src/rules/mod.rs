// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in rule table, the last step of resolution.
//!
//! Rules match on the structural kind of both sides, so nominal aliases of
//! built-in shapes get built-in behavior once nothing more specific claimed
//! the pair.

mod bytes;
mod literal;
mod record;
mod scalar;
mod structural;

use crate::classify::StructuralKind;
use crate::dynamic::{TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine};
use std::sync::Arc;

pub(crate) use bytes::write_bytes;
pub(crate) use literal::int_parts;
pub(crate) use scalar::{float_value, int_value};

/// Built-in routine for `src -> dst`, if the table has one.
pub(crate) fn builtin(
    mapper: &Mapper,
    src: &Arc<TypeDescriptor>,
    dst: &Arc<TypeDescriptor>,
) -> Option<Routine> {
    let routine = host_copy(src, dst)
        .or_else(|| scalar::resolve(src, dst))
        .or_else(|| bytes::resolve(src, dst, mapper.config().byte_order))
        .or_else(|| structural::resolve(src, dst))
        .or_else(|| record::resolve(mapper, src, dst))?;

    if mapper.config().strict_types && src != dst && strict_applies(src) {
        return Some(Routine::failing(
            "strict",
            ConversionError::strict_mismatch(src, dst),
        ));
    }
    Some(routine)
}

/// A host type into itself. Reached only when neither the type nor the
/// registry describes that conversion.
fn host_copy(src: &TypeDescriptor, dst: &TypeDescriptor) -> Option<Routine> {
    if src != dst || !matches!(src.kind(), TypeKind::Opaque(_)) {
        return None;
    }
    Some(Routine::new("host-copy", |_, source, mut target| {
        target.set(source.value().clone());
        Ok(())
    }))
}

/// Strict mode compares nominal types of scalars and of element-wise
/// containers. Maps and records are matched key by key instead.
fn strict_applies(src: &TypeDescriptor) -> bool {
    let kind = StructuralKind::of(src);
    kind.is_scalar() || matches!(kind, StructuralKind::Sequence | StructuralKind::Array)
}
