// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wrapper unwrapping for both sides of a conversion.
//!
//! Sources stop at the first layer that is not a wrapper; destinations
//! stop at the first plain, registered or self-describing layer, allocating
//! empty optionals on the way down. Neither side consults the dispatcher.

use crate::classify::{has_convert_in, is_plain, is_wrapper};
use crate::dynamic::{DynamicData, DynamicValue, TypeDescriptor, TypeKind};
use crate::registry::Registry;
use std::sync::Arc;

/// Unwrap `value` for reading. `None` when a wrapper is empty or the value
/// does not have the shape its type declares.
pub(crate) fn resolve_source<'a>(
    mut ty: &'a Arc<TypeDescriptor>,
    mut value: &'a DynamicValue,
) -> Option<(&'a Arc<TypeDescriptor>, &'a DynamicValue)> {
    loop {
        if !is_wrapper(ty) {
            return Some((ty, value));
        }
        match (ty.kind(), value) {
            (TypeKind::Optional(inner), DynamicValue::Optional(slot)) => {
                ty = inner;
                value = slot.as_deref()?;
            }
            (TypeKind::Any, DynamicValue::Any(slot)) => {
                let data = slot.as_deref()?;
                ty = &data.descriptor;
                value = &data.value;
            }
            _ => return None,
        }
    }
}

/// Unwrap `value` for writing.
///
/// An empty optional receives the zero value of its inner type. An empty
/// `any` slot is itself the destination. An occupied `any` slot is entered
/// only when its occupant accepts in-place writes (a map, an optional, a
/// registered or self-describing type); otherwise the slot is replaced.
pub(crate) fn resolve_target<'a>(
    registry: &Registry,
    mut ty: &'a Arc<TypeDescriptor>,
    mut value: &'a mut DynamicValue,
) -> Option<(&'a Arc<TypeDescriptor>, &'a mut DynamicValue)> {
    loop {
        if is_plain(ty) || registry.contains(ty) || has_convert_in(ty) {
            return Some((ty, value));
        }
        match ty.kind() {
            TypeKind::Optional(inner) => {
                let DynamicValue::Optional(slot) = value else {
                    return None;
                };
                let boxed = slot.get_or_insert_with(|| Box::new(DynamicValue::zero(inner)));
                ty = inner;
                value = &mut **boxed;
            }
            TypeKind::Any => {
                let enter = match &*value {
                    DynamicValue::Any(Some(data)) => accepts_in_place(registry, &data.descriptor),
                    DynamicValue::Any(None) => false,
                    _ => return None,
                };
                if !enter {
                    return Some((ty, value));
                }
                let DynamicValue::Any(Some(data)) = value else {
                    return None;
                };
                let DynamicData {
                    descriptor,
                    value: inner,
                } = &mut **data;
                ty = &*descriptor;
                value = inner;
            }
            _ => return Some((ty, value)),
        }
    }
}

fn accepts_in_place(registry: &Registry, occupant: &TypeDescriptor) -> bool {
    matches!(occupant.kind(), TypeKind::Map(_))
        || is_wrapper(occupant)
        || registry.contains(occupant)
        || has_convert_in(occupant)
}
