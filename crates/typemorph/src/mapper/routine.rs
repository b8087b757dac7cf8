// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion routines and the value handles they operate on.

use crate::dynamic::{DynamicValue, TypeDescriptor};
use crate::error::ConversionError;
use crate::mapper::Mapper;
use std::fmt;
use std::sync::Arc;

type RoutineFn =
    dyn Fn(&Mapper, Source<'_>, Target<'_>) -> Result<(), ConversionError> + Send + Sync;

/// A resolved conversion for one type pair.
///
/// Cloning is cheap; clones share the same function.
#[derive(Clone)]
pub struct Routine {
    name: &'static str,
    func: Arc<RoutineFn>,
}

impl Routine {
    pub fn new<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&Mapper, Source<'_>, Target<'_>) -> Result<(), ConversionError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Routine that always fails with `err`.
    pub fn failing(name: &'static str, err: ConversionError) -> Self {
        Self::new(name, move |_, _, _| Err(err.clone()))
    }

    /// Short label, used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(
        &self,
        mapper: &Mapper,
        source: Source<'_>,
        target: Target<'_>,
    ) -> Result<(), ConversionError> {
        (self.func)(mapper, source, target)
    }
}

impl fmt::Debug for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Routine").field(&self.name).finish()
    }
}

/// Readable side of a conversion: a resolved value and its type.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    ty: &'a Arc<TypeDescriptor>,
    value: &'a DynamicValue,
}

impl<'a> Source<'a> {
    pub fn new(ty: &'a Arc<TypeDescriptor>, value: &'a DynamicValue) -> Self {
        Self { ty, value }
    }

    pub fn ty(&self) -> &'a Arc<TypeDescriptor> {
        self.ty
    }

    pub fn value(&self) -> &'a DynamicValue {
        self.value
    }
}

/// Writable side of a conversion: a resolved slot and its declared type.
#[derive(Debug)]
pub struct Target<'a> {
    ty: &'a Arc<TypeDescriptor>,
    value: &'a mut DynamicValue,
}

impl<'a> Target<'a> {
    pub fn new(ty: &'a Arc<TypeDescriptor>, value: &'a mut DynamicValue) -> Self {
        Self { ty, value }
    }

    pub fn ty(&self) -> &'a Arc<TypeDescriptor> {
        self.ty
    }

    pub fn value(&self) -> &DynamicValue {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut DynamicValue {
        self.value
    }

    /// Overwrite the slot.
    pub fn set(&mut self, value: DynamicValue) {
        *self.value = value;
    }

    pub fn into_parts(self) -> (&'a Arc<TypeDescriptor>, &'a mut DynamicValue) {
        (self.ty, self.value)
    }
}
