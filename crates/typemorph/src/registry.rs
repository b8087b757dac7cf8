// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion registry.
//!
//! Providers are keyed by type descriptor. When a source or destination
//! type has a provider, the provider decides: it either yields a routine
//! or declines, and a decline ends resolution for that pair.

use crate::dynamic::TypeDescriptor;
use crate::mapper::{Mapper, Routine};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Supplies conversion routines for pairs involving its type.
pub trait Provider: Send + Sync {
    /// Routine for `src -> dst`, or `None` to decline.
    fn routine(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine>;
}

impl<F> Provider for F
where
    F: Fn(&Mapper, &Arc<TypeDescriptor>, &Arc<TypeDescriptor>) -> Option<Routine> + Send + Sync,
{
    fn routine(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        self(mapper, src, dst)
    }
}

/// Consulted before every other rule. `None` falls through.
pub type OverrideHook =
    Arc<dyn Fn(&Mapper, &Arc<TypeDescriptor>, &Arc<TypeDescriptor>) -> Option<Routine> + Send + Sync>;

/// Registry that maps types to their conversion providers.
#[derive(Clone, Default)]
pub struct Registry {
    providers: HashMap<Arc<TypeDescriptor>, Arc<dyn Provider>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` for `desc`, replacing any previous one.
    pub fn register(&mut self, desc: Arc<TypeDescriptor>, provider: impl Provider + 'static) {
        self.providers.insert(desc, Arc::new(provider));
    }

    /// Register a closure provider.
    pub fn register_fn<F>(&mut self, desc: Arc<TypeDescriptor>, provider: F)
    where
        F: Fn(&Mapper, &Arc<TypeDescriptor>, &Arc<TypeDescriptor>) -> Option<Routine>
            + Send
            + Sync
            + 'static,
    {
        self.register(desc, provider);
    }

    /// Provider registered for `desc`.
    pub fn provider(&self, desc: &TypeDescriptor) -> Option<&Arc<dyn Provider>> {
        self.providers.get(desc)
    }

    pub fn contains(&self, desc: &TypeDescriptor) -> bool {
        self.providers.contains_key(desc)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered types.
    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.providers.keys()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.providers.keys().map(|k| k.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::PrimitiveKind;

    #[test]
    fn test_register_and_lookup() {
        let celsius = Arc::new(TypeDescriptor::primitive("Celsius", PrimitiveKind::F64));
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register_fn(celsius.clone(), |_, _, _| None);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&celsius));
        assert!(registry.provider(&TypeDescriptor::primitive("Celsius", PrimitiveKind::F64)).is_some());
        assert!(!registry.contains(&TypeDescriptor::builtin(PrimitiveKind::F64)));
        assert_eq!(format!("{:?}", registry), "{\"Celsius\"}");
    }

    #[test]
    fn test_clone_shares_providers() {
        let desc = Arc::new(TypeDescriptor::primitive("Id", PrimitiveKind::U32));
        let mut registry = Registry::new();
        registry.register_fn(desc.clone(), |_, _, _| None);
        let copy = registry.clone();
        assert!(Arc::ptr_eq(
            registry.provider(&desc).unwrap(),
            copy.provider(&desc).unwrap()
        ));
    }
}
