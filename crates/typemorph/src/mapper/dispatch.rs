// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-pair resolution.
//!
//! Resolution walks an ordered list of strategies; the first one that
//! produces a routine or a terminal refusal wins. Results, refusals
//! included, are memoized per type pair for the lifetime of the mapper.

use crate::classify::{has_convert_in, has_convert_out, is_plain};
use crate::dynamic::{DynamicData, DynamicValue, TypeDescriptor, TypeKind};
use crate::error::ConversionError;
use crate::mapper::{Mapper, Routine};
use crate::rules;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Outcome of one strategy.
pub(crate) enum Resolution {
    Routine(Routine),
    /// Terminal: no later strategy is consulted.
    NoConversion,
    Continue,
}

/// One step of the precedence chain.
pub(crate) trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution;
}

struct OverrideHook;

impl Strategy for OverrideHook {
    fn name(&self) -> &'static str {
        "override-hook"
    }

    fn resolve(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        match mapper.hook.as_ref().and_then(|hook| hook(mapper, src, dst)) {
            Some(routine) => Resolution::Routine(routine),
            None => Resolution::Continue,
        }
    }
}

struct DirectCopy;

impl Strategy for DirectCopy {
    fn name(&self) -> &'static str {
        "direct-copy"
    }

    fn resolve(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        if src == dst && is_plain(src) {
            Resolution::Routine(Routine::new("copy", |_, source, mut target| {
                target.set(source.value().clone());
                Ok(())
            }))
        } else {
            Resolution::Continue
        }
    }
}

struct AnySlot;

impl Strategy for AnySlot {
    fn name(&self) -> &'static str {
        "any-slot"
    }

    fn resolve(
        &self,
        _: &Mapper,
        _: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        if !matches!(dst.kind(), TypeKind::Any) {
            return Resolution::Continue;
        }
        Resolution::Routine(Routine::new("assign-any", |_, source, mut target| {
            match target.value_mut() {
                DynamicValue::Any(Some(occupant)) if occupant.descriptor == *source.ty() => {
                    occupant.value = source.value().clone();
                }
                slot => {
                    *slot = DynamicValue::Any(Some(Box::new(DynamicData {
                        descriptor: Arc::clone(source.ty()),
                        value: source.value().clone(),
                    })));
                }
            }
            Ok(())
        }))
    }
}

struct SelfConvertOut;

impl Strategy for SelfConvertOut {
    fn name(&self) -> &'static str {
        "convert-out"
    }

    fn resolve(
        &self,
        _: &Mapper,
        src: &Arc<TypeDescriptor>,
        _: &Arc<TypeDescriptor>,
    ) -> Resolution {
        if !has_convert_out(src) {
            return Resolution::Continue;
        }
        Resolution::Routine(Routine::new("convert-out", |mapper, source, target| {
            let capability = match source.value() {
                DynamicValue::Opaque(obj) => obj.capability_out(),
                _ => None,
            };
            match capability {
                Some(capability) => capability.convert_out(mapper, target),
                None => Err(ConversionError::invalid_source(source.ty(), target.ty())),
            }
        }))
    }
}

struct SelfConvertIn;

impl Strategy for SelfConvertIn {
    fn name(&self) -> &'static str {
        "convert-in"
    }

    fn resolve(
        &self,
        _: &Mapper,
        _: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        if !has_convert_in(dst) {
            return Resolution::Continue;
        }
        Resolution::Routine(Routine::new("convert-in", |mapper, source, target| {
            let ty = target.ty();
            let (_, value) = target.into_parts();
            let capability = match value {
                DynamicValue::Opaque(obj) => obj.capability_in(),
                _ => None,
            };
            match capability {
                Some(capability) => capability.convert_in(mapper, source),
                None => Err(ConversionError::invalid_destination(source.ty(), ty)),
            }
        }))
    }
}

/// Registry lookup keyed by one side of the pair.
struct RegistryProvider {
    by_source: bool,
}

impl Strategy for RegistryProvider {
    fn name(&self) -> &'static str {
        if self.by_source {
            "source-provider"
        } else {
            "destination-provider"
        }
    }

    fn resolve(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        let key = if self.by_source { src } else { dst };
        let Some(provider) = mapper.registry.provider(key) else {
            return Resolution::Continue;
        };
        match provider.routine(mapper, src, dst) {
            Some(routine) => Resolution::Routine(routine),
            None => {
                log::debug!("[registry] provider for {} declined {} -> {}", key, src, dst);
                Resolution::NoConversion
            }
        }
    }
}

struct Builtin;

impl Strategy for Builtin {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn resolve(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Resolution {
        match rules::builtin(mapper, src, dst) {
            Some(routine) => Resolution::Routine(routine),
            None => Resolution::NoConversion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypePair {
    src: Arc<TypeDescriptor>,
    dst: Arc<TypeDescriptor>,
}

/// Snapshot of the type-pair cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached pairs, refusals included.
    pub entries: usize,
    /// Cached pairs with no routine.
    pub unsupported: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Ordered strategies plus the memo table.
pub(crate) struct Dispatcher {
    strategies: Vec<Box<dyn Strategy>>,
    cache: Mutex<HashMap<TypePair, Option<Routine>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(OverrideHook),
                Box::new(DirectCopy),
                Box::new(AnySlot),
                Box::new(SelfConvertOut),
                Box::new(SelfConvertIn),
                Box::new(RegistryProvider { by_source: true }),
                Box::new(RegistryProvider { by_source: false }),
                Box::new(Builtin),
            ],
            cache: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Routine for `src -> dst`, memoized.
    pub(crate) fn resolve(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        let pair = TypePair {
            src: Arc::clone(src),
            dst: Arc::clone(dst),
        };
        let cached = self.cache.lock().get(&pair).cloned();
        if let Some(entry) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return entry;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        log::trace!("[dispatch] cache miss {} -> {}", src, dst);

        // Computed without the lock held; concurrent first writes are
        // idempotent and the first one stored wins.
        let resolved = self.compute(mapper, src, dst);
        self.cache.lock().entry(pair).or_insert(resolved).clone()
    }

    fn compute(
        &self,
        mapper: &Mapper,
        src: &Arc<TypeDescriptor>,
        dst: &Arc<TypeDescriptor>,
    ) -> Option<Routine> {
        for strategy in &self.strategies {
            match strategy.resolve(mapper, src, dst) {
                Resolution::Routine(routine) => {
                    log::trace!(
                        "[dispatch] {} -> {} resolved by {} ({})",
                        src,
                        dst,
                        strategy.name(),
                        routine.name()
                    );
                    return Some(routine);
                }
                Resolution::NoConversion => {
                    log::debug!(
                        "[dispatch] no conversion {} -> {} (refused by {})",
                        src,
                        dst,
                        strategy.name()
                    );
                    return None;
                }
                Resolution::Continue => {}
            }
        }
        None
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        CacheStats {
            entries: cache.len(),
            unsupported: cache.values().filter(|r| r.is_none()).count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{named, PrimitiveKind};

    fn names(dispatcher: &Dispatcher) -> Vec<&'static str> {
        dispatcher.strategies.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            names(&Dispatcher::new()),
            [
                "override-hook",
                "direct-copy",
                "any-slot",
                "convert-out",
                "convert-in",
                "source-provider",
                "destination-provider",
                "builtin",
            ]
        );
    }

    #[test]
    fn test_direct_copy_only_for_identical_plain_types() {
        let mapper = Mapper::new();
        let i64_ty = TypeDescriptor::builtin(PrimitiveKind::I64);
        let alias = named("Id", &i64_ty);
        assert!(matches!(
            DirectCopy.resolve(&mapper, &i64_ty, &i64_ty),
            Resolution::Routine(_)
        ));
        assert!(matches!(
            DirectCopy.resolve(&mapper, &alias, &alias),
            Resolution::Continue
        ));
    }

    #[test]
    fn test_declining_provider_is_terminal() {
        let id = named("Id", &TypeDescriptor::builtin(PrimitiveKind::I64));
        let mapper = Mapper::builder()
            .register_fn(id.clone(), |_, _, _| None)
            .build();
        let strategy = RegistryProvider { by_source: true };
        let string = TypeDescriptor::builtin(PrimitiveKind::String);
        assert!(matches!(
            strategy.resolve(&mapper, &id, &string),
            Resolution::NoConversion
        ));
        assert!(matches!(
            strategy.resolve(&mapper, &string, &id),
            Resolution::Continue
        ));
        assert!(mapper.dispatcher.resolve(&mapper, &id, &string).is_none());
    }

    #[test]
    fn test_refusals_are_cached() {
        let mapper = Mapper::new();
        let bool_ty = TypeDescriptor::builtin(PrimitiveKind::Bool);
        let map_ty = Arc::new(TypeDescriptor::map(bool_ty.clone(), bool_ty.clone()));
        assert!(mapper.dispatcher.resolve(&mapper, &bool_ty, &map_ty).is_none());
        assert!(mapper.dispatcher.resolve(&mapper, &bool_ty, &map_ty).is_none());
        let stats = mapper.cache_stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.unsupported, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }
}
