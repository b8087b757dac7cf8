// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The conversion engine.
//!
//! A [`Mapper`] owns its configuration, its provider registry and its
//! type-pair cache. Build one with [`Mapper::builder`], or derive one from
//! an existing mapper with [`Mapper::to_builder`]; the configuration is
//! fixed once built, so cached routines never go stale.
//!
//! ```rust
//! use typemorph::dynamic::{DynamicData, PrimitiveKind, TypeDescriptor};
//! use typemorph::Mapper;
//!
//! let mapper = Mapper::builder().strict_types(false).build();
//! let src = DynamicData::from_native("0x2a".to_string());
//! let mut dst = DynamicData::new(&TypeDescriptor::builtin(PrimitiveKind::U8));
//! mapper.convert(&src, &mut dst).unwrap();
//! assert_eq!(dst.to_native::<u8>().unwrap(), 42);
//! ```

mod dispatch;
mod resolve;
mod routine;

pub use dispatch::CacheStats;
pub(crate) use resolve::{resolve_source, resolve_target};
pub use routine::{Routine, Source, Target};

use crate::config::{ByteOrder, MapperConfig, NameTransform};
use crate::dynamic::{DynamicData, DynamicValue, NativeValue, TypeDescriptor};
use crate::error::ConversionError;
use crate::fields::{self, FieldDescriptor};
use crate::providers;
use crate::registry::{OverrideHook, Provider, Registry};
use dashmap::DashMap;
use dispatch::Dispatcher;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Runtime type conversion engine.
pub struct Mapper {
    config: MapperConfig,
    registry: Registry,
    hook: Option<OverrideHook>,
    dispatcher: Dispatcher,
    fields: DashMap<Arc<TypeDescriptor>, Arc<[FieldDescriptor]>>,
}

impl Mapper {
    /// Mapper with the default configuration and no providers.
    pub fn new() -> Self {
        MapperBuilder::new().build()
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    /// Builder seeded with this mapper's configuration, registry and hook.
    ///
    /// The derived mapper starts with an empty cache.
    pub fn to_builder(&self) -> MapperBuilder {
        MapperBuilder {
            config: self.config.clone(),
            registry: self.registry.clone(),
            hook: self.hook.clone(),
        }
    }

    /// Shared default mapper with the built-in providers registered.
    ///
    /// Meant as a starting point for [`Mapper::to_builder`].
    pub fn prototype() -> &'static Mapper {
        static PROTOTYPE: OnceLock<Mapper> = OnceLock::new();
        PROTOTYPE.get_or_init(|| MapperBuilder::new().with_default_providers().build())
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Convert `src` into `dst`, in place.
    pub fn convert(&self, src: &DynamicData, dst: &mut DynamicData) -> Result<(), ConversionError> {
        let (dst_ty, dst_value) = dst.parts_mut();
        self.convert_value(&src.descriptor, &src.value, dst_ty, dst_value)
    }

    /// Convert a raw value of type `src_ty` into a slot of type `dst_ty`.
    ///
    /// This is the re-entry point for routines that convert nested values.
    pub fn convert_value(
        &self,
        src_ty: &Arc<TypeDescriptor>,
        src: &DynamicValue,
        dst_ty: &Arc<TypeDescriptor>,
        dst: &mut DynamicValue,
    ) -> Result<(), ConversionError> {
        let (from, value) = resolve_source(src_ty, src)
            .ok_or_else(|| ConversionError::invalid_source(src_ty, dst_ty))?;
        let (to, slot) = resolve_target(&self.registry, dst_ty, dst)
            .ok_or_else(|| ConversionError::invalid_destination(src_ty, dst_ty))?;
        let routine = self
            .dispatcher
            .resolve(self, from, to)
            .ok_or_else(|| ConversionError::unsupported(from, to))?;
        routine.call(self, Source::new(from, value), Target::new(to, slot))
    }

    /// Convert `src` into a fresh value of native type `T`.
    pub fn convert_native<T: NativeValue>(&self, src: &DynamicData) -> Result<T, ConversionError> {
        let descriptor = T::descriptor();
        let mut dst = DynamicData::new(&descriptor);
        self.convert(src, &mut dst)?;
        dst.to_native::<T>().map_err(|e| {
            ConversionError::invalid_destination(&src.descriptor, &descriptor)
                .with_reason(e.to_string())
        })
    }

    /// Resolved routine for a type pair, if any. Uses the cache.
    pub fn routine(&self, src: &Arc<TypeDescriptor>, dst: &Arc<TypeDescriptor>) -> Option<Routine> {
        self.dispatcher.resolve(self, src, dst)
    }

    /// Field descriptors of a record type, computed once per type.
    pub fn field_descriptors(&self, desc: &Arc<TypeDescriptor>) -> Arc<[FieldDescriptor]> {
        if let Some(cached) = self.fields.get(desc) {
            return Arc::clone(cached.value());
        }
        let computed: Arc<[FieldDescriptor]> = fields::describe(&self.config, desc).into();
        Arc::clone(
            self.fields
                .entry(Arc::clone(desc))
                .or_insert(computed)
                .value(),
        )
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.dispatcher.stats()
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("hook", &self.hook.as_ref().map(|_| "<fn>"))
            .field("cache", &self.dispatcher.stats())
            .finish()
    }
}

/// Builder for [`Mapper`].
#[derive(Clone, Default)]
pub struct MapperBuilder {
    config: MapperConfig,
    registry: Registry,
    hook: Option<OverrideHook>,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict_types(mut self, strict: bool) -> Self {
        self.config.strict_types = strict;
        self
    }

    pub fn tag_key(mut self, tag_key: impl Into<String>) -> Self {
        self.config.tag_key = tag_key.into();
        self
    }

    pub fn path_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.path_separator = separator.into();
        self
    }

    pub fn name_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let transform: NameTransform = Arc::new(transform);
        self.config.name_transform = Some(transform);
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.config.byte_order = order;
        self
    }

    /// Register a provider for `desc`.
    pub fn register(mut self, desc: Arc<TypeDescriptor>, provider: impl Provider + 'static) -> Self {
        self.registry.register(desc, provider);
        self
    }

    /// Register a closure provider for `desc`.
    pub fn register_fn<F>(self, desc: Arc<TypeDescriptor>, provider: F) -> Self
    where
        F: Fn(&Mapper, &Arc<TypeDescriptor>, &Arc<TypeDescriptor>) -> Option<Routine>
            + Send
            + Sync
            + 'static,
    {
        self.register(desc, provider)
    }

    /// Install a hook consulted before every other resolution rule.
    pub fn override_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Mapper, &Arc<TypeDescriptor>, &Arc<TypeDescriptor>) -> Option<Routine>
            + Send
            + Sync
            + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Register the built-in providers (timestamps, big integers, decimals,
    /// fractions).
    pub fn with_default_providers(mut self) -> Self {
        providers::register_defaults(&mut self.registry);
        self
    }

    pub fn build(self) -> Mapper {
        log::debug!(
            "[dispatch] mapper built: strict={} tag='{}' separator='{}' providers={}",
            self.config.strict_types,
            self.config.tag_key,
            self.config.path_separator,
            self.registry.len()
        );
        Mapper {
            config: self.config,
            registry: self.registry,
            hook: self.hook,
            dispatcher: Dispatcher::new(),
            fields: DashMap::new(),
        }
    }
}
