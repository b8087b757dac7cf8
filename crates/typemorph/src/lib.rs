// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # typemorph - runtime type conversion
//!
//! Converts a value of one runtime type into a slot of another, where both
//! types are only known at execution time: parsed configuration into
//! declared records, loose maps into typed structures and back, numbers
//! into text or bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use typemorph::dynamic::{DynamicData, DynamicValue, PrimitiveKind, TypeDescriptorBuilder};
//! use typemorph::Mapper;
//! use std::sync::Arc;
//!
//! let point = Arc::new(
//!     TypeDescriptorBuilder::new("Point")
//!         .field("x", PrimitiveKind::I32)
//!         .field("y", PrimitiveKind::I32)
//!         .build(),
//! );
//! let mut src = DynamicData::new(&point);
//! src.set("x", 3i32).unwrap();
//! src.set("y", -4i32).unwrap();
//!
//! let loose = typemorph::dynamic::map_of(
//!     typemorph::TypeDescriptor::builtin(PrimitiveKind::String),
//!     typemorph::TypeDescriptor::builtin(PrimitiveKind::String),
//! );
//! let mut dst = DynamicData::new(&loose);
//!
//! let mapper = Mapper::new();
//! mapper.convert(&src, &mut dst).unwrap();
//! let y = dst.get_entry(&DynamicValue::from("y")).unwrap();
//! assert_eq!(y, Some(&DynamicValue::from("-4")));
//! ```
//!
//! ## How a pair is resolved
//!
//! | Step | Rule |
//! |------|------|
//! | 1 | Override hook, if installed |
//! | 2 | Identical plain types are copied |
//! | 3 | `any` destinations are assigned |
//! | 4 | Source converts itself ([`extension::ConvertOut`]) |
//! | 5 | Destination fills itself ([`extension::ConvertIn`]) |
//! | 6 | Provider registered for the source type |
//! | 7 | Provider registered for the destination type |
//! | 8 | Built-in rules by structural kind |
//!
//! The outcome, including "no conversion", is cached per type pair.
//!
//! ## Modules Overview
//!
//! - [`dynamic`] - Runtime type model (descriptors, values, builders)
//! - [`registry`] - Per-type conversion providers
//! - [`extension`] - Self-describing conversion capabilities
//! - [`fields`] - External field names of record members
//! - [`providers`] - Built-in providers (timestamps, big integers, decimals, fractions)
//! - `json` - JSON bridge (feature `serde`)
//! - `schema` - Type declarations from TOML/YAML (feature `config-loaders`)

pub mod classify;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod extension;
pub mod fields;
mod mapper;
pub mod providers;
pub mod registry;
mod rules;

/// JSON bridge.
#[cfg(feature = "serde")]
pub mod json;
/// Type declarations loaded from files.
#[cfg(feature = "config-loaders")]
pub mod schema;

pub use config::{ByteOrder, MapperConfig, NameCase, NameTransform};
pub use dynamic::{DynamicData, DynamicValue, TypeDescriptor};
pub use error::{ConversionError, ErrorKind};
pub use mapper::{CacheStats, Mapper, MapperBuilder, Routine, Source, Target};
pub use registry::{OverrideHook, Provider, Registry};

#[cfg(feature = "config-loaders")]
pub use config::{ConfigError, MapperSettings};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
