// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mapper configuration.
//!
//! [`MapperConfig`] is the in-memory form handed to
//! [`MapperBuilder`](crate::MapperBuilder). With the `config-loaders`
//! feature, [`MapperSettings`] loads the serializable subset from TOML or
//! YAML files.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maps a record member name to its external name.
pub type NameTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Byte order for numeric <-> byte-sequence conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

/// Engine options.
#[derive(Clone)]
pub struct MapperConfig {
    /// Require identical nominal types for scalar, sequence and map conversions.
    pub strict_types: bool,
    /// Tag consulted for external field names. Empty disables tags.
    pub tag_key: String,
    /// Splits a field name into a nested path. Empty disables nesting.
    pub path_separator: String,
    /// Applied to untagged member names.
    pub name_transform: Option<NameTransform>,
    pub byte_order: ByteOrder,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            strict_types: false,
            tag_key: "map".to_string(),
            path_separator: ".".to_string(),
            name_transform: None,
            byte_order: ByteOrder::BigEndian,
        }
    }
}

impl fmt::Debug for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfig")
            .field("strict_types", &self.strict_types)
            .field("tag_key", &self.tag_key)
            .field("path_separator", &self.path_separator)
            .field("name_transform", &self.name_transform.as_ref().map(|_| "<fn>"))
            .field("byte_order", &self.byte_order)
            .finish()
    }
}

/// Named member-name transforms, for file-based configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NameCase {
    #[default]
    AsIs,
    Lower,
    Upper,
    Snake,
    Camel,
}

impl NameCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::AsIs => name.to_string(),
            Self::Lower => name.to_lowercase(),
            Self::Upper => name.to_uppercase(),
            Self::Snake => to_snake_case(name),
            Self::Camel => to_camel_case(name),
        }
    }

    /// Function form; `None` for [`NameCase::AsIs`].
    pub fn into_transform(self) -> Option<NameTransform> {
        match self {
            Self::AsIs => None,
            case => Some(Arc::new(move |name: &str| case.apply(name))),
        }
    }
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn to_camel_case(name: &str) -> String {
    let snake = to_snake_case(name);
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(feature = "config-loaders")]
pub use loaders::{ConfigError, MapperSettings};

#[cfg(feature = "config-loaders")]
mod loaders {
    use super::{ByteOrder, MapperConfig, NameCase};
    use serde::{Deserialize, Serialize};
    use std::path::Path;
    use thiserror::Error;

    /// Configuration errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        #[error("TOML parse error: {0}")]
        Toml(#[from] toml::de::Error),

        #[error("TOML encode error: {0}")]
        TomlEncode(#[from] toml::ser::Error),

        #[error("YAML parse error: {0}")]
        Yaml(#[from] serde_yaml::Error),

        #[error("Invalid configuration: {0}")]
        Invalid(String),
    }

    /// File-loadable mapper settings.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MapperSettings {
        /// Require identical nominal types for scalar conversions.
        #[serde(default)]
        pub strict_types: bool,

        /// Tag consulted for external field names.
        #[serde(default = "default_tag_key")]
        pub tag_key: String,

        /// Nested path separator.
        #[serde(default = "default_path_separator")]
        pub path_separator: String,

        /// Transform applied to untagged member names.
        #[serde(default)]
        pub name_case: NameCase,

        /// Byte order for numeric <-> bytes.
        #[serde(default)]
        pub byte_order: ByteOrder,
    }

    fn default_tag_key() -> String {
        "map".to_string()
    }

    fn default_path_separator() -> String {
        ".".to_string()
    }

    impl Default for MapperSettings {
        fn default() -> Self {
            Self {
                strict_types: false,
                tag_key: default_tag_key(),
                path_separator: default_path_separator(),
                name_case: NameCase::AsIs,
                byte_order: ByteOrder::BigEndian,
            }
        }
    }

    impl MapperSettings {
        pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
            let settings: Self = toml::from_str(content)?;
            settings.validate()?;
            Ok(settings)
        }

        pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
            let settings: Self = serde_yaml::from_str(content)?;
            settings.validate()?;
            Ok(settings)
        }

        /// Load from a `.toml`, `.yaml` or `.yml` file.
        pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("yaml" | "yml") => Self::from_yaml_str(&content),
                Some("toml") | None => Self::from_toml_str(&content),
                Some(other) => Err(ConfigError::Invalid(format!(
                    "unsupported settings format: .{}",
                    other
                ))),
            }
        }

        pub fn to_toml_string(&self) -> Result<String, ConfigError> {
            Ok(toml::to_string_pretty(self)?)
        }

        /// Validate the settings.
        pub fn validate(&self) -> Result<(), ConfigError> {
            if self.path_separator.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(
                    "path_separator must not contain whitespace".into(),
                ));
            }
            let tag_ok = self
                .tag_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !tag_ok {
                return Err(ConfigError::Invalid(format!(
                    "tag_key '{}' is not an identifier",
                    self.tag_key
                )));
            }
            Ok(())
        }

        pub fn into_config(self) -> MapperConfig {
            MapperConfig {
                strict_types: self.strict_types,
                tag_key: self.tag_key,
                path_separator: self.path_separator,
                name_transform: self.name_case.into_transform(),
                byte_order: self.byte_order,
            }
        }
    }
}
