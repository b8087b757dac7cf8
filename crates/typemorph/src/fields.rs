// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! External field names of record members.
//!
//! The external name of a member comes from, in order: its tag under the
//! configured tag key, the configured name transform, the member name.
//! A tag value of `-` excludes the member. The name is split on the path
//! separator into a nested path.

use crate::config::MapperConfig;
use crate::dynamic::TypeDescriptor;

const SKIP_TAG: &str = "-";

/// Resolved external view of one record member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Position of the member in the record.
    pub index: usize,
    /// External name, separators included.
    pub name: String,
    /// `name` split on the path separator.
    pub path: Vec<String>,
    /// Member is excluded from conversions.
    pub skip: bool,
}

impl FieldDescriptor {
    /// Name of the innermost path segment.
    pub fn leaf(&self) -> &str {
        self.path.last().map_or(self.name.as_str(), String::as_str)
    }

    pub fn is_nested(&self) -> bool {
        self.path.len() > 1
    }
}

/// Field descriptors of every member of `desc`, in declaration order.
///
/// Non-record descriptors have no fields.
pub fn describe(config: &MapperConfig, desc: &TypeDescriptor) -> Vec<FieldDescriptor> {
    let Some(members) = desc.members() else {
        return Vec::new();
    };
    members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let tag = if config.tag_key.is_empty() {
                None
            } else {
                member.tag_value(&config.tag_key).filter(|t| !t.is_empty())
            };
            let (name, skip) = match tag {
                Some(SKIP_TAG) => (member.name.clone(), true),
                Some(tag) => (tag.to_string(), false),
                None => match &config.name_transform {
                    Some(transform) => (transform(&member.name), false),
                    None => (member.name.clone(), false),
                },
            };
            let path = if config.path_separator.is_empty() {
                vec![name.clone()]
            } else {
                name.split(config.path_separator.as_str())
                    .map(str::to_string)
                    .collect()
            };
            FieldDescriptor {
                index,
                name,
                path,
                skip,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameCase;
    use crate::dynamic::{MemberDescriptor, PrimitiveKind, TypeDescriptorBuilder};

    fn record() -> TypeDescriptor {
        let i64_ty = TypeDescriptor::builtin(PrimitiveKind::I64);
        TypeDescriptorBuilder::new("Record")
            .tagged_field("Foo", i64_ty.clone(), "map", "bar")
            .tagged_field("Nested", i64_ty.clone(), "map", "a.b.foo")
            .tagged_field("Hidden", i64_ty.clone(), "map", "-")
            .member(MemberDescriptor::new("PlainName", i64_ty.clone()).tag("json", "plain"))
            .build()
    }

    #[test]
    fn test_default_tags() {
        let fields = describe(&MapperConfig::default(), &record());
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, "bar");
        assert_eq!(fields[1].path, ["a", "b", "foo"]);
        assert_eq!(fields[1].leaf(), "foo");
        assert!(fields[1].is_nested());
        assert!(fields[2].skip);
        assert_eq!(fields[3].name, "PlainName");
        assert_eq!(fields[3].index, 3);
    }

    #[test]
    fn test_custom_tag_key() {
        let config = MapperConfig {
            tag_key: "json".into(),
            ..MapperConfig::default()
        };
        let fields = describe(&config, &record());
        assert_eq!(fields[0].name, "Foo");
        assert!(!fields[2].skip);
        assert_eq!(fields[3].name, "plain");
    }

    #[test]
    fn test_empty_tag_key_and_separator() {
        let config = MapperConfig {
            tag_key: String::new(),
            path_separator: String::new(),
            ..MapperConfig::default()
        };
        let fields = describe(&config, &record());
        assert_eq!(fields[1].name, "Nested");
        assert!(fields.iter().all(|f| !f.skip && !f.is_nested()));

        let config = MapperConfig {
            path_separator: String::new(),
            ..MapperConfig::default()
        };
        let fields = describe(&config, &record());
        assert_eq!(fields[1].path, ["a.b.foo"]);
    }

    #[test]
    fn test_name_transform_only_for_untagged() {
        let config = MapperConfig {
            name_transform: NameCase::Snake.into_transform(),
            ..MapperConfig::default()
        };
        let fields = describe(&config, &record());
        assert_eq!(fields[0].name, "bar");
        assert_eq!(fields[3].name, "plain_name");
    }

    #[test]
    fn test_non_record_has_no_fields() {
        let desc = TypeDescriptor::builtin(PrimitiveKind::Bool);
        assert!(describe(&MapperConfig::default(), &desc).is_empty());
    }
}
