// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type declarations loaded from TOML or YAML.
//!
//! ```toml
//! root = "Server"
//!
//! [types.Port]
//! alias = "u16"
//!
//! [types.Server]
//! fields = [
//!     { name = "host", type = "string", tags = { map = "net.host" } },
//!     { name = "port", type = "Port", tags = { map = "net.port" } },
//!     { name = "labels", type = "map[string]string" },
//! ]
//! ```
//!
//! Type expressions: primitive names, `any`, `bytes`, `timestamp`, `bigint`,
//! `decimal`, `rational`, `[]T`, `[N]T`, `map[K]V`, `?T`, or a declared
//! name. Declarations may refer to each other in any order, but not to
//! themselves.

use crate::dynamic::{
    array_of, map_of, named, optional_of, sequence_of, MemberDescriptor, PrimitiveKind,
    TypeDescriptor,
};
use crate::providers::{BigInteger, Decimal, Rational, Timestamp};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Schema loading errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid type expression '{expr}': {reason}")]
    InvalidExpr { expr: String, reason: String },

    #[error("unknown type '{0}'")]
    UnknownType(String),

    #[error("type '{0}' refers to itself")]
    Cycle(String),

    #[error("invalid schema: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    root: Option<String>,
    #[serde(default)]
    types: BTreeMap<String, TypeDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDecl {
    fields: Option<Vec<FieldDecl>>,
    alias: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDecl {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Resolved type declarations.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: BTreeMap<String, Arc<TypeDescriptor>>,
    root: Option<String>,
}

impl Schema {
    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        Self::from_document(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        Self::from_document(serde_yaml::from_str(content)?)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("toml") | None => Self::from_toml_str(&content),
            Some(other) => Err(SchemaError::Invalid(format!(
                "unsupported schema format: .{}",
                other
            ))),
        }
    }

    fn from_document(doc: Document) -> Result<Self, SchemaError> {
        let mut resolver = Resolver {
            decls: &doc.types,
            done: BTreeMap::new(),
            stack: Vec::new(),
        };
        for name in doc.types.keys() {
            resolver.resolve(name)?;
        }
        let types = resolver.done;
        if let Some(root) = &doc.root {
            if !types.contains_key(root) {
                return Err(SchemaError::UnknownType(root.clone()));
            }
        }
        log::debug!("[schema] loaded {} types (root: {:?})", types.len(), doc.root);
        Ok(Self {
            types,
            root: doc.root,
        })
    }

    /// Declared type `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(name)
    }

    /// The type named by `root`, if the document has one.
    pub fn root(&self) -> Option<&Arc<TypeDescriptor>> {
        self.root.as_deref().and_then(|name| self.get(name))
    }

    /// Declared type names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Parse a type expression, resolving names against `schema`.
pub fn parse_type_expr(expr: &str, schema: &Schema) -> Result<Arc<TypeDescriptor>, SchemaError> {
    parse(expr, &mut |name| {
        schema
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    })
}

struct Resolver<'a> {
    decls: &'a BTreeMap<String, TypeDecl>,
    done: BTreeMap<String, Arc<TypeDescriptor>>,
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Arc<TypeDescriptor>, SchemaError> {
        if let Some(desc) = self.done.get(name) {
            return Ok(Arc::clone(desc));
        }
        if self.stack.iter().any(|n| n == name) {
            return Err(SchemaError::Cycle(name.to_string()));
        }
        let decls = self.decls;
        let decl = decls
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;

        self.stack.push(name.to_string());
        let desc = match (&decl.fields, &decl.alias) {
            (Some(fields), None) => {
                let mut members = Vec::with_capacity(fields.len());
                for field in fields {
                    let ty = parse(&field.ty, &mut |n| self.resolve(n))?;
                    let mut member = MemberDescriptor::new(&field.name, ty);
                    for (key, value) in &field.tags {
                        member = member.tag(key, value);
                    }
                    members.push(member);
                }
                Arc::new(TypeDescriptor::struct_type(name, members))
            }
            (None, Some(alias)) => {
                let base = parse(alias, &mut |n| self.resolve(n))?;
                named(name, &base)
            }
            _ => {
                return Err(SchemaError::Invalid(format!(
                    "type '{}' needs exactly one of 'fields' or 'alias'",
                    name
                )))
            }
        };
        self.stack.pop();
        self.done.insert(name.to_string(), Arc::clone(&desc));
        Ok(desc)
    }
}

type Lookup<'l> = dyn FnMut(&str) -> Result<Arc<TypeDescriptor>, SchemaError> + 'l;

fn parse(expr: &str, lookup: &mut Lookup<'_>) -> Result<Arc<TypeDescriptor>, SchemaError> {
    let invalid = |reason: &str| SchemaError::InvalidExpr {
        expr: expr.to_string(),
        reason: reason.to_string(),
    };
    let e = expr.trim();
    if e.is_empty() {
        return Err(invalid("empty"));
    }
    if let Some(inner) = e.strip_prefix('?') {
        return Ok(optional_of(parse(inner, lookup)?));
    }
    if let Some(element) = e.strip_prefix("[]") {
        return Ok(sequence_of(parse(element, lookup)?));
    }
    if let Some(rest) = e.strip_prefix("map[") {
        let close = matching_bracket(rest).ok_or_else(|| invalid("unbalanced brackets"))?;
        let key = parse(&rest[..close], lookup)?;
        let value = parse(&rest[close + 1..], lookup)?;
        return Ok(map_of(key, value));
    }
    if let Some(rest) = e.strip_prefix('[') {
        let (len, element) = rest
            .split_once(']')
            .ok_or_else(|| invalid("unbalanced brackets"))?;
        let len = len
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid("array length must be a number"))?;
        return Ok(array_of(parse(element, lookup)?, len));
    }
    if !e.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("unexpected character"));
    }
    match e {
        "any" => Ok(TypeDescriptor::any()),
        "bytes" => Ok(TypeDescriptor::bytes()),
        "timestamp" => Ok(Timestamp::descriptor()),
        "bigint" => Ok(BigInteger::descriptor()),
        "decimal" => Ok(Decimal::descriptor()),
        "rational" => Ok(Rational::descriptor()),
        name => match PrimitiveKind::from_name(name) {
            Some(kind) => Ok(TypeDescriptor::builtin(kind)),
            None => lookup(name),
        },
    }
}

/// Index of the `]` closing an already-opened bracket.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::TypeKind;
    use std::io::Write;

    const SERVER: &str = r#"
root = "Server"

[types.Server]
fields = [
    { name = "host", type = "string", tags = { map = "net.host" } },
    { name = "port", type = "Port" },
    { name = "routes", type = "map[string][]Route" },
]

[types.Route]
fields = [{ name = "path", type = "string" }, { name = "weight", type = "?f64" }]

[types.Port]
alias = "u16"
"#;

    #[test]
    fn test_declarations_resolve_in_any_order() {
        let schema = Schema::from_toml_str(SERVER).unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), ["Port", "Route", "Server"]);
        let server = schema.root().unwrap();
        assert_eq!(server.name(), "Server");
        let members = server.members().unwrap();
        assert_eq!(members[0].tag_value("map"), Some("net.host"));
        assert_eq!(members[1].type_desc.to_string(), "Port");
        assert_eq!(members[2].type_desc.to_string(), "map[string][]Route");
        assert_eq!(schema.get("Port").unwrap().primitive_kind(), Some(PrimitiveKind::U16));
    }

    #[test]
    fn test_type_expressions() {
        let schema = Schema::from_toml_str(SERVER).unwrap();
        let parsed = |e: &str| parse_type_expr(e, &schema).map(|d| d.to_string());
        assert_eq!(parsed("[4]u8").unwrap(), "[4]u8");
        assert_eq!(parsed("map[string]map[i32]?any").unwrap(), "map[string]map[i32]?any");
        assert_eq!(parsed(" bytes ").unwrap(), "[]u8");
        assert_eq!(parsed("[]Port").unwrap(), "[]Port");
        assert!(matches!(
            parse_type_expr("timestamp", &schema).unwrap().kind(),
            TypeKind::Opaque(_)
        ));
        assert_eq!(parse_type_expr("?decimal", &schema).unwrap().to_string(), "?decimal");
        assert!(Arc::ptr_eq(
            &parse_type_expr("rational", &schema).unwrap(),
            &Rational::descriptor()
        ));
        assert!(matches!(parsed("Missing"), Err(SchemaError::UnknownType(_))));
        assert!(matches!(parsed("[x]u8"), Err(SchemaError::InvalidExpr { .. })));
        assert!(matches!(parsed("map[string"), Err(SchemaError::InvalidExpr { .. })));
        assert!(matches!(parsed("a-b"), Err(SchemaError::InvalidExpr { .. })));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let doc = "[types.Node]\nfields = [{ name = \"next\", type = \"?Node\" }]\n";
        assert!(matches!(Schema::from_toml_str(doc), Err(SchemaError::Cycle(n)) if n == "Node"));

        let doc = "[types.A]\nalias = \"B\"\n[types.B]\nalias = \"[]A\"\n";
        assert!(matches!(Schema::from_toml_str(doc), Err(SchemaError::Cycle(_))));
    }

    #[test]
    fn test_invalid_declarations() {
        let both = "[types.X]\nalias = \"u8\"\nfields = []\n";
        assert!(matches!(Schema::from_toml_str(both), Err(SchemaError::Invalid(_))));
        let bad_root = "root = \"Nope\"\n[types.X]\nalias = \"u8\"\n";
        assert!(matches!(Schema::from_toml_str(bad_root), Err(SchemaError::UnknownType(_))));
        assert!(Schema::from_toml_str("[types.X]\nshape = \"u8\"\n").is_err());
    }

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "types:\n  Reading:\n    fields:\n      - {{ name: at, type: timestamp }}\n      - {{ name: value, type: f32 }}"
        )
        .unwrap();
        let schema = Schema::from_file(file.path()).unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.root().is_none());
        assert_eq!(
            schema.get("Reading").unwrap().members().unwrap()[1].type_desc.to_string(),
            "f32"
        );
    }
}
