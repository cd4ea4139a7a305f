// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML class declaration loader.
//!
//! Declares classes from a YAML document instead of builder calls.
//!
//! # Example YAML
//!
//! ```yaml
//! classes:
//!   - name: Toy
//!     options: { type_check: coerce }
//!     attributes:
//!       - { name: kind, type: symbol }
//!
//!   - name: Child
//!     options:
//!       type_check: coerce
//!       coerce_blanks_to_nil: true
//!     attributes:
//!       - { name: name, type: string, disallow: null }
//!       - { name: age, type: integer, default: 0 }
//!       - { name: toys, type: "sequence_of(Toy)", default: [] }
//! ```
//!
//! Classes register in document order, so a parent or a referenced class
//! must appear before its users.

use crate::defaults::TypeDefaults;
use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::AttributeError;
use crate::options::{DefaultTo, OptionsPatch, TypeCheckMode};
use crate::schema::{AttributeDecl, ClassBuilder, ClassSchema};
use crate::store::ClassRegistry;
use crate::value::{Mapping, Value};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// YAML class loader.
pub struct YamlLoader;

/// Root YAML document structure.
#[derive(Debug, Deserialize)]
pub struct YamlSchemaDocument {
    #[serde(default)]
    pub classes: Vec<YamlClass>,
}

/// One class declaration.
#[derive(Debug, Deserialize)]
pub struct YamlClass {
    pub name: String,

    /// Parent class name
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub options: YamlOptions,

    #[serde(default)]
    pub attributes: Vec<YamlAttribute>,
}

/// Class options; absent keys inherit.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlOptions {
    pub ignore_extra_keys: Option<bool>,

    /// strict or coerce
    pub type_check: Option<TypeCheckMode>,

    pub coerce_blanks_to_nil: Option<bool>,

    pub default_to: Option<YamlDefaultTo>,

    /// `disallow: null` forbids nil; an absent key sets nothing
    #[serde(deserialize_with = "present")]
    pub disallow: Option<serde_yaml::Value>,

    pub whitelist: Option<Vec<serde_yaml::Value>>,
}

/// `{ value: X }` or `{ type_defaults: { kind: value, ... } }`.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlDefaultTo {
    #[serde(deserialize_with = "present")]
    pub value: Option<serde_yaml::Value>,

    /// Overrides applied on top of the standard table
    pub type_defaults: Option<BTreeMap<String, serde_yaml::Value>>,
}

/// One attribute declaration.
#[derive(Debug, Deserialize)]
pub struct YamlAttribute {
    pub name: String,

    #[serde(default, rename = "type")]
    pub type_name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub default: Option<serde_yaml::Value>,

    #[serde(default, deserialize_with = "present")]
    pub disallow: Option<serde_yaml::Value>,

    #[serde(default)]
    pub whitelist: Option<Vec<serde_yaml::Value>>,
}

// Distinguishes an explicit `null` from an absent key.
fn present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<serde_yaml::Value>, D::Error> {
    serde_yaml::Value::deserialize(deserializer).map(Some)
}

/// Loader failure.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    /// Registration rejected a class
    Schema(AttributeError),
    /// Structurally valid YAML with unusable content
    Invalid(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read schema file: {}", e),
            Self::Yaml(e) => write!(f, "failed to parse YAML: {}", e),
            Self::Schema(e) => write!(f, "schema rejected: {}", e),
            Self::Invalid(msg) => write!(f, "invalid schema document: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::Schema(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

impl From<AttributeError> for LoadError {
    fn from(e: AttributeError) -> Self {
        Self::Schema(e)
    }
}

impl YamlLoader {
    /// Load and register every class in a YAML file.
    pub fn load_file<P: AsRef<Path>>(
        registry: &ClassRegistry,
        path: P,
    ) -> Result<Vec<Arc<ClassSchema>>, LoadError> {
        let path = path.as_ref();
        log::debug!("[attrobj] loading class declarations from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::load_str(registry, &content)
    }

    /// Parse and register every class in `content`, in document order.
    ///
    /// Stops at the first failure; classes registered before it stay
    /// registered.
    pub fn load_str(
        registry: &ClassRegistry,
        content: &str,
    ) -> Result<Vec<Arc<ClassSchema>>, LoadError> {
        let document = Self::parse_yaml(content)?;
        let mut registered = Vec::with_capacity(document.classes.len());
        for class in document.classes {
            let builder = Self::class_to_builder(class)?;
            registered.push(registry.register(builder)?);
        }
        Ok(registered)
    }

    /// Parse YAML content.
    pub fn parse_yaml(content: &str) -> Result<YamlSchemaDocument, LoadError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Convert a YAML class into a builder.
    pub fn class_to_builder(class: YamlClass) -> Result<ClassBuilder, LoadError> {
        let mut builder = ClassBuilder::new(class.name.as_str());
        if let Some(parent) = class.extends {
            builder = builder.extends(parent);
        }

        let patch = Self::options_to_patch(class.options)?;
        if !patch.is_empty() {
            builder = builder.configure(patch);
        }

        for attribute in class.attributes {
            builder = builder.attribute(Self::attribute_to_decl(attribute)?);
        }
        Ok(builder)
    }

    fn options_to_patch(options: YamlOptions) -> Result<OptionsPatch, LoadError> {
        let mut patch = OptionsPatch::new();
        patch.ignore_extra_keys = options.ignore_extra_keys;
        patch.type_check = options.type_check;
        patch.coerce_blanks_to_nil = options.coerce_blanks_to_nil;
        patch.disallow = options.disallow.map(yaml_to_value).transpose()?;
        patch.whitelist = options.whitelist.map(yaml_sequence).transpose()?;
        patch.default_to = options.default_to.map(default_to).transpose()?;
        Ok(patch)
    }

    fn attribute_to_decl(attribute: YamlAttribute) -> Result<AttributeDecl, LoadError> {
        let mut decl = AttributeDecl::new(attribute.name.as_str());
        if let Some(type_name) = attribute.type_name {
            decl = decl.typed(TypeDescriptor::parse(&type_name));
        }
        if let Some(default) = attribute.default {
            decl = decl.default(yaml_to_value(default)?);
        }
        if let Some(disallow) = attribute.disallow {
            decl = decl.disallow(yaml_to_value(disallow)?);
        }
        if let Some(whitelist) = attribute.whitelist {
            decl = decl.whitelist(yaml_sequence(whitelist)?);
        }
        Ok(decl)
    }
}

fn default_to(declared: YamlDefaultTo) -> Result<DefaultTo, LoadError> {
    match (declared.value, declared.type_defaults) {
        (Some(value), None) => Ok(DefaultTo::Value(yaml_to_value(value)?)),
        (None, Some(overrides)) => {
            let mut table = TypeDefaults::standard();
            for (name, value) in overrides {
                let value = yaml_to_value(value)?;
                table = match PrimitiveKind::from_name(&name) {
                    Some(kind) => table.with_kind(kind, value),
                    None => match TypeDescriptor::parse(&name) {
                        TypeDescriptor::Class(_) => table.with_class(name, value),
                        _ => {
                            return Err(LoadError::Invalid(format!(
                                "type_defaults key '{}' is neither a type kind nor a class name",
                                name
                            )))
                        }
                    },
                };
            }
            Ok(DefaultTo::TypeDefaults(table))
        }
        (Some(_), Some(_)) => Err(LoadError::Invalid(
            "default_to takes either 'value' or 'type_defaults', not both".to_string(),
        )),
        (None, None) => Err(LoadError::Invalid(
            "default_to needs 'value' or 'type_defaults'".to_string(),
        )),
    }
}

fn yaml_sequence(items: Vec<serde_yaml::Value>) -> Result<Vec<Value>, LoadError> {
    items.into_iter().map(yaml_to_value).collect()
}

/// Convert a YAML value; tags are ignored.
pub fn yaml_to_value(yaml: serde_yaml::Value) -> Result<Value, LoadError> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(v) => Value::Bool(v),
        serde_yaml::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Value::Integer(v),
            (None, Some(v)) => Value::Float(v),
            (None, None) => {
                return Err(LoadError::Invalid(format!("unrepresentable number {}", n)))
            }
        },
        serde_yaml::Value::String(v) => Value::String(v),
        serde_yaml::Value::Sequence(items) => Value::Sequence(yaml_sequence(items)?),
        serde_yaml::Value::Mapping(map) => {
            let mut mapping = Mapping::with_capacity(map.len());
            for (k, v) in map {
                mapping.insert(yaml_to_value(k)?, yaml_to_value(v)?);
            }
            Value::Mapping(mapping)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value)?,
    })
}
