// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type default values.

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::value::{Mapping, Value};
use std::collections::HashMap;

/// Lookup table from a type descriptor to its zero value.
///
/// Used by the `default_to` class option to give every attribute without an
/// explicit default the zero value of its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefaults {
    kinds: HashMap<PrimitiveKind, Value>,
    classes: HashMap<String, Value>,
}

impl TypeDefaults {
    /// The standard table: `""`, `false`, `0`, `0.0`, `0`, nil, `[]`, `{}`.
    pub fn standard() -> Self {
        let kinds = PrimitiveKind::ALL
            .iter()
            .map(|kind| {
                let zero = match kind {
                    PrimitiveKind::String => Value::String(String::new()),
                    PrimitiveKind::Boolean => Value::Bool(false),
                    PrimitiveKind::Integer | PrimitiveKind::Numeric => Value::Integer(0),
                    PrimitiveKind::Float => Value::Float(0.0),
                    PrimitiveKind::Symbol => Value::Null,
                    PrimitiveKind::Sequence => Value::Sequence(Vec::new()),
                    PrimitiveKind::Mapping => Value::Mapping(Mapping::new()),
                };
                (*kind, zero)
            })
            .collect();
        Self {
            kinds,
            classes: HashMap::new(),
        }
    }

    /// Table with no entries at all.
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            classes: HashMap::new(),
        }
    }

    /// Override the entry for a primitive kind.
    pub fn with_kind(mut self, kind: PrimitiveKind, value: impl Into<Value>) -> Self {
        self.kinds.insert(kind, value.into());
        self
    }

    /// Add an entry for a class descriptor.
    pub fn with_class(mut self, class: impl Into<String>, value: impl Into<Value>) -> Self {
        self.classes.insert(class.into(), value.into());
        self
    }

    /// Entry for `descriptor`; nil when the table has none.
    pub fn fetch(&self, descriptor: &TypeDescriptor) -> Value {
        let entry = match descriptor {
            TypeDescriptor::Primitive(kind) => self.kinds.get(kind),
            TypeDescriptor::Class(class) => self.classes.get(class.name()),
            _ => None,
        };
        entry.cloned().unwrap_or(Value::Null)
    }
}

impl Default for TypeDefaults {
    fn default() -> Self {
        Self::standard()
    }
}
