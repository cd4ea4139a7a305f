// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructed instances and their attribute bags.

use crate::error::{AttributeError, Result};
use crate::schema::ClassSchema;
use crate::store::ClassRegistry;
use crate::value::{Mapping, Value};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Realized `{attribute name -> value}` map of an instance.
///
/// Entries keep schema order; equality ignores it.
#[derive(Clone, Default)]
pub struct AttributeBag {
    entries: Vec<(Arc<str>, Value)>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace an entry, keeping its position.
    pub fn insert(&mut self, name: Arc<str>, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Convenience wrapper around [`insert`](Self::insert).
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.insert(Arc::from(name), value.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| &**n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (&**n, v))
    }

    /// Generic mapping with string keys.
    pub fn to_mapping(&self) -> Mapping {
        self.iter()
            .map(|(name, value)| (Value::from(name), value.clone()))
            .collect()
    }
}

impl PartialEq for AttributeBag {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl fmt::Debug for AttributeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for AttributeBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Instance of a schema-bearing class.
///
/// Only the construction pipeline creates instances, so every instance
/// satisfies its class schema at the time it was built.
#[derive(Clone)]
pub struct Instance {
    schema: Arc<ClassSchema>,
    bag: AttributeBag,
}

impl Instance {
    /// Construct an instance of `class` registered in `registry`.
    pub fn new(registry: &ClassRegistry, class: &str, input: Mapping) -> Result<Self> {
        registry.construct(class, input)
    }

    pub(crate) fn from_parts(schema: Arc<ClassSchema>, bag: AttributeBag) -> Self {
        Self { schema, bag }
    }

    pub fn class_name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<ClassSchema> {
        &self.schema
    }

    /// Class identity or ancestry.
    pub fn is_a(&self, class: &str) -> bool {
        self.schema.is_a(class)
    }

    pub(crate) fn bag(&self) -> &AttributeBag {
        &self.bag
    }

    /// Copy of the attribute bag. Mutating it never affects the instance.
    pub fn attributes(&self) -> AttributeBag {
        self.bag.clone()
    }

    /// Read accessor.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.bag
            .get(name)
            .ok_or_else(|| AttributeError::unknown_attribute(self.class_name(), name, &Mapping::new()))
    }

    /// Read accessor that returns `None` for undeclared names.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.bag.get(name)
    }

    /// Write accessor. Runs the attribute's writer hook; no type checks.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let def = self.schema.attribute(name).ok_or_else(|| {
            AttributeError::unknown_attribute(self.schema.name(), name, &Mapping::new())
        })?;
        let value = def.write(value.into());
        self.bag.insert(Arc::clone(def.name_arc()), value);
        Ok(())
    }

    /// Shallow generic export.
    pub fn to_generic_map(&self) -> Mapping {
        self.bag.to_mapping()
    }

    /// JSON export. Fails when an attribute holds an opaque value.
    pub fn to_json(&self) -> std::result::Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Same registered class (one schema, not merely one name) and equal bags.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.bag == other.bag
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class_name());
        for (name, value) in self.bag.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.bag.serialize(serializer)
    }
}
