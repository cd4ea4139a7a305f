// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class registry - the per-class schema store.
//!
//! # Architecture
//!
//! - **Write-once**: a class name is registered exactly once; its
//!   [`ClassSchema`] never changes afterwards.
//! - **Lock-free reads**: `DashMap` sharding, no global `RwLock`.
//! - **Zero-copy**: lookups hand out `Arc<ClassSchema>`.
//!
//! Most programs use the process-wide [`ClassRegistry::global`]; tests and
//! embedders create isolated registries with [`ClassRegistry::new`].

use crate::error::{AttributeError, Result};
use crate::instance::Instance;
use crate::options::SchemaOptions;
use crate::pipeline;
use crate::schema::{AttributeDef, ClassBuilder, ClassSchema};
use crate::value::Mapping;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();

/// Table of registered classes (thread-safe).
#[derive(Default)]
pub struct ClassRegistry {
    classes: DashMap<Arc<str>, Arc<ClassSchema>>,
}

impl ClassRegistry {
    /// Create an empty, isolated registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
        }
    }

    /// Process-wide registry.
    pub fn global() -> &'static ClassRegistry {
        GLOBAL_REGISTRY.get_or_init(ClassRegistry::new)
    }

    // ===================================================================
    // Registration
    // ===================================================================

    /// Resolve `builder` and store the resulting schema.
    ///
    /// Fails with a configuration error when the name is taken, the parent
    /// is missing, or a declared descriptor is unsupported. Nothing is
    /// stored on failure.
    pub fn register(&self, builder: ClassBuilder) -> Result<Arc<ClassSchema>> {
        if self.contains(builder.name()) {
            return Err(duplicate(builder.name()));
        }
        let schema = Arc::new(builder.resolve(self)?);

        match self.classes.entry(Arc::clone(schema.name_arc())) {
            Entry::Occupied(_) => return Err(duplicate(schema.name())),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&schema));
            }
        }

        log::debug!(
            "[attrobj] registered class {}{} ({} attributes, type_check={}, ignore_extra_keys={})",
            schema.name(),
            schema
                .parent()
                .map(|p| format!(" < {}", p.name()))
                .unwrap_or_default(),
            schema.attributes().len(),
            schema.options().type_check,
            schema.options().ignore_extra_keys
        );
        Ok(schema)
    }

    // ===================================================================
    // Lookup
    // ===================================================================

    #[inline]
    #[must_use]
    pub fn class(&self, name: &str) -> Option<Arc<ClassSchema>> {
        self.classes.get(name).map(|entry| Arc::clone(entry.value()))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Attribute definitions of `name`, parent entries first.
    pub fn resolve_schema(&self, name: &str) -> Result<Vec<Arc<AttributeDef>>> {
        Ok(self.require(name)?.attributes().to_vec())
    }

    /// Resolved options of `name`.
    pub fn resolve_options(&self, name: &str) -> Result<SchemaOptions> {
        let options = self.require(name)?.options().clone();
        log::debug!("[attrobj] resolved options for {}: {:?}", name, options);
        Ok(options)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.iter().map(|e| e.key().to_string()).collect();
        names.sort();
        names
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    // ===================================================================
    // Construction
    // ===================================================================

    /// Construct an instance of `name` from `input`.
    pub fn construct(&self, name: &str, input: Mapping) -> Result<Instance> {
        let schema = self.require(name)?;
        pipeline::construct(self, &schema, input)
    }

    fn require(&self, name: &str) -> Result<Arc<ClassSchema>> {
        self.class(name).ok_or_else(|| {
            AttributeError::configuration(format!("class {} is not registered", name))
        })
    }
}

fn duplicate(name: &str) -> AttributeError {
    AttributeError::configuration(format!("class {} is already registered", name))
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::OptionsPatch;
    use crate::schema::AttributeDecl;

    #[test]
    fn test_register_is_write_once() {
        let registry = ClassRegistry::new();
        ClassBuilder::new("Foo").register_in(&registry).unwrap();
        let err = ClassBuilder::new("Foo").register_in(&registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_schema_and_options() {
        let registry = ClassRegistry::new();
        ClassBuilder::new("Foo")
            .configure(OptionsPatch::new().ignore_extra_keys(true))
            .attribute(AttributeDecl::new("bar"))
            .register_in(&registry)
            .unwrap();
        ClassBuilder::new("ChildFoo")
            .extends("Foo")
            .attribute(AttributeDecl::new("lol"))
            .register_in(&registry)
            .unwrap();

        let names: Vec<_> = registry
            .resolve_schema("ChildFoo")
            .unwrap()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(names, vec!["bar", "lol"]);
        assert!(registry.resolve_options("ChildFoo").unwrap().ignore_extra_keys);
        assert_eq!(registry.class_names(), vec!["ChildFoo", "Foo"]);
    }

    #[test]
    fn test_unknown_class() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());
        let err = registry.construct("Nope", Mapping::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(registry.resolve_schema("Nope").is_err());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClassRegistry>();

        let registry = Arc::new(ClassRegistry::new());
        ClassBuilder::new("Point")
            .attribute(AttributeDecl::new("x"))
            .register_in(&registry)
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .construct("Point", crate::mapping! { "x" => i })
                        .map(|p| p.get("x").cloned())
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let x = handle.join().unwrap().unwrap().unwrap();
            assert_eq!(x, crate::Value::Integer(i as i64));
        }
    }
}
