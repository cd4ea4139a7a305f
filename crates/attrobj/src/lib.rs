// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # attrobj - schema-driven attributed value objects
//!
//! A class declares a fixed set of named, typed construction attributes.
//! Every instance is validated once, at construction: required attributes
//! present, unknown keys rejected (or dropped), defaults applied, disallowed
//! values rejected, and declared types either strictly checked or coerced
//! into canonical form.
//!
//! ## Quick Start
//!
//! ```rust
//! use attrobj::{
//!     mapping, AttributeDecl, ClassBuilder, ClassRegistry, OptionsPatch, PrimitiveKind,
//!     TypeDescriptor, Value,
//! };
//!
//! fn main() -> attrobj::Result<()> {
//!     let registry = ClassRegistry::new();
//!
//!     ClassBuilder::new("Toy")
//!         .configure(OptionsPatch::new().coerce())
//!         .attribute(AttributeDecl::new("kind").typed(PrimitiveKind::Symbol))
//!         .register_in(&registry)?;
//!
//!     ClassBuilder::new("Child")
//!         .configure(OptionsPatch::new().coerce())
//!         .attribute(AttributeDecl::new("name").typed(PrimitiveKind::String))
//!         .attribute(
//!             AttributeDecl::new("toys")
//!                 .typed(TypeDescriptor::sequence_of(TypeDescriptor::class("Toy")))
//!                 .default(Vec::<Value>::new()),
//!         )
//!         .register_in(&registry)?;
//!
//!     let child = registry.construct(
//!         "Child",
//!         mapping! { "name" => "Zelda", "toys" => vec![mapping! { "kind" => "doll" }] },
//!     )?;
//!     let toys = child.get("toys")?.as_sequence().unwrap_or_default();
//!     assert!(toys[0].as_instance().is_some_and(|toy| toy.is_a("Toy")));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  ClassBuilder / YamlLoader        declaration                        |
//! +---------------------------------------------------------------------+
//! |  ClassRegistry (schema store)     write-once DashMap of ClassSchema  |
//! +---------------------------------------------------------------------+
//! |  pipeline                         keys -> defaults -> disallow ->    |
//! |                                   type strategy -> whitelist -> bag  |
//! +---------------------------------------------------------------------+
//! |  registry (type registry)         StrictCheck | Coerce, parametrized |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`schema`] - class declarations and resolved schemas
//! - [`store`] - the class registry
//! - [`registry`] - strict checking and coercion strategies
//! - [`record`] - typed records (`#[derive(Record)]`)
//! - [`loader`] - YAML class declarations (feature `yaml`)

// Allow the derive macro to work inside this crate's tests
extern crate self as attrobj;

/// Per-type default values for the `default_to` option.
pub mod defaults;
/// Type descriptors for declared attributes.
pub mod descriptor;
/// Error types.
pub mod error;
/// Constructed instances and attribute bags.
pub mod instance;
/// YAML class declaration loader.
#[cfg(feature = "yaml")]
pub mod loader;
/// Class-level options.
pub mod options;
mod parametrized;
mod pipeline;
/// Typed records over instances.
pub mod record;
/// Type registry: strict checking and coercion.
pub mod registry;
/// Class declarations and resolved schemas.
pub mod schema;
/// Class registry.
pub mod store;
/// Dynamic values.
pub mod value;


pub use attrobj_codegen::Record;
pub use defaults::TypeDefaults;
pub use descriptor::{ClassRef, OpaqueType, PrimitiveKind, TypeDescriptor};
pub use error::{AttributeError, ErrorKind, Result};
pub use instance::{AttributeBag, Instance};
#[cfg(feature = "yaml")]
pub use loader::{LoadError, YamlLoader};
pub use options::{DefaultTo, OptionsPatch, SchemaOptions, TypeCheckMode};
pub use record::{FromValue, Record, RecordError};
pub use registry::{strategy_for, CoercionContext, Coerce, StrictCheck, TypeStrategy};
pub use schema::{AttributeDecl, AttributeDef, ClassBuilder, ClassSchema, DefaultValue};
pub use store::ClassRegistry;
pub use value::{Mapping, OpaqueValue, Symbol, Value};
