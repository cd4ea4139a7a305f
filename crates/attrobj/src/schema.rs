// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class declarations and resolved schemas.
//!
//! A [`ClassBuilder`] records `configure`, `attribute` and `extends` calls in
//! order. Registering it replays them against the parent's resolved schema:
//! each attribute declaration is resolved against the options in effect at
//! that point, producing an immutable [`ClassSchema`].
//!
//! # Example
//!
//! ```rust
//! use attrobj::{AttributeDecl, ClassBuilder, ClassRegistry, OptionsPatch, PrimitiveKind};
//!
//! let registry = ClassRegistry::new();
//! ClassBuilder::new("Child")
//!     .configure(OptionsPatch::new().coerce())
//!     .attribute(AttributeDecl::new("name").typed(PrimitiveKind::String))
//!     .attribute(AttributeDecl::new("age").typed(PrimitiveKind::Integer).default(0))
//!     .register_in(&registry)
//!     .unwrap();
//!
//! let schema = registry.resolve_schema("Child").unwrap();
//! assert_eq!(schema.len(), 2);
//! ```

use crate::descriptor::{ClassRef, TypeDescriptor};
use crate::error::{AttributeError, Result};
use crate::options::{OptionsPatch, SchemaOptions};
use crate::registry;
use crate::store::ClassRegistry;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Write hook run when a value is committed to an attribute.
pub type Writer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Deferred default computation.
pub type Provider = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default of an attribute.
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// No default; the attribute is required.
    #[default]
    Unset,
    Value(Value),
    /// Computed on every construction that needs it.
    Computed(Provider),
}

impl DefaultValue {
    pub fn computed<F>(provider: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(provider))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Materialize the default. Computed providers run on every call.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            Self::Unset => None,
            Self::Value(value) => Some(value.clone()),
            Self::Computed(provider) => Some(provider()),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

/// Resolved attribute definition.
#[derive(Clone)]
pub struct AttributeDef {
    name: Arc<str>,
    descriptor: TypeDescriptor,
    default: DefaultValue,
    disallow: Option<Value>,
    whitelist: Option<Vec<Value>>,
    writer: Option<Writer>,
}

impl AttributeDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Effective default, class-level fallback included.
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    /// Effective disallow sentinel. `Some(Value::Null)` forbids nil.
    pub fn disallow(&self) -> Option<&Value> {
        self.disallow.as_ref()
    }

    pub fn whitelist(&self) -> Option<&[Value]> {
        self.whitelist.as_deref()
    }

    /// Returns `true` if no default applies.
    pub fn is_required(&self) -> bool {
        self.default.is_unset()
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Whether `value` equals the disallow sentinel.
    pub fn is_disallowed(&self, value: &Value) -> bool {
        self.disallow.as_ref() == Some(value)
    }

    /// Whitelist membership; every value is permitted without a whitelist.
    pub fn permits(&self, value: &Value) -> bool {
        self.whitelist
            .as_ref()
            .map_or(true, |allowed| allowed.contains(value))
    }

    pub(crate) fn write(&self, value: Value) -> Value {
        match &self.writer {
            Some(writer) => writer(value),
            None => value,
        }
    }
}

impl fmt::Debug for AttributeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDef")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("default", &self.default)
            .field("disallow", &self.disallow)
            .field("whitelist", &self.whitelist)
            .field("has_writer", &self.has_writer())
            .finish()
    }
}

/// One attribute declaration, resolved at registration.
#[derive(Clone)]
pub struct AttributeDecl {
    name: Arc<str>,
    descriptor: TypeDescriptor,
    default: DefaultValue,
    disallow: Option<Value>,
    whitelist: Option<Vec<Value>>,
    writer: Option<Writer>,
}

impl AttributeDecl {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            descriptor: TypeDescriptor::Unset,
            default: DefaultValue::Unset,
            disallow: None,
            whitelist: None,
            writer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn typed(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.descriptor = descriptor.into();
        self
    }

    /// Constant default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }

    /// Default computed on each construction that needs it.
    pub fn default_with<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = DefaultValue::computed(provider);
        self
    }

    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    /// Reject this exact value. Use `Value::Null` to forbid nil.
    pub fn disallow(mut self, value: impl Into<Value>) -> Self {
        self.disallow = Some(value.into());
        self
    }

    pub fn whitelist<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.whitelist = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Custom write accessor logic.
    pub fn writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(writer));
        self
    }

    fn resolve(self, options: &SchemaOptions) -> AttributeDef {
        let default = if self.default.is_unset() {
            options.default_to.resolve(&self.descriptor)
        } else {
            self.default
        };
        AttributeDef {
            name: self.name,
            default,
            disallow: self.disallow.or_else(|| options.disallow.clone()),
            whitelist: self.whitelist.or_else(|| options.whitelist.clone()),
            descriptor: self.descriptor,
            writer: self.writer,
        }
    }
}

enum Declaration {
    Configure(OptionsPatch),
    Attribute(AttributeDecl),
}

/// Class declaration.
pub struct ClassBuilder {
    name: Arc<str>,
    parent: Option<Arc<str>>,
    declarations: Vec<Declaration>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            declarations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inherit attributes and options from `parent`, which must already be
    /// registered.
    pub fn extends(mut self, parent: impl Into<Arc<str>>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Apply option overrides to the declarations that follow.
    pub fn configure(mut self, patch: OptionsPatch) -> Self {
        self.declarations.push(Declaration::Configure(patch));
        self
    }

    pub fn attribute(mut self, decl: AttributeDecl) -> Self {
        self.declarations.push(Declaration::Attribute(decl));
        self
    }

    /// Register in the process-wide registry.
    pub fn register(self) -> Result<Arc<ClassSchema>> {
        ClassRegistry::global().register(self)
    }

    pub fn register_in(self, registry: &ClassRegistry) -> Result<Arc<ClassSchema>> {
        registry.register(self)
    }

    pub(crate) fn resolve(self, registry: &ClassRegistry) -> Result<ClassSchema> {
        let parent = match &self.parent {
            Some(parent) => Some(registry.class(parent).ok_or_else(|| {
                AttributeError::configuration(format!(
                    "parent class {} of {} is not registered",
                    parent, self.name
                ))
            })?),
            None => None,
        };

        let mut options = parent
            .as_ref()
            .map(|p| p.options().clone())
            .unwrap_or_default();
        let mut attributes: Vec<Arc<AttributeDef>> = parent
            .as_ref()
            .map(|p| p.attributes().to_vec())
            .unwrap_or_default();

        for declaration in self.declarations {
            match declaration {
                Declaration::Configure(patch) => options = options.merged(&patch),
                Declaration::Attribute(decl) => {
                    validate_descriptor(registry, &self.name, &options, &decl)?;
                    let def = Arc::new(decl.resolve(&options));
                    match attributes.iter_mut().find(|a| a.name() == def.name()) {
                        Some(slot) => *slot = def,
                        None => attributes.push(def),
                    }
                }
            }
        }

        Ok(ClassSchema {
            name: self.name,
            parent,
            attributes,
            options,
        })
    }
}

fn validate_descriptor(
    registry: &ClassRegistry,
    class: &str,
    options: &SchemaOptions,
    decl: &AttributeDecl,
) -> Result<()> {
    if !registry::is_supported(options.type_check, &decl.descriptor) {
        return Err(AttributeError::configuration(format!(
            "unknown type for {} type check: {} on {}.{}",
            options.type_check,
            decl.descriptor,
            class,
            decl.name()
        )));
    }
    if let TypeDescriptor::Class(ClassRef::Schema(target)) = &decl.descriptor {
        if &**target != class && !registry.contains(target) {
            return Err(AttributeError::configuration(format!(
                "class {} referenced by {}.{} is not registered",
                target,
                class,
                decl.name()
            )));
        }
    }
    Ok(())
}

/// Resolved, immutable class schema.
#[derive(Debug)]
pub struct ClassSchema {
    name: Arc<str>,
    parent: Option<Arc<ClassSchema>>,
    attributes: Vec<Arc<AttributeDef>>,
    options: SchemaOptions,
}

impl ClassSchema {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ClassSchema>> {
        self.parent.as_ref()
    }

    /// Attribute definitions; parent entries first, in declaration order.
    pub fn attributes(&self) -> &[Arc<AttributeDef>] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Arc<AttributeDef>> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name())
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// This class followed by its ancestors.
    pub fn ancestry(&self) -> impl Iterator<Item = &ClassSchema> {
        std::iter::successors(Some(self), |class| class.parent.as_deref())
    }

    /// Class identity or ancestry.
    pub fn is_a(&self, class: &str) -> bool {
        self.ancestry().any(|c| c.name() == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::TypeDefaults;
    use crate::descriptor::PrimitiveKind;
    use crate::error::ErrorKind;
    use crate::options::TypeCheckMode;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_declaration_resolves_against_current_options() {
        let registry = ClassRegistry::new();
        let schema = ClassBuilder::new("Foo")
            .attribute(AttributeDecl::new("early").typed(PrimitiveKind::String))
            .configure(OptionsPatch::new().type_defaults(TypeDefaults::standard()))
            .attribute(AttributeDecl::new("late").typed(PrimitiveKind::String))
            .register_in(&registry)
            .unwrap();

        assert!(schema.attribute("early").unwrap().is_required());
        assert_eq!(
            schema.attribute("late").unwrap().default().resolve(),
            Some(Value::from(""))
        );
    }

    #[test]
    fn test_redeclaration_keeps_position() {
        let registry = ClassRegistry::new();
        let schema = ClassBuilder::new("Foo")
            .attribute(AttributeDecl::new("a"))
            .attribute(AttributeDecl::new("b"))
            .attribute(AttributeDecl::new("a").default(1))
            .register_in(&registry)
            .unwrap();
        let names: Vec<_> = schema.attribute_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(!schema.attribute("a").unwrap().is_required());
    }

    #[test]
    fn test_class_level_disallow_and_explicit_override() {
        let registry = ClassRegistry::new();
        let schema = ClassBuilder::new("Foo")
            .configure(OptionsPatch::new().disallow(Value::Null))
            .attribute(AttributeDecl::new("a"))
            .attribute(AttributeDecl::new("b").disallow("x"))
            .register_in(&registry)
            .unwrap();
        assert_eq!(schema.attribute("a").unwrap().disallow(), Some(&Value::Null));
        assert_eq!(schema.attribute("b").unwrap().disallow(), Some(&Value::from("x")));
    }

    #[test]
    fn test_parametrized_requires_coerce_mode() {
        let registry = ClassRegistry::new();
        let err = ClassBuilder::new("Strict")
            .attribute(AttributeDecl::new("tags").typed(TypeDescriptor::sequence_of(PrimitiveKind::String)))
            .register_in(&registry)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        ClassBuilder::new("Loose")
            .configure(OptionsPatch::new().type_check(TypeCheckMode::Coerce))
            .attribute(AttributeDecl::new("tags").typed(TypeDescriptor::sequence_of(PrimitiveKind::String)))
            .register_in(&registry)
            .unwrap();
    }

    #[test]
    fn test_unknown_descriptor_and_class_rejected() {
        let registry = ClassRegistry::new();
        let err = ClassBuilder::new("A")
            .attribute(AttributeDecl::new("x").typed("unicorn"))
            .register_in(&registry)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = ClassBuilder::new("B")
            .attribute(AttributeDecl::new("x").typed(TypeDescriptor::class("Missing")))
            .register_in(&registry)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!registry.contains("B"));

        ClassBuilder::new("Node")
            .attribute(AttributeDecl::new("next").typed(TypeDescriptor::class("Node")).default(Value::Null))
            .register_in(&registry)
            .unwrap();
    }

    #[test]
    fn test_computed_default_is_not_cached() {
        let counter = Arc::new(AtomicI64::new(0));
        let handle = Arc::clone(&counter);
        let default = DefaultValue::computed(move || Value::Integer(handle.fetch_add(1, Ordering::SeqCst) + 1));
        assert_eq!(default.resolve(), Some(Value::Integer(1)));
        assert_eq!(default.resolve(), Some(Value::Integer(2)));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_writer_flag() {
        let plain = AttributeDecl::new("a").resolve(&SchemaOptions::root());
        let hooked = AttributeDecl::new("b")
            .writer(|v| v)
            .resolve(&SchemaOptions::root());
        assert!(!plain.has_writer());
        assert!(hooked.has_writer());
        assert!(format!("{:?}", hooked).contains("has_writer: true"));
    }

    #[test]
    fn test_ancestry() {
        let registry = ClassRegistry::new();
        ClassBuilder::new("Base").register_in(&registry).unwrap();
        let child = ClassBuilder::new("Derived")
            .extends("Base")
            .register_in(&registry)
            .unwrap();
        assert!(child.is_a("Derived"));
        assert!(child.is_a("Base"));
        assert!(!child.is_a("Other"));
        assert_eq!(child.parent().map(|p| p.name()), Some("Base"));

        let err = ClassBuilder::new("Orphan")
            .extends("Nobody")
            .register_in(&registry)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
