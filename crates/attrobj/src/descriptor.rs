// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for declared attributes.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Integer,
    Float,
    /// Integer or float; integral floats collapse to integers on coercion.
    Numeric,
    Symbol,
    Sequence,
    Mapping,
}

impl PrimitiveKind {
    /// Every primitive kind, in declaration order.
    pub const ALL: [PrimitiveKind; 8] = [
        Self::String,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Numeric,
        Self::Symbol,
        Self::Sequence,
        Self::Mapping,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Numeric => "numeric",
            Self::Symbol => "symbol",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }

    /// Parse a kind name. `array` and `hash` are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "numeric" => Some(Self::Numeric),
            "symbol" => Some(Self::Symbol),
            "sequence" | "array" => Some(Self::Sequence),
            "mapping" | "hash" => Some(Self::Mapping),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// External Rust type identified by its `TypeId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpaqueType {
    id: TypeId,
    name: &'static str,
}

impl OpaqueType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for OpaqueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueType({})", self.name)
    }
}

/// Reference to a class a value must be an instance of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassRef {
    /// Schema-bearing class registered in a `ClassRegistry`.
    Schema(Arc<str>),
    /// External type without a schema.
    Opaque(OpaqueType),
}

impl ClassRef {
    pub fn schema(name: impl Into<Arc<str>>) -> Self {
        Self::Schema(name.into())
    }

    pub fn opaque<T: Any>() -> Self {
        Self::Opaque(OpaqueType::of::<T>())
    }

    /// Display name of the referenced class.
    pub fn name(&self) -> &str {
        match self {
            Self::Schema(name) => name,
            Self::Opaque(ty) => ty.name(),
        }
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeDescriptor {
    /// No type enforcement.
    #[default]
    Unset,
    Primitive(PrimitiveKind),
    Class(ClassRef),
    /// Homogeneous sequence with the given element type.
    SequenceOf(Box<TypeDescriptor>),
    /// Mapping with the given key and value types.
    MappingOf(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// Unrecognised type name; never supported.
    Unknown(String),
}

impl TypeDescriptor {
    /// Schema-bearing class reference.
    pub fn class(name: impl Into<Arc<str>>) -> Self {
        Self::Class(ClassRef::schema(name))
    }

    /// External type reference.
    pub fn opaque<T: Any>() -> Self {
        Self::Class(ClassRef::opaque::<T>())
    }

    pub fn sequence_of(element: impl Into<TypeDescriptor>) -> Self {
        Self::SequenceOf(Box::new(element.into()))
    }

    pub fn mapping_of(key: impl Into<TypeDescriptor>, value: impl Into<TypeDescriptor>) -> Self {
        Self::MappingOf(Box::new(key.into()), Box::new(value.into()))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_parametrized(&self) -> bool {
        matches!(self, Self::SequenceOf(_) | Self::MappingOf(..))
    }

    /// Parse a textual type name.
    ///
    /// Accepts the primitive kind names (plus the `array`/`hash` aliases),
    /// `sequence_of(T)`, `mapping_of(K, V)` (or `array_of`/`hash_of`) and a
    /// capitalised identifier naming a schema class. Anything else becomes
    /// [`TypeDescriptor::Unknown`]; an empty string is [`TypeDescriptor::Unset`].
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Unset;
        }
        if let Some(kind) = PrimitiveKind::from_name(text) {
            return Self::Primitive(kind);
        }
        if let Some(inner) = strip_call(text, &["sequence_of", "array_of"]) {
            return Self::sequence_of(Self::parse(inner));
        }
        if let Some(inner) = strip_call(text, &["mapping_of", "hash_of"]) {
            return match split_arguments(inner) {
                Some((key, value)) => Self::mapping_of(Self::parse(key), Self::parse(value)),
                None => Self::Unknown(text.to_string()),
            };
        }
        if is_class_name(text) {
            return Self::class(text);
        }
        Self::Unknown(text.to_string())
    }
}

fn strip_call<'a>(text: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        text.strip_prefix(name)?
            .trim_start()
            .strip_prefix('(')?
            .strip_suffix(')')
    })
}

/// Split `K, V` at the first comma outside parentheses.
fn split_arguments(args: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in args.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => return Some((&args[..idx], &args[idx + 1..])),
            _ => {}
        }
    }
    None
}

fn is_class_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

impl From<PrimitiveKind> for TypeDescriptor {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<ClassRef> for TypeDescriptor {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            Self::Primitive(kind) => write!(f, "{}", kind),
            Self::Class(class) => f.write_str(class.name()),
            Self::SequenceOf(element) => write!(f, "sequence_of({})", element),
            Self::MappingOf(key, value) => write!(f, "mapping_of({}, {})", key, value),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}
