// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic attribute values.
//!
//! [`Value`] is the closed set of runtime values an attribute bag can hold.
//! Input maps handed to the construction pipeline, defaults, disallow
//! sentinels and whitelists are all expressed with it.

use crate::instance::Instance;
use parking_lot::Mutex;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

static SYMBOL_TABLE: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

/// Interned atomic name.
///
/// Symbols with equal text share one allocation for the lifetime of the
/// process.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Intern `name`, reusing the existing entry when there is one.
    ///
    /// Entries are never evicted: interning untrusted input (for example
    /// symbol coercion of request strings) grows the table without bound.
    pub fn intern(name: &str) -> Self {
        let table = SYMBOL_TABLE.get_or_init(|| Mutex::new(HashSet::new()));
        let mut table = table.lock();
        if let Some(existing) = table.get(name) {
            return Self(Arc::clone(existing));
        }
        let interned: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&interned));
        Self(interned)
    }

    /// Symbol text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both symbols point at the same interned entry.
    pub fn same_entry(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.same_entry(other) || *self.0 == *other.0
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::intern(name)
    }
}

// ---------------------------------------------------------------------------
// Opaque values
// ---------------------------------------------------------------------------

trait OpaqueObject: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn eq_opaque(&self, other: &dyn Any) -> bool;
}

impl<T: Any + Send + Sync + fmt::Debug + PartialEq> OpaqueObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_opaque(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| other == self)
    }
}

/// Instance of an external Rust type that does not take part in the
/// attribute-schema system.
///
/// Opaque values can only be checked for their exact type; no coercion into
/// them exists.
#[derive(Clone)]
pub struct OpaqueValue {
    inner: Arc<dyn OpaqueObject>,
    type_name: &'static str,
}

impl OpaqueValue {
    /// Wrap an external value.
    pub fn new<T: Any + Send + Sync + fmt::Debug + PartialEq>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.inner.as_any().type_id()
    }

    /// Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check the wrapped type.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_any().is::<T>()
    }

    /// Borrow the wrapped value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.eq_opaque(other.inner.as_any())
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Insertion-ordered key-value collection.
///
/// Keys are arbitrary [`Value`]s; inserting an existing key replaces its
/// value in place. Equality ignores entry order.
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(Value, Value)>,
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a value by name; matches both string and symbol keys.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_name() == Some(name))
            .map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an entry by key.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} => {}", key, value)?;
        }
        f.write_str("}")
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Build a [`Mapping`] from `key => value` pairs.
///
/// ```rust
/// use attrobj::{mapping, Value};
///
/// let input = mapping! { "name" => "Zelda", "age" => 12 };
/// assert_eq!(input.get_named("age"), Some(&Value::Integer(12)));
/// ```
#[macro_export]
macro_rules! mapping {
    () => {
        $crate::Mapping::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut mapping = $crate::Mapping::new();
        $( mapping.insert($key, $value); )+
        mapping
    }};
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A dynamic attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(Symbol),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// Instance of a schema-bearing class.
    Object(Instance),
    /// Instance of an external type.
    Opaque(OpaqueValue),
}

impl Value {
    /// Intern `name` as a symbol value.
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(Symbol::intern(name))
    }

    /// Wrap an external value.
    pub fn opaque<T: Any + Send + Sync + fmt::Debug + PartialEq>(value: T) -> Self {
        Self::Opaque(OpaqueValue::new(value))
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check for the empty string.
    pub fn is_blank_string(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as symbol.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as schema-bearing instance.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Try to borrow an opaque value as `T`.
    pub fn as_opaque<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Attribute-name view of a key: strings and symbols name attributes,
    /// everything else is an opaque key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            Self::Symbol(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "nil",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Object(instance) => instance.class_name(),
            Self::Opaque(opaque) => opaque.type_name(),
        }
    }

    /// Canonical string form: text for strings and symbols, the inspect
    /// form for everything else.
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::String(v) => v.clone(),
            Self::Symbol(v) => v.as_str().to_string(),
            other => other.to_string(),
        }
    }
}

/// Render a float the way the canonical string form expects: integral
/// values keep a trailing `.0`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("nil"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::String(v) => write!(f, "{:?}", v),
            Self::Symbol(v) => write!(f, "{:?}", v),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Mapping(map) => write!(f, "{}", map),
            Self::Object(instance) => {
                write!(f, "#<{}", instance.class_name())?;
                for (index, (name, value)) in instance.bag().iter().enumerate() {
                    let sep = if index == 0 { " " } else { ", " };
                    write!(f, "{}{}: {}", sep, name, value)?;
                }
                f.write_str(">")
            }
            Self::Opaque(opaque) => write!(f, "#<{} {:?}>", opaque.type_name(), opaque),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Symbol(v) => serializer.serialize_str(v.as_str()),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(map) => map.serialize(serializer),
            Self::Object(instance) => instance.serialize(serializer),
            Self::Opaque(opaque) => Err(S::Error::custom(format!(
                "opaque value of type {} is not serializable",
                opaque.type_name()
            ))),
        }
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Symbol> for Value {
    fn from(v: Symbol) -> Self {
        Self::Symbol(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Self::Mapping(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Self::Object(v)
    }
}

impl From<OpaqueValue> for Value {
    fn from(v: OpaqueValue) -> Self {
        Self::Opaque(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Self::Integer(v),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(v) => Self::String(v),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
