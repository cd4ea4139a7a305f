// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed records over constructed instances.
//!
//! `#[derive(Record)]` maps a struct with named fields onto a registered
//! class, giving typed read access to a validated attribute bag:
//!
//! ```rust,ignore
//! use attrobj::{mapping, ClassRegistry, Record};
//!
//! #[derive(Record)]
//! #[record(class = "Toy")]
//! struct Toy {
//!     kind: attrobj::Symbol,
//! }
//!
//! let toy = Toy::construct(&registry, mapping! { "kind" => "teddybear" })?;
//! ```

use crate::error::Result;
use crate::instance::Instance;
use crate::store::ClassRegistry;
use crate::value::{Mapping, Symbol, Value};
use std::fmt;

/// Typed hydration failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Instance belongs to an unrelated class.
    WrongClass { expected: String, found: String },
    /// Attribute value does not have the field's Rust type.
    Mismatch {
        attribute: String,
        expected: String,
        found: String,
    },
}

impl RecordError {
    pub fn mismatch(expected: impl Into<String>, found: &Value) -> Self {
        Self::Mismatch {
            attribute: String::new(),
            expected: expected.into(),
            found: found.type_name().to_string(),
        }
    }

    /// Name the attribute of a mismatch raised by a nested extraction.
    pub fn at(self, name: &str) -> Self {
        match self {
            Self::Mismatch {
                attribute,
                expected,
                found,
            } if attribute.is_empty() => Self::Mismatch {
                attribute: name.to_string(),
                expected,
                found,
            },
            other => other,
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongClass { expected, found } => {
                write!(f, "expected an instance of {}, got {}", expected, found)
            }
            Self::Mismatch {
                attribute,
                expected,
                found,
            } => write!(f, "attribute '{}': expected {}, found {}", attribute, expected, found),
        }
    }
}

impl std::error::Error for RecordError {}

/// Typed extraction from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError>;
}

/// Typed view over instances of one class.
pub trait Record: Sized {
    /// Backing class name.
    fn class_name() -> &'static str;

    fn from_instance(instance: &Instance) -> std::result::Result<Self, RecordError>;

    /// Run the construction pipeline, then hydrate.
    fn construct(registry: &ClassRegistry, input: Mapping) -> Result<Self> {
        let instance = registry.construct(Self::class_name(), input)?;
        Ok(Self::from_instance(&instance)?)
    }
}

/// Fail unless `instance` is a `class` (or a descendant).
pub fn expect_class(instance: &Instance, class: &str) -> std::result::Result<(), RecordError> {
    if instance.is_a(class) {
        Ok(())
    } else {
        Err(RecordError::WrongClass {
            expected: class.to_string(),
            found: instance.class_name().to_string(),
        })
    }
}

/// Extract attribute `name` of `instance` as `T`.
pub fn field<T: FromValue>(instance: &Instance, name: &str) -> std::result::Result<T, RecordError> {
    let value = instance.value(name).ok_or_else(|| RecordError::Mismatch {
        attribute: name.to_string(),
        expected: "a declared attribute".to_string(),
        found: format!("no attribute on {}", instance.class_name()),
    })?;
    T::from_value(value).map_err(|e| e.at(name))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value.as_bool().ok_or_else(|| RecordError::mismatch("boolean", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value.as_i64().ok_or_else(|| RecordError::mismatch("integer", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Integer(v) => Ok(*v as f64),
            other => Err(RecordError::mismatch("float", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RecordError::mismatch("string", value))
    }
}

impl FromValue for Symbol {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value
            .as_symbol()
            .cloned()
            .ok_or_else(|| RecordError::mismatch("symbol", value))
    }
}

impl FromValue for Mapping {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value
            .as_mapping()
            .cloned()
            .ok_or_else(|| RecordError::mismatch("mapping", value))
    }
}

impl FromValue for Instance {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value
            .as_instance()
            .cloned()
            .ok_or_else(|| RecordError::mismatch("object", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, RecordError> {
        value
            .as_sequence()
            .ok_or_else(|| RecordError::mismatch("sequence", value))?
            .iter()
            .map(T::from_value)
            .collect()
    }
}
