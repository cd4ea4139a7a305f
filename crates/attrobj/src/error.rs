// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for schema registration and construction.

use crate::record::RecordError;
use crate::value::Mapping;
use std::fmt;

/// Result type for attribute operations
pub type Result<T> = std::result::Result<T, AttributeError>;

/// Error category, for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownAttribute,
    MissingAttribute,
    DisallowedValue,
    Type,
    UncoercibleValue,
    Configuration,
    Record,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownAttribute => "UnknownAttributeError",
            Self::MissingAttribute => "MissingAttributeError",
            Self::DisallowedValue => "DisallowedValueError",
            Self::Type => "TypeError",
            Self::UncoercibleValue => "UncoercibleValueError",
            Self::Configuration => "ConfigurationError",
            Self::Record => "RecordError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while declaring classes or constructing instances
#[derive(Debug, Clone)]
pub enum AttributeError {
    /// Input key not declared by the class
    UnknownAttribute {
        class: String,
        key: String,
        args: Mapping,
    },

    /// Required attribute absent and no default applies
    MissingAttribute {
        class: String,
        attribute: String,
        args: Mapping,
    },

    /// Value equals the disallow sentinel or is outside the whitelist
    DisallowedValue {
        class: String,
        attribute: String,
        args: Mapping,
    },

    /// Strict type check failed
    Type {
        class: String,
        attribute: String,
        expected: String,
        args: Mapping,
    },

    /// Coercion impossible for the runtime shape of the value
    UncoercibleValue {
        class: Option<String>,
        attribute: Option<String>,
        reason: String,
    },

    /// Malformed schema
    Configuration { message: String },

    /// Typed record hydration failed
    Record(RecordError),
}

impl AttributeError {
    pub fn unknown_attribute(class: &str, key: impl Into<String>, args: &Mapping) -> Self {
        Self::UnknownAttribute {
            class: class.to_string(),
            key: key.into(),
            args: args.clone(),
        }
    }

    pub fn missing_attribute(class: &str, attribute: &str, args: &Mapping) -> Self {
        Self::MissingAttribute {
            class: class.to_string(),
            attribute: attribute.to_string(),
            args: args.clone(),
        }
    }

    pub fn disallowed_value(class: &str, attribute: &str, args: &Mapping) -> Self {
        Self::DisallowedValue {
            class: class.to_string(),
            attribute: attribute.to_string(),
            args: args.clone(),
        }
    }

    pub fn type_mismatch(
        class: &str,
        attribute: &str,
        expected: impl fmt::Display,
        args: &Mapping,
    ) -> Self {
        Self::Type {
            class: class.to_string(),
            attribute: attribute.to_string(),
            expected: expected.to_string(),
            args: args.clone(),
        }
    }

    /// Uncoercible value whose class and attribute are filled in later.
    pub fn uncoercible(reason: impl Into<String>) -> Self {
        Self::UncoercibleValue {
            class: None,
            attribute: None,
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Attach class and attribute to an uncoercible error that has none yet.
    ///
    /// Errors from nested constructions already carry their own location and
    /// pass through untouched.
    pub fn located(self, class_name: &str, attribute_name: &str) -> Self {
        match self {
            Self::UncoercibleValue {
                class: None,
                attribute: None,
                reason,
            } => Self::UncoercibleValue {
                class: Some(class_name.to_string()),
                attribute: Some(attribute_name.to_string()),
                reason,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAttribute { .. } => ErrorKind::UnknownAttribute,
            Self::MissingAttribute { .. } => ErrorKind::MissingAttribute,
            Self::DisallowedValue { .. } => ErrorKind::DisallowedValue,
            Self::Type { .. } => ErrorKind::Type,
            Self::UncoercibleValue { .. } => ErrorKind::UncoercibleValue,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Record(_) => ErrorKind::Record,
        }
    }

    /// Class the error was raised for, when known.
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::UnknownAttribute { class, .. }
            | Self::MissingAttribute { class, .. }
            | Self::DisallowedValue { class, .. }
            | Self::Type { class, .. } => Some(class),
            Self::UncoercibleValue { class, .. } => class.as_deref(),
            Self::Configuration { .. } | Self::Record(_) => None,
        }
    }

    /// Offending attribute (or unknown key), when known.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::UnknownAttribute { key, .. } => Some(key),
            Self::MissingAttribute { attribute, .. }
            | Self::DisallowedValue { attribute, .. }
            | Self::Type { attribute, .. } => Some(attribute),
            Self::UncoercibleValue { attribute, .. } => attribute.as_deref(),
            Self::Configuration { .. } | Self::Record(_) => None,
        }
    }

    /// Raw construction input, for keyed errors.
    pub fn args(&self) -> Option<&Mapping> {
        match self {
            Self::UnknownAttribute { args, .. }
            | Self::MissingAttribute { args, .. }
            | Self::DisallowedValue { args, .. }
            | Self::Type { args, .. } => Some(args),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Self::UnknownAttribute { class, key, args } => {
                write!(f, "{}: '{}' for {} - args given: {}", kind, key, class, args)
            }
            Self::MissingAttribute {
                class,
                attribute,
                args,
            }
            | Self::DisallowedValue {
                class,
                attribute,
                args,
            } => write!(
                f,
                "{}: '{}' for {} - args given: {}",
                kind, attribute, class, args
            ),
            Self::Type {
                class,
                attribute,
                expected,
                args,
            } => write!(
                f,
                "{}: '{}' for {} - args given: {} (expected {})",
                kind, attribute, class, args, expected
            ),
            Self::UncoercibleValue {
                class,
                attribute,
                reason,
            } => {
                write!(f, "{}: ", kind)?;
                if let (Some(class), Some(attribute)) = (class, attribute) {
                    write!(f, "'{}' for {} - ", attribute, class)?;
                }
                f.write_str(reason)
            }
            Self::Configuration { message } => write!(f, "{}: {}", kind, message),
            Self::Record(e) => write!(f, "{}: {}", kind, e),
        }
    }
}

impl std::error::Error for AttributeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for AttributeError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}
