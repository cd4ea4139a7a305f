// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class-level options.
//!
//! A class starts from its parent's resolved [`SchemaOptions`] (or the root
//! defaults) and applies each [`OptionsPatch`] it declares, in order. Only the
//! fields a patch sets explicitly override.

use crate::defaults::TypeDefaults;
use crate::descriptor::TypeDescriptor;
use crate::schema::DefaultValue;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type enforcement strategy for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCheckMode {
    /// Reject values that are not already of the declared type.
    #[default]
    Strict,
    /// Convert values into the declared type.
    Coerce,
}

impl fmt::Display for TypeCheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Coerce => f.write_str("coerce"),
        }
    }
}

/// Class-wide fallback for attributes declared without a default.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultTo {
    /// No fallback; such attributes are required.
    #[default]
    Unset,
    /// The same value for every attribute.
    Value(Value),
    /// The zero value of each attribute's declared type.
    TypeDefaults(TypeDefaults),
}

impl DefaultTo {
    /// Effective default for an attribute declared with `descriptor`.
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> DefaultValue {
        match self {
            Self::Unset => DefaultValue::Unset,
            Self::Value(value) => DefaultValue::Value(value.clone()),
            Self::TypeDefaults(table) => DefaultValue::Value(table.fetch(descriptor)),
        }
    }
}

/// Resolved options of a class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaOptions {
    pub ignore_extra_keys: bool,
    pub default_to: DefaultTo,
    pub type_check: TypeCheckMode,
    /// Coerce `""` to nil for every non-string attribute (coerce mode only).
    pub coerce_blanks_to_nil: bool,
    /// Class-wide disallow sentinel. `Some(Value::Null)` forbids nil.
    pub disallow: Option<Value>,
    pub whitelist: Option<Vec<Value>>,
}

impl SchemaOptions {
    /// Root defaults every class inherits from.
    pub fn root() -> Self {
        Self::default()
    }

    /// Apply `patch` on top of these options.
    pub fn merged(&self, patch: &OptionsPatch) -> Self {
        Self {
            ignore_extra_keys: patch.ignore_extra_keys.unwrap_or(self.ignore_extra_keys),
            default_to: patch
                .default_to
                .clone()
                .unwrap_or_else(|| self.default_to.clone()),
            type_check: patch.type_check.unwrap_or(self.type_check),
            coerce_blanks_to_nil: patch
                .coerce_blanks_to_nil
                .unwrap_or(self.coerce_blanks_to_nil),
            disallow: patch.disallow.clone().or_else(|| self.disallow.clone()),
            whitelist: patch.whitelist.clone().or_else(|| self.whitelist.clone()),
        }
    }
}

/// Explicitly set option overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionsPatch {
    pub ignore_extra_keys: Option<bool>,
    pub default_to: Option<DefaultTo>,
    pub type_check: Option<TypeCheckMode>,
    pub coerce_blanks_to_nil: Option<bool>,
    pub disallow: Option<Value>,
    pub whitelist: Option<Vec<Value>>,
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_extra_keys(mut self, ignore: bool) -> Self {
        self.ignore_extra_keys = Some(ignore);
        self
    }

    pub fn default_to(mut self, default_to: DefaultTo) -> Self {
        self.default_to = Some(default_to);
        self
    }

    /// Shortcut for `default_to(DefaultTo::Value(value))`.
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        self.default_to(DefaultTo::Value(value.into()))
    }

    /// Shortcut for `default_to(DefaultTo::TypeDefaults(table))`.
    pub fn type_defaults(self, table: TypeDefaults) -> Self {
        self.default_to(DefaultTo::TypeDefaults(table))
    }

    pub fn type_check(mut self, mode: TypeCheckMode) -> Self {
        self.type_check = Some(mode);
        self
    }

    pub fn coerce(self) -> Self {
        self.type_check(TypeCheckMode::Coerce)
    }

    pub fn strict(self) -> Self {
        self.type_check(TypeCheckMode::Strict)
    }

    pub fn coerce_blanks_to_nil(mut self, enabled: bool) -> Self {
        self.coerce_blanks_to_nil = Some(enabled);
        self
    }

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

    /// Returns `true` if the patch overrides nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
