// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container descriptors: `sequence_of(E)` and `mapping_of(K, V)`.
//!
//! Element descriptors are not validated at declaration time; an illegal
//! element type surfaces as a configuration error the first time a value
//! reaches it.

use crate::descriptor::TypeDescriptor;
use crate::error::{AttributeError, Result};
use crate::registry::{self, CoercionContext};
use crate::value::{Mapping, Value};

pub(crate) fn check_sequence_of(element: &TypeDescriptor, value: &Value) -> Result<bool> {
    let Some(items) = value.as_sequence() else {
        return Ok(false);
    };
    for item in items {
        if !registry::check(element, item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(crate) fn check_mapping_of(
    key: &TypeDescriptor,
    val: &TypeDescriptor,
    value: &Value,
) -> Result<bool> {
    let Some(map) = value.as_mapping() else {
        return Ok(false);
    };
    for (k, v) in map.iter() {
        if !registry::check(key, k)? || !registry::check(val, v)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(crate) fn coerce_sequence_of(
    ctx: &CoercionContext<'_>,
    element: &TypeDescriptor,
    value: Value,
) -> Result<Value> {
    match value {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| registry::coerce(ctx, element, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        other => Err(AttributeError::uncoercible(format!(
            "trying to coerce into sequence_of({}), but value is not a sequence, it is {}",
            element,
            other.type_name()
        ))),
    }
}

/// Rebuild a mapping, coercing every key and value. Two keys that coerce
/// to the same value (`"1"`, `"01"` as integers) are uncoercible.
pub(crate) fn coerce_mapping_of(
    ctx: &CoercionContext<'_>,
    key: &TypeDescriptor,
    val: &TypeDescriptor,
    value: Value,
) -> Result<Value> {
    match value {
        Value::Mapping(map) => {
            let mut coerced = Mapping::with_capacity(map.len());
            for (k, v) in map {
                let k = registry::coerce(ctx, key, k)?;
                if coerced.contains_key(&k) {
                    return Err(AttributeError::uncoercible(format!(
                        "trying to coerce into mapping_of({}, {}), but two keys coerce to {}",
                        key, val, k
                    )));
                }
                let v = registry::coerce(ctx, val, v)?;
                coerced.insert(k, v);
            }
            Ok(Value::Mapping(coerced))
        }
        other => Err(AttributeError::uncoercible(format!(
            "trying to coerce into mapping_of({}, {}), but value is not a mapping, it is {}",
            key,
            val,
            other.type_name()
        ))),
    }
}
