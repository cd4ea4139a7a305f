// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction pipeline.
//!
//! Turns a raw input mapping into a validated attribute bag:
//!
//! 1. normalize keys (strings and symbols name attributes)
//! 2. reject unknown keys, or drop them when `ignore_extra_keys` is set
//! 3. per declared attribute, in schema order: default, required check,
//!    disallow, type enforcement, disallow and whitelist on the enforced value,
//!    commit through the writer
//!
//! The first failure aborts the construction.

use crate::error::{AttributeError, Result};
use crate::instance::{AttributeBag, Instance};
use crate::registry::{self, CoercionContext};
use crate::schema::ClassSchema;
use crate::store::ClassRegistry;
use crate::value::{Mapping, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) fn construct(
    registry: &ClassRegistry,
    schema: &Arc<ClassSchema>,
    input: Mapping,
) -> Result<Instance> {
    log::trace!("[attrobj] constructing {} from {}", schema.name(), input);
    let options = schema.options();

    let mut given: HashMap<&str, Value> = HashMap::with_capacity(input.len());
    for (key, value) in input.iter() {
        match key.as_name() {
            Some(name) if schema.attribute(name).is_some() => {
                given.insert(name, value.clone());
            }
            _ if options.ignore_extra_keys => {
                log::debug!("[attrobj] {}: dropping extra key {}", schema.name(), key);
            }
            Some(name) => {
                return Err(AttributeError::unknown_attribute(schema.name(), name, &input));
            }
            None => {
                return Err(AttributeError::unknown_attribute(
                    schema.name(),
                    key.to_string(),
                    &input,
                ));
            }
        }
    }

    let strategy = registry::strategy_for(options.type_check);
    let ctx = CoercionContext::new(registry, options.coerce_blanks_to_nil);
    let mut bag = AttributeBag::with_capacity(schema.attributes().len());

    for def in schema.attributes() {
        let value = match given.remove(def.name()) {
            Some(value) => value,
            None => def.default().resolve().ok_or_else(|| {
                AttributeError::missing_attribute(schema.name(), def.name(), &input)
            })?,
        };

        if def.is_disallowed(&value) {
            return Err(AttributeError::disallowed_value(schema.name(), def.name(), &input));
        }

        let value = if def.descriptor().is_unset() || value.is_null() {
            value
        } else {
            strategy
                .enforce(&ctx, def.descriptor(), value)
                .map_err(|e| e.located(schema.name(), def.name()))?
                .ok_or_else(|| {
                    AttributeError::type_mismatch(
                        schema.name(),
                        def.name(),
                        def.descriptor(),
                        &input,
                    )
                })?
        };

        // Coercion may produce the sentinel ("abc" -> 0, "" -> nil).
        if def.is_disallowed(&value) || !def.permits(&value) {
            return Err(AttributeError::disallowed_value(schema.name(), def.name(), &input));
        }

        bag.insert(Arc::clone(def.name_arc()), def.write(value));
    }

    Ok(Instance::from_parts(Arc::clone(schema), bag))
}
