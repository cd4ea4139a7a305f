// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: strict checking and coercion.
//!
//! Two interchangeable strategies enforce a [`TypeDescriptor`] on a value:
//!
//! - [`StrictCheck`] accepts a value only if it already has the declared type.
//! - [`Coerce`] converts the value into the declared type's canonical form,
//!   constructing nested schema-bearing objects from mappings.
//!
//! A class picks one through its `type_check` option; the construction
//! pipeline asks [`strategy_for`] for it.

use crate::descriptor::{ClassRef, PrimitiveKind, TypeDescriptor};
use crate::error::{AttributeError, Result};
use crate::options::TypeCheckMode;
use crate::parametrized;
use crate::store::ClassRegistry;
use crate::value::{Symbol, Value};

/// Per-construction state handed to coercion.
#[derive(Clone, Copy)]
pub struct CoercionContext<'a> {
    registry: &'a ClassRegistry,
    coerce_blanks_to_nil: bool,
}

impl<'a> CoercionContext<'a> {
    pub fn new(registry: &'a ClassRegistry, coerce_blanks_to_nil: bool) -> Self {
        Self {
            registry,
            coerce_blanks_to_nil,
        }
    }

    /// Registry used to construct nested objects.
    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    pub fn coerce_blanks_to_nil(&self) -> bool {
        self.coerce_blanks_to_nil
    }
}

/// A type enforcement strategy.
pub trait TypeStrategy: Send + Sync {
    fn mode(&self) -> TypeCheckMode;

    /// Whether attributes may be declared with `descriptor` under this strategy.
    fn is_supported(&self, descriptor: &TypeDescriptor) -> bool {
        is_supported(self.mode(), descriptor)
    }

    /// Enforce `descriptor` on a non-null value.
    ///
    /// Returns the value to commit, or `None` when a strict check rejects it.
    fn enforce(
        &self,
        ctx: &CoercionContext<'_>,
        descriptor: &TypeDescriptor,
        value: Value,
    ) -> Result<Option<Value>>;
}

/// Strict type checking.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictCheck;

impl TypeStrategy for StrictCheck {
    fn mode(&self) -> TypeCheckMode {
        TypeCheckMode::Strict
    }

    fn enforce(
        &self,
        _ctx: &CoercionContext<'_>,
        descriptor: &TypeDescriptor,
        value: Value,
    ) -> Result<Option<Value>> {
        Ok(check(descriptor, &value)?.then_some(value))
    }
}

/// Type coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coerce;

impl TypeStrategy for Coerce {
    fn mode(&self) -> TypeCheckMode {
        TypeCheckMode::Coerce
    }

    fn enforce(
        &self,
        ctx: &CoercionContext<'_>,
        descriptor: &TypeDescriptor,
        value: Value,
    ) -> Result<Option<Value>> {
        coerce(ctx, descriptor, value).map(Some)
    }
}

/// Strategy implementing `mode`.
pub fn strategy_for(mode: TypeCheckMode) -> &'static dyn TypeStrategy {
    match mode {
        TypeCheckMode::Strict => &StrictCheck,
        TypeCheckMode::Coerce => &Coerce,
    }
}

/// Whether `descriptor` may be declared under `mode`.
///
/// Parametrized descriptors are declarable in coerce mode only.
pub fn is_supported(mode: TypeCheckMode, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::Unset | TypeDescriptor::Primitive(_) | TypeDescriptor::Class(_) => true,
        TypeDescriptor::SequenceOf(_) | TypeDescriptor::MappingOf(..) => {
            mode == TypeCheckMode::Coerce
        }
        TypeDescriptor::Unknown(_) => false,
    }
}

/// Strict membership test. Never mutates.
pub fn check(descriptor: &TypeDescriptor, value: &Value) -> Result<bool> {
    match descriptor {
        TypeDescriptor::Unset => Ok(true),
        TypeDescriptor::Primitive(kind) => Ok(check_primitive(*kind, value)),
        TypeDescriptor::Class(ClassRef::Schema(class)) => {
            Ok(value.as_instance().is_some_and(|instance| instance.is_a(class)))
        }
        TypeDescriptor::Class(ClassRef::Opaque(ty)) => {
            Ok(matches!(value, Value::Opaque(opaque) if opaque.type_id() == ty.id()))
        }
        TypeDescriptor::SequenceOf(element) => parametrized::check_sequence_of(element, value),
        TypeDescriptor::MappingOf(key, val) => parametrized::check_mapping_of(key, val, value),
        TypeDescriptor::Unknown(name) => Err(AttributeError::configuration(format!(
            "unknown type for type check: {}",
            name
        ))),
    }
}

fn check_primitive(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::String => matches!(value, Value::String(_)),
        PrimitiveKind::Boolean => matches!(value, Value::Bool(_)),
        PrimitiveKind::Integer => matches!(value, Value::Integer(_)),
        PrimitiveKind::Float => matches!(value, Value::Float(_)),
        PrimitiveKind::Numeric => matches!(value, Value::Integer(_) | Value::Float(_)),
        PrimitiveKind::Symbol => matches!(value, Value::Symbol(_)),
        PrimitiveKind::Sequence => matches!(value, Value::Sequence(_)),
        PrimitiveKind::Mapping => matches!(value, Value::Mapping(_)),
    }
}

/// Convert `value` into the canonical form of `descriptor`.
///
/// Nil always coerces to nil.
pub fn coerce(ctx: &CoercionContext<'_>, descriptor: &TypeDescriptor, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if ctx.coerce_blanks_to_nil()
        && value.is_blank_string()
        && *descriptor != TypeDescriptor::Primitive(PrimitiveKind::String)
    {
        return Ok(Value::Null);
    }
    match descriptor {
        TypeDescriptor::Unset => Ok(value),
        TypeDescriptor::Primitive(kind) => coerce_primitive(*kind, value),
        TypeDescriptor::Class(ClassRef::Schema(class)) => coerce_into_class(ctx, class, value),
        TypeDescriptor::Class(ClassRef::Opaque(ty)) => {
            let matches = matches!(&value, Value::Opaque(opaque) if opaque.type_id() == ty.id());
            if matches {
                Ok(value)
            } else {
                Err(AttributeError::uncoercible(format!(
                    "no coercion from {} into {}",
                    value.type_name(),
                    ty.name()
                )))
            }
        }
        TypeDescriptor::SequenceOf(element) => {
            parametrized::coerce_sequence_of(ctx, element, value)
        }
        TypeDescriptor::MappingOf(key, val) => {
            parametrized::coerce_mapping_of(ctx, key, val, value)
        }
        TypeDescriptor::Unknown(name) => Err(AttributeError::configuration(format!(
            "unknown type for type coercion: {}",
            name
        ))),
    }
}

fn coerce_into_class(ctx: &CoercionContext<'_>, class: &str, value: Value) -> Result<Value> {
    match value {
        Value::Object(instance) if instance.is_a(class) => Ok(Value::Object(instance)),
        Value::Mapping(input) => ctx
            .registry()
            .construct(class, input)
            .map(Value::Object),
        other => Err(AttributeError::uncoercible(format!(
            "trying to coerce into {}, but value is not a mapping, it is {}",
            class,
            other.type_name()
        ))),
    }
}

fn coerce_primitive(kind: PrimitiveKind, value: Value) -> Result<Value> {
    match kind {
        PrimitiveKind::String => Ok(Value::String(value.to_canonical_string())),
        PrimitiveKind::Boolean => Ok(Value::Bool(is_true_literal(&value))),
        PrimitiveKind::Integer => coerce_integer(&value).map(Value::Integer),
        PrimitiveKind::Float => coerce_float(&value).map(Value::Float),
        PrimitiveKind::Numeric => match value {
            Value::Integer(_) => Ok(value),
            other => coerce_float(&other).map(collapse_numeric),
        },
        PrimitiveKind::Symbol => match value {
            Value::Symbol(_) => Ok(value),
            Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::String(_) => {
                Ok(Value::Symbol(Symbol::intern(&value.to_canonical_string())))
            }
            other => Err(uncoercible(kind, &other)),
        },
        PrimitiveKind::Sequence => match value {
            Value::Sequence(_) => Ok(value),
            other => Err(uncoercible(kind, &other)),
        },
        PrimitiveKind::Mapping => match value {
            Value::Mapping(_) => Ok(value),
            other => Err(uncoercible(kind, &other)),
        },
    }
}

fn uncoercible(kind: PrimitiveKind, value: &Value) -> AttributeError {
    AttributeError::uncoercible(format!(
        "cannot coerce {} {} into {}",
        value.type_name(),
        value,
        kind
    ))
}

fn is_true_literal(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Integer(i) => *i == 1,
        Value::Float(f) => *f == 1.0,
        Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

fn coerce_integer(value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Float(f) => float_to_integer(*f)
            .ok_or_else(|| uncoercible(PrimitiveKind::Integer, value)),
        Value::String(s) => {
            parse_integer_prefix(s).ok_or_else(|| uncoercible(PrimitiveKind::Integer, value))
        }
        other => Err(uncoercible(PrimitiveKind::Integer, other)),
    }
}

fn coerce_float(value: &Value) -> Result<f64> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::String(s) => Ok(parse_float_prefix(s)),
        other => Err(uncoercible(PrimitiveKind::Float, other)),
    }
}

// i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn float_to_integer(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= -I64_BOUND && truncated < I64_BOUND {
        Some(truncated as i64)
    } else {
        None
    }
}

fn collapse_numeric(value: f64) -> Value {
    match float_to_integer(value) {
        Some(integer) if value % 1.0 == 0.0 => Value::Integer(integer),
        _ => Value::Float(value),
    }
}

/// Integer read from the longest leading `[+-]digits` run; `0` if there is
/// none, `None` on overflow.
fn parse_integer_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let end = sign
        + bytes[sign..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
    if end == sign {
        return Some(0);
    }
    text[..end].parse::<i64>().ok()
}

/// Float read from the longest leading decimal literal; `0.0` if there is none.
fn parse_float_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| -> usize {
        start
            + bytes[start.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    text[..end].parse::<f64>().unwrap_or(0.0)
}
