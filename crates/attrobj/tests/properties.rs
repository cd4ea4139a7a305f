// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Exact round-trips

//! Randomized construction properties
//!
//! Seeded inputs, so every failure reproduces.

use attrobj::{
    mapping, AttributeDecl, ClassBuilder, ClassRegistry, OptionsPatch, PrimitiveKind, Value,
};

const ROUNDS: usize = 500;

fn registry() -> ClassRegistry {
    let registry = ClassRegistry::new();
    ClassBuilder::new("Sample")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("id").typed(PrimitiveKind::Integer))
        .attribute(AttributeDecl::new("ratio").typed(PrimitiveKind::Float))
        .attribute(AttributeDecl::new("claimed").typed(PrimitiveKind::Boolean))
        .attribute(AttributeDecl::new("label").typed(PrimitiveKind::String))
        .attribute(AttributeDecl::new("tag").typed(PrimitiveKind::Symbol))
        .register_in(&registry)
        .unwrap();
    registry
}

fn random_label(rng: &mut fastrand::Rng) -> String {
    (0..rng.usize(0..12)).map(|_| rng.alphanumeric()).collect()
}

#[test]
fn test_integer_strings_coerce_to_their_value() {
    let registry = registry();
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for _ in 0..ROUNDS {
        let id = rng.i64(..);
        let sample = registry
            .construct(
                "Sample",
                mapping! {
                    "id" => id.to_string(),
                    "ratio" => 0,
                    "claimed" => false,
                    "label" => "",
                    "tag" => "t",
                },
            )
            .unwrap();
        assert_eq!(sample.get("id").unwrap(), &Value::Integer(id), "id {}", id);
    }
}

#[test]
fn test_coercion_is_idempotent() {
    let registry = registry();
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..ROUNDS {
        let input = mapping! {
            "id" => if rng.bool() { Value::from(rng.i32(..)) } else { Value::from(rng.i32(..).to_string()) },
            "ratio" => f64::from(rng.i32(-1000..1000)) / 8.0,
            "claimed" => ["true", "false", "1", "0", ""][rng.usize(..5)],
            "label" => random_label(&mut rng),
            "tag" => random_label(&mut rng),
        };

        let first = registry.construct("Sample", input.clone()).unwrap();
        let second = registry.construct("Sample", first.to_generic_map()).unwrap();
        assert_eq!(first, second, "input {}", input);
    }
}

#[test]
fn test_strict_reconstruction_is_stable() {
    let registry = ClassRegistry::new();
    ClassBuilder::new("StrictSample")
        .attribute(AttributeDecl::new("id").typed(PrimitiveKind::Integer))
        .attribute(AttributeDecl::new("score").typed(PrimitiveKind::Numeric))
        .attribute(AttributeDecl::new("label").typed(PrimitiveKind::String).default("x"))
        .register_in(&registry)
        .unwrap();
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..ROUNDS {
        let score = if rng.bool() {
            Value::from(rng.i64(..))
        } else {
            Value::from(rng.f64() * 1e6)
        };
        let mut input = mapping! { "id" => rng.i64(..), "score" => score };
        if rng.bool() {
            input.insert("label", random_label(&mut rng));
        }

        let first = registry.construct("StrictSample", input).unwrap();
        let second = registry
            .construct("StrictSample", first.to_generic_map())
            .unwrap();
        assert_eq!(first, second);
    }
}
