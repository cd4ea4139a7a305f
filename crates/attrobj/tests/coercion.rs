// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::too_many_lines)] // Table-driven tests

//! Coercion integration tests
//!
//! Classes configured with `type_check: coerce`, including parametrized
//! sequence/mapping types and nested class construction.

use attrobj::{
    mapping, AttributeDecl, ClassBuilder, ClassRegistry, ErrorKind, Mapping, OptionsPatch,
    PrimitiveKind, TypeDescriptor, Value,
};

fn coerced_foo(registry: &ClassRegistry) {
    ClassBuilder::new("CoercedFoo")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("a_string").typed(PrimitiveKind::String).default("its a string"))
        .attribute(AttributeDecl::new("a_boolean").typed(PrimitiveKind::Boolean).default(false))
        .attribute(AttributeDecl::new("a_integer").typed(PrimitiveKind::Integer).default(77))
        .attribute(AttributeDecl::new("a_float").typed(PrimitiveKind::Float).default(98.12))
        .attribute(AttributeDecl::new("a_numeric").typed(PrimitiveKind::Numeric).default(12.12))
        .attribute(
            AttributeDecl::new("a_symbol")
                .typed(PrimitiveKind::Symbol)
                .default(Value::symbol("some_default_symbol")),
        )
        .attribute(AttributeDecl::new("a_array").typed(PrimitiveKind::Sequence).default(Value::Null))
        .attribute(AttributeDecl::new("a_hash").typed(PrimitiveKind::Mapping).default(Value::Null))
        .attribute(AttributeDecl::new("something").default(Value::Null))
        .register_in(registry)
        .expect("CoercedFoo registers");
}

fn coerce_one(registry: &ClassRegistry, attribute: &str, value: impl Into<Value>) -> Value {
    let mut input = Mapping::new();
    input.insert(attribute, value);
    let foo = registry
        .construct("CoercedFoo", input)
        .unwrap_or_else(|e| panic!("{} failed: {}", attribute, e));
    foo.get(attribute).unwrap().clone()
}

#[test]
fn test_coerces_booleans() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);

    for input in [Value::Bool(true), Value::Integer(1), "true".into(), "1".into()] {
        assert_eq!(coerce_one(&registry, "a_boolean", input), Value::Bool(true));
    }
    for input in [
        Value::Bool(false),
        Value::Integer(0),
        "false".into(),
        "0".into(),
        "".into(),
    ] {
        assert_eq!(coerce_one(&registry, "a_boolean", input), Value::Bool(false));
    }
    assert!(coerce_one(&registry, "a_boolean", Value::Null).is_null());
}

#[test]
fn test_coerces_numbers() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);

    assert_eq!(coerce_one(&registry, "a_integer", 1.1), Value::Integer(1));
    assert_eq!(coerce_one(&registry, "a_integer", "01"), Value::Integer(1));
    assert_eq!(coerce_one(&registry, "a_integer", "1.1"), Value::Integer(1));

    assert_eq!(coerce_one(&registry, "a_float", 1), Value::Float(1.0));
    assert_eq!(coerce_one(&registry, "a_float", "01"), Value::Float(1.0));
    assert_eq!(coerce_one(&registry, "a_float", "1.5"), Value::Float(1.5));

    assert_eq!(coerce_one(&registry, "a_numeric", "1"), Value::Integer(1));
    assert_eq!(coerce_one(&registry, "a_numeric", "1.1"), Value::Float(1.1));
    assert_eq!(coerce_one(&registry, "a_numeric", 1.1), Value::Float(1.1));
    assert_eq!(coerce_one(&registry, "a_numeric", 4), Value::Integer(4));
}

#[test]
fn test_coerces_strings_and_symbols() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);

    assert_eq!(coerce_one(&registry, "a_string", 1), Value::from("1"));
    assert_eq!(
        coerce_one(&registry, "a_string", Value::symbol("abc")),
        Value::from("abc")
    );
    assert_eq!(coerce_one(&registry, "a_symbol", "1"), Value::symbol("1"));
    assert_eq!(coerce_one(&registry, "a_symbol", "asd"), Value::symbol("asd"));
}

#[test]
fn test_untyped_values_pass_through() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);
    let nested = mapping! { "x" => vec![1, 2] };
    assert_eq!(
        coerce_one(&registry, "something", nested.clone()),
        Value::Mapping(nested)
    );
}

#[test]
fn test_defaults_are_coerced_too() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);
    let foo = registry.construct("CoercedFoo", Mapping::new()).unwrap();
    assert_eq!(foo.get("a_string").unwrap(), &Value::from("its a string"));
    assert_eq!(foo.get("a_integer").unwrap(), &Value::Integer(77));
    assert_eq!(foo.get("a_numeric").unwrap(), &Value::Float(12.12));
    assert_eq!(
        foo.get("a_symbol").unwrap(),
        &Value::symbol("some_default_symbol")
    );
}

#[test]
fn test_uncoercible_values() {
    let registry = ClassRegistry::new();
    coerced_foo(&registry);

    let err = registry
        .construct("CoercedFoo", mapping! { "a_integer" => vec![1] })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UncoercibleValue);
    assert_eq!(err.class(), Some("CoercedFoo"));
    assert_eq!(err.attribute(), Some("a_integer"));

    let err = registry
        .construct("CoercedFoo", mapping! { "a_array" => "not a list" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UncoercibleValue);
}

#[test]
fn test_coerce_blanks_to_nil() {
    let registry = ClassRegistry::new();
    ClassBuilder::new("Blanky")
        .configure(OptionsPatch::new().coerce().coerce_blanks_to_nil(true))
        .attribute(AttributeDecl::new("count").typed(PrimitiveKind::Integer))
        .attribute(AttributeDecl::new("flag").typed(PrimitiveKind::Boolean))
        .attribute(AttributeDecl::new("label").typed(PrimitiveKind::String))
        .register_in(&registry)
        .unwrap();

    let blanky = registry
        .construct("Blanky", mapping! { "count" => "", "flag" => "", "label" => "" })
        .unwrap();
    assert!(blanky.get("count").unwrap().is_null());
    assert!(blanky.get("flag").unwrap().is_null());
    assert_eq!(blanky.get("label").unwrap(), &Value::from(""));
}

#[test]
fn test_blanks_kept_without_option() {
    let registry = ClassRegistry::new();
    ClassBuilder::new("Blanky")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("count").typed(PrimitiveKind::Integer))
        .register_in(&registry)
        .unwrap();
    let blanky = registry.construct("Blanky", mapping! { "count" => "" }).unwrap();
    assert_eq!(blanky.get("count").unwrap(), &Value::Integer(0));
}

fn family(registry: &ClassRegistry) {
    ClassBuilder::new("Toy")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("kind").typed(PrimitiveKind::Symbol))
        .attribute(AttributeDecl::new("size").typed(PrimitiveKind::Integer))
        .attribute(
            AttributeDecl::new("colors")
                .typed(TypeDescriptor::mapping_of(PrimitiveKind::Symbol, PrimitiveKind::Boolean)),
        )
        .register_in(registry)
        .unwrap();
    ClassBuilder::new("Child")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("name").typed(PrimitiveKind::String))
        .attribute(
            AttributeDecl::new("toys").typed(TypeDescriptor::sequence_of(TypeDescriptor::class("Toy"))),
        )
        .register_in(registry)
        .unwrap();
    ClassBuilder::new("Parent")
        .configure(OptionsPatch::new().coerce())
        .attribute(AttributeDecl::new("name").typed(PrimitiveKind::String))
        .attribute(
            AttributeDecl::new("children")
                .typed("sequence_of(Child)")
                .default(Vec::<Value>::new()),
        )
        .register_in(registry)
        .unwrap();
}

#[test]
fn test_nested_construction() {
    let registry = ClassRegistry::new();
    family(&registry);

    let parent = registry
        .construct(
            "Parent",
            mapping! {
                "name" => "Mr Leider",
                "children" => vec![mapping! {
                    "name" => "Zelda",
                    "toys" => vec![mapping! {
                        "kind" => "teddybear",
                        "size" => "1",
                        "colors" => mapping! { "red" => "true", "blue" => 0 },
                    }],
                }],
            },
        )
        .unwrap();

    let children = parent.get("children").unwrap().as_sequence().unwrap();
    let zelda = children[0].as_instance().unwrap();
    assert!(zelda.is_a("Child"));
    assert_eq!(zelda.get("name").unwrap(), &Value::from("Zelda"));

    let toys = zelda.get("toys").unwrap().as_sequence().unwrap();
    let bear = toys[0].as_instance().unwrap();
    assert_eq!(bear.get("kind").unwrap(), &Value::symbol("teddybear"));
    assert_eq!(bear.get("size").unwrap(), &Value::Integer(1));
    assert_eq!(
        bear.get("colors").unwrap(),
        &Value::Mapping(mapping! {
            Value::symbol("red") => true,
            Value::symbol("blue") => false,
        })
    );
}

#[test]
fn test_nested_instances_pass_through() {
    let registry = ClassRegistry::new();
    family(&registry);

    let toy = registry
        .construct(
            "Toy",
            mapping! { "kind" => "ball", "size" => 2, "colors" => Mapping::new() },
        )
        .unwrap();
    let child = registry
        .construct("Child", mapping! { "name" => "Link", "toys" => vec![toy.clone()] })
        .unwrap();
    let toys = child.get("toys").unwrap().as_sequence().unwrap();
    assert_eq!(toys[0], Value::Object(toy));
}

#[test]
fn test_parametrized_shape_errors() {
    let registry = ClassRegistry::new();
    family(&registry);

    let err = registry
        .construct("Child", mapping! { "name" => "Z", "toys" => "nope" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UncoercibleValue);
    assert!(err
        .to_string()
        .contains("trying to coerce into sequence_of(Toy), but value is not a sequence"));

    let err = registry
        .construct(
            "Toy",
            mapping! { "kind" => "ball", "size" => 2, "colors" => vec!["red"] },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UncoercibleValue);
    assert_eq!(err.attribute(), Some("colors"));
}

#[test]
fn test_parametrized_types_require_coerce_mode() {
    let registry = ClassRegistry::new();
    let err = ClassBuilder::new("StrictList")
        .attribute(AttributeDecl::new("items").typed(TypeDescriptor::sequence_of(PrimitiveKind::Integer)))
        .register_in(&registry)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
