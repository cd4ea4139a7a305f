// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "yaml")]
#![allow(clippy::float_cmp)] // Test assertions with constants

//! YAML loader integration tests
//!
//! Class declarations read from files, then used for construction.

use attrobj::{
    mapping, ClassRegistry, ErrorKind, LoadError, Mapping, TypeCheckMode, Value, YamlLoader,
};
use std::fs;

const FAMILY: &str = r#"
classes:
  - name: Toy
    options: { type_check: coerce }
    attributes:
      - { name: kind, type: symbol }
      - { name: size, type: integer, default: 1 }

  - name: Child
    options:
      type_check: coerce
      coerce_blanks_to_nil: true
    attributes:
      - { name: name, type: string, disallow: null }
      - { name: age, type: integer, default: 0 }
      - { name: toys, type: "sequence_of(Toy)", default: [] }
      - { name: mood, whitelist: [happy, grumpy], default: happy }

  - name: Teen
    extends: Child
    attributes:
      - { name: phone, type: boolean, default: false }
"#;

#[test]
fn test_load_file_and_construct() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("family.yaml");
    fs::write(&path, FAMILY).expect("write schema");

    let registry = ClassRegistry::new();
    let registered = YamlLoader::load_file(&registry, &path).expect("load schema");
    let names: Vec<_> = registered.iter().map(|schema| schema.name().to_string()).collect();
    assert_eq!(names, vec!["Toy", "Child", "Teen"]);
    assert_eq!(
        registry.resolve_options("Child").unwrap().type_check,
        TypeCheckMode::Coerce
    );

    let child = registry
        .construct(
            "Child",
            mapping! { "name" => "Zelda", "age" => "", "toys" => vec![mapping! { "kind" => "doll" }] },
        )
        .unwrap();
    assert!(child.get("age").unwrap().is_null());
    assert_eq!(child.get("mood").unwrap(), &Value::from("happy"));
    let toys = child.get("toys").unwrap().as_sequence().unwrap();
    let doll = toys[0].as_instance().unwrap();
    assert_eq!(doll.get("kind").unwrap(), &Value::symbol("doll"));
    assert_eq!(doll.get("size").unwrap(), &Value::Integer(1));
}

#[test]
fn test_loaded_constraints_apply() {
    let registry = ClassRegistry::new();
    YamlLoader::load_str(&registry, FAMILY).unwrap();

    let err = registry
        .construct("Child", mapping! { "name" => Value::Null })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisallowedValue);

    let err = registry
        .construct("Child", mapping! { "name" => "Z", "mood" => "sleepy" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisallowedValue);

    let teen = registry
        .construct("Teen", mapping! { "name" => "Link", "phone" => "true" })
        .unwrap();
    assert!(teen.is_a("Child"));
    assert_eq!(teen.get("phone").unwrap(), &Value::Bool(true));
    assert_eq!(teen.get("age").unwrap(), &Value::Integer(0));
}

#[test]
fn test_default_to_type_defaults() {
    let registry = ClassRegistry::new();
    YamlLoader::load_str(
        &registry,
        r#"
classes:
  - name: Defaults
    options:
      default_to: { type_defaults: { integer: 7 } }
    attributes:
      - { name: count, type: integer }
      - { name: label, type: string }
      - { name: anything }
"#,
    )
    .unwrap();

    let defaults = registry.construct("Defaults", Mapping::new()).unwrap();
    assert_eq!(defaults.get("count").unwrap(), &Value::Integer(7));
    assert_eq!(defaults.get("label").unwrap(), &Value::from(""));
    assert!(defaults.get("anything").unwrap().is_null());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = ClassRegistry::new();
    let err = YamlLoader::load_file(&registry, dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_unknown_parent_stops_loading() {
    let registry = ClassRegistry::new();
    let err = YamlLoader::load_str(
        &registry,
        r#"
classes:
  - name: First
    attributes: [{ name: a }]
  - name: Orphan
    extends: Nobody
"#,
    )
    .unwrap_err();
    match err {
        LoadError::Schema(e) => assert_eq!(e.kind(), ErrorKind::Configuration),
        other => panic!("unexpected error: {}", other),
    }
    assert!(registry.contains("First"));
    assert!(!registry.contains("Orphan"));
}
