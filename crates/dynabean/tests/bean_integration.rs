//! Integration tests for beans built from JSON documents
//!
//! Tests cover:
//! - Schema file → class → bean population
//! - Inferred classes for schemaless documents
//! - Typed slot coercion through the public API
//! - Rendering beans back to JSON

use dynabean::{
    bean_to_json, to_bean, to_bean_with_class, BeanError, DynaBean, DynaClass, PrimitiveKind,
    PropertyType, Schema, SchemaFile, Value,
};
use serde_json::json;
use std::io::Write;

const ORDER_SCHEMA: &str = r#"
[[class]]
name = "Customer"

[[class.property]]
name = "name"
type = "string"

[[class.property]]
name = "vip"
type = "boolean"

[[class]]
name = "Order"

[[class.property]]
name = "id"
type = "long"

[[class.property]]
name = "total"
type = "float"

[[class.property]]
name = "quantities"
type = "short[]"

[[class.property]]
name = "notes"
type = "list"

[[class.property]]
name = "meta"
type = "map"

[[class.property]]
name = "customer"
type = "bean:Customer"

[[class.property]]
name = "discount"
type = "double?"
"#;

fn order_schema() -> Schema {
    SchemaFile::from_str(ORDER_SCHEMA).unwrap().resolve().unwrap()
}

// ============================================================================
// Schema-driven beans
// ============================================================================

#[test]
fn test_load_schema_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ORDER_SCHEMA.as_bytes()).unwrap();

    let schema = Schema::load(file.path()).unwrap();
    assert_eq!(schema.classes().len(), 2);
    assert_eq!(schema.root().map(|c| c.name().to_string()), Some("Order".into()));
}

#[test]
fn test_missing_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Schema::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to access schema file"));
}

#[test]
fn test_populate_order_from_json() {
    let schema = order_schema();
    let order = schema.class("Order").unwrap();

    let doc = json!({
        "id": 7,
        "total": 19.5,
        "quantities": [1, 2.0, "3"],
        "notes": ["gift", 1],
        "meta": {"source": "web"},
        "customer": {"name": "Ann", "vip": "yes", "age": 40},
        "unknown": true
    });

    let bean = to_bean_with_class(&doc, order).unwrap();

    assert_eq!(bean.get("id").unwrap(), Value::Long(7));
    assert_eq!(bean.get("total").unwrap(), Value::Float(19.5));
    assert_eq!(
        bean.get("quantities").unwrap(),
        Value::Array(vec![Value::Short(1), Value::Short(2), Value::Short(3)])
    );
    assert_eq!(bean.get_indexed("notes", 1).unwrap(), Value::Int(1));
    assert_eq!(
        bean.get_mapped("meta", "source").unwrap(),
        Some(Value::String("web".into()))
    );
    assert_eq!(bean.get("discount").unwrap(), Value::Null);

    let customer = bean.get("customer").unwrap();
    let customer = customer.as_bean().unwrap();
    assert_eq!(customer.get("vip").unwrap(), Value::Bool(true));
    assert!(matches!(
        customer.get("age"),
        Err(BeanError::UnknownProperty { .. })
    ));
}

#[test]
fn test_conversion_failure_surfaces() {
    let schema = order_schema();
    let err = to_bean_with_class(&json!({"id": "seven"}), schema.class("Order").unwrap())
        .unwrap_err();
    assert!(matches!(err, BeanError::Conversion { .. }));
}

#[test]
fn test_render_back_to_json() {
    let schema = order_schema();
    let mut bean = schema.class("Order").unwrap().new_instance();
    bean.set("id", 3).unwrap();
    bean.set_indexed("quantities", 1, 5).unwrap();
    bean.set_mapped("meta", "k", "v").unwrap();

    assert_eq!(
        bean_to_json(&bean),
        json!({
            "id": 3,
            "total": 0.0,
            "quantities": [0, 5],
            "notes": null,
            "meta": {"k": "v"},
            "customer": null,
            "discount": null
        })
    );
}

// ============================================================================
// Inferred beans
// ============================================================================

#[test]
fn test_inferred_bean_roundtrip() {
    let doc = json!({
        "title": "Report",
        "pages": 12,
        "ratio": 0.75,
        "draft": false,
        "authors": ["a", "b"],
        "stats": {"views": 5_000_000_000i64}
    });

    let bean = to_bean(&doc).unwrap();
    assert_eq!(bean_to_json(&bean), doc);

    let stats = bean.get("stats").unwrap();
    assert_eq!(
        stats.as_bean().unwrap().get("views").unwrap(),
        Value::Long(5_000_000_000)
    );
}

#[test]
fn test_inferred_slots_accept_updates() {
    let mut bean = to_bean(&json!({"pages": 1, "title": "x"})).unwrap();
    bean.set("pages", 2.9).unwrap();
    assert_eq!(bean.get("pages").unwrap(), Value::Int(2));
    bean.set("pages", Value::Null).unwrap();
    assert_eq!(bean.get("pages").unwrap(), Value::Null);
    bean.set("title", true).unwrap();
    assert_eq!(bean.get("title").unwrap(), Value::String("true".into()));
}

// ============================================================================
// Shared classes
// ============================================================================

#[test]
fn test_beans_share_class_across_threads() {
    let class = DynaClass::builder("Counter")
        .property("n", PropertyType::Primitive(PrimitiveKind::Long))
        .build();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let class = class.clone();
            std::thread::spawn(move || {
                let bean = DynaBean::new();
                bean.set_dyna_class(class);
                let mut bean = bean;
                bean.set("n", i).unwrap();
                bean
            })
        })
        .collect();

    let beans: Vec<DynaBean> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, bean) in beans.iter().enumerate() {
        assert_eq!(bean.get("n").unwrap(), Value::Long(i as i64));
        assert_eq!(**bean.dyna_class().unwrap(), *class);
    }
}

#[test]
fn test_racing_class_bindings_settle_on_one_class() {
    use std::sync::{Arc, Barrier};

    const THREADS: usize = 8;
    let bean = Arc::new(DynaBean::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let bean = Arc::clone(&bean);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let class = DynaClass::builder(format!("Class{}", i))
                    .property("n", PropertyType::Primitive(PrimitiveKind::Int))
                    .build();
                barrier.wait();
                let bound = bean.set_dyna_class(class);
                let seen = bean.dyna_class().unwrap().name().to_string();
                (bound, format!("Class{}", i), seen)
            })
        })
        .collect();

    let results: Vec<(bool, String, String)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<&String> = results
        .iter()
        .filter(|(bound, _, _)| *bound)
        .map(|(_, own, _)| own)
        .collect();
    assert_eq!(winners.len(), 1);

    let bound = bean.dyna_class().unwrap().name().to_string();
    assert_eq!(&bound, winners[0]);
    assert!(results.iter().all(|(_, _, seen)| *seen == bound));
}
