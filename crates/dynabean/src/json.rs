//! JSON adaptation
//!
//! Bridges `serde_json` documents and beans. Numbers keep the narrowest of
//! `int`, `long` and `double` that represents them, arrays become lists
//! and objects become maps until a slot type says otherwise.

use crate::bean::DynaBean;
use crate::class::DynaClass;
use crate::error::{BeanError, BeanResult};
use crate::ty::{PrimitiveKind, PropertyType};
use crate::value::Value;
use rustc_hash::FxHashMap;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Class name given to the root of an inferred document
pub const ROOT_CLASS_NAME: &str = "Bean";

/// Convert a JSON value into a property value
pub fn value_from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => number_from_json(n),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        JsonValue::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), value_from_json(value)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

fn number_from_json(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map(Value::Int).unwrap_or(Value::Long(i));
    }
    n.as_f64().map(Value::Double).unwrap_or(Value::Null)
}

/// Convert a property value into JSON.
///
/// Chars become one-character strings and non-finite floats become null.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Char(c) => JsonValue::String(c.to_string()),
        Value::Float(n) => float_to_json(f64::from(*n)),
        Value::Double(n) => float_to_json(*n),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) | Value::List(items) => {
            JsonValue::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), value_to_json(value)))
                .collect(),
        ),
        Value::Bean(bean) => bean_to_json(bean),
        integral => integral
            .as_i64()
            .map(|n| JsonValue::Number(n.into()))
            .unwrap_or(JsonValue::Null),
    }
}

fn float_to_json(n: f64) -> JsonValue {
    Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Render a bean as a JSON object of its declared properties
pub fn bean_to_json(bean: &DynaBean) -> JsonValue {
    JsonValue::Object(
        bean.entries()
            .into_iter()
            .map(|(name, value)| (name, value_to_json(&value)))
            .collect(),
    )
}

/// Infer a class descriptor from the shape of a JSON object.
///
/// Nested objects become nested bean classes named after their key. Names
/// are unique within the result: a nested shape reuses a class only when
/// the shapes match, otherwise it gets a numeric suffix (`X`, `X2`, ...).
/// The root name is never given to a nested class.
pub fn infer_class(name: &str, object: &Map<String, JsonValue>) -> Arc<DynaClass> {
    let mut namer = ClassNamer::new(name);
    let properties = namer.infer_properties(object);
    build_class(name, properties)
}

/// Tracks class names handed out while inferring one document
struct ClassNamer {
    root: String,
    classes: FxHashMap<String, Arc<DynaClass>>,
}

impl ClassNamer {
    fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            classes: FxHashMap::default(),
        }
    }

    fn infer_properties(
        &mut self,
        object: &Map<String, JsonValue>,
    ) -> Vec<(String, PropertyType)> {
        object
            .iter()
            .map(|(key, value)| (key.clone(), self.infer_type(key, value)))
            .collect()
    }

    fn infer_type(&mut self, key: &str, value: &JsonValue) -> PropertyType {
        match value {
            JsonValue::Null => PropertyType::Object,
            JsonValue::Bool(_) => PropertyType::Boxed(PrimitiveKind::Boolean),
            JsonValue::Number(n) => match number_from_json(n) {
                Value::Int(_) => PropertyType::Boxed(PrimitiveKind::Int),
                Value::Long(_) => PropertyType::Boxed(PrimitiveKind::Long),
                _ => PropertyType::Boxed(PrimitiveKind::Double),
            },
            JsonValue::String(_) => PropertyType::String,
            JsonValue::Array(_) => PropertyType::List,
            JsonValue::Object(entries) => {
                let properties = self.infer_properties(entries);
                PropertyType::Bean(self.nested_class(&class_name_for(key), properties))
            }
        }
    }

    fn nested_class(
        &mut self,
        base: &str,
        properties: Vec<(String, PropertyType)>,
    ) -> Arc<DynaClass> {
        let mut suffix = 1usize;
        loop {
            let name = if suffix == 1 {
                base.to_string()
            } else {
                format!("{}{}", base, suffix)
            };
            suffix += 1;

            if name == self.root {
                continue;
            }
            match self.classes.get(&name) {
                Some(existing) if same_shape(existing, &properties) => return existing.clone(),
                Some(_) => continue,
                None => {
                    let class = build_class(&name, properties);
                    self.classes.insert(name, class.clone());
                    return class;
                }
            }
        }
    }
}

fn same_shape(class: &DynaClass, properties: &[(String, PropertyType)]) -> bool {
    class.len() == properties.len()
        && class
            .dyna_properties()
            .iter()
            .zip(properties)
            .all(|(property, (name, ty))| property.name() == name.as_str() && property.ty() == ty)
}

fn build_class(name: &str, properties: Vec<(String, PropertyType)>) -> Arc<DynaClass> {
    properties
        .into_iter()
        .fold(DynaClass::builder(name), |builder, (key, ty)| builder.property(key, ty))
        .build()
}

/// UpperCamelCase class name for a property key (`home_address` -> `HomeAddress`).
///
/// The result is always a valid class name: a leading digit gets an
/// underscore prefix, and keys without letters or digits map to
/// `ROOT_CLASS_NAME`.
pub fn class_name_for(key: &str) -> String {
    let name: String = key
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();

    match name.chars().next() {
        None => ROOT_CLASS_NAME.to_string(),
        Some(first) if first.is_numeric() => format!("_{}", name),
        Some(_) => name,
    }
}

/// Build a bean from a JSON object, inferring its class
pub fn to_bean(json: &JsonValue) -> BeanResult<DynaBean> {
    let object = expect_object(json)?;
    let class = infer_class(ROOT_CLASS_NAME, object);
    populate(class, object)
}

/// Build a bean of a known class from a JSON object.
///
/// Keys the class does not declare are skipped.
pub fn to_bean_with_class(json: &JsonValue, class: Arc<DynaClass>) -> BeanResult<DynaBean> {
    populate(class, expect_object(json)?)
}

fn expect_object(json: &JsonValue) -> BeanResult<&Map<String, JsonValue>> {
    json.as_object().ok_or_else(|| BeanError::NotAnObject {
        got: json_type_name(json).to_string(),
    })
}

fn populate(class: Arc<DynaClass>, object: &Map<String, JsonValue>) -> BeanResult<DynaBean> {
    let mut bean = class.clone().new_instance();
    for (key, value) in object {
        if class.dyna_property(key).is_none() {
            tracing::debug!(class = class.name(), key = key.as_str(), "skipping undeclared key");
            continue;
        }
        bean.set(key, value_from_json(value))?;
    }
    Ok(bean)
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_narrowest_form() {
        assert_eq!(value_from_json(&json!(7)), Value::Int(7));
        assert_eq!(value_from_json(&json!(5_000_000_000i64)), Value::Long(5_000_000_000));
        assert_eq!(value_from_json(&json!(1.5)), Value::Double(1.5));
        assert_eq!(value_from_json(&json!(u64::MAX)), Value::Double(u64::MAX as f64));
    }

    #[test]
    fn test_collections_become_lists_and_maps() {
        let value = value_from_json(&json!({"a": [1, "x"], "b": null}));
        let map = value.as_map().unwrap();
        assert_eq!(
            map["a"],
            Value::List(vec![Value::Int(1), Value::String("x".into())])
        );
        assert_eq!(map["b"], Value::Null);
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::Char('q')), json!("q"));
        assert_eq!(value_to_json(&Value::Short(-3)), json!(-3));
        assert_eq!(value_to_json(&Value::Double(f64::INFINITY)), JsonValue::Null);
        assert_eq!(
            value_to_json(&Value::Array(vec![Value::Float(0.5), Value::Null])),
            json!([0.5, null])
        );
    }

    #[test]
    fn test_infer_class() {
        let doc = json!({
            "name": "Ann",
            "age": 30,
            "ratio": 0.5,
            "active": true,
            "tags": [],
            "note": null,
            "home_address": {"city": "Oslo"}
        });
        let class = infer_class("Person", doc.as_object().unwrap());
        let ty = |name: &str| class.dyna_property(name).unwrap().ty().to_string();
        assert_eq!(ty("name"), "string");
        assert_eq!(ty("age"), "int?");
        assert_eq!(ty("ratio"), "double?");
        assert_eq!(ty("active"), "boolean?");
        assert_eq!(ty("tags"), "list");
        assert_eq!(ty("note"), "object");
        assert_eq!(ty("home_address"), "bean:HomeAddress");
    }

    #[test]
    fn test_class_name_for() {
        assert_eq!(class_name_for("home_address"), "HomeAddress");
        assert_eq!(class_name_for("user"), "User");
        assert_eq!(class_name_for("__"), ROOT_CLASS_NAME);
        assert_eq!(class_name_for("first-name"), "FirstName");
        assert_eq!(class_name_for("@type"), "Type");
        assert_eq!(class_name_for("1st_place"), "_1stPlace");
    }

    fn nested(class: &DynaClass, name: &str) -> Arc<DynaClass> {
        match class.dyna_property(name).unwrap().ty() {
            PropertyType::Bean(nested) => nested.clone(),
            other => panic!("{} is not a bean slot: {}", name, other),
        }
    }

    #[test]
    fn test_nested_class_never_takes_root_name() {
        let doc = json!({"bean": {"x": 1}});
        let class = infer_class(ROOT_CLASS_NAME, doc.as_object().unwrap());
        let inner = nested(&class, "bean");
        assert_eq!(inner.name(), "Bean2");
        assert_eq!(inner.dyna_property("x").unwrap().ty().to_string(), "int?");
    }

    #[test]
    fn test_different_shapes_under_same_key_get_distinct_names() {
        let doc = json!({"a": {"x": {"p": 1}}, "b": {"x": {"q": "s"}}});
        let class = infer_class("Root", doc.as_object().unwrap());
        let ax = nested(&nested(&class, "a"), "x");
        let bx = nested(&nested(&class, "b"), "x");
        assert_eq!(ax.name(), "X");
        assert_eq!(bx.name(), "X2");
        assert!(ax.dyna_property("p").is_some());
        assert!(bx.dyna_property("q").is_some());
    }

    #[test]
    fn test_same_shapes_share_a_class() {
        let doc = json!({"a": {"x": {"p": 1}}, "b": {"x": {"p": 2}}});
        let class = infer_class("Root", doc.as_object().unwrap());
        let ax = nested(&nested(&class, "a"), "x");
        let bx = nested(&nested(&class, "b"), "x");
        assert!(Arc::ptr_eq(&ax, &bx));
        assert_eq!(ax.name(), "X");
    }

    #[test]
    fn test_to_bean_nests_beans() {
        let bean = to_bean(&json!({"id": 1, "owner": {"name": "Ann"}})).unwrap();
        assert_eq!(bean.dyna_class().map(|c| c.name()), Some(ROOT_CLASS_NAME));
        let owner = bean.get("owner").unwrap();
        let owner = owner.as_bean().unwrap();
        assert_eq!(owner.get("name").unwrap(), Value::String("Ann".into()));
    }

    #[test]
    fn test_to_bean_rejects_non_objects() {
        assert_eq!(
            to_bean(&json!([1])).unwrap_err(),
            BeanError::NotAnObject {
                got: "array".into()
            }
        );
    }

    #[test]
    fn test_to_bean_with_class_skips_undeclared_keys() {
        let class = DynaClass::builder("Point")
            .property("x", PropertyType::Primitive(PrimitiveKind::Long))
            .build();
        let bean = to_bean_with_class(&json!({"x": 2, "y": 3}), class).unwrap();
        assert_eq!(bean.get("x").unwrap(), Value::Long(2));
        assert_eq!(bean_to_json(&bean), json!({"x": 2}));
    }
}
