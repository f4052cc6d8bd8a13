//! `dynabean infer`: derive a TOML schema from a document.

use super::read_document;
use anyhow::anyhow;
use dynabean::{infer_class, SchemaFile};
use std::path::Path;

pub fn execute(file: &Path, name: &str) -> anyhow::Result<String> {
    let document = read_document(file)?;
    let object = document
        .as_object()
        .ok_or_else(|| anyhow!("{} does not hold a JSON object", file.display()))?;

    let class = infer_class(name, object);
    let schema = SchemaFile::from_classes([&class])?;
    schema.validate()?;
    Ok(schema.to_toml()?)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use dynabean::Schema;

    #[test]
    fn test_infer_writes_loadable_schema() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "order.json", ORDER_JSON);

        let toml = execute(&file, "Order").unwrap();
        let schema_path = write(&dir, "inferred.toml", &toml);
        let schema = Schema::load(&schema_path).unwrap();

        let names: Vec<&str> = schema.classes().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Buyer", "Order"]);

        let order = schema.class("Order").unwrap();
        assert_eq!(order.dyna_property("id").unwrap().ty().to_string(), "int?");
        assert_eq!(order.dyna_property("tags").unwrap().ty().to_string(), "list");
        assert_eq!(
            order.dyna_property("buyer").unwrap().ty().to_string(),
            "bean:Buyer"
        );
    }

    #[test]
    fn test_infer_accepts_non_identifier_keys() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "person.json", r#"{"first-name": "Ann", "@type": "user"}"#);

        let toml = execute(&file, "Person").unwrap();
        let schema = Schema::load(&write(&dir, "person.toml", &toml)).unwrap();
        let person = schema.class("Person").unwrap();
        assert_eq!(person.dyna_property("first-name").unwrap().ty().to_string(), "string");
        assert!(person.dyna_property("@type").is_some());
    }

    #[test]
    fn test_inferred_schemas_always_load() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("root.json", r#"{"bean": {"x": 1}}"#, "Bean"),
            ("shapes.json", r#"{"a": {"x": {"p": 1}}, "b": {"x": {"q": "s"}}}"#, "Root"),
            ("digits.json", r#"{"2nd": {"v": true}}"#, "Root"),
        ];

        for (name, json, class) in cases {
            let file = write(&dir, name, json);
            let toml = execute(&file, class).unwrap();
            let schema = Schema::load(&write(&dir, "out.toml", &toml))
                .unwrap_or_else(|e| panic!("{}: {}\n{}", name, e, toml));
            assert_eq!(schema.root().unwrap().name(), class);
        }

        let file = write(&dir, "shapes.json", r#"{"a": {"x": {"p": 1}}, "b": {"x": {"q": "s"}}}"#);
        let toml = execute(&file, "Root").unwrap();
        let schema = Schema::load(&write(&dir, "out.toml", &toml)).unwrap();
        assert!(schema.class("X").unwrap().dyna_property("p").is_some());
        assert!(schema.class("X2").unwrap().dyna_property("q").is_some());
        assert_eq!(
            schema.class("B").unwrap().dyna_property("x").unwrap().ty().to_string(),
            "bean:X2"
        );
    }

    #[test]
    fn test_infer_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "list.json", "[]");

        let err = execute(&file, "Order").unwrap_err();
        assert!(err.to_string().contains("does not hold a JSON object"));
    }

    #[test]
    fn test_infer_rejects_invalid_class_names() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "order.json", ORDER_JSON);

        assert!(execute(&file, "not a name").is_err());
    }
}
