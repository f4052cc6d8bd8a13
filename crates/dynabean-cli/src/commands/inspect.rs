//! `dynabean inspect`: print a loaded bean.

use super::{load_bean, SchemaArgs};
use std::path::Path;

pub fn execute(file: &Path, schema: &SchemaArgs, json: bool) -> anyhow::Result<String> {
    let bean = load_bean(file, schema)?;
    if json {
        Ok(serde_json::to_string_pretty(&dynabean::bean_to_json(&bean))?)
    } else {
        Ok(bean.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    #[test]
    fn test_inspect_listing() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "order.json", ORDER_JSON);
        let schema = SchemaArgs {
            schema: Some(write(&dir, "order.toml", ORDER_SCHEMA)),
            class: None,
        };

        let output = execute(&file, &schema, false).unwrap();
        assert_eq!(
            output,
            "Order[\n  id=42\n  tags=[new, gift]\n  meta={channel=web}\n  buyer=Buyer[\n    name=Ann\n  ]\n]"
        );
    }

    #[test]
    fn test_inspect_json_drops_undeclared_keys() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "order.json", ORDER_JSON);
        let schema = SchemaArgs {
            schema: Some(write(&dir, "order.toml", ORDER_SCHEMA)),
            class: None,
        };

        let output = execute(&file, &schema, true).unwrap();
        let rendered: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            rendered,
            serde_json::json!({
                "id": 42,
                "tags": ["new", "gift"],
                "meta": {"channel": "web"},
                "buyer": {"name": "Ann"}
            })
        );
    }

    #[test]
    fn test_inspect_inferred_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "order.json", ORDER_JSON);

        let output = execute(&file, &SchemaArgs::default(), true).unwrap();
        let rendered: serde_json::Value = serde_json::from_str(&output).unwrap();
        let original: serde_json::Value = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(rendered, original);
    }
}
