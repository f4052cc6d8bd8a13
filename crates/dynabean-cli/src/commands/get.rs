//! `dynabean get`: print a single property.

use super::{load_bean, SchemaArgs};
use anyhow::Context;
use dynabean::Value;
use std::path::Path;

/// Which part of the property to print
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Whole,
    Index(usize),
    Key(String),
}

pub fn execute(
    file: &Path,
    property: &str,
    selector: Selector,
    schema: &SchemaArgs,
) -> anyhow::Result<String> {
    let bean = load_bean(file, schema)?;
    let value = match &selector {
        Selector::Whole => bean.get(property),
        Selector::Index(index) => bean.get_indexed(property, *index),
        Selector::Key(key) => bean.get_mapped(property, key).map(|v| v.unwrap_or(Value::Null)),
    }
    .with_context(|| format!("Cannot read {} from {}", property, file.display()))?;
    Ok(value.to_string())
}
