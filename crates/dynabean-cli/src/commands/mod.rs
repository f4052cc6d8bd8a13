//! Subcommand implementations
//!
//! Each command returns its output as a string; `main` prints it.

pub mod get;
pub mod infer;
pub mod inspect;

use anyhow::{anyhow, Context};
use clap::Args;
use dynabean::{to_bean, to_bean_with_class, DynaBean, Schema};
use std::path::{Path, PathBuf};

/// Optional schema selection shared by `inspect` and `get`
#[derive(Args, Debug, Default, Clone)]
pub struct SchemaArgs {
    /// TOML schema declaring the document's class
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// Class to bind (defaults to the last class in the schema)
    #[arg(long, requires = "schema")]
    pub class: Option<String>,
}

/// Read and parse a JSON document
pub fn read_document(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Load a document into a bean, using the schema when one is given
pub fn load_bean(path: &Path, args: &SchemaArgs) -> anyhow::Result<DynaBean> {
    let document = read_document(path)?;

    let Some(schema_path) = &args.schema else {
        return to_bean(&document).with_context(|| format!("Cannot load {}", path.display()));
    };

    let schema = Schema::load(schema_path)
        .with_context(|| format!("Cannot load schema {}", schema_path.display()))?;
    let class = match &args.class {
        Some(name) => schema
            .class(name)
            .ok_or_else(|| anyhow!("Class {} is not declared in {}", name, schema_path.display()))?,
        None => schema
            .root()
            .ok_or_else(|| anyhow!("Schema {} declares no classes", schema_path.display()))?,
    };
    tracing::debug!(class = class.name(), "binding document");

    to_bean_with_class(&document, class).with_context(|| format!("Cannot load {}", path.display()))
}
