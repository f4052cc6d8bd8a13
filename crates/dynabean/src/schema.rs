//! Class descriptors from TOML schema files
//!
//! A schema file declares one or more classes and their typed properties:
//!
//! ```toml
//! [[class]]
//! name = "Address"
//!
//! [[class.property]]
//! name = "city"
//! type = "string"
//!
//! [[class]]
//! name = "Person"
//!
//! [[class.property]]
//! name = "home"
//! type = "bean:Address"
//! ```
//!
//! `bean:` references may point at classes declared anywhere in the file.
//! Descriptors are immutable, so reference cycles are rejected.

use crate::class::DynaClass;
use crate::error::BeanError;
use crate::ty::{bean_reference, PropertyType};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read or write the schema file
    #[error("Failed to access schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to render TOML
    #[error("Failed to render schema: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Structural problem in the declarations
    #[error("Invalid schema: {0}")]
    Validation(String),

    /// Malformed property type
    #[error("Invalid schema: {0}")]
    Type(#[from] BeanError),
}

/// Parsed (unresolved) schema file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaFile {
    /// Declared classes
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDef>,
}

/// One `[[class]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDef {
    /// Class name
    pub name: String,

    /// Declared properties, in order
    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyDef>,
}

/// One `[[class.property]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDef {
    /// Property name
    pub name: String,

    /// Type text, e.g. `int`, `double?`, `string[]`, `bean:Address`
    #[serde(rename = "type")]
    pub ty: String,
}

impl SchemaFile {
    /// Parse a schema from a file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a schema from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SchemaError> {
        let schema: SchemaFile = toml::from_str(content)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Describe existing classes, including nested bean classes.
    ///
    /// Nested classes are listed before the classes that use them. Two
    /// different classes sharing a name cannot be described in one file.
    pub fn from_classes<'a, I>(classes: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = &'a Arc<DynaClass>>,
    {
        let mut schema = SchemaFile::default();
        let mut seen = FxHashMap::default();
        for class in classes {
            collect_class(class, &mut seen, &mut schema.classes)?;
        }
        Ok(schema)
    }

    /// Validate names and duplicates
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut class_names = FxHashSet::default();
        for class in &self.classes {
            if !is_valid_class_name(&class.name) {
                return Err(SchemaError::Validation(format!(
                    "Invalid class name: '{}'",
                    class.name
                )));
            }
            if !class_names.insert(class.name.as_str()) {
                return Err(SchemaError::Validation(format!(
                    "Duplicate class: {}",
                    class.name
                )));
            }

            let mut property_names = FxHashSet::default();
            for property in &class.properties {
                if property.name.is_empty() {
                    return Err(SchemaError::Validation(format!(
                        "Empty property name in {}",
                        class.name
                    )));
                }
                if !property_names.insert(property.name.as_str()) {
                    return Err(SchemaError::Validation(format!(
                        "Duplicate property {}.{}",
                        class.name, property.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve `bean:` references and build class descriptors
    pub fn resolve(&self) -> Result<Schema, SchemaError> {
        self.validate()?;

        let declared: FxHashSet<&str> = self.classes.iter().map(|c| c.name.as_str()).collect();
        for class in &self.classes {
            for property in &class.properties {
                if let Some(target) = bean_reference(&property.ty) {
                    if !declared.contains(target) {
                        return Err(SchemaError::Validation(format!(
                            "Unknown class {} referenced by {}.{}",
                            target, class.name, property.name
                        )));
                    }
                }
            }
        }

        let mut resolved: FxHashMap<String, Arc<DynaClass>> = FxHashMap::default();
        let mut pending: Vec<&ClassDef> = self.classes.iter().collect();

        while !pending.is_empty() {
            let (ready, blocked): (Vec<&ClassDef>, Vec<&ClassDef>) =
                pending.into_iter().partition(|class| {
                    class.properties.iter().all(|property| {
                        bean_reference(&property.ty).map_or(true, |t| resolved.contains_key(t))
                    })
                });

            if ready.is_empty() {
                let names: Vec<&str> = blocked.iter().map(|c| c.name.as_str()).collect();
                return Err(SchemaError::Validation(format!(
                    "Cyclic class references: {}",
                    names.join(", ")
                )));
            }

            for class in ready {
                let mut builder = DynaClass::builder(class.name.clone());
                for property in &class.properties {
                    let ty = PropertyType::parse_with(&property.ty, |name| {
                        resolved.get(name).cloned()
                    })?;
                    builder = builder.property(property.name.clone(), ty);
                }
                resolved.insert(class.name.clone(), builder.build());
            }
            pending = blocked;
        }

        let classes = self
            .classes
            .iter()
            .filter_map(|class| resolved.get(&class.name).cloned())
            .collect();
        Ok(Schema {
            classes,
            by_name: resolved,
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, SchemaError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write as TOML to a file
    pub fn to_file(&self, path: &Path) -> Result<(), SchemaError> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

fn collect_class<'a>(
    class: &'a Arc<DynaClass>,
    seen: &mut FxHashMap<&'a str, &'a Arc<DynaClass>>,
    out: &mut Vec<ClassDef>,
) -> Result<(), SchemaError> {
    if let Some(&existing) = seen.get(class.name()) {
        if Arc::ptr_eq(existing, class) || **existing == **class {
            return Ok(());
        }
        return Err(SchemaError::Validation(format!(
            "Conflicting definitions of class {}",
            class.name()
        )));
    }
    seen.insert(class.name(), class);

    for property in class.dyna_properties() {
        let mut ty = property.ty();
        while let PropertyType::Array(element) = ty {
            ty = &**element;
        }
        if let PropertyType::Bean(nested) = ty {
            collect_class(nested, seen, out)?;
        }
    }

    out.push(ClassDef {
        name: class.name().to_string(),
        properties: class
            .dyna_properties()
            .iter()
            .map(|property| PropertyDef {
                name: property.name().to_string(),
                ty: property.ty().to_string(),
            })
            .collect(),
    });
    Ok(())
}

/// Identifier-like class names: letters, digits, underscores, not starting with a digit
fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Resolved set of class descriptors
#[derive(Debug, Clone)]
pub struct Schema {
    classes: Vec<Arc<DynaClass>>,
    by_name: FxHashMap<String, Arc<DynaClass>>,
}

impl Schema {
    /// Load and resolve a schema file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        SchemaFile::from_file(path)?.resolve()
    }

    /// Look up a class by name
    pub fn class(&self, name: &str) -> Option<Arc<DynaClass>> {
        self.by_name.get(name).cloned()
    }

    /// All classes in declaration order
    pub fn classes(&self) -> &[Arc<DynaClass>] {
        &self.classes
    }

    /// Last declared class, the conventional root of a document
    pub fn root(&self) -> Option<Arc<DynaClass>> {
        self.classes.last().cloned()
    }

    /// Render back to TOML
    pub fn to_toml(&self) -> Result<String, SchemaError> {
        SchemaFile::from_classes(&self.classes)?.to_toml()
    }
}
