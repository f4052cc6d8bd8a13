//! Dynamic property beans
//!
//! This crate provides late-bound property containers over JSON object
//! models:
//! - Class descriptors declaring named, typed properties
//! - Beans storing scalar, indexed and mapped property values
//! - Assignability checks with a numeric widening/narrowing table
//! - A morpher registry for conversions the table does not cover
//! - JSON adaptation and TOML schema loading

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod assign;
pub mod bean;
pub mod class;
pub mod error;
pub mod json;
pub mod morph;
pub mod schema;
pub mod ty;
pub mod value;

pub use assign::{assignability, coerce, numeric_coercion, Assignability, NumericCoercion};
pub use bean::{DynaBean, MAX_ARRAY_LEN};
pub use class::{DynaClass, DynaClassBuilder, DynaProperty};
pub use error::{BeanError, BeanResult};
pub use json::{bean_to_json, infer_class, to_bean, to_bean_with_class};
pub use morph::{Morpher, MorpherRegistry};
pub use schema::{Schema, SchemaError, SchemaFile};
pub use ty::{PrimitiveKind, PropertyType};
pub use value::Value;
