//! Morpher registry
//!
//! Morphers convert values that are not assignable to a slot type. The
//! registry is consulted by `DynaBean::set` after the direct and numeric
//! assignment rules have declined a value. The first registered morpher
//! that supports the target type performs the conversion.

use crate::assign::{self, Assignability};
use crate::error::{BeanError, BeanResult};
use crate::json;
use crate::ty::{PrimitiveKind, PropertyType};
use crate::value::Value;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

static GLOBAL_REGISTRY: Lazy<Arc<MorpherRegistry>> =
    Lazy::new(|| Arc::new(MorpherRegistry::with_defaults()));

/// Converts values into a family of property types
pub trait Morpher: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Check if this morpher handles the target type
    fn supports(&self, target: &PropertyType) -> bool;

    /// Convert `value` into `target`.
    ///
    /// `registry` is the registry doing the dispatch, for element-wise
    /// conversion of nested values.
    fn morph(
        &self,
        target: &PropertyType,
        value: Value,
        registry: &MorpherRegistry,
    ) -> BeanResult<Value>;
}

/// Ordered collection of morphers
pub struct MorpherRegistry {
    morphers: Vec<Box<dyn Morpher>>,
}

impl MorpherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            morphers: Vec::new(),
        }
    }

    /// Create a registry with the primitive, string and collection morphers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PrimitiveMorpher);
        registry.register(StringMorpher);
        registry.register(CollectionMorpher);
        registry
    }

    /// Process-wide default registry
    pub fn global() -> Arc<MorpherRegistry> {
        Arc::clone(&*GLOBAL_REGISTRY)
    }

    /// Append a morpher. Earlier registrations take precedence.
    pub fn register(&mut self, morpher: impl Morpher + 'static) {
        self.morphers.push(Box::new(morpher));
    }

    /// Number of registered morphers
    pub fn len(&self) -> usize {
        self.morphers.len()
    }

    /// Check if no morphers are registered
    pub fn is_empty(&self) -> bool {
        self.morphers.is_empty()
    }

    /// Convert `value` with the first morpher that supports `target`
    pub fn morph(&self, target: &PropertyType, value: Value) -> BeanResult<Value> {
        let morpher = self
            .morphers
            .iter()
            .find(|morpher| morpher.supports(target))
            .ok_or_else(|| BeanError::NoMorpher {
                target: target.to_string(),
            })?;

        tracing::debug!(
            morpher = morpher.name(),
            from = value.type_name(),
            to = %target,
            "morphing value"
        );
        morpher.morph(target, value, self)
    }

    /// Assign-or-morph: the conversion `set` applies to every stored value
    pub fn convert(&self, target: &PropertyType, value: Value) -> BeanResult<Value> {
        match assign::assignability(target, &value) {
            Assignability::Direct | Assignability::Numeric(_) => assign::coerce(target, value),
            Assignability::Incompatible => self.morph(target, value),
        }
    }
}

impl Default for MorpherRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for MorpherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.morphers.iter().map(|morpher| morpher.name()))
            .finish()
    }
}

// ============================================================================
// Primitive and boxed slots
// ============================================================================

/// Converts null, booleans, numbers, chars and strings into primitive kinds
pub struct PrimitiveMorpher;

impl Morpher for PrimitiveMorpher {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn supports(&self, target: &PropertyType) -> bool {
        target.primitive_kind().is_some()
    }

    fn morph(
        &self,
        target: &PropertyType,
        value: Value,
        _registry: &MorpherRegistry,
    ) -> BeanResult<Value> {
        let kind = match target.primitive_kind() {
            Some(kind) => kind,
            None => return Err(BeanError::NoMorpher { target: target.to_string() }),
        };

        match value {
            Value::Null if target.is_primitive() => Ok(kind.default_value()),
            Value::Null => Ok(Value::Null),
            Value::String(ref text) => parse_primitive(kind, text.trim())
                .map_err(|reason| BeanError::conversion("string", target, reason)),
            Value::Bool(b) => match kind {
                PrimitiveKind::Boolean => Ok(Value::Bool(b)),
                PrimitiveKind::Char => Err(BeanError::conversion(
                    "boolean",
                    target,
                    "booleans have no char form",
                )),
                _ => cast(&Value::Int(i32::from(b)), kind, target),
            },
            Value::Char(c) => match kind {
                PrimitiveKind::Char => Ok(Value::Char(c)),
                PrimitiveKind::Boolean => Err(BeanError::conversion(
                    "char",
                    target,
                    "chars have no boolean form",
                )),
                _ => cast(&Value::Long(i64::from(u32::from(c))), kind, target),
            },
            ref number if number.is_numeric() => match kind {
                PrimitiveKind::Boolean => Ok(Value::Bool(number.as_f64().unwrap_or(0.0) != 0.0)),
                PrimitiveKind::Char => number
                    .as_i64()
                    .and_then(|code| u32::try_from(code).ok())
                    .and_then(char::from_u32)
                    .map(Value::Char)
                    .ok_or_else(|| {
                        BeanError::conversion(number.type_name(), target, "not a valid code point")
                    }),
                _ => cast(number, kind, target),
            },
            other => Err(BeanError::conversion(
                other.type_name(),
                target,
                "composite values have no primitive form",
            )),
        }
    }
}

fn cast(value: &Value, kind: PrimitiveKind, target: &PropertyType) -> BeanResult<Value> {
    value
        .cast_numeric(kind)
        .ok_or_else(|| BeanError::conversion(value.type_name(), target, "not numeric"))
}

fn parse_primitive(kind: PrimitiveKind, text: &str) -> Result<Value, String> {
    match kind {
        PrimitiveKind::Boolean => parse_bool(text)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{}' is not a boolean", text)),
        PrimitiveKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(format!("'{}' is not a single character", text)),
            }
        }
        PrimitiveKind::Byte => parse_integral::<i8>(text).map(Value::Byte),
        PrimitiveKind::Short => parse_integral::<i16>(text).map(Value::Short),
        PrimitiveKind::Int => parse_integral::<i32>(text).map(Value::Int),
        PrimitiveKind::Long => parse_integral::<i64>(text).map(Value::Long),
        PrimitiveKind::Float => text
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|e| format!("'{}': {}", text, e)),
        PrimitiveKind::Double => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| format!("'{}': {}", text, e)),
    }
}

/// Integral text must fit the target; decimal text truncates toward zero.
fn parse_integral<T>(text: &str) -> Result<T, String>
where
    T: TryFrom<i64>,
{
    let wide = match text.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let n = text
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", text))?;
            if !n.is_finite() {
                return Err(format!("'{}' is not finite", text));
            }
            n.trunc() as i64
        }
    };
    T::try_from(wide).map_err(|_| format!("{} is out of range", wide))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

// ============================================================================
// String slots
// ============================================================================

/// Renders scalars with `Display` and composites as JSON text
pub struct StringMorpher;

impl Morpher for StringMorpher {
    fn name(&self) -> &'static str {
        "string"
    }

    fn supports(&self, target: &PropertyType) -> bool {
        matches!(target, PropertyType::String)
    }

    fn morph(
        &self,
        _target: &PropertyType,
        value: Value,
        _registry: &MorpherRegistry,
    ) -> BeanResult<Value> {
        Ok(match value {
            Value::Null => Value::Null,
            composite if composite.is_composite() => {
                Value::String(json::value_to_json(&composite).to_string())
            }
            scalar => Value::String(scalar.to_string()),
        })
    }
}

// ============================================================================
// Collection and bean slots
// ============================================================================

/// Converts between arrays, lists, maps and nested beans
pub struct CollectionMorpher;

impl Morpher for CollectionMorpher {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn supports(&self, target: &PropertyType) -> bool {
        matches!(
            target,
            PropertyType::Array(_) | PropertyType::List | PropertyType::Map | PropertyType::Bean(_)
        )
    }

    fn morph(
        &self,
        target: &PropertyType,
        value: Value,
        registry: &MorpherRegistry,
    ) -> BeanResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match target {
            PropertyType::List => Ok(match value {
                Value::Array(items) | Value::List(items) => Value::List(items),
                single => Value::List(vec![single]),
            }),

            PropertyType::Array(element) => {
                let items = match value {
                    Value::Array(items) | Value::List(items) => items,
                    single => vec![single],
                };
                items
                    .into_iter()
                    .map(|item| registry.convert(element, item))
                    .collect::<BeanResult<Vec<_>>>()
                    .map(Value::Array)
            }

            PropertyType::Map => match value {
                Value::Map(map) => Ok(Value::Map(map)),
                Value::Bean(bean) => {
                    let mut map = BTreeMap::new();
                    if let Some(class) = bean.dyna_class() {
                        for property in class.dyna_properties() {
                            map.insert(property.name().to_string(), bean.get(property.name())?);
                        }
                    }
                    Ok(Value::Map(map))
                }
                other => Err(BeanError::conversion(
                    other.type_name(),
                    target,
                    "only maps and beans convert to map",
                )),
            },

            PropertyType::Bean(class) => match value {
                Value::Map(map) => {
                    let mut bean = class.clone().new_instance();
                    for (key, item) in map {
                        match class.dyna_property(&key) {
                            Some(property) => {
                                let converted = registry.convert(property.ty(), item)?;
                                bean.put(key, converted);
                            }
                            None => {
                                tracing::debug!(
                                    class = class.name(),
                                    key = key.as_str(),
                                    "skipping undeclared key"
                                );
                            }
                        }
                    }
                    Ok(Value::from(bean))
                }
                other => Err(BeanError::conversion(
                    other.type_name(),
                    target,
                    "only maps convert to beans",
                )),
            },

            _ => Err(BeanError::NoMorpher {
                target: target.to_string(),
            }),
        }
    }
}
