//! Dynamic beans
//!
//! A `DynaBean` is a property bag bound to a `DynaClass`. Every access
//! resolves the property descriptor first: undeclared names are rejected,
//! indexed accessors require an array or list slot, and keyed accessors
//! require a map slot. Stored values go through assignability checks and,
//! failing those, the morpher registry.
//!
//! # Example
//!
//! ```ignore
//! let class = DynaClass::builder("Person")
//!     .property("name", PropertyType::String)
//!     .property("age", PropertyType::Primitive(PrimitiveKind::Int))
//!     .build();
//! let mut bean = class.new_instance();
//! bean.set("age", Value::Double(41.0))?;
//! assert_eq!(bean.get("age")?, Value::Int(41));
//! ```

use crate::class::DynaClass;
use crate::error::{BeanError, BeanResult};
use crate::morph::MorpherRegistry;
use crate::ty::PropertyType;
use crate::value::Value;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Largest length an array property grows to through `set_indexed`
pub const MAX_ARRAY_LEN: usize = 1 << 24;

/// A property bag validated against a class descriptor
#[derive(Clone)]
pub struct DynaBean {
    dyna_class: OnceCell<Arc<DynaClass>>,
    values: FxHashMap<String, Value>,
    morphers: Arc<MorpherRegistry>,
}

impl DynaBean {
    /// Create an unbound bean using the global morpher registry
    pub fn new() -> Self {
        Self::with_morphers(MorpherRegistry::global())
    }

    /// Create an unbound bean using a custom morpher registry
    pub fn with_morphers(morphers: Arc<MorpherRegistry>) -> Self {
        Self {
            dyna_class: OnceCell::new(),
            values: FxHashMap::default(),
            morphers,
        }
    }

    /// Create a bean bound to `class`
    pub fn with_class(class: Arc<DynaClass>) -> Self {
        let bean = Self::new();
        bean.set_dyna_class(class);
        bean
    }

    /// Bind the class descriptor.
    ///
    /// Only the first binding takes effect; returns false when a class was
    /// already bound.
    pub fn set_dyna_class(&self, class: Arc<DynaClass>) -> bool {
        match self.dyna_class.try_insert(class) {
            Ok(_) => true,
            Err((bound, rejected)) => {
                if **bound != *rejected {
                    tracing::warn!(
                        bound = bound.name(),
                        rejected = rejected.name(),
                        "ignoring second class binding"
                    );
                }
                false
            }
        }
    }

    /// Bound class descriptor
    pub fn dyna_class(&self) -> Option<&Arc<DynaClass>> {
        self.dyna_class.get()
    }

    /// Morpher registry used by `set`
    pub fn morphers(&self) -> &Arc<MorpherRegistry> {
        &self.morphers
    }

    fn property_type(&self, name: &str) -> BeanResult<PropertyType> {
        let class = self.dyna_class.get().ok_or(BeanError::NoDynaClass)?;
        class
            .dyna_property(name)
            .map(|property| property.ty().clone())
            .ok_or_else(|| BeanError::UnknownProperty {
                name: name.to_string(),
            })
    }

    // ========================================================================
    // Scalar access
    // ========================================================================

    /// Read a property.
    ///
    /// Absent values read as the slot default: zero for primitives, null
    /// for everything else.
    pub fn get(&self, name: &str) -> BeanResult<Value> {
        let ty = self.property_type(name)?;
        match self.values.get(name) {
            Some(value) if !value.is_null() => Ok(value.clone()),
            _ => Ok(ty.default_value()),
        }
    }

    /// Store a property, converting it into the declared type
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> BeanResult<()> {
        let ty = self.property_type(name)?;
        let converted = self.morphers.convert(&ty, value.into())?;
        self.values.insert(name.to_string(), converted);
        Ok(())
    }

    // ========================================================================
    // Indexed access
    // ========================================================================

    /// Read one element of an array or list property
    pub fn get_indexed(&self, name: &str, index: usize) -> BeanResult<Value> {
        let ty = self.property_type(name)?;
        if !ty.is_indexed() {
            return Err(BeanError::NonIndexed {
                name: name.to_string(),
                index,
            });
        }

        let items = self
            .values
            .get(name)
            .and_then(Value::as_slice)
            .unwrap_or_default();
        items
            .get(index)
            .cloned()
            .ok_or_else(|| BeanError::IndexOutOfBounds {
                name: name.to_string(),
                index,
                len: items.len(),
            })
    }

    /// Write one element of an array or list property.
    ///
    /// Arrays grow to fit `index`, padding with the component default, up
    /// to `MAX_ARRAY_LEN` elements. Lists accept an index up to their length, appending at the end.
    pub fn set_indexed(
        &mut self,
        name: &str,
        index: usize,
        value: impl Into<Value>,
    ) -> BeanResult<()> {
        let ty = self.property_type(name)?;
        match ty {
            PropertyType::Array(element) => {
                let converted = self.morphers.convert(&element, value.into())?;
                let current_len = self
                    .values
                    .get(name)
                    .and_then(|value| match value {
                        Value::Array(items) => Some(items.len()),
                        _ => None,
                    })
                    .unwrap_or(0);
                if index >= current_len && index >= MAX_ARRAY_LEN {
                    return Err(BeanError::IndexOutOfBounds {
                        name: name.to_string(),
                        index,
                        len: current_len,
                    });
                }

                let slot = self
                    .values
                    .entry(name.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !matches!(slot, Value::Array(_)) {
                    *slot = Value::Array(Vec::new());
                }
                if let Value::Array(items) = slot {
                    if index >= items.len() {
                        // index < MAX_ARRAY_LEN here, so this cannot overflow
                        items.resize(index + 1, element.default_value());
                    }
                    items[index] = converted;
                }
                Ok(())
            }
            PropertyType::List => {
                let slot = self
                    .values
                    .entry(name.to_string())
                    .or_insert_with(|| Value::List(Vec::new()));
                if !matches!(slot, Value::List(_)) {
                    *slot = Value::List(Vec::new());
                }
                if let Value::List(items) = slot {
                    match index.cmp(&items.len()) {
                        std::cmp::Ordering::Less => items[index] = value.into(),
                        std::cmp::Ordering::Equal => items.push(value.into()),
                        std::cmp::Ordering::Greater => {
                            return Err(BeanError::IndexOutOfBounds {
                                name: name.to_string(),
                                index,
                                len: items.len(),
                            })
                        }
                    }
                }
                Ok(())
            }
            _ => Err(BeanError::NonIndexed {
                name: name.to_string(),
                index,
            }),
        }
    }

    // ========================================================================
    // Mapped access
    // ========================================================================

    fn check_mapped(&self, name: &str, key: &str) -> BeanResult<()> {
        if self.property_type(name)?.is_mapped() {
            Ok(())
        } else {
            Err(BeanError::NonMapped {
                name: name.to_string(),
                key: key.to_string(),
            })
        }
    }

    fn mapped_mut(&mut self, name: &str) -> &mut BTreeMap<String, Value> {
        let slot = self
            .values
            .entry(name.to_string())
            .or_insert_with(|| Value::Map(BTreeMap::new()));
        if !matches!(slot, Value::Map(_)) {
            *slot = Value::Map(BTreeMap::new());
        }
        match slot {
            Value::Map(map) => map,
            _ => unreachable!("slot was just replaced with a map"),
        }
    }

    /// Read one entry of a map property. An absent map reads as empty.
    pub fn get_mapped(&self, name: &str, key: &str) -> BeanResult<Option<Value>> {
        self.check_mapped(name, key)?;
        Ok(self
            .values
            .get(name)
            .and_then(Value::as_map)
            .and_then(|map| map.get(key))
            .cloned())
    }

    /// Check if a map property has an entry for `key`
    pub fn contains(&self, name: &str, key: &str) -> BeanResult<bool> {
        self.check_mapped(name, key)?;
        Ok(self
            .values
            .get(name)
            .and_then(Value::as_map)
            .is_some_and(|map| map.contains_key(key)))
    }

    /// Write one entry of a map property, creating the map if absent.
    ///
    /// Returns the previous value for `key`.
    pub fn set_mapped(
        &mut self,
        name: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> BeanResult<Option<Value>> {
        self.check_mapped(name, key)?;
        Ok(self.mapped_mut(name).insert(key.to_string(), value.into()))
    }

    /// Remove one entry of a map property, creating the map if absent
    pub fn remove(&mut self, name: &str, key: &str) -> BeanResult<Option<Value>> {
        self.check_mapped(name, key)?;
        Ok(self.mapped_mut(name).remove(key))
    }

    // ========================================================================
    // Bulk access
    // ========================================================================

    /// Declared properties with their current values, in declaration order.
    ///
    /// An unbound bean yields its raw stored values sorted by name.
    pub fn entries(&self) -> Vec<(String, Value)> {
        match self.dyna_class.get() {
            Some(class) => class
                .dyna_properties()
                .iter()
                .map(|property| {
                    let value = match self.values.get(property.name()) {
                        Some(value) if !value.is_null() => value.clone(),
                        _ => property.ty().default_value(),
                    };
                    (property.name().to_string(), value)
                })
                .collect(),
            None => {
                let mut entries: Vec<(String, Value)> = self
                    .values
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries
            }
        }
    }

    /// Store an already converted value without descriptor checks
    pub(crate) fn put(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }
}

impl Default for DynaBean {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DynaBean {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self.dyna_class.get(), other.dyna_class.get()) {
            (Some(a), Some(b)) => **a == **b && self.entries() == other.entries(),
            (None, None) => self.entries() == other.entries(),
            _ => false,
        }
    }
}

impl Eq for DynaBean {}

impl Hash for DynaBean {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyna_class.get().map(|class| class.as_ref()).hash(state);
        self.entries().hash(state);
    }
}

impl fmt::Debug for DynaBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynaBean")
            .field("class", &self.dyna_class.get().map(|class| class.name()))
            .field("values", &self.values)
            .finish()
    }
}

impl fmt::Display for DynaBean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_name = self
            .dyna_class
            .get()
            .map(|class| class.name())
            .unwrap_or("DynaBean");
        writeln!(f, "{}[", class_name)?;
        for (name, value) in self.entries() {
            if value.is_composite() {
                // Nested beans render multi-line; shift their lines right
                let nested = value.to_string().replace('\n', "\n  ");
                writeln!(f, "  {}={}", name, nested)?;
            } else {
                writeln!(f, "  {}={}", name, value)?;
            }
        }
        write!(f, "]")
    }
}
