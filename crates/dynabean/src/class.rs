//! Class descriptors for dynamic beans
//!
//! A `DynaClass` names a bean shape: an ordered list of property
//! descriptors, each pairing a name with a declared `PropertyType`.
//! Descriptors are immutable once built and shared through `Arc`.

use crate::bean::DynaBean;
use crate::ty::PropertyType;
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A property descriptor: name plus declared type
#[derive(Debug, Clone, PartialEq)]
pub struct DynaProperty {
    name: String,
    ty: PropertyType,
}

impl DynaProperty {
    /// Create a property descriptor
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    pub fn ty(&self) -> &PropertyType {
        &self.ty
    }

    /// Check if indexed accessors apply
    pub fn is_indexed(&self) -> bool {
        self.ty.is_indexed()
    }

    /// Check if mapped accessors apply
    pub fn is_mapped(&self) -> bool {
        self.ty.is_mapped()
    }
}

/// Builder for `DynaClass`
#[derive(Debug)]
pub struct DynaClassBuilder {
    name: String,
    properties: Vec<DynaProperty>,
    lookup: FxHashMap<String, usize>,
}

impl DynaClassBuilder {
    /// Declare a property. Redeclaring a name replaces its type in place.
    pub fn property(mut self, name: impl Into<String>, ty: PropertyType) -> Self {
        let name = name.into();
        match self.lookup.get(&name) {
            Some(&index) => self.properties[index].ty = ty,
            None => {
                self.lookup.insert(name.clone(), self.properties.len());
                self.properties.push(DynaProperty::new(name, ty));
            }
        }
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> Arc<DynaClass> {
        Arc::new(DynaClass {
            name: self.name,
            properties: self.properties,
            lookup: self.lookup,
        })
    }
}

/// Bean class descriptor
#[derive(Debug, Clone)]
pub struct DynaClass {
    name: String,
    properties: Vec<DynaProperty>,
    lookup: FxHashMap<String, usize>,
}

impl DynaClass {
    /// Start building a class with the given name
    pub fn builder(name: impl Into<String>) -> DynaClassBuilder {
        DynaClassBuilder {
            name: name.into(),
            properties: Vec::new(),
            lookup: FxHashMap::default(),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a property descriptor by name
    pub fn dyna_property(&self, name: &str) -> Option<&DynaProperty> {
        self.lookup.get(name).map(|&index| &self.properties[index])
    }

    /// All property descriptors in declaration order
    pub fn dyna_properties(&self) -> &[DynaProperty] {
        &self.properties
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the class declares no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Create an empty bean bound to this class
    pub fn new_instance(self: Arc<Self>) -> DynaBean {
        DynaBean::with_class(self)
    }
}

impl PartialEq for DynaClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.properties == other.properties
    }
}

impl Hash for DynaClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        for property in &self.properties {
            property.name.hash(state);
        }
    }
}
