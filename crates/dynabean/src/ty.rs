//! Property type descriptors
//!
//! A `PropertyType` is the declared type of a bean slot. It decides which
//! accessors apply (indexed, mapped or scalar), what an absent value reads
//! as, and which conversions `set` performs.

use crate::class::DynaClass;
use crate::error::{BeanError, BeanResult};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Primitive slot kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte` (8-bit signed)
    Byte,
    /// `char`
    Char,
    /// `short` (16-bit signed)
    Short,
    /// `int` (32-bit signed)
    Int,
    /// `long` (64-bit signed)
    Long,
    /// `float` (32-bit IEEE 754)
    Float,
    /// `double` (64-bit IEEE 754)
    Double,
}

impl PrimitiveKind {
    /// All kinds, in declaration order
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Keyword used in type text
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Width rank among the numeric kinds (`byte` lowest, `double` highest).
    ///
    /// `boolean` and `char` have no rank and never take part in numeric
    /// coercion.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            PrimitiveKind::Byte => Some(0),
            PrimitiveKind::Short => Some(1),
            PrimitiveKind::Int => Some(2),
            PrimitiveKind::Long => Some(3),
            PrimitiveKind::Float => Some(4),
            PrimitiveKind::Double => Some(5),
            PrimitiveKind::Boolean | PrimitiveKind::Char => None,
        }
    }

    /// Check if this is one of the six numeric kinds
    pub fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Check if this is an integral numeric kind
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long
        )
    }

    /// Zero value of the kind
    pub fn default_value(self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Byte => Value::Byte(0),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::Short => Value::Short(0),
            PrimitiveKind::Int => Value::Int(0),
            PrimitiveKind::Long => Value::Long(0),
            PrimitiveKind::Float => Value::Float(0.0),
            PrimitiveKind::Double => Value::Double(0.0),
        }
    }

    fn from_keyword(text: &str) -> Option<Self> {
        PrimitiveKind::ALL.into_iter().find(|kind| kind.name() == text)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a bean property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    /// Non-nullable primitive slot; absent values read as zero
    Primitive(PrimitiveKind),
    /// Nullable primitive wrapper; absent values read as null
    Boxed(PrimitiveKind),
    /// UTF-8 string
    String,
    /// Accepts any value
    Object,
    /// Indexed slot with a component type
    Array(Box<PropertyType>),
    /// Indexed slot with untyped elements
    List,
    /// String-keyed slot
    Map,
    /// Nested bean of a fixed class
    Bean(Arc<DynaClass>),
}

impl PropertyType {
    /// Array type with the given component type
    pub fn array_of(element: PropertyType) -> Self {
        PropertyType::Array(Box::new(element))
    }

    /// Check if indexed accessors apply
    pub fn is_indexed(&self) -> bool {
        matches!(self, PropertyType::Array(_) | PropertyType::List)
    }

    /// Check if mapped accessors apply
    pub fn is_mapped(&self) -> bool {
        matches!(self, PropertyType::Map)
    }

    /// Check if the slot is a non-nullable primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, PropertyType::Primitive(_))
    }

    /// Primitive kind of a primitive or boxed slot
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            PropertyType::Primitive(kind) | PropertyType::Boxed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Component type of an array slot
    pub fn element_type(&self) -> Option<&PropertyType> {
        match self {
            PropertyType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Value an absent slot reads as
    pub fn default_value(&self) -> Value {
        match self {
            PropertyType::Primitive(kind) => kind.default_value(),
            _ => Value::Null,
        }
    }

    /// Parse type text, resolving `bean:<Name>` references through `resolve`
    pub fn parse_with<F>(text: &str, resolve: F) -> BeanResult<PropertyType>
    where
        F: Fn(&str) -> Option<Arc<DynaClass>>,
    {
        parse_type(text.trim(), &resolve)
    }
}

fn parse_type<F>(text: &str, resolve: &F) -> BeanResult<PropertyType>
where
    F: Fn(&str) -> Option<Arc<DynaClass>>,
{
    if text.is_empty() {
        return Err(BeanError::type_parse(text, "empty type"));
    }

    if let Some(inner) = text.strip_suffix("[]") {
        return Ok(PropertyType::array_of(parse_type(inner.trim_end(), resolve)?));
    }

    if let Some(class_name) = text.strip_prefix("bean:") {
        let class_name = class_name.trim();
        if class_name.is_empty() {
            return Err(BeanError::type_parse(text, "missing class name"));
        }
        return resolve(class_name)
            .map(PropertyType::Bean)
            .ok_or_else(|| BeanError::type_parse(text, format!("unknown class {}", class_name)));
    }

    if let Some(kind) = text.strip_suffix('?') {
        return PrimitiveKind::from_keyword(kind)
            .map(PropertyType::Boxed)
            .ok_or_else(|| BeanError::type_parse(text, "only primitive kinds can be boxed"));
    }

    match text {
        "string" => Ok(PropertyType::String),
        "object" => Ok(PropertyType::Object),
        "list" => Ok(PropertyType::List),
        "map" => Ok(PropertyType::Map),
        other => PrimitiveKind::from_keyword(other)
            .map(PropertyType::Primitive)
            .ok_or_else(|| BeanError::type_parse(text, "unknown type name")),
    }
}

/// Class name referenced by `bean:<Name>` type text, looking through `[]`
pub fn bean_reference(text: &str) -> Option<&str> {
    let mut text = text.trim();
    while let Some(inner) = text.strip_suffix("[]") {
        text = inner.trim_end();
    }
    text.strip_prefix("bean:").map(str::trim)
}

impl FromStr for PropertyType {
    type Err = BeanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::parse_with(s, |_| None)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Primitive(kind) => write!(f, "{}", kind),
            PropertyType::Boxed(kind) => write!(f, "{}?", kind),
            PropertyType::String => write!(f, "string"),
            PropertyType::Object => write!(f, "object"),
            PropertyType::Array(element) => write!(f, "{}[]", element),
            PropertyType::List => write!(f, "list"),
            PropertyType::Map => write!(f, "map"),
            PropertyType::Bean(class) => write!(f, "bean:{}", class.name()),
        }
    }
}
