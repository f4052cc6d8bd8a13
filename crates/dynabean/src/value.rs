//! Tagged property values
//!
//! `Value` is what a bean stores per slot. Scalars carry their primitive
//! kind so assignments can be checked against the declared slot type, and
//! collections keep the array/list distinction the slot types make.

use crate::bean::DynaBean;
use crate::ty::PrimitiveKind;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A property value
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent / null
    Null,
    /// `boolean`
    Bool(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(char),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// String
    String(String),
    /// Fixed-component array
    Array(Vec<Value>),
    /// Untyped list
    List(Vec<Value>),
    /// String-keyed map
    Map(BTreeMap<String, Value>),
    /// Nested bean
    Bean(Box<DynaBean>),
}

impl Value {
    /// Type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Char(_) => "char",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Bean(_) => "bean",
        }
    }

    /// Primitive kind of a scalar value
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Bool(_) => Some(PrimitiveKind::Boolean),
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is one of the numeric scalars
    pub fn is_numeric(&self) -> bool {
        self.primitive_kind().is_some_and(PrimitiveKind::is_numeric)
    }

    /// Check if this is an array, list, map or bean
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::List(_) | Value::Map(_) | Value::Bean(_)
        )
    }

    /// Get the boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the char if this is a Char
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Get an integral numeric value widened to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Short(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Get any numeric value as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    /// Get the string slice if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the elements of an array or list
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the entries if this is a Map
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the nested bean if this is a Bean
    pub fn as_bean(&self) -> Option<&DynaBean> {
        match self {
            Value::Bean(bean) => Some(bean),
            _ => None,
        }
    }

    /// Convert a numeric value into another numeric kind.
    ///
    /// Integer narrowing wraps and float-to-integer conversion truncates
    /// toward zero and saturates. Returns `None` when either side is not
    /// numeric.
    pub fn cast_numeric(&self, kind: PrimitiveKind) -> Option<Value> {
        if !kind.is_numeric() {
            return None;
        }

        if let Some(n) = self.as_i64() {
            return Some(match kind {
                PrimitiveKind::Byte => Value::Byte(n as i8),
                PrimitiveKind::Short => Value::Short(n as i16),
                PrimitiveKind::Int => Value::Int(n as i32),
                PrimitiveKind::Long => Value::Long(n),
                PrimitiveKind::Float => Value::Float(n as f32),
                _ => Value::Double(n as f64),
            });
        }

        let n = match self {
            Value::Float(n) => f64::from(*n),
            Value::Double(n) => *n,
            _ => return None,
        };
        Some(match kind {
            PrimitiveKind::Byte => Value::Byte(n as i8),
            PrimitiveKind::Short => Value::Short(n as i16),
            PrimitiveKind::Int => Value::Int(n as i32),
            PrimitiveKind::Long => Value::Long(n as i64),
            PrimitiveKind::Float => Value::Float(n as f32),
            _ => Value::Double(n),
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            // NaN compares equal to NaN so that Eq stays reflexive
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Bean(a), Value::Bean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

fn float_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Byte(n) => n.hash(state),
            Value::Char(c) => c.hash(state),
            Value::Short(n) => n.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Long(n) => n.hash(state),
            Value::Float(n) => float_bits(f64::from(*n)).hash(state),
            Value::Double(n) => float_bits(*n).hash(state),
            Value::String(s) => s.hash(state),
            Value::Array(items) | Value::List(items) => items.hash(state),
            Value::Map(map) => map.hash(state),
            Value::Bean(bean) => bean.hash(state),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) | Value::List(items) => write_items(f, items),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Bean(bean) => write!(f, "{}", bean),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i8> for Value {
    fn from(n: i8) -> Self {
        Value::Byte(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Value::Short(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<DynaBean> for Value {
    fn from(bean: DynaBean) -> Self {
        Value::Bean(Box::new(bean))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Short(1).type_name(), "short");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
        assert_eq!(Value::List(vec![]).type_name(), "list");
    }

    #[test]
    fn test_array_and_list_are_distinct() {
        assert_ne!(Value::Array(vec![Value::Int(1)]), Value::List(vec![Value::Int(1)]));
    }

    #[test]
    fn test_nan_and_signed_zero() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_eq!(hash_of(&Value::Double(f64::NAN)), hash_of(&Value::Double(f64::NAN)));
        assert_eq!(Value::Double(0.0), Value::Double(-0.0));
        assert_eq!(hash_of(&Value::Double(0.0)), hash_of(&Value::Double(-0.0)));
    }

    #[test]
    fn test_cast_numeric() {
        assert_eq!(Value::Double(3.9).cast_numeric(PrimitiveKind::Int), Some(Value::Int(3)));
        assert_eq!(Value::Double(-3.9).cast_numeric(PrimitiveKind::Long), Some(Value::Long(-3)));
        assert_eq!(Value::Int(300).cast_numeric(PrimitiveKind::Byte), Some(Value::Byte(44)));
        assert_eq!(Value::Byte(7).cast_numeric(PrimitiveKind::Double), Some(Value::Double(7.0)));
        assert_eq!(
            Value::Double(1e20).cast_numeric(PrimitiveKind::Int),
            Some(Value::Int(i32::MAX))
        );
        assert_eq!(Value::Bool(true).cast_numeric(PrimitiveKind::Int), None);
        assert_eq!(Value::Int(1).cast_numeric(PrimitiveKind::Char), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::String("hi".into()).to_string(), "hi");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Bool(true)]).to_string(),
            "[1, true]"
        );
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Null);
        assert_eq!(Value::Map(map).to_string(), "{a=null, b=2}");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
