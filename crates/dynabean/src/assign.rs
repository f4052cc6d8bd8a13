//! Assignability and numeric coercion
//!
//! Decides whether a value can be stored into a typed slot as-is, needs a
//! numeric conversion first, or has to go through the morpher registry.
//!
//! # Numeric conversion table
//!
//! ```text
//! source \ slot   byte  short  int  long  float  double
//! byte             =     W      W    W     W      W
//! short            N     =      W    W     W      W
//! int              N     N      =    W     W      W
//! long             N     N      N    =     W      W
//! float            N     N      N    N     =      W
//! double           N     N      N    N     N      =
//! ```
//!
//! `W` widens, `N` narrows, `=` is direct. `boolean` and `char` never take
//! part in numeric conversion. A primitive value is directly assignable to
//! both the primitive and the boxed slot of its own kind.

use crate::error::{BeanError, BeanResult};
use crate::ty::{PrimitiveKind, PropertyType};
use crate::value::Value;

/// Direction of a numeric conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericCoercion {
    /// Target kind is wider than the source
    Widen,
    /// Target kind is narrower than the source
    Narrow,
}

impl NumericCoercion {
    /// Get the name of this coercion
    pub fn name(&self) -> &'static str {
        match self {
            NumericCoercion::Widen => "widen",
            NumericCoercion::Narrow => "narrow",
        }
    }
}

/// Outcome of checking a value against a slot type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignability {
    /// Store the value unchanged
    Direct,
    /// Convert the value into the slot's numeric kind first
    Numeric(NumericCoercion),
    /// Neither; the caller falls back to morphing
    Incompatible,
}

/// Numeric conversion between two kinds, if the table has an entry for it
pub fn numeric_coercion(from: PrimitiveKind, to: PrimitiveKind) -> Option<NumericCoercion> {
    let from_rank = from.numeric_rank()?;
    let to_rank = to.numeric_rank()?;

    if from_rank == to_rank {
        None
    } else if to_rank > from_rank {
        Some(NumericCoercion::Widen)
    } else {
        Some(NumericCoercion::Narrow)
    }
}

/// Check how `value` can be stored into a slot of type `dest`
pub fn assignability(dest: &PropertyType, value: &Value) -> Assignability {
    match (dest, value) {
        (PropertyType::Primitive(_), Value::Null) => Assignability::Incompatible,
        (_, Value::Null) => Assignability::Direct,

        (PropertyType::Object, _) => Assignability::Direct,

        (PropertyType::Primitive(kind) | PropertyType::Boxed(kind), _) => {
            match value.primitive_kind() {
                Some(source) if source == *kind => Assignability::Direct,
                Some(source) => numeric_coercion(source, *kind)
                    .map(Assignability::Numeric)
                    .unwrap_or(Assignability::Incompatible),
                None => Assignability::Incompatible,
            }
        }

        (PropertyType::String, Value::String(_)) => Assignability::Direct,
        (PropertyType::List, Value::List(_)) => Assignability::Direct,
        (PropertyType::Map, Value::Map(_)) => Assignability::Direct,

        (PropertyType::Array(element), Value::Array(items)) => {
            if items
                .iter()
                .all(|item| assignability(element, item) == Assignability::Direct)
            {
                Assignability::Direct
            } else {
                Assignability::Incompatible
            }
        }

        (PropertyType::Bean(class), Value::Bean(bean)) => match bean.dyna_class() {
            Some(bound) if **bound == **class => Assignability::Direct,
            _ => Assignability::Incompatible,
        },

        _ => Assignability::Incompatible,
    }
}

/// Store-ready form of `value` for a slot of type `dest`.
///
/// Applies direct and numeric assignments only; incompatible values are
/// reported as a type mismatch.
pub fn coerce(dest: &PropertyType, value: Value) -> BeanResult<Value> {
    match assignability(dest, &value) {
        Assignability::Direct => Ok(value),
        Assignability::Numeric(coercion) => {
            let converted = dest
                .primitive_kind()
                .and_then(|kind| value.cast_numeric(kind));
            match converted {
                Some(converted) => {
                    tracing::trace!(
                        from = value.type_name(),
                        to = %dest,
                        coercion = coercion.name(),
                        "numeric coercion"
                    );
                    Ok(converted)
                }
                None => Err(mismatch(dest, &value)),
            }
        }
        Assignability::Incompatible => Err(mismatch(dest, &value)),
    }
}

fn mismatch(dest: &PropertyType, value: &Value) -> BeanError {
    BeanError::TypeMismatch {
        expected: dest.to_string(),
        got: value.type_name().to_string(),
    }
}
