//! Error types for dynamic bean access

/// Result type for bean operations
pub type BeanResult<T> = Result<T, BeanError>;

/// Errors raised while reading, writing or converting bean properties
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeanError {
    /// The bean has no class descriptor bound yet
    #[error("No class descriptor bound to bean")]
    NoDynaClass,

    /// The class descriptor does not declare the property
    #[error("Unspecified property for {name}")]
    UnknownProperty {
        /// Requested property name
        name: String,
    },

    /// Indexed access on a property that is neither an array nor a list
    #[error("Non-indexed property name: {name} index: {index}")]
    NonIndexed {
        /// Property name
        name: String,
        /// Requested index
        index: usize,
    },

    /// Keyed access on a property that is not a map
    #[error("Non-mapped property name: {name} key: {key}")]
    NonMapped {
        /// Property name
        name: String,
        /// Requested key
        key: String,
    },

    /// Index past the end of an indexed property
    #[error("Index {index} out of bounds for property {name} (length {len})")]
    IndexOutOfBounds {
        /// Property name
        name: String,
        /// Requested index
        index: usize,
        /// Current length
        len: usize,
    },

    /// Value could not be converted into the target type
    #[error("Cannot convert {from} to {to}: {reason}")]
    Conversion {
        /// Source value type name
        from: String,
        /// Target property type
        to: String,
        /// Why the conversion failed
        reason: String,
    },

    /// Value is not assignable and no coercion applies
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected property type
        expected: String,
        /// Actual value type name
        got: String,
    },

    /// No registered morpher handles the target type
    #[error("No morpher registered for {target}")]
    NoMorpher {
        /// Target property type
        target: String,
    },

    /// A JSON document root was not an object
    #[error("Expected JSON object, got {got}")]
    NotAnObject {
        /// JSON type name of the root
        got: String,
    },

    /// Malformed property type text
    #[error("Invalid property type '{text}': {reason}")]
    TypeParse {
        /// Offending text
        text: String,
        /// Why it was rejected
        reason: String,
    },
}

impl BeanError {
    pub(crate) fn conversion(
        from: impl Into<String>,
        to: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        BeanError::Conversion {
            from: from.into(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_parse(text: &str, reason: impl Into<String>) -> Self {
        BeanError::TypeParse {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}
