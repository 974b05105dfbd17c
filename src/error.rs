//! Error types for the condition filter engine

use thiserror::Error;

use crate::condition::{Condition, ValueKind};
use crate::tree::NodeId;

/// Main error type for the condition filter engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Operator is not valid for the leaf's value kind. Raised by the compiler only.
    #[error("Condition {condition} is not supported for {kind} values")]
    UnsupportedCondition { condition: Condition, kind: ValueKind },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a condition group")]
    NotAGroup(NodeId),

    #[error("Node {0} is not a property condition")]
    NotACondition(NodeId),

    #[error("Property is read-only: {0}")]
    ReadOnlyProperty(String),

    #[error("Invalid value for property {property}: expected {expected}")]
    InvalidValue { property: String, expected: String },

    #[error("Type {0} exposes no properties")]
    NoProperties(String),

    #[error("Invalid property reference: {0}")]
    InvalidPropertyReference(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Property resolution task failed: {0}")]
    ResolutionTask(String),
}

impl FilterError {
    /// Creates an unsupported condition error.
    pub fn unsupported(condition: Condition, kind: ValueKind) -> Self {
        FilterError::UnsupportedCondition { condition, kind }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(property: impl Into<String>, expected: impl Into<String>) -> Self {
        FilterError::InvalidValue {
            property: property.into(),
            expected: expected.into(),
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::DeserializationError(err.to_string())
    }
}

/// Result type alias for the condition filter engine
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_condition_message() {
        let err = FilterError::unsupported(Condition::Contains, ValueKind::Boolean);
        assert_eq!(
            err.to_string(),
            "Condition Contains is not supported for boolean values"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let converted: FilterError = err.into();
        assert!(matches!(converted, FilterError::DeserializationError(_)));
    }
}
