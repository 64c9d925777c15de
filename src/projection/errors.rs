//! Projection error types
//!
//! Error codes:
//! - GATE_FILTER_INVALID: an `only` selector cannot be applied
//! - GATE_DATA_INCONSISTENT: a resolved result has an unexpected shape
//!
//! Both are non-retryable and abort projection for the whole query.

use std::fmt;

use thiserror::Error;

use crate::domain::{ResourceId, ResourceValue, Statement};

/// Projection error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorCode {
    /// Filter configuration cannot be applied
    GateFilterInvalid,
    /// Resolved resources are not in the expected shape
    GateDataInconsistent,
}

impl FilterErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FilterErrorCode::GateFilterInvalid => "GATE_FILTER_INVALID",
            FilterErrorCode::GateDataInconsistent => "GATE_DATA_INCONSISTENT",
        }
    }
}

impl fmt::Display for FilterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure while projecting a single result
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// Regex argument of a match selector does not compile
    #[error("failed to parse match argument '{pattern}': {source}")]
    InvalidMatchArg {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Match selector without a target field
    #[error("match filter has no target field")]
    EmptyMatchTarget,

    /// Result is neither a record nor a list of records
    #[error("resource result has unknown type {type_name} with value: {value}")]
    UnknownResultShape {
        type_name: &'static str,
        value: String,
    },

    /// Statement has filters but no result was stored for it
    #[error("no result found for resource {0}")]
    MissingResult(ResourceId),
}

impl FilterError {
    /// Returns the error code
    pub fn code(&self) -> FilterErrorCode {
        match self {
            FilterError::InvalidMatchArg { .. } | FilterError::EmptyMatchTarget => {
                FilterErrorCode::GateFilterInvalid
            }
            FilterError::UnknownResultShape { .. } | FilterError::MissingResult(_) => {
                FilterErrorCode::GateDataInconsistent
            }
        }
    }

    /// Projection faults never succeed on retry
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub(crate) fn unknown_shape(value: &ResourceValue) -> Self {
        FilterError::UnknownResultShape {
            type_name: value.type_name(),
            value: format!("{:?}", value),
        }
    }
}

/// Result type for single-result projection
pub type FilterResult<T> = Result<T, FilterError>;

/// Projection failure of a query, with the offending statement attached
#[derive(Debug, Error)]
#[error("[{}] failed to apply filter on statement {resource_id}: {cause}", .cause.code())]
pub struct ProjectionError {
    pub resource_id: ResourceId,
    pub statement: Box<Statement>,
    /// Result the filter was applied to, when one was stored
    pub resource: Option<Box<ResourceValue>>,
    #[source]
    pub cause: FilterError,
}

impl ProjectionError {
    pub fn code(&self) -> FilterErrorCode {
        self.cause.code()
    }
}

/// Result type for query-level projection
pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(FilterErrorCode::GateFilterInvalid.code(), "GATE_FILTER_INVALID");
        assert_eq!(
            FilterErrorCode::GateDataInconsistent.code(),
            "GATE_DATA_INCONSISTENT"
        );
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            FilterError::EmptyMatchTarget.code(),
            FilterErrorCode::GateFilterInvalid
        );
        let err = FilterError::unknown_shape(&ResourceValue::Pending(Statement::new("heroes")));
        assert_eq!(err.code(), FilterErrorCode::GateDataInconsistent);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Statement"));
    }

    #[test]
    fn test_projection_error_display() {
        let statement = Statement::new("heroes");
        let err = ProjectionError {
            resource_id: statement.resource_id(),
            statement: Box::new(statement),
            resource: None,
            cause: FilterError::MissingResult(ResourceId::from("heroes")),
        };

        let display = err.to_string();
        assert!(display.contains("GATE_DATA_INCONSISTENT"));
        assert!(display.contains("heroes"));
    }
}
