//! Error types for mock registration and operation resolution.

use thiserror::Error;

/// Errors raised while building a provider from mocked responses.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("Mocked request requires an operation name: {query}")]
    MissingOperationName { query: String },

    #[error("Failed to parse mock configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid mock configuration: {0}")]
    Invalid(String),
}

/// Errors returned to consumers when an operation goes through the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("No more mocked responses for operation {operation_name} with variables {variables}")]
    NoMatch {
        operation_name: String,
        variables: serde_json::Value,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to render response template: {0}")]
    Template(String),

    #[error("Operation reached the end of the link chain without a response")]
    Unterminated,
}

impl LinkError {
    /// Whether this error means no mocked response was available.
    pub fn is_no_match(&self) -> bool {
        matches!(self, LinkError::NoMatch { .. })
    }
}
