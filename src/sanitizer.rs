//! Wildcard removal from registered mocks.
//!
//! Each mock's wildcard variables are dropped from its expected variables and
//! recorded in the provider's [`WildcardRegistry`], so the exact-match engine
//! only ever compares the keys a test actually cares about.

use crate::config::{DelayConfig, MockOutcome, MockedResponse};
use crate::error::MockError;
use crate::operation::operation_name;
use crate::registry::WildcardRegistry;
use crate::variables::{MockVariables, VariableValue, Variables};
use tracing::debug;

/// A mock with every wildcard removed, ready for exact matching.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedMock {
    /// Operation name read from the mock's document
    pub operation_name: String,
    /// Expected variables (empty when the mock declared none)
    pub variables: Variables,
    pub outcome: MockOutcome,
    pub delay: Option<DelayConfig>,
    pub template: bool,
}

/// Strip wildcards from `mocks`, recording them in `registry`.
///
/// The output keeps the order and length of the input. Fails on the first mock
/// whose document has no operation name.
pub fn sanitize(
    mocks: &[MockedResponse],
    registry: &mut WildcardRegistry,
) -> Result<Vec<SanitizedMock>, MockError> {
    mocks
        .iter()
        .map(|mock| sanitize_mock(mock, registry))
        .collect()
}

fn sanitize_mock(
    mock: &MockedResponse,
    registry: &mut WildcardRegistry,
) -> Result<SanitizedMock, MockError> {
    let operation_name =
        operation_name(&mock.request.query).ok_or_else(|| MockError::MissingOperationName {
            query: mock.request.query.clone(),
        })?;

    let variables = match &mock.request.variables {
        Some(declared) => remove_wildcards(declared, &operation_name, registry),
        None => Variables::new(),
    };

    Ok(SanitizedMock {
        operation_name,
        variables,
        outcome: mock.outcome.clone(),
        delay: mock.delay.clone(),
        template: mock.template,
    })
}

fn remove_wildcards(
    declared: &MockVariables,
    operation_name: &str,
    registry: &mut WildcardRegistry,
) -> Variables {
    let mut kept = Variables::new();
    for (key, value) in declared {
        match value {
            VariableValue::Wildcard => {
                debug!(operation = %operation_name, key = %key, "Registered wildcard variable");
                registry.register(operation_name, key.as_str());
            }
            VariableValue::Literal(literal) => {
                kept.insert(key.clone(), literal.clone());
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockRequest;
    use crate::variables::match_any;
    use serde_json::json;

    const GET_USER: &str = "query GetUser($id: ID!, $name: String) { user(id: $id, name: $name) { id } }";

    #[test]
    fn test_wildcards_removed_and_registered() {
        let mocks = vec![MockedResponse::new(
            MockRequest::new(GET_USER)
                .variable("id", match_any())
                .variable("name", "a"),
        )];
        let mut registry = WildcardRegistry::new();

        let sanitized = sanitize(&mocks, &mut registry).unwrap();

        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].operation_name, "GetUser");
        assert_eq!(json!(sanitized[0].variables), json!({"name": "a"}));
        assert_eq!(registry.keys_for("GetUser"), Some(&["id".to_string()][..]));
    }

    #[test]
    fn test_mock_without_variables_passes_through() {
        let mocks = vec![
            MockedResponse::new(MockRequest::new("query Ping { ping }")).with_data(json!({"ping": 1}))
        ];
        let mut registry = WildcardRegistry::new();

        let sanitized = sanitize(&mocks, &mut registry).unwrap();

        assert!(sanitized[0].variables.is_empty());
        assert_eq!(sanitized[0].outcome, mocks[0].outcome);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_literal_variables_unchanged() {
        let mocks = vec![MockedResponse::new(
            MockRequest::new(GET_USER)
                .variable("id", "1")
                .variable("name", json!(null)),
        )];
        let mut registry = WildcardRegistry::new();

        let sanitized = sanitize(&mocks, &mut registry).unwrap();

        assert_eq!(json!(sanitized[0].variables), json!({"id": "1", "name": null}));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_shared_operation_accumulates_keys() {
        let mocks = vec![
            MockedResponse::new(MockRequest::new(GET_USER).variable("id", match_any())),
            MockedResponse::new(
                MockRequest::new(GET_USER)
                    .variable("id", match_any())
                    .variable("name", match_any()),
            ),
        ];
        let mut registry = WildcardRegistry::new();

        let sanitized = sanitize(&mocks, &mut registry).unwrap();

        assert_eq!(sanitized.len(), 2);
        assert!(sanitized.iter().all(|m| m.variables.is_empty()));
        assert_eq!(
            registry.keys_for("GetUser"),
            Some(&["id".to_string(), "id".to_string(), "name".to_string()][..])
        );
    }

    #[test]
    fn test_order_preserved() {
        let mocks = vec![
            MockedResponse::new(MockRequest::new("query B { b }")),
            MockedResponse::new(MockRequest::new("query A { a }")),
        ];
        let mut registry = WildcardRegistry::new();

        let names: Vec<_> = sanitize(&mocks, &mut registry)
            .unwrap()
            .into_iter()
            .map(|m| m.operation_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_missing_operation_name() {
        let mocks = vec![
            MockedResponse::new(MockRequest::new("query Ok { ok }")),
            MockedResponse::new(MockRequest::new("{ users { id } }").variable("id", match_any())),
        ];
        let mut registry = WildcardRegistry::new();

        let err = sanitize(&mocks, &mut registry).unwrap_err();
        assert!(matches!(err, MockError::MissingOperationName { .. }));
    }
}
