//! Wildcard stripping for live operations.
//!
//! Runs before the mock engine. For operations with registered wildcards, the
//! matching keys are moved out of the variables so whatever value the client
//! sent cannot break exact matching.

use crate::error::LinkError;
use crate::link::{Forward, Link};
use crate::operation::{FetchResult, Operation};
use crate::registry::WildcardRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Link that omits wildcard variables before forwarding.
pub struct WildcardStrippingLink {
    registry: Arc<WildcardRegistry>,
}

impl WildcardStrippingLink {
    pub fn new(registry: Arc<WildcardRegistry>) -> Self {
        Self { registry }
    }

    /// Return `operation` with its registered wildcard keys moved from
    /// `variables` to `stripped`. Keys the operation does not carry are ignored.
    pub fn strip(&self, mut operation: Operation) -> Operation {
        let Some(keys) = operation
            .operation_name
            .as_deref()
            .and_then(|name| self.registry.keys_for(name))
        else {
            return operation;
        };

        for key in keys {
            if let Some(value) = operation.variables.remove(key) {
                operation.stripped.insert(key.clone(), value);
            }
        }

        debug!(
            operation = %operation.display_name(),
            keys = ?keys,
            "Stripped wildcard variables"
        );
        operation
    }
}

#[async_trait]
impl Link for WildcardStrippingLink {
    async fn request(
        &self,
        operation: Operation,
        forward: Forward<'_>,
    ) -> Result<FetchResult, LinkError> {
        forward.run(self.strip(operation)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkChain;
    use serde_json::json;

    const GET_USER: &str = "query GetUser($id: ID!, $name: String) { user(id: $id, name: $name) { id } }";

    fn registry() -> Arc<WildcardRegistry> {
        let mut registry = WildcardRegistry::new();
        registry.register("GetUser", "id");
        registry.register("GetUser", "requestedAt");
        Arc::new(registry)
    }

    #[test]
    fn test_strip_registered_keys() {
        let link = WildcardStrippingLink::new(registry());
        let op = Operation::new(GET_USER)
            .variable("id", 99)
            .variable("name", "a")
            .variable("requestedAt", "2024-01-01");

        let stripped = link.strip(op);

        assert_eq!(json!(stripped.variables), json!({"name": "a"}));
        assert_eq!(
            json!(stripped.stripped),
            json!({"id": 99, "requestedAt": "2024-01-01"})
        );
    }

    #[test]
    fn test_absent_keys_ignored() {
        let link = WildcardStrippingLink::new(registry());
        let op = Operation::new(GET_USER).variable("name", "a");

        let stripped = link.strip(op.clone());

        assert_eq!(stripped.variables, op.variables);
        assert!(stripped.stripped.is_empty());
    }

    #[test]
    fn test_unregistered_operation_untouched() {
        let link = WildcardStrippingLink::new(registry());
        let op = Operation::new("query ListUsers($id: ID) { users(id: $id) { id } }").variable("id", 1);

        assert_eq!(link.strip(op.clone()), op);

        let anonymous = Operation::new("{ users { id } }").variable("id", 1);
        assert_eq!(link.strip(anonymous.clone()), anonymous);
    }

    struct Echo;

    #[async_trait]
    impl Link for Echo {
        async fn request(
            &self,
            operation: Operation,
            _forward: Forward<'_>,
        ) -> Result<FetchResult, LinkError> {
            Ok(FetchResult::data(serde_json::Value::Object(operation.variables)))
        }
    }

    #[test]
    fn test_forwards_stripped_operation() {
        let chain = LinkChain::from_links(vec![
            Arc::new(WildcardStrippingLink::new(registry())),
            Arc::new(Echo),
        ]);
        let op = Operation::new(GET_USER).variable("id", 5).variable("name", "b");

        let result = tokio_test::block_on(chain.execute(op)).unwrap();

        assert_eq!(result.data, Some(json!({"name": "b"})));
    }
}
