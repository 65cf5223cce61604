//! Operation matching against mocked responses.
//!
//! [`MockLink`] is the exact-match engine: an operation matches a mock when its
//! name and variables are deeply equal to the mock's, and a matched mock is
//! consumed. [`ReusableMockLink`] wraps it and re-arms mocks after each
//! request so repeated operations keep resolving.

use crate::config::{MockOutcome, ReusePolicy};
use crate::error::LinkError;
use crate::link::{Forward, Link};
use crate::operation::{FetchResult, Operation};
use crate::sanitizer::SanitizedMock;
use crate::template::TemplateEngine;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Exact-match mock engine.
pub struct MockLink {
    /// Available mocks by operation name, in registration order
    mocked_responses: Mutex<HashMap<String, Vec<SanitizedMock>>>,
    template_engine: TemplateEngine,
}

impl MockLink {
    /// Create an engine with every mock available once.
    pub fn new(mocks: &[SanitizedMock]) -> Self {
        let mut mocked_responses: HashMap<String, Vec<SanitizedMock>> = HashMap::new();
        for mock in mocks {
            mocked_responses
                .entry(mock.operation_name.clone())
                .or_default()
                .push(mock.clone());
        }

        Self {
            mocked_responses: Mutex::new(mocked_responses),
            template_engine: TemplateEngine::new(),
        }
    }

    /// Make `mock` available for one more match.
    pub async fn add_mocked_response(&self, mock: SanitizedMock) {
        self.mocked_responses
            .lock()
            .await
            .entry(mock.operation_name.clone())
            .or_default()
            .push(mock);
    }

    /// Number of mocks still available for an operation.
    pub async fn available(&self, operation_name: &str) -> usize {
        self.mocked_responses
            .lock()
            .await
            .get(operation_name)
            .map(|mocks| mocks.len())
            .unwrap_or(0)
    }

    /// Remove and return the first available mock matching `operation`.
    pub async fn take(&self, operation: &Operation) -> Result<SanitizedMock, LinkError> {
        let mut mocked_responses = self.mocked_responses.lock().await;

        if let Some(name) = &operation.operation_name {
            if let Some(candidates) = mocked_responses.get_mut(name) {
                if let Some(idx) = candidates
                    .iter()
                    .position(|mock| mock.variables == operation.variables)
                {
                    return Ok(candidates.remove(idx));
                }
            }
        }

        Err(LinkError::NoMatch {
            operation_name: operation.display_name().to_string(),
            variables: serde_json::Value::Object(operation.variables.clone()),
        })
    }

    /// Produce the canned outcome of `mock` for `operation`.
    pub async fn deliver(
        &self,
        mock: &SanitizedMock,
        operation: &Operation,
    ) -> Result<FetchResult, LinkError> {
        if let Some(delay) = &mock.delay {
            let delay = delay.calculate();
            if !delay.is_zero() {
                debug!(operation = %mock.operation_name, delay_ms = delay.as_millis() as u64, "Applying delay");
                tokio::time::sleep(delay).await;
            }
        }

        match &mock.outcome {
            MockOutcome::Error(message) => Err(LinkError::Network(message.clone())),
            MockOutcome::Result(result) if mock.template => self.render(result, operation),
            MockOutcome::Result(result) => Ok(result.clone()),
        }
    }

    fn render(&self, result: &FetchResult, operation: &Operation) -> Result<FetchResult, LinkError> {
        let render = |value: &serde_json::Value| {
            self.template_engine
                .render_json(value, operation)
                .map_err(|e| LinkError::Template(e.to_string()))
        };

        Ok(FetchResult {
            data: result.data.as_ref().map(render).transpose()?,
            errors: result.errors.iter().map(render).collect::<Result<_, _>>()?,
        })
    }
}

#[async_trait]
impl Link for MockLink {
    async fn request(
        &self,
        operation: Operation,
        _forward: Forward<'_>,
    ) -> Result<FetchResult, LinkError> {
        let mock = self.take(&operation).await?;
        self.deliver(&mock, &operation).await
    }
}

/// Mock engine whose mocks survive being matched.
pub struct ReusableMockLink {
    inner: MockLink,
    /// The sanitized mocks as registered
    mocks: Vec<SanitizedMock>,
    policy: ReusePolicy,
}

impl ReusableMockLink {
    pub fn new(mocks: Vec<SanitizedMock>, policy: ReusePolicy) -> Self {
        Self {
            inner: MockLink::new(&mocks),
            mocks,
            policy,
        }
    }

    /// The wrapped engine.
    pub fn inner(&self) -> &MockLink {
        &self.inner
    }

    /// Put a mock back into the engine after `operation` was attempted.
    async fn rearm(&self, operation: &Operation, matched: Option<&SanitizedMock>) {
        let mock = match self.policy {
            ReusePolicy::Never => None,
            ReusePolicy::MatchedMock => matched.cloned(),
            ReusePolicy::OperationName => operation.operation_name.as_ref().and_then(|name| {
                self.mocks
                    .iter()
                    .find(|mock| &mock.operation_name == name)
                    .cloned()
            }),
        };

        if let Some(mock) = mock {
            debug!(operation = %mock.operation_name, "Re-armed mocked response");
            self.inner.add_mocked_response(mock).await;
        }
    }
}

#[async_trait]
impl Link for ReusableMockLink {
    async fn request(
        &self,
        operation: Operation,
        _forward: Forward<'_>,
    ) -> Result<FetchResult, LinkError> {
        let taken = self.inner.take(&operation).await;
        self.rearm(&operation, taken.as_ref().ok()).await;
        let mock = taken?;
        self.inner.deliver(&mock, &operation).await
    }
}
