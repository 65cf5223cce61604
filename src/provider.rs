//! Mocked provider: the scope in which operations are served from mocks.

use crate::config::{MockProviderConfig, MockedResponse, ProviderSettings};
use crate::error::{LinkError, MockError};
use crate::interceptor::WildcardStrippingLink;
use crate::link::{Link, LinkChain};
use crate::matcher::ReusableMockLink;
use crate::operation::{FetchResult, Operation};
use crate::registry::WildcardRegistry;
use crate::sanitizer::sanitize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mocked Provider
///
/// Owns the wildcard registry built from its mocks and the link chain
/// `[wildcard stripping, reusable mock engine]` every operation runs through.
pub struct MockedProvider {
    settings: ProviderSettings,
    registry: Arc<WildcardRegistry>,
    chain: LinkChain,
    mock_count: usize,
    /// Total operations processed.
    operations_total: AtomicU64,
    /// Operations that reached a mock.
    operations_matched: AtomicU64,
    /// Operations with no available mock.
    operations_unmatched: AtomicU64,
}

/// Snapshot of provider counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub total: u64,
    pub matched: u64,
    pub unmatched: u64,
}

impl MockedProvider {
    /// Create a provider with default settings.
    pub fn new(mocks: &[MockedResponse]) -> Result<Self, MockError> {
        Self::with_settings(mocks, ProviderSettings::default())
    }

    /// Create a provider. Fails before any operation runs if a mock has no
    /// operation name.
    pub fn with_settings(
        mocks: &[MockedResponse],
        settings: ProviderSettings,
    ) -> Result<Self, MockError> {
        let mut registry = WildcardRegistry::new();
        let sanitized = sanitize(mocks, &mut registry)?;
        let registry = Arc::new(registry);

        let chain = LinkChain::from_links(vec![
            Arc::new(WildcardStrippingLink::new(registry.clone())) as Arc<dyn Link>,
            Arc::new(ReusableMockLink::new(sanitized, settings.reuse)),
        ]);

        info!(
            mocks = mocks.len(),
            wildcard_operations = registry.len(),
            reuse = ?settings.reuse,
            "Mocked provider initialized"
        );

        Ok(Self {
            settings,
            registry,
            chain,
            mock_count: mocks.len(),
            operations_total: AtomicU64::new(0),
            operations_matched: AtomicU64::new(0),
            operations_unmatched: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &MockProviderConfig) -> Result<Self, MockError> {
        Self::with_settings(&config.mocks, config.settings.clone())
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, MockError> {
        let config: MockProviderConfig = serde_yaml::from_str(yaml)?;
        // Sanitization reports unnamed operations before the remaining checks
        let provider = Self::from_config(&config)?;
        config
            .validate()
            .map_err(|e| MockError::Invalid(e.to_string()))?;
        Ok(provider)
    }

    /// Wildcard keys recorded for this provider's mocks.
    pub fn registry(&self) -> &WildcardRegistry {
        &self.registry
    }

    /// Number of mocks registered at construction.
    pub fn mock_count(&self) -> usize {
        self.mock_count
    }

    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            total: self.operations_total.load(Ordering::Relaxed),
            matched: self.operations_matched.load(Ordering::Relaxed),
            unmatched: self.operations_unmatched.load(Ordering::Relaxed),
        }
    }

    /// Handle for consumers inside this provider's scope.
    pub fn client(&self) -> MockClient<'_> {
        MockClient { provider: self }
    }

    /// Run an operation through the link chain.
    pub async fn execute(&self, operation: Operation) -> Result<FetchResult, LinkError> {
        self.operations_total.fetch_add(1, Ordering::Relaxed);
        let name = operation.display_name().to_string();
        debug!(operation = %name, kind = %operation.kind, "Executing operation");

        let result = self.chain.execute(operation).await;

        match &result {
            Err(LinkError::NoMatch { variables, .. }) => {
                self.operations_unmatched.fetch_add(1, Ordering::Relaxed);
                if self.settings.log_unmatched {
                    warn!(operation = %name, variables = %variables, "No mocked response matched");
                }
            }
            _ => {
                self.operations_matched.fetch_add(1, Ordering::Relaxed);
                if self.settings.log_matches {
                    info!(operation = %name, ok = result.is_ok(), "Operation matched mock");
                }
            }
        }

        result
    }
}

/// Client handle that issues operations against a [`MockedProvider`].
#[derive(Clone, Copy)]
pub struct MockClient<'a> {
    provider: &'a MockedProvider,
}

impl MockClient<'_> {
    /// Execute `document` with `variables` (a JSON object, or null for none).
    pub async fn query(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<FetchResult, LinkError> {
        self.provider
            .execute(Operation::new(document).with_variables(variables))
            .await
    }
}
