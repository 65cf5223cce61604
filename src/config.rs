//! Configuration for the mocked provider.
//!
//! Defines mocked responses, wildcard variables, and reuse settings.

use crate::operation::{operation_name, FetchResult};
use crate::variables::{MockVariables, VariableValue};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration for a mocked provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct MockProviderConfig {
    /// Mocked responses, in registration order
    #[serde(default)]
    pub mocks: Vec<MockedResponse>,

    /// Provider settings
    #[serde(default)]
    pub settings: ProviderSettings,
}

impl MockProviderConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (i, mock) in self.mocks.iter().enumerate() {
            mock.validate()
                .map_err(|e| anyhow::anyhow!("Mock {}: {}", i, e))?;
        }
        Ok(())
    }
}

/// A mocked request paired with its canned outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockedResponse {
    /// Request the mock answers
    pub request: MockRequest,

    /// Either `result` or `error`
    #[serde(flatten)]
    pub outcome: MockOutcome,

    /// Latency simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayConfig>,

    /// Render string fields of the result as templates
    #[serde(default)]
    pub template: bool,
}

impl MockedResponse {
    /// A mock answering `request` with an empty result.
    pub fn new(request: MockRequest) -> Self {
        Self {
            request,
            outcome: MockOutcome::Result(FetchResult::default()),
            delay: None,
            template: false,
        }
    }

    /// Answer with the given `data` payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.outcome = MockOutcome::Result(FetchResult::data(data));
        self
    }

    /// Answer with a full result, including GraphQL errors.
    pub fn with_result(mut self, result: FetchResult) -> Self {
        self.outcome = MockOutcome::Result(result);
        self
    }

    /// Answer with a network error.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.outcome = MockOutcome::Error(message.into());
        self
    }

    /// Delay the response by a fixed duration.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(DelayConfig {
            fixed_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            min_ms: 0,
            max_ms: 0,
        });
        self
    }

    /// Render the result as a template against the live operation.
    pub fn templated(mut self) -> Self {
        self.template = true;
        self
    }

    /// Validate the mocked response.
    pub fn validate(&self) -> anyhow::Result<()> {
        if operation_name(&self.request.query).is_none() {
            anyhow::bail!("Mocked request requires an operation name");
        }
        if let Some(delay) = &self.delay {
            delay.validate()?;
        }
        Ok(())
    }
}

/// The request side of a mock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockRequest {
    /// GraphQL document; must contain a named operation
    pub query: String,

    /// Expected variables (`!any` marks a wildcard)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<MockVariables>,
}

impl MockRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }

    /// Declare an expected variable. Use [`crate::match_any`] for a wildcard.
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.variables
            .get_or_insert_with(MockVariables::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Canned outcome of a mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockOutcome {
    /// Successful response with data and optional GraphQL errors
    Result(FetchResult),
    /// Network-level failure
    Error(String),
}

/// Delay/latency simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelayConfig {
    /// Fixed delay in milliseconds
    #[serde(default)]
    pub fixed_ms: u64,

    /// Minimum delay for random range (ms)
    #[serde(default)]
    pub min_ms: u64,

    /// Maximum delay for random range (ms)
    #[serde(default)]
    pub max_ms: u64,
}

impl DelayConfig {
    /// Calculate the actual delay to apply.
    pub fn calculate(&self) -> Duration {
        if self.fixed_ms > 0 {
            return Duration::from_millis(self.fixed_ms);
        }
        if self.max_ms > self.min_ms {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            return Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms));
        }
        Duration::from_millis(self.min_ms)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_ms > 0 && self.max_ms < self.min_ms {
            anyhow::bail!(
                "Invalid delay range: min_ms {} > max_ms {}",
                self.min_ms,
                self.max_ms
            );
        }
        Ok(())
    }
}

/// How consumed mocks are re-armed after a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// Re-add the first registered mock with the operation's name.
    ///
    /// This also happens after a failed request, so every unmatched attempt
    /// leaves one more copy of that mock in the pool.
    #[default]
    OperationName,
    /// Re-add exactly the mock that served the request
    MatchedMock,
    /// Mocks are consumed after one match
    Never,
}

/// Provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// How mocks are re-armed
    #[serde(default)]
    pub reuse: ReusePolicy,

    /// Log all matched operations
    #[serde(default = "default_true")]
    pub log_matches: bool,

    /// Log unmatched operations
    #[serde(default = "default_true")]
    pub log_unmatched: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            reuse: ReusePolicy::default(),
            log_matches: true,
            log_unmatched: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::match_any;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_simple_mock() {
        let yaml = r#"
mocks:
  - request:
      query: "query GetUser($id: ID!) { user(id: $id) { name } }"
      variables:
        id: "1"
    result:
      data:
        user:
          name: Ada
"#;
        let config: MockProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.mocks.len(), 1);
        let mock = &config.mocks[0];
        assert_eq!(
            mock.request.variables.as_ref().unwrap()["id"],
            VariableValue::Literal(json!("1"))
        );
        assert_eq!(
            mock.outcome,
            MockOutcome::Result(FetchResult::data(json!({"user": {"name": "Ada"}})))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_wildcard_and_error() {
        let yaml = r#"
mocks:
  - request:
      query: "mutation Save($id: ID!, $at: String) { save(id: $id, at: $at) }"
      variables:
        id: "7"
        at: !any
    error: "connection reset"
    delay:
      fixed_ms: 20
"#;
        let config: MockProviderConfig = serde_yaml::from_str(yaml).unwrap();
        let mock = &config.mocks[0];
        assert!(mock.request.variables.as_ref().unwrap()["at"].is_wildcard());
        assert_eq!(mock.outcome, MockOutcome::Error("connection reset".to_string()));
        assert_eq!(mock.delay.as_ref().unwrap().fixed_ms, 20);
    }

    #[test]
    fn test_parse_settings() {
        let yaml = r#"
settings:
  reuse: matched_mock
  log_matches: false
"#;
        let config: MockProviderConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.mocks.is_empty());
        assert_eq!(config.settings.reuse, ReusePolicy::MatchedMock);
        assert!(!config.settings.log_matches);
        assert!(config.settings.log_unmatched);
    }

    #[test]
    fn test_mock_without_outcome_is_rejected() {
        let yaml = r#"
mocks:
  - request:
      query: "query GetUser { user { name } }"
"#;
        assert!(serde_yaml::from_str::<MockProviderConfig>(yaml).is_err());
    }

    #[test]
    fn test_validate_missing_operation_name() {
        let config = MockProviderConfig {
            mocks: vec![MockedResponse::new(MockRequest::new("{ users { id } }"))],
            settings: ProviderSettings::default(),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Mock 0"));
    }

    #[test]
    fn test_validate_delay_range() {
        let mut mock = MockedResponse::new(MockRequest::new("query A { a }"));
        mock.delay = Some(DelayConfig {
            fixed_ms: 0,
            min_ms: 100,
            max_ms: 10,
        });
        assert!(mock.validate().is_err());
    }

    #[test]
    fn test_delay_calculation() {
        let fixed = DelayConfig {
            fixed_ms: 100,
            min_ms: 0,
            max_ms: 0,
        };
        assert_eq!(fixed.calculate(), Duration::from_millis(100));

        let range = DelayConfig {
            fixed_ms: 0,
            min_ms: 50,
            max_ms: 150,
        };
        let delay = range.calculate().as_millis() as u64;
        assert!((50..=150).contains(&delay));
    }

    #[test]
    fn test_builder() {
        let mock = MockedResponse::new(
            MockRequest::new("query GetUser($id: ID!) { user(id: $id) { name } }")
                .variable("id", match_any())
                .variable("locale", "en"),
        )
        .with_data(json!({"user": null}))
        .with_delay(Duration::from_millis(5))
        .templated();

        let vars = mock.request.variables.as_ref().unwrap();
        assert!(vars["id"].is_wildcard());
        assert_eq!(vars["locale"], VariableValue::Literal(json!("en")));
        assert_eq!(mock.delay.as_ref().unwrap().fixed_ms, 5);
        assert!(mock.template);
    }

    #[test]
    fn test_with_delay_saturates() {
        let mock = MockedResponse::new(MockRequest::new("query A { a }"))
            .with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(mock.delay.as_ref().unwrap().fixed_ms, u64::MAX);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config: MockProviderConfig =
            serde_yaml::from_str(include_str!("../demos/default-config.yaml")).unwrap();
        assert_eq!(config.mocks.len(), 3);
        assert!(config.mocks[0].template);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
mocks:
  - request:
      query: "query Ping {{ ping }}"
    result:
      data:
        ping: pong
"#
        )
        .unwrap();

        let config = MockProviderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mocks.len(), 1);
    }
}
