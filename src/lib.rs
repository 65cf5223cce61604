//! GraphQL Mocked Provider
//!
//! A test double for a GraphQL client's transport. Operations are answered
//! from registered mocked responses instead of the network.
//!
//! # Features
//!
//! - **Exact Matching**: Operation name and variables must equal the mock's
//! - **Wildcard Variables**: Mark a variable with [`match_any`] (`!any` in
//!   YAML) and its live value is ignored when matching
//! - **Reusable Mocks**: Matched mocks are re-armed so repeated operations
//!   keep resolving
//! - **Dynamic Results**: Render result fields with Handlebars templates
//! - **Latency Simulation**: Add fixed or random delays
//! - **Network Errors**: Answer an operation with a transport failure
//!
//! # Example Configuration
//!
//! ```yaml
//! mocks:
//!   - request:
//!       query: "query GetUser($id: ID!, $at: String) { user(id: $id) { name } }"
//!       variables:
//!         id: "1"
//!         at: !any
//!     result:
//!       data:
//!         user:
//!           name: Ada
//! ```

pub mod config;
pub mod error;
pub mod interceptor;
pub mod link;
pub mod matcher;
pub mod operation;
pub mod provider;
pub mod registry;
pub mod sanitizer;
pub mod template;
pub mod variables;

pub use config::{MockProviderConfig, MockRequest, MockedResponse, ProviderSettings, ReusePolicy};
pub use error::{LinkError, MockError};
pub use operation::{FetchResult, Operation};
pub use provider::{MockClient, MockedProvider};
pub use variables::{match_any, VariableValue};
