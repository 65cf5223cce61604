//! GraphQL Mocked Provider - CLI Entry Point
//!
//! Validates mock fixtures and replays operations against them.

use anyhow::Result;
use clap::Parser;
use graphql_mocked_provider::{MockProviderConfig, MockedProvider, Operation};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "graphql-mocked-provider",
    about = "Mocked GraphQL transport - validate mock fixtures and replay operations",
    version
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mocks.yaml")]
    config: PathBuf,

    /// YAML file with operations to run against the mocks
    #[arg(short, long)]
    operations: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: Level,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

/// An operation read from the operations file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationDefinition {
    query: String,
    #[serde(default)]
    variables: serde_json::Value,
}

impl OperationDefinition {
    fn validate(&self) -> Result<()> {
        if !(self.variables.is_null() || self.variables.is_object()) {
            anyhow::bail!("variables must be a mapping, got {}", self.variables);
        }
        Ok(())
    }
}

fn build_operation(definition: OperationDefinition) -> Result<Operation> {
    definition.validate()?;
    Ok(Operation::new(definition.query).with_variables(definition.variables))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so results on stdout stay machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.print_config {
        println!("{}", include_str!("../demos/default-config.yaml"));
        return Ok(());
    }

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {:?}", args.config);
    }
    info!(path = ?args.config, "Loading configuration");
    let config = MockProviderConfig::from_file(&args.config)?;

    // Construction also checks every mock has a named operation
    let provider = MockedProvider::from_config(&config)?;

    if args.validate {
        println!(
            "Configuration is valid ({} mocks, {} operations with wildcards)",
            provider.mock_count(),
            provider.registry().len()
        );
        return Ok(());
    }

    let Some(path) = args.operations else {
        anyhow::bail!("Nothing to do: pass --operations, --validate or --print-config");
    };

    let content = std::fs::read_to_string(&path)?;
    let operations: Vec<OperationDefinition> = serde_yaml::from_str(&content)?;
    info!(path = ?path, operations = operations.len(), "Replaying operations");

    for (i, definition) in operations.into_iter().enumerate() {
        let operation = build_operation(definition)
            .map_err(|e| anyhow::anyhow!("Operation {}: {}", i, e))?;
        let name = operation.display_name().to_string();

        let line = match provider.execute(operation).await {
            Ok(result) => serde_json::json!({ "operation": name, "result": result }),
            Err(e) => serde_json::json!({ "operation": name, "error": e.to_string() }),
        };
        println!("{}", line);
    }

    let stats = provider.stats();
    info!(
        total = stats.total,
        matched = stats.matched,
        unmatched = stats.unmatched,
        "Replay finished"
    );

    Ok(())
}
