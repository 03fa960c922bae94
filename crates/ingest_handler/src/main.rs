mod collaborators;
mod config;

use crate::collaborators::{FieldSignalDeriver, InMemoryMilestoneAggregator};
use crate::config::ServiceConfig;
use anyhow::Context;
use common::telemetry::init_telemetry;
use ingest_worker::domain::{ChangeBatchConfig, ChangeBatchService, Invocation, InvocationResponse};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

/// Runs a single invocation: the JSON document is read from the file named by the first
/// argument, or from stdin, and the response is written to stdout.
#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_config = match config.telemetry_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid telemetry configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&telemetry_config) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!(
        environment = %config.environment,
        "Starting change ingest handler"
    );
    debug!("Configuration: {:?}", config);

    let service = ChangeBatchService::new(
        Arc::new(FieldSignalDeriver::new()),
        Arc::new(InMemoryMilestoneAggregator::new()),
        ChangeBatchConfig {
            environment: config.runtime_environment(),
        },
    );

    let response = match read_invocation(std::env::args().nth(1)).await {
        Ok(invocation) => service.handle(invocation).await,
        Err(e) => {
            error!(error = %format!("{:#}", e), "failed to read invocation");
            InvocationResponse::failure(&format!("{:#}", e))
        }
    };

    match serde_json::to_string(&response) {
        Ok(body) => println!("{}", body),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            std::process::exit(1);
        }
    }

    if !response.is_success() {
        std::process::exit(1);
    }
}

async fn read_invocation(path: Option<String>) -> anyhow::Result<Invocation> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read invocation file {}", path))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read invocation from stdin")?;
            raw
        }
    };

    if raw.trim().is_empty() {
        return Ok(Invocation::default());
    }

    serde_json::from_str(&raw).context("invocation is not valid JSON")
}
