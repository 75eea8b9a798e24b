//! Glue job trigger
//!
//! An event handler that starts a named Glue job and returns immediately
//! with the run id. The job itself is not awaited.

use crate::config::TriggerConfig;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_glue::Client;
use aws_sdk_glue::error::DisplayErrorContext;
use eyre::{Result, eyre};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_ATTEMPTS: u32 = 1;

/// Anything that can start a batch job by name
pub trait JobRunner: Send + Sync {
    /// Start a run and return its id, without waiting for it to finish
    fn start_job_run(&self, job_name: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Glue client tuned to fail fast
///
/// Short connect/read timeouts and a single attempt keep the triggering call
/// quick regardless of how long the job runs.
#[derive(Clone, Debug)]
pub struct GlueRunner {
    client: Client,
}

impl GlueRunner {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS environment
    pub async fn from_env() -> Self {
        Self::from_loader(aws_config::defaults(BehaviorVersion::latest())).await
    }

    /// Build a client from `loader` with the fail-fast timeouts and retries
    pub async fn from_loader(loader: ConfigLoader) -> Self {
        let config = loader
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(CONNECT_TIMEOUT)
                    .read_timeout(READ_TIMEOUT)
                    .build(),
            )
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS))
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

impl JobRunner for GlueRunner {
    async fn start_job_run(&self, job_name: &str) -> Result<Option<String>> {
        let output = self
            .client
            .start_job_run()
            .job_name(job_name)
            .send()
            .await
            .map_err(|e| eyre!("{}", DisplayErrorContext(&e)))?;
        Ok(output.job_run_id().map(str::to_string))
    }
}

/// HTTP-style handler result
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub status_code: u16,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_run_id: Option<String>,
}

impl TriggerResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Start the configured job
///
/// The event is opaque and only logged. Errors never escape: a failed call
/// becomes a 500 response carrying the error text.
pub async fn handle<R: JobRunner>(
    runner: &R,
    config: &TriggerConfig,
    event: &Value,
) -> TriggerResponse {
    let job_name = &config.job_name;
    log::debug!("Received event: {}", event);
    log::info!("Starting Glue job: {}", job_name);

    match runner.start_job_run(job_name).await {
        Ok(job_run_id) => {
            log::info!(
                "Started Glue job {} with run id: {}",
                job_name,
                job_run_id.as_deref().unwrap_or("<none>")
            );
            TriggerResponse {
                status_code: 200,
                body: format!("Glue job {} started successfully.", job_name),
                job_run_id,
            }
        }
        Err(e) => {
            log::error!("Error starting Glue job: {:#}", e);
            TriggerResponse {
                status_code: 500,
                body: format!("Error starting Glue job: {}", e),
                job_run_id: None,
            }
        }
    }
}
