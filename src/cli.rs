//! CLI helper functions
//!
//! Wire the real clients (B3 over HTTP, S3, Glue) to the library operations.

use crate::{
    config::{Settings, TriggerConfig},
    portfolio::{B3Client, PagePolicy, RunOptions, RunSummary, process},
    storage::S3Store,
    trigger::{GlueRunner, TriggerResponse, handle},
};
use chrono::NaiveDate;
use eyre::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Build run options from settings and command-line flags
pub fn run_options(
    settings: &Settings,
    run_date: NaiveDate,
    strict: bool,
    local_copy: Option<PathBuf>,
) -> RunOptions {
    RunOptions {
        first_page: settings.first_page(),
        policy: if strict {
            PagePolicy::Strict
        } else {
            PagePolicy::BestEffort
        },
        run_date,
        prefix: settings.bucket_path.clone(),
        local_copy,
    }
}

/// Run the extractor against the live endpoint and bucket
///
/// Pipeline: PortfolioExtractor → PartitionCaster → ParquetUploader(S3)
pub async fn extract(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    log::info!("Connecting to {}", settings.base_url);
    let source = B3Client::try_new(settings.base_url.clone())?;
    let store = S3Store::from_settings(settings).await?;
    log::info!("Uploading to bucket {}", store.bucket());

    process(&source, &store, options).await
}

/// Read a trigger event from a JSON file, or an empty object when no file is given
pub fn read_event(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse event file: {}", path.display()))
        }
        None => Ok(Value::Object(Default::default())),
    }
}

/// Start the configured Glue job
pub async fn trigger(event: &Value) -> TriggerResponse {
    let config = TriggerConfig::from_env();
    let runner = GlueRunner::from_env().await;
    handle(&runner, &config, event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_run_options() {
        let settings = Settings {
            bucket_path: "raw/".to_string(),
            index: "IBXX".to_string(),
            ..Settings::default()
        };
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let options = run_options(&settings, date, true, None);
        assert_eq!(options.policy, PagePolicy::Strict);
        assert_eq!(options.prefix, "raw/");
        assert_eq!(options.first_page.index, "IBXX");
        assert_eq!(options.run_date, date);

        let options = run_options(&settings, date, false, None);
        assert_eq!(options.policy, PagePolicy::BestEffort);
    }

    #[test]
    fn test_read_event() {
        assert_eq!(read_event(None).unwrap(), serde_json::json!({}));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"source": "aws.events", "detail-type": "Scheduled Event"}}"#).unwrap();
        let event = read_event(Some(file.path())).unwrap();
        assert_eq!(event["source"], "aws.events");
    }

    #[test]
    fn test_read_event_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_event(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse event file"));
    }
}
