//! One extraction run, end to end

use super::{PagePolicy, PageRequest, PartitionCaster, PortfolioExtractor, PortfolioSource};
use crate::etl::Pipeline;
use crate::storage::{ObjectStore, ParquetUploader, object_key};
use chrono::NaiveDate;
use eyre::Result;
use std::path::PathBuf;

/// Per-run options
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub first_page: PageRequest,
    pub policy: PagePolicy,
    pub run_date: NaiveDate,
    /// Key prefix inside the bucket
    pub prefix: String,
    /// Also write the Parquet file here
    pub local_copy: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            first_page: PageRequest::default(),
            policy: PagePolicy::default(),
            run_date,
            prefix: String::new(),
            local_copy: None,
        }
    }
}

/// What a run did
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub skipped_pages: usize,
    pub rows_written: usize,
    /// Object key, if anything was uploaded
    pub key: Option<String>,
}

/// Fetch, consolidate, stamp, cast and upload
///
/// Returns without uploading when no records came back.
///
/// # Errors
/// Page 1 failures, cast failures and storage failures are fatal
pub async fn process<S, O>(source: &S, store: &O, options: &RunOptions) -> Result<RunSummary>
where
    S: PortfolioSource,
    O: ObjectStore,
{
    log::info!("Starting data extraction process...");

    let key = object_key(&options.prefix, options.run_date);
    let pipeline = Pipeline::new(
        PortfolioExtractor::new(source, options.first_page.clone(), options.policy),
        PartitionCaster::new(options.run_date),
        ParquetUploader::new(store, key.clone()).with_local_copy(options.local_copy.clone()),
    );

    let report = pipeline.run().await?;
    let uploaded = report.extracted > 0;

    let summary = RunSummary {
        records: report.extracted,
        skipped_pages: report.skipped,
        rows_written: report.loaded,
        key: uploaded.then_some(key),
    };

    if uploaded {
        log::info!("Processing complete.");
    } else {
        log::warn!("Nothing to upload for {}", options.run_date);
    }
    Ok(summary)
}
