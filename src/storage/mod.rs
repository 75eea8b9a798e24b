//! Artifact storage
//!
//! This module handles writing the run artifact:
//! - Parquet serialization of the consolidated table
//! - The [`ObjectStore`] seam and its S3 implementation
//! - The run-date object key layout
//! - [`ParquetUploader`], the pipeline's load stage

mod columnar;
mod s3;

pub use columnar::{to_parquet_bytes, to_record_batch};
pub use s3::S3Store;

use crate::etl::Loader;
use crate::portfolio::Table;
use chrono::NaiveDate;
use eyre::{Context, Result};
use std::future::Future;
use std::path::PathBuf;

/// Somewhere to put a binary object under a key
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `key`, replacing any existing object
    fn put(&self, key: &str, body: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    /// Human-readable location of `key`, for logs
    fn location(&self, key: &str) -> String;
}

/// Key of the run artifact: `{prefix}/{DD-MM-YY}/carteira-dia-{YYYY-MM-DD}.parquet`
///
/// An empty prefix puts the date folder at the bucket root. The same date
/// always maps to the same key, so a rerun replaces that day's file.
pub fn object_key(prefix: &str, run_date: NaiveDate) -> String {
    let folder = run_date.format("%d-%m-%y");
    let filename = format!("carteira-dia-{}.parquet", run_date.format("%Y-%m-%d"));
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{}/{}", folder, filename)
    } else {
        format!("{}/{}/{}", prefix, folder, filename)
    }
}

/// Serializes the table to Parquet and uploads it
///
/// Optionally also writes the same bytes to a local file.
pub struct ParquetUploader<'a, O> {
    store: &'a O,
    key: String,
    local_copy: Option<PathBuf>,
}

impl<'a, O: ObjectStore> ParquetUploader<'a, O> {
    pub fn new(store: &'a O, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            local_copy: None,
        }
    }

    /// Also write the Parquet file to `path`
    pub fn with_local_copy(mut self, path: Option<PathBuf>) -> Self {
        self.local_copy = path;
        self
    }

    /// Serialize and upload; no retry
    pub async fn upload_as_parquet(&self, table: &Table) -> Result<()> {
        let bytes = to_parquet_bytes(table)?;

        if let Some(path) = &self.local_copy {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Data saved locally: {}", path.display());
        }

        let location = self.store.location(&self.key);
        self.store.put(&self.key, bytes).await?;
        log::info!("Data saved to {}", location);
        Ok(())
    }
}

impl<O: ObjectStore> Loader for ParquetUploader<'_, O> {
    type Item = Table;

    async fn load(&self, batch: Self::Item) -> Result<usize> {
        self.upload_as_parquet(&batch).await?;
        Ok(batch.len())
    }
}
