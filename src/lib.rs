//! B3 Carteira
//!
//! Pulls the daily index portfolio from B3 into a Parquet file on S3, and
//! starts the Glue job that consumes it.

pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod locale;
pub mod portfolio;
pub mod storage;
pub mod trigger;

// Re-exports for convenience
pub use config::{Settings, TriggerConfig};
pub use error::ExtractError;
pub use etl::{Extraction, Extractor, Loader, Pipeline, PipelineReport, Transformer};
pub use portfolio::{B3Client, PagePolicy, PageRequest, RunOptions, RunSummary, Table, process};
pub use storage::{ObjectStore, ParquetUploader, S3Store};
pub use trigger::{GlueRunner, JobRunner, TriggerResponse, handle};
