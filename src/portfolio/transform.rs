//! Date stamping and numeric casts as a pipeline stage

use super::table::{Table, add_date_partition, cast_columns};
use crate::etl::Transformer;
use chrono::NaiveDate;
use eyre::{Context, Result};

/// Stamps the run date and casts the weight/quantity columns
pub struct PartitionCaster {
    run_date: NaiveDate,
}

impl PartitionCaster {
    pub fn new(run_date: NaiveDate) -> Self {
        Self { run_date }
    }
}

impl Transformer for PartitionCaster {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let table = add_date_partition(input, self.run_date);
        let table = cast_columns(table).context("Failed to cast portfolio columns")?;

        let (rows, columns) = table.shape();
        log::info!("Combined table shape: ({}, {})", rows, columns);
        for line in table.head(5) {
            log::debug!("  {}", line);
        }

        Ok(table)
    }
}
