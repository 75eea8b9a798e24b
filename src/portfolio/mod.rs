//! Index portfolio extraction
//!
//! Fetches every page of the daily portfolio listing, consolidates the rows
//! into a [`Table`], stamps the run date, casts the weight and quantity
//! columns, and hands the table to the storage layer.

mod client;
mod fetch;
mod process;
mod request;
mod table;
mod transform;

pub use client::{B3Client, PageInfo, PortfolioPage, PortfolioSource, Record};
pub use fetch::{FetchOutcome, PagePolicy, PortfolioExtractor, fetch_all_pages};
pub use process::{RunOptions, RunSummary, process};
pub use request::PageRequest;
pub use table::{
    Cell, ColumnType, DATE_COLUMN, PART_COLUMN, QUANTITY_COLUMN, Table, add_date_partition,
    cast_columns, consolidate,
};
pub use transform::PartitionCaster;
