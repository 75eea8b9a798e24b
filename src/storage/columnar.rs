//! Parquet serialization of the consolidated table

use crate::portfolio::{Cell, ColumnType, Table};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use eyre::{Context, Result};
use parquet::arrow::ArrowWriter;
use std::sync::Arc;

impl From<ColumnType> for DataType {
    fn from(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Boolean => DataType::Boolean,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
        }
    }
}

/// Build a single Arrow batch from the table
///
/// Every column is nullable; types come from [`Table::column_type`].
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.columns().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len());

    for name in table.columns() {
        let column_type = table.column_type(name);
        fields.push(Field::new(name, column_type.into(), true));
        arrays.push(build_array(table, name, column_type));
    }

    let schema = Arc::new(Schema::new(fields));
    RecordBatch::try_new(schema, arrays).context("Failed to build record batch")
}

fn build_array(table: &Table, name: &str, column_type: ColumnType) -> ArrayRef {
    let cells = table.column(name);
    match column_type {
        ColumnType::Boolean => Arc::new(BooleanArray::from(
            cells
                .map(|c| match c {
                    Cell::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Int64 => Arc::new(Int64Array::from(
            cells
                .map(|c| match c {
                    Cell::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Float64 => Arc::new(Float64Array::from(
            cells
                .map(|c| match c {
                    Cell::Float(f) => Some(*f),
                    Cell::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Utf8 => Arc::new(StringArray::from(
            cells.map(Cell::render).collect::<Vec<_>>(),
        )),
    }
}

/// Serialize the table to an in-memory Parquet file
pub fn to_parquet_bytes(table: &Table) -> Result<Vec<u8>> {
    let batch = to_record_batch(table)?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)
        .context("Failed to create Parquet writer")?;
    writer
        .write(&batch)
        .context("Failed to write Parquet row group")?;
    writer.close().context("Failed to finalize Parquet file")?;

    log::debug!(
        "Serialized {} rows to {} Parquet bytes",
        batch.num_rows(),
        buffer.len()
    );
    Ok(buffer)
}
