//! Consolidated portfolio table
//!
//! Rows keep whatever fields the service sent. Columns are the union of row
//! keys in first-seen order; a row without a key reads as null in that column.

use super::Record;
use crate::error::ExtractError;
use crate::locale::{ParseError, parse_decimal_comma, parse_thousands_dot};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// Column stamped with the run date
pub const DATE_COLUMN: &str = "date";
/// Index weight, sent as a decimal-comma string
pub const PART_COLUMN: &str = "part";
/// Theoretical quantity, sent as a dot-grouped integer string
pub const QUANTITY_COLUMN: &str = "theoricalQty";

/// A single typed value
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Nested arrays or objects, kept as their JSON text
    Json(String),
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s),
            other => Cell::Json(other.to_string()),
        }
    }
}

impl Cell {
    /// Text rendering used when a column falls back to strings
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) | Cell::Json(s) => Some(s.clone()),
        }
    }
}

/// Storage type of a column, inferred from its cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Int64,
    Float64,
    Utf8,
}

/// Rows from every fetched page, in fetch order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, Cell>>,
    /// Types fixed by a cast, independent of the cells
    pins: HashMap<String, ColumnType>,
}

impl Table {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Self::default();
        for record in records {
            let mut row = HashMap::with_capacity(record.len());
            for (key, value) in record {
                if !table.columns.contains(&key) {
                    table.columns.push(key.clone());
                }
                row.insert(key, Cell::from(value));
            }
            table.rows.push(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Cell at `row` in `column`; missing keys read as null
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&Cell::Null)
    }

    /// All cells of a column, top to bottom
    pub fn column(&self, name: &str) -> impl Iterator<Item = &Cell> {
        (0..self.rows.len()).map(move |i| self.cell(i, name))
    }

    /// Storage type of a column
    ///
    /// A column pinned by a cast keeps that type even when every cell is
    /// null. Otherwise the type is inferred: integers widen to floats when
    /// mixed; any other mix, and all-null columns, fall back to text.
    pub fn column_type(&self, name: &str) -> ColumnType {
        if let Some(pinned) = self.pins.get(name) {
            return *pinned;
        }
        let mut inferred: Option<ColumnType> = None;
        for cell in self.column(name) {
            let this = match cell {
                Cell::Null => continue,
                Cell::Bool(_) => ColumnType::Boolean,
                Cell::Int(_) => ColumnType::Int64,
                Cell::Float(_) => ColumnType::Float64,
                Cell::Text(_) | Cell::Json(_) => return ColumnType::Utf8,
            };
            inferred = Some(match (inferred, this) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(ColumnType::Int64), ColumnType::Float64)
                | (Some(ColumnType::Float64), ColumnType::Int64) => ColumnType::Float64,
                _ => return ColumnType::Utf8,
            });
        }
        inferred.unwrap_or(ColumnType::Utf8)
    }

    /// Set `column` to `cell` on every row, adding the column if needed
    pub fn fill_column(&mut self, column: &str, cell: Cell) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
        for row in &mut self.rows {
            row.insert(column.to_string(), cell.clone());
        }
    }

    /// Rewrite every non-null cell of `column` through `cast` and pin the
    /// column to `pin`
    ///
    /// Only text cells are cast; any other non-null value is rejected with
    /// its rendering as the offending string. Nulls stay null.
    fn cast_column<F>(
        &mut self,
        column: &str,
        pin: ColumnType,
        cast: F,
    ) -> Result<(), ExtractError>
    where
        F: Fn(&str) -> Result<Cell, ParseError>,
    {
        if !self.has_column(column) {
            return Err(ExtractError::MissingColumn(column.to_string()));
        }

        for row in &mut self.rows {
            let Some(cell) = row.get_mut(column) else {
                continue;
            };
            let cast_result = match &*cell {
                Cell::Null => continue,
                Cell::Text(raw) => cast(raw.as_str()),
                other => Err(ParseError {
                    value: other.render().unwrap_or_default(),
                    expected: "locale-formatted string",
                }),
            };
            *cell = cast_result.map_err(|source| ExtractError::Cast {
                column: column.to_string(),
                source,
            })?;
        }
        self.pins.insert(column.to_string(), pin);
        Ok(())
    }

    /// Up to `n` rows rendered as `column=value` pairs, for log previews
    pub fn head(&self, n: usize) -> Vec<String> {
        (0..self.rows.len().min(n))
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| {
                        let value = self.cell(i, c).render().unwrap_or_else(|| "null".into());
                        format!("{}={}", c, value)
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl From<Vec<Record>> for Table {
    fn from(records: Vec<Record>) -> Self {
        consolidate(records)
    }
}

/// Build the table from the accumulated records
///
/// An empty result set is reported but is not an error.
pub fn consolidate(records: Vec<Record>) -> Table {
    let table = Table::from_records(records);
    if table.is_empty() {
        log::warn!("No data retrieved");
    }
    table
}

/// Stamp every row with the run date as `YYYY-MM-DD`
pub fn add_date_partition(mut table: Table, run_date: NaiveDate) -> Table {
    let stamp = run_date.format("%Y-%m-%d").to_string();
    table.fill_column(DATE_COLUMN, Cell::Text(stamp));
    table
}

/// Cast the weight column to `f64` and the quantity column to `i64`
///
/// # Errors
/// - [`ExtractError::MissingColumn`] if either column is absent
/// - [`ExtractError::Cast`] naming the first value that doesn't parse
pub fn cast_columns(mut table: Table) -> Result<Table, ExtractError> {
    table.cast_column(PART_COLUMN, ColumnType::Float64, |raw| {
        parse_decimal_comma(raw).map(Cell::Float)
    })?;
    table.cast_column(QUANTITY_COLUMN, ColumnType::Int64, |raw| {
        parse_thousands_dot(raw).map(Cell::Int)
    })?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn sample() -> Table {
        consolidate(vec![
            record(json!({"cod": "PETR4", "part": "1,234", "theoricalQty": "12.345"})),
            record(json!({"cod": "VALE3", "part": "10,5", "theoricalQty": "4.196.924.316"})),
        ])
    }

    #[test]
    fn test_consolidate_keeps_column_order() {
        let table = consolidate(vec![
            record(json!({"segment": null, "cod": "A", "asset": "X"})),
            record(json!({"cod": "B", "extra": 1})),
        ]);
        assert_eq!(table.shape(), (2, 4));
        assert!(table.has_column("extra"));
        assert_eq!(table.cell(0, "extra"), &Cell::Null);
        assert_eq!(table.cell(1, "extra"), &Cell::Int(1));
        assert_eq!(table.cell(1, "asset"), &Cell::Null);
    }

    #[test]
    fn test_consolidate_empty() {
        let table = consolidate(vec![]);
        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 0));
    }

    #[test]
    fn test_add_date_partition() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let table = add_date_partition(sample(), date);
        assert_eq!(table.columns().last().map(String::as_str), Some("date"));
        assert!(
            table
                .column(DATE_COLUMN)
                .all(|c| c == &Cell::Text("2024-03-07".to_string()))
        );
    }

    #[test]
    fn test_add_date_partition_overwrites_existing() {
        let table = consolidate(vec![record(json!({"date": "old", "cod": "A"}))]);
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let table = add_date_partition(table, date);
        assert_eq!(table.shape(), (1, 2));
        assert_eq!(table.cell(0, "date"), &Cell::Text("2025-01-02".to_string()));
    }

    #[test]
    fn test_cast_columns() {
        let table = cast_columns(sample()).unwrap();
        assert_eq!(table.cell(0, PART_COLUMN), &Cell::Float(1.234));
        assert_eq!(table.cell(0, QUANTITY_COLUMN), &Cell::Int(12345));
        assert_eq!(table.cell(1, PART_COLUMN), &Cell::Float(10.5));
        assert_eq!(table.cell(1, QUANTITY_COLUMN), &Cell::Int(4_196_924_316));
        assert_eq!(table.column_type(PART_COLUMN), ColumnType::Float64);
        assert_eq!(table.column_type(QUANTITY_COLUMN), ColumnType::Int64);
        assert_eq!(table.column_type("cod"), ColumnType::Utf8);
    }

    #[test]
    fn test_cast_missing_column() {
        let table = consolidate(vec![record(json!({"cod": "A", "part": "1,0"}))]);
        let err = cast_columns(table).unwrap_err();
        assert!(matches!(err, ExtractError::MissingColumn(ref c) if c == "theoricalQty"));
    }

    #[test]
    fn test_cast_reports_offending_value() {
        let table = consolidate(vec![
            record(json!({"part": "1,0", "theoricalQty": "1.000"})),
            record(json!({"part": "abc", "theoricalQty": "2.000"})),
        ]);
        match cast_columns(table).unwrap_err() {
            ExtractError::Cast { column, source } => {
                assert_eq!(column, "part");
                assert_eq!(source.value, "abc");
            }
            other => panic!("expected Cast error, got {:?}", other),
        }
    }

    #[test]
    fn test_cast_keeps_nulls() {
        let table = consolidate(vec![
            record(json!({"part": null, "theoricalQty": "1"})),
            record(json!({"part": "2,5"})),
        ]);
        let table = cast_columns(table).unwrap();
        assert_eq!(table.cell(0, PART_COLUMN), &Cell::Null);
        assert_eq!(table.cell(1, QUANTITY_COLUMN), &Cell::Null);
        assert_eq!(table.column_type(QUANTITY_COLUMN), ColumnType::Int64);
    }

    #[test]
    fn test_cast_pins_all_null_columns() {
        let table = consolidate(vec![record(
            json!({"cod": "A", "part": null, "theoricalQty": null}),
        )]);
        assert_eq!(table.column_type(PART_COLUMN), ColumnType::Utf8);

        let table = cast_columns(table).unwrap();
        assert_eq!(table.column_type(PART_COLUMN), ColumnType::Float64);
        assert_eq!(table.column_type(QUANTITY_COLUMN), ColumnType::Int64);
    }

    #[test]
    fn test_cast_rejects_numeric_quantity_with_fraction() {
        let table = consolidate(vec![record(json!({"part": "1", "theoricalQty": 1.5}))]);
        let err = cast_columns(table).unwrap_err();
        assert!(matches!(err, ExtractError::Cast { ref column, .. } if column == "theoricalQty"));
    }

    #[test]
    fn test_column_type_inference() {
        let table = consolidate(vec![
            record(json!({"i": 1, "f": 1, "b": true, "n": null, "mix": 1, "nested": [1]})),
            record(json!({"i": 2, "f": 2.5, "b": false, "n": null, "mix": "x", "nested": {}})),
        ]);
        assert_eq!(table.column_type("i"), ColumnType::Int64);
        assert_eq!(table.column_type("f"), ColumnType::Float64);
        assert_eq!(table.column_type("b"), ColumnType::Boolean);
        assert_eq!(table.column_type("n"), ColumnType::Utf8);
        assert_eq!(table.column_type("mix"), ColumnType::Utf8);
        assert_eq!(table.column_type("nested"), ColumnType::Utf8);
        assert_eq!(table.cell(0, "nested").render().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_head() {
        let head = sample().head(1);
        assert_eq!(head.len(), 1);
        assert!(head[0].starts_with("cod=PETR4"));
    }
}
