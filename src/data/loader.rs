use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Record, RecordTable, TARGET};
use super::neighborhood::restore_neighborhood;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Load-time failures, surfaced verbatim in the UI status line.
#[derive(Debug, Error)]
pub enum DataError {
    /// The dataset file does not exist. The message must carry the attempted
    /// path so the user can fix it.
    #[error("File not found. Check the path to the dataset: `{path}`")]
    DatasetNotFound { path: PathBuf },

    /// The required target column is missing from the file.
    #[error("Column `Saleprice` was not found in this file")]
    SchemaError,

    /// The file exists but could not be parsed.
    #[error("Failed to read `{path}`: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Unsupported file extension: .{extension}")]
    UnsupportedExtension { extension: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a housing table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + one record per line (primary format)
/// * `.parquet` – scalar Utf8/Int/Float/Boolean columns
/// * `.json`    – records orientation: `[{ "Saleprice": 208500, ... }, ...]`
///
/// Every successful load ends with the `Neighborhood` reconstruction, so
/// callers always see the derived column.
pub fn load_table(path: &Path) -> Result<RecordTable, DataError> {
    if !path.exists() {
        return Err(DataError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => {
            return Err(DataError::UnsupportedExtension {
                extension: other.to_string(),
            })
        }
    };

    let table = parsed.map_err(|e| DataError::Malformed {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })?;

    if !table.has_column(TARGET) {
        return Err(DataError::SchemaError);
    }

    Ok(restore_neighborhood(table))
}

// ---------------------------------------------------------------------------
// Loader cache
// ---------------------------------------------------------------------------

/// Memoized loads keyed by path: repeated loads of the same file return the
/// cached table. Failed loads are not cached so the user can fix the file
/// and retry. The cached table is immutable; downstream steps only derive.
#[derive(Default)]
pub struct LoaderCache {
    entries: HashMap<PathBuf, Arc<RecordTable>>,
}

impl LoaderCache {
    pub fn load(&mut self, path: &Path) -> Result<Arc<RecordTable>, DataError> {
        if let Some(table) = self.entries.get(path) {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_table(path)?);
        log::info!(
            "Loaded {} rows, {} columns from {}",
            table.len(),
            table.column_names.len(),
            path.display()
        );
        self.entries.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line. Cell types
/// are inferred per value; `Neighborhood_*` indicators arrive as 0/1 ints.
fn load_csv(path: &Path) -> Result<RecordTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, got {}",
                headers.len(),
                record.len()
            );
        }

        let mut cells = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            cells.insert(headers[col_idx].clone(), guess_cell_type(value));
        }
        records.push(Record { cells });
    }

    Ok(RecordTable::from_records(records, headers))
}

/// Infer a cell type from raw CSV text. Empty fields and the `NA` marker
/// common in housing datasets parse as null.
fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || s == "NA" {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Saleprice": 208500, "YearBuilt": 2003, "Neighborhood_CollgCr": 1 },
///   ...
/// ]
/// ```
///
/// Column order is the sorted union of keys, which keeps the one-hot
/// tie-break deterministic for JSON input too.
fn load_json(path: &Path) -> Result<RecordTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: BTreeSet<String> = BTreeSet::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut cells = BTreeMap::new();
        for (key, val) in obj {
            columns.insert(key.clone());
            cells.insert(key.clone(), json_to_cell(val));
        }
        records.push(Record { cells });
    }

    Ok(RecordTable::from_records(
        records,
        columns.into_iter().collect(),
    ))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns. Works with files written by both
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RecordTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if column_names.is_empty() {
            column_names = schema.fields().iter().map(|f| f.name().clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row);
                cells.insert(field.name().clone(), value);
            }
            records.push(Record { cells });
        }
    }

    Ok(RecordTable::from_records(records, column_names))
}

/// Extract a single cell from an Arrow column at a given row. Columns with
/// dtypes outside the scalar set the dashboard understands read as null.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            use arrow::array::AsArray;
            if let Some(s) = col.as_any().downcast_ref::<arrow::array::StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::Null,
    }
}
