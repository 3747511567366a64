use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Well-known column names
// ---------------------------------------------------------------------------

/// Target variable. Required; the loader rejects files without it.
pub const TARGET: &str = "Saleprice";
/// Construction year, used for range filtering and scatter hover text.
pub const YEAR: &str = "YearBuilt";
/// Above-ground living area, used for range filtering and as a scatter axis.
pub const AREA: &str = "GrLivArea";
/// Ordinal overall quality, used for set filtering, coloring and grouping.
pub const QUALITY: &str = "OverallQual";
/// Derived categorical column produced by `restore_neighborhood`.
pub const NEIGHBORHOOD: &str = "Neighborhood";
/// Prefix of the one-hot indicator columns the derived column collapses.
pub const NEIGHBORHOOD_PREFIX: &str = "Neighborhood_";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common CSV/Parquet dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// `Float` must render round-trip-faithfully: the export step writes cells
/// through `Display` and the round-trip property depends on it.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Booleans count as 0/1 so one-hot indicator
    /// columns loaded from JSON behave like their 0/1 CSV counterparts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single row of the source table.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Dynamic columns: column_name → value.
    pub cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// The cell as a number, `None` when absent, null or text.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(CellValue::as_f64)
    }

    /// The cell rendered as display text, `None` when absent or null.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.cells.get(column) {
            None | Some(CellValue::Null) => None,
            Some(v) => Some(v.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// `column_names` keeps the source order (CSV header / Parquet schema order);
/// the one-hot tie-break in `restore_neighborhood` relies on it being fixed.
#[derive(Debug, Clone)]
pub struct RecordTable {
    /// All rows.
    pub records: Vec<Record>,
    /// Ordered list of column names, as they appeared in the source.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl RecordTable {
    /// Build column indices from loaded rows. `column_names` comes from the
    /// loader so the source order survives (the rows' own maps are sorted).
    pub fn from_records(records: Vec<Record>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for rec in &records {
            for (col, val) in &rec.cells {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        RecordTable {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// All non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|rec| rec.number(column))
            .collect()
    }

    /// Observed (min, max) of a numeric column, `None` when no numeric
    /// values exist. Used for the range-slider bounds.
    pub fn numeric_bounds(&self, column: &str) -> Option<(f64, f64)> {
        let values = self.numeric_values(column);
        if values.is_empty() {
            return None;
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// Capabilities – which optional columns are actually present
// ---------------------------------------------------------------------------

/// Single upfront schema probe: which optional columns the loaded table has.
/// Filters and chart selection consult this instead of re-checking columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub has_year: bool,
    pub has_area: bool,
    pub has_quality: bool,
    pub has_neighborhood: bool,
}

impl Capabilities {
    pub fn probe(table: &RecordTable) -> Self {
        Capabilities {
            has_year: table.has_column(YEAR),
            has_area: table.has_column(AREA),
            has_quality: table.has_column(QUALITY),
            has_neighborhood: table.has_column(NEIGHBORHOOD),
        }
    }
}
