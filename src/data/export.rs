use anyhow::{Context, Result};

use super::model::RecordTable;

// ---------------------------------------------------------------------------
// Filtered-view CSV export
// ---------------------------------------------------------------------------

/// Serialize the filtered view as UTF-8 CSV bytes: header row in the table's
/// column order, then the view's rows in view order. Null cells become empty
/// fields; everything else is a faithful serialization of the cell value.
pub fn to_csv_bytes(table: &RecordTable, view: &[usize]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(&table.column_names)
        .context("writing CSV header")?;

    for &i in view {
        let rec = &table.records[i];
        let fields: Vec<String> = table
            .column_names
            .iter()
            .map(|col| rec.get(col).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer
            .write_record(&fields)
            .with_context(|| format!("writing CSV row {i}"))?;
    }

    writer.into_inner().context("flushing CSV writer")
}
