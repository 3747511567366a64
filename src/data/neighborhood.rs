use super::model::{CellValue, RecordTable, NEIGHBORHOOD, NEIGHBORHOOD_PREFIX};

// ---------------------------------------------------------------------------
// Neighborhood reconstruction from one-hot indicator columns
// ---------------------------------------------------------------------------

/// Label used when no indicator column identifies a row's neighborhood.
pub const UNKNOWN: &str = "Unknown";

/// Collapse the `Neighborhood_*` one-hot indicator columns into a single
/// `Neighborhood` text column.
///
/// Per row, the indicator column holding the maximum numeric value wins and
/// its stripped suffix becomes the label. Ties keep the earliest column in
/// the table's column order (the scan only replaces on strictly greater).
/// Rows where every indicator is null or non-numeric, and tables with no
/// indicator columns at all, get the label `"Unknown"`.
pub fn restore_neighborhood(mut table: RecordTable) -> RecordTable {
    let indicator_cols: Vec<String> = table
        .column_names
        .iter()
        .filter(|c| c.starts_with(NEIGHBORHOOD_PREFIX))
        .cloned()
        .collect();

    for rec in &mut table.records {
        let label = if indicator_cols.is_empty() {
            UNKNOWN.to_string()
        } else {
            let mut best: Option<(&str, f64)> = None;
            for col in &indicator_cols {
                let Some(value) = rec.number(col) else {
                    continue;
                };
                match best {
                    Some((_, max)) if value <= max => {}
                    _ => best = Some((col, value)),
                }
            }
            match best {
                Some((col, _)) => col[NEIGHBORHOOD_PREFIX.len()..].to_string(),
                None => UNKNOWN.to_string(),
            }
        };
        rec.cells
            .insert(NEIGHBORHOOD.to_string(), CellValue::Text(label.clone()));
        table
            .unique_values
            .entry(NEIGHBORHOOD.to_string())
            .or_default()
            .insert(CellValue::Text(label));
    }

    if !table.has_column(NEIGHBORHOOD) {
        table.column_names.push(NEIGHBORHOOD.to_string());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn table(columns: &[&str], rows: &[&[CellValue]]) -> RecordTable {
        let records = rows
            .iter()
            .map(|row| Record {
                cells: columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.to_string(), v.clone()))
                    .collect(),
            })
            .collect();
        RecordTable::from_records(records, columns.iter().map(|c| c.to_string()).collect())
    }

    fn labels(table: &RecordTable) -> Vec<String> {
        table
            .records
            .iter()
            .map(|r| r.text(NEIGHBORHOOD).unwrap())
            .collect()
    }

    #[test]
    fn picks_the_hot_indicator_per_row() {
        let t = table(
            &["Neighborhood_A", "Neighborhood_B"],
            &[
                &[CellValue::Integer(1), CellValue::Integer(0)],
                &[CellValue::Integer(0), CellValue::Integer(1)],
            ],
        );
        let t = restore_neighborhood(t);
        assert_eq!(labels(&t), vec!["A", "B"]);
    }

    #[test]
    fn no_indicator_columns_yields_unknown_everywhere() {
        let t = table(&["Saleprice"], &[&[CellValue::Integer(100)], &[CellValue::Integer(200)]]);
        let t = restore_neighborhood(t);
        assert_eq!(labels(&t), vec![UNKNOWN, UNKNOWN]);
        assert!(t.has_column(NEIGHBORHOOD));
    }

    /// Equal indicator values keep the first column in source order.
    #[test]
    fn ties_resolve_to_earliest_column() {
        let t = table(
            &["Neighborhood_B", "Neighborhood_A"],
            &[&[CellValue::Integer(1), CellValue::Integer(1)]],
        );
        let t = restore_neighborhood(t);
        assert_eq!(labels(&t), vec!["B"]);
    }

    #[test]
    fn all_null_indicators_yield_unknown() {
        let t = table(
            &["Neighborhood_A", "Neighborhood_B"],
            &[&[CellValue::Null, CellValue::Null]],
        );
        let t = restore_neighborhood(t);
        assert_eq!(labels(&t), vec![UNKNOWN]);
    }

    #[test]
    fn derived_labels_land_in_unique_values() {
        let t = table(
            &["Neighborhood_A", "Neighborhood_B"],
            &[
                &[CellValue::Integer(1), CellValue::Integer(0)],
                &[CellValue::Integer(0), CellValue::Integer(1)],
            ],
        );
        let t = restore_neighborhood(t);
        let uniques = &t.unique_values[NEIGHBORHOOD];
        assert!(uniques.contains(&CellValue::Text("A".into())));
        assert!(uniques.contains(&CellValue::Text("B".into())));
    }
}
