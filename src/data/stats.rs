use std::collections::BTreeSet;

use super::model::{CellValue, RecordTable, AREA, TARGET};

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Median of an unsorted slice. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile(&sorted, 0.5))
}

/// Linearly interpolated percentile over an already sorted slice.
/// `p` is a fraction in [0, 1]; empty input yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Pearson correlation coefficient of two equal-length series.
/// `None` when fewer than two pairs or either series has zero variance,
/// so degenerate columns drop out of the driver ranking entirely.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }
    let n = n as f64;
    let num = n * sum_xy - sum_x * sum_y;
    let den = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if den == 0.0 || !den.is_finite() {
        None
    } else {
        Some(num / den)
    }
}

// ---------------------------------------------------------------------------
// View-scoped column access
// ---------------------------------------------------------------------------

/// Non-null numeric values of one column across the view's rows.
pub fn view_numeric_values(table: &RecordTable, view: &[usize], column: &str) -> Vec<f64> {
    view.iter()
        .filter_map(|&i| table.records[i].number(column))
        .collect()
}

/// Columns that behave numerically within the view: at least one numeric
/// non-null cell and no text cell. Source column order is preserved.
pub fn numeric_columns(table: &RecordTable, view: &[usize]) -> Vec<String> {
    table
        .column_names
        .iter()
        .filter(|col| {
            let mut any_number = false;
            for &i in view {
                match table.records[i].get(col) {
                    Some(CellValue::Text(_)) => return false,
                    Some(v) if v.as_f64().is_some() => any_number = true,
                    _ => {}
                }
            }
            any_number
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Driver ranking
// ---------------------------------------------------------------------------

/// One numeric feature ranked by linear correlation with the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub feature: String,
    pub correlation: f64,
}

/// Correlate every numeric column against `Saleprice` over pairwise-complete
/// rows, drop undefined correlations, sort descending by signed value.
/// The target itself is excluded from the result.
pub fn rank_drivers(table: &RecordTable, view: &[usize]) -> Vec<Driver> {
    let mut drivers: Vec<Driver> = numeric_columns(table, view)
        .into_iter()
        .filter(|col| col != TARGET)
        .filter_map(|col| {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for &i in view {
                let rec = &table.records[i];
                if let (Some(x), Some(y)) = (rec.number(&col), rec.number(TARGET)) {
                    xs.push(x);
                    ys.push(y);
                }
            }
            pearson(&xs, &ys).map(|correlation| Driver {
                feature: col,
                correlation,
            })
        })
        .collect();

    drivers.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
    drivers
}

/// Pairwise correlation matrix over the given columns (view rows only).
/// Undefined entries render as NaN; the heatmap paints them neutral.
pub fn correlation_matrix(table: &RecordTable, view: &[usize], columns: &[String]) -> Vec<Vec<f64>> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|col| {
            view.iter()
                .map(|&i| table.records[i].number(col))
                .collect()
        })
        .collect();

    let mut matrix = vec![vec![f64::NAN; columns.len()]; columns.len()];
    for a in 0..columns.len() {
        for b in a..columns.len() {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for (va, vb) in series[a].iter().zip(series[b].iter()) {
                if let (Some(x), Some(y)) = (va, vb) {
                    xs.push(*x);
                    ys.push(*y);
                }
            }
            let r = pearson(&xs, &ys).unwrap_or(f64::NAN);
            matrix[a][b] = r;
            matrix[b][a] = r;
        }
    }
    matrix
}

// ---------------------------------------------------------------------------
// Summary generation
// ---------------------------------------------------------------------------

/// Fixed synopsis when the view has too few numeric columns to correlate.
pub const NOT_ENOUGH_NUMERIC: &str = "Not enough numeric columns to calculate relationships.";

/// How many top drivers the synopsis names.
const SYNOPSIS_DRIVERS: usize = 5;

/// The three scalar values of the Overview metrics panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub rows: usize,
    pub median_price: Option<f64>,
    /// `None` when the living-area column is absent (rendered "n/a").
    pub median_area: Option<f64>,
}

pub fn summary_metrics(table: &RecordTable, view: &[usize]) -> SummaryMetrics {
    SummaryMetrics {
        rows: view.len(),
        median_price: median(&view_numeric_values(table, view, TARGET)),
        median_area: if table.has_column(AREA) {
            median(&view_numeric_values(table, view, AREA))
        } else {
            None
        },
    }
}

/// Natural-language synopsis of the filtered view. Descriptive only; the
/// closing sentence tells the reader it is not a causal claim.
pub fn synopsis(table: &RecordTable, view: &[usize]) -> String {
    let numeric = numeric_columns(table, view);
    if numeric.len() < 4 {
        return NOT_ENOUGH_NUMERIC.to_string();
    }

    let median_price = median(&view_numeric_values(table, view, TARGET)).unwrap_or(f64::NAN);
    let top: Vec<String> = rank_drivers(table, view)
        .into_iter()
        .take(SYNOPSIS_DRIVERS)
        .map(|d| d.feature)
        .collect();

    format!(
        "For the current filters (n={}), median Saleprice is {:.0}. \
         Top positively related numeric features here are: {}. \
         This is correlation-based, not causation.",
        view.len(),
        median_price,
        top.join(", "),
    )
}

/// Dedup helper for the heatmap label list: target first, then drivers.
pub fn heatmap_columns(drivers: &[Driver], limit: usize) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(TARGET);
    let mut columns = vec![TARGET.to_string()];
    for d in drivers.iter().take(limit) {
        if seen.insert(&d.feature) {
            columns.push(d.feature.clone());
        }
    }
    columns
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

    fn int(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

    // ── scalar statistics ────────────────────────────────────────────────

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median(&[300.0, 100.0, 200.0]), Some(200.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&sorted, 0.0), 10.0);
        assert_eq!(percentile(&sorted, 1.0), 50.0);
        assert_eq!(percentile(&sorted, 0.5), 30.0);
        // 10th percentile of 5 points sits 40% between the first two.
        assert!((percentile(&sorted, 0.1) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let down: Vec<f64> = xs.iter().map(|x| -x).collect();
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_is_undefined_for_constant_series() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    // ── numeric column detection ─────────────────────────────────────────

    #[test]
    fn numeric_columns_exclude_text_and_all_null() {
        let t = table(
            &["Saleprice", "Neighborhood", "Empty", "GrLivArea"],
            &[
                &[int(100), CellValue::Text("A".into()), CellValue::Null, int(900)],
                &[int(200), CellValue::Text("B".into()), CellValue::Null, int(1100)],
            ],
        );
        let view = vec![0, 1];
        assert_eq!(numeric_columns(&t, &view), vec!["Saleprice", "GrLivArea"]);
    }

    // ── driver ranking ───────────────────────────────────────────────────

    #[test]
    fn drivers_rank_descending_and_exclude_target() {
        let t = table(
            &["Saleprice", "Up", "Down", "Flat"],
            &[
                &[int(100), int(1), int(9), int(5)],
                &[int(200), int(2), int(6), int(5)],
                &[int(300), int(3), int(3), int(5)],
            ],
        );
        let drivers = rank_drivers(&t, &[0, 1, 2]);
        let names: Vec<&str> = drivers.iter().map(|d| d.feature.as_str()).collect();
        // Flat has zero variance and must be dropped, not ranked last.
        assert_eq!(names, vec!["Up", "Down"]);
        assert!(drivers[0].correlation > drivers[1].correlation);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let t = table(
            &["Saleprice", "GrLivArea"],
            &[
                &[int(100), int(900)],
                &[int(200), int(1400)],
                &[int(300), int(2000)],
            ],
        );
        let cols = vec!["Saleprice".to_string(), "GrLivArea".to_string()];
        let m = correlation_matrix(&t, &[0, 1, 2], &cols);
        assert!((m[0][0] - 1.0).abs() < 1e-9);
        assert!((m[0][1] - m[1][0]).abs() < 1e-12);
    }

    // ── summary ──────────────────────────────────────────────────────────

    #[test]
    fn metrics_report_row_count_and_medians() {
        let t = table(
            &["Saleprice", "GrLivArea"],
            &[
                &[int(100), int(900)],
                &[int(200), int(1100)],
                &[int(300), int(1300)],
            ],
        );
        let m = summary_metrics(&t, &[0, 1, 2]);
        assert_eq!(m.rows, 3);
        assert_eq!(m.median_price, Some(200.0));
        assert_eq!(m.median_area, Some(1100.0));
    }

    #[test]
    fn metrics_area_is_none_when_column_absent() {
        let t = table(&["Saleprice"], &[&[int(100)]]);
        assert_eq!(summary_metrics(&t, &[0]).median_area, None);
    }

    /// Fewer than four numeric columns produce exactly the fixed sentence.
    #[test]
    fn synopsis_degrades_below_four_numeric_columns() {
        let t = table(
            &["Saleprice", "GrLivArea", "YearBuilt"],
            &[&[int(100), int(900), int(1990)], &[int(200), int(1100), int(2005)]],
        );
        assert_eq!(synopsis(&t, &[0, 1]), NOT_ENOUGH_NUMERIC);
    }

    #[test]
    fn synopsis_interpolates_count_median_and_features() {
        let t = table(
            &["Saleprice", "A", "B", "C", "D"],
            &[
                &[int(100), int(1), int(2), int(3), int(4)],
                &[int(200), int(2), int(4), int(6), int(8)],
                &[int(300), int(3), int(6), int(9), int(12)],
            ],
        );
        let text = synopsis(&t, &[0, 1, 2]);
        assert!(text.contains("(n=3)"));
        assert!(text.contains("median Saleprice is 200"));
        assert!(text.ends_with("This is correlation-based, not causation."));
    }

    #[test]
    fn heatmap_columns_start_with_target_and_dedup() {
        let drivers = vec![
            Driver { feature: "A".into(), correlation: 0.9 },
            Driver { feature: "B".into(), correlation: 0.8 },
        ];
        assert_eq!(heatmap_columns(&drivers, 11), vec!["Saleprice", "A", "B"]);
        assert_eq!(heatmap_columns(&drivers, 1), vec!["Saleprice", "A"]);
    }
}
