use std::collections::BTreeSet;

use super::model::{Capabilities, CellValue, RecordTable, AREA, NEIGHBORHOOD, QUALITY, YEAR};
use super::stats::percentile;

// ---------------------------------------------------------------------------
// Filter specification: the conjunction of active predicates
// ---------------------------------------------------------------------------

/// Current filter selections, one entry per sidebar control.
///
/// Every predicate is optional: `None` (or an empty neighborhood set) means
/// "no constraint". The filtered view is always recomputed from the full
/// table and this spec; the table itself is never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Inclusive `YearBuilt` range. `None` when the column is absent.
    pub year_range: Option<(f64, f64)>,
    /// Inclusive `GrLivArea` range. `None` when the column is absent.
    pub area_range: Option<(f64, f64)>,
    /// Selected `OverallQual` values. `None` when the column is absent;
    /// a set covering every observed value means "match everything".
    pub quality: Option<BTreeSet<CellValue>>,
    /// Selected neighborhood names. Empty set means "no constraint".
    pub neighborhoods: BTreeSet<String>,
}

impl FilterSpec {
    /// Default spec for a freshly loaded table: numeric ranges start at the
    /// observed 10th/90th percentiles (full min/max defaults are dominated
    /// by outliers), quality starts with every value selected, and the
    /// neighborhood selection starts empty (unconstrained).
    pub fn initial(table: &RecordTable, caps: Capabilities) -> Self {
        FilterSpec {
            year_range: caps.has_year.then(|| default_range(table, YEAR)).flatten(),
            area_range: caps.has_area.then(|| default_range(table, AREA)).flatten(),
            quality: caps
                .has_quality
                .then(|| quality_options(table))
                .filter(|s| !s.is_empty()),
            neighborhoods: BTreeSet::new(),
        }
    }
}

/// Observed 10th–90th percentile of a column, rounded to whole units
/// (both filtered columns are integer-valued in the source data).
fn default_range(table: &RecordTable, column: &str) -> Option<(f64, f64)> {
    let mut values = table.numeric_values(column);
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some((
        percentile(&values, 0.10).round(),
        percentile(&values, 0.90).round(),
    ))
}

/// The selectable quality values: every observed non-null value.
pub fn quality_options(table: &RecordTable) -> BTreeSet<CellValue> {
    table
        .unique_values
        .get(QUALITY)
        .map(|vals| vals.iter().filter(|v| !v.is_null()).cloned().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Filter evaluation
// ---------------------------------------------------------------------------

/// Return indices of rows that pass all active predicates.
///
/// A row passes when every predicate accepts it:
/// * range predicates: the value must be numeric and inside the inclusive
///   bounds; rows with a missing value fail an active range
/// * quality: passes outright when every observed value is selected,
///   otherwise the row's value must be non-null and in the selected set
/// * neighborhoods: an empty selection passes everything, otherwise the
///   row's label must be selected
pub fn filtered_indices(table: &RecordTable, spec: &FilterSpec) -> Vec<usize> {
    let all_quality = quality_options(table);
    // The "everything selected" default is no effective filter; it must keep
    // null-quality rows too, so it is dropped here rather than per row.
    let quality_filter = spec
        .quality
        .as_ref()
        .filter(|sel| !all_quality.is_subset(sel));

    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            if let Some((lo, hi)) = spec.year_range {
                match rec.number(YEAR) {
                    Some(y) if y >= lo && y <= hi => {}
                    _ => return false,
                }
            }
            if let Some((lo, hi)) = spec.area_range {
                match rec.number(AREA) {
                    Some(a) if a >= lo && a <= hi => {}
                    _ => return false,
                }
            }
            if let Some(selected) = quality_filter {
                match rec.get(QUALITY) {
                    Some(v) if !v.is_null() && selected.contains(v) => {}
                    _ => return false,
                }
            }
            if !spec.neighborhoods.is_empty() {
                match rec.text(NEIGHBORHOOD) {
                    Some(label) if spec.neighborhoods.contains(&label) => {}
                    _ => return false,
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, TARGET};
    use crate::data::neighborhood::restore_neighborhood;
    use crate::data::stats::{median, view_numeric_values};

    fn int(v: i64) -> CellValue {
        CellValue::Integer(v)
    }

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

    fn three_row_table() -> RecordTable {
        table(
            &[TARGET, YEAR, QUALITY],
            &[
                &[int(100), int(1950), int(5)],
                &[int(200), int(1980), int(7)],
                &[int(300), int(2005), int(5)],
            ],
        )
    }

    // ── defaults ─────────────────────────────────────────────────────────

    #[test]
    fn initial_spec_selects_all_quality_and_no_neighborhoods() {
        let t = three_row_table();
        let spec = FilterSpec::initial(&t, Capabilities::probe(&t));
        assert_eq!(spec.quality.as_ref().map(BTreeSet::len), Some(2));
        assert!(spec.neighborhoods.is_empty());
        assert!(spec.year_range.is_some());
        assert!(spec.area_range.is_none());
    }

    #[test]
    fn default_range_sits_inside_observed_bounds() {
        let t = table(
            &[YEAR],
            &[
                &[int(1900)],
                &[int(1950)],
                &[int(1960)],
                &[int(1970)],
                &[int(1980)],
                &[int(1990)],
                &[int(2000)],
                &[int(2005)],
                &[int(2010)],
                &[int(2020)],
            ],
        );
        let (lo, hi) = default_range(&t, YEAR).unwrap();
        assert!(lo > 1900.0 && hi < 2020.0);
        assert!(lo < hi);
    }

    // ── predicate semantics ──────────────────────────────────────────────

    /// All quality values selected matches everything (Scenario A).
    #[test]
    fn all_quality_selected_keeps_every_row() {
        let t = three_row_table();
        let spec = FilterSpec {
            quality: Some(quality_options(&t)),
            ..FilterSpec::default()
        };
        let view = filtered_indices(&t, &spec);
        assert_eq!(view, vec![0, 1, 2]);
        assert_eq!(median(&view_numeric_values(&t, &view, TARGET)), Some(200.0));
    }

    /// A year range covering no rows yields the empty view (Scenario C).
    #[test]
    fn exclusive_year_range_yields_empty_view() {
        let t = three_row_table();
        let spec = FilterSpec {
            year_range: Some((1800.0, 1900.0)),
            ..FilterSpec::default()
        };
        assert!(filtered_indices(&t, &spec).is_empty());
    }

    /// An empty neighborhood selection applies no constraint (Scenario E).
    #[test]
    fn empty_neighborhood_selection_is_unconstrained() {
        let t = restore_neighborhood(table(
            &[TARGET, "Neighborhood_A", "Neighborhood_B"],
            &[
                &[int(100), int(1), int(0)],
                &[int(200), int(0), int(1)],
            ],
        ));
        let spec = FilterSpec::default();
        assert_eq!(filtered_indices(&t, &spec), vec![0, 1]);

        let constrained = FilterSpec {
            neighborhoods: ["A".to_string()].into_iter().collect(),
            ..FilterSpec::default()
        };
        assert_eq!(filtered_indices(&t, &constrained), vec![0]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let t = three_row_table();
        let spec = FilterSpec {
            year_range: Some((1950.0, 2005.0)),
            ..FilterSpec::default()
        };
        assert_eq!(filtered_indices(&t, &spec), vec![0, 1, 2]);
    }

    #[test]
    fn missing_value_fails_an_active_range() {
        let t = table(
            &[TARGET, YEAR],
            &[&[int(100), int(1990)], &[int(200), CellValue::Null]],
        );
        let spec = FilterSpec {
            year_range: Some((1900.0, 2020.0)),
            ..FilterSpec::default()
        };
        assert_eq!(filtered_indices(&t, &spec), vec![0]);
    }

    #[test]
    fn partial_quality_selection_filters_rows() {
        let t = three_row_table();
        let spec = FilterSpec {
            quality: Some([int(5)].into_iter().collect()),
            ..FilterSpec::default()
        };
        assert_eq!(filtered_indices(&t, &spec), vec![0, 2]);
    }

    // ── invariants ───────────────────────────────────────────────────────

    /// The view is a subset of the table and widening never shrinks it.
    #[test]
    fn widening_a_predicate_never_shrinks_the_view() {
        let t = three_row_table();
        let narrow = FilterSpec {
            year_range: Some((1970.0, 1990.0)),
            quality: Some([int(7)].into_iter().collect()),
            ..FilterSpec::default()
        };
        let narrow_view = filtered_indices(&t, &narrow);

        let wide = FilterSpec {
            year_range: None,
            ..narrow.clone()
        };
        let wide_view = filtered_indices(&t, &wide);

        assert!(narrow_view.iter().all(|i| wide_view.contains(i)));
        assert!(wide_view.len() >= narrow_view.len());
        assert!(wide_view.iter().all(|&i| i < t.len()));
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = three_row_table();
        let spec = FilterSpec {
            year_range: Some((1960.0, 2010.0)),
            ..FilterSpec::default()
        };
        let once = filtered_indices(&t, &spec);
        let twice = filtered_indices(&t, &spec);
        assert_eq!(once, twice);
    }
}
