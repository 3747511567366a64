use std::collections::BTreeMap;

use crate::data::model::{
    Capabilities, CellValue, RecordTable, AREA, NEIGHBORHOOD, QUALITY, TARGET, YEAR,
};
use crate::data::stats::{
    correlation_matrix, heatmap_columns, median, numeric_columns, percentile, rank_drivers,
    view_numeric_values, Driver,
};

// ---------------------------------------------------------------------------
// User-adjustable chart parameters
// ---------------------------------------------------------------------------

/// Histogram bin count for the price distribution.
pub const PRICE_BINS: usize = 30;
/// Driver analysis needs this many numeric columns to be meaningful.
pub const MIN_DRIVER_COLUMNS: usize = 5;
/// The heatmap keeps the target plus this many top drivers.
pub const HEATMAP_DRIVERS: usize = 11;

pub const TOP_N_RANGE: std::ops::RangeInclusive<usize> = 5..=25;
pub const TOP_K_RANGE: std::ops::RangeInclusive<usize> = 5..=20;

/// Main-area chart controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartParams {
    /// How many neighborhoods the bar chart keeps.
    pub top_n: usize,
    /// How many drivers the horizontal bar chart keeps.
    pub top_k: usize,
    /// Whether the correlation heatmap is rendered.
    pub show_heatmap: bool,
}

impl Default for ChartParams {
    fn default() -> Self {
        ChartParams {
            top_n: 12,
            top_k: 10,
            show_heatmap: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Chart specifications
// ---------------------------------------------------------------------------

/// One point of the area-vs-price scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub area: f64,
    pub price: f64,
    /// Quality value, used for coloring and legend grouping.
    pub quality: Option<CellValue>,
    /// Construction year for hover text, when the column exists.
    pub year: Option<f64>,
}

/// Five-number summary of one box in the quality box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    /// Numeric quality value the box sits at on the x axis.
    pub quality: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

/// A chart the Visualization Selector offers for the current view. Data is
/// pre-aggregated here; the UI layer only draws.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// Distribution of the target over the filtered view.
    Histogram {
        title: String,
        values: Vec<f64>,
        bins: usize,
    },
    /// Living area vs price, colored by quality.
    Scatter {
        title: String,
        points: Vec<ScatterPoint>,
    },
    /// Price distribution per quality level.
    BoxPlot { title: String, boxes: Vec<BoxStats> },
    /// Median price of the top-N neighborhoods, descending.
    NeighborhoodBars {
        title: String,
        bars: Vec<(String, f64)>,
    },
    /// Top-K drivers by correlation with the target, horizontal.
    DriverBars {
        title: String,
        bars: Vec<(String, f64)>,
    },
    /// Pairwise correlations of the target and its top drivers.
    Heatmap {
        title: String,
        labels: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
}

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// Choose which charts the current view supports. A chart is offered only
/// when every column it needs is present; this is an availability gate, not
/// a ranking. Callers must not pass an empty view (the empty-filter warning
/// short-circuits the render pass before chart selection).
pub fn select_charts(
    table: &RecordTable,
    view: &[usize],
    caps: Capabilities,
    params: ChartParams,
) -> Vec<ChartSpec> {
    let mut charts = Vec::new();

    charts.push(ChartSpec::Histogram {
        title: "Saleprice Distribution (filtered)".to_string(),
        values: view_numeric_values(table, view, TARGET),
        bins: PRICE_BINS,
    });

    if caps.has_area && caps.has_quality {
        charts.push(ChartSpec::Scatter {
            title: "GrLivArea vs Saleprice (color = OverallQual)".to_string(),
            points: scatter_points(table, view, caps),
        });
    }

    if caps.has_quality {
        charts.push(ChartSpec::BoxPlot {
            title: "Saleprice by OverallQual".to_string(),
            boxes: quality_boxes(table, view),
        });
    }

    if caps.has_neighborhood {
        charts.push(ChartSpec::NeighborhoodBars {
            title: format!("Top {} Neighborhoods by Median Saleprice", params.top_n),
            bars: neighborhood_medians(table, view, params.top_n),
        });
    }

    // Driver charts degrade to a placeholder below the column threshold.
    if numeric_columns(table, view).len() >= MIN_DRIVER_COLUMNS {
        let drivers = rank_drivers(table, view);
        charts.push(ChartSpec::DriverBars {
            title: "Top numeric correlations with Saleprice (filtered)".to_string(),
            bars: drivers
                .iter()
                .take(params.top_k)
                .map(|d| (d.feature.clone(), d.correlation))
                .collect(),
        });

        if params.show_heatmap {
            charts.push(heatmap_spec(table, view, &drivers));
        }
    }

    charts
}

fn scatter_points(table: &RecordTable, view: &[usize], caps: Capabilities) -> Vec<ScatterPoint> {
    view.iter()
        .filter_map(|&i| {
            let rec = &table.records[i];
            let area = rec.number(AREA)?;
            let price = rec.number(TARGET)?;
            Some(ScatterPoint {
                area,
                price,
                quality: rec.get(QUALITY).filter(|v| !v.is_null()).cloned(),
                year: caps.has_year.then(|| rec.number(YEAR)).flatten(),
            })
        })
        .collect()
}

/// Tukey box stats per quality level: quartiles plus whiskers at the most
/// extreme values still inside 1.5·IQR of the quartiles.
fn quality_boxes(table: &RecordTable, view: &[usize]) -> Vec<BoxStats> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for &i in view {
        let rec = &table.records[i];
        if let (Some(q), Some(price)) = (rec.number(QUALITY), rec.number(TARGET)) {
            groups.entry(q.round() as i64).or_default().push(price);
        }
    }

    groups
        .into_iter()
        .map(|(quality, mut prices)| {
            prices.sort_by(f64::total_cmp);
            let q1 = percentile(&prices, 0.25);
            let q3 = percentile(&prices, 0.75);
            let iqr = q3 - q1;
            let low_fence = q1 - 1.5 * iqr;
            let high_fence = q3 + 1.5 * iqr;
            let lower_whisker = prices
                .iter()
                .copied()
                .find(|&p| p >= low_fence)
                .unwrap_or(q1);
            let upper_whisker = prices
                .iter()
                .rev()
                .copied()
                .find(|&p| p <= high_fence)
                .unwrap_or(q3);
            BoxStats {
                quality: quality as f64,
                lower_whisker,
                q1,
                median: percentile(&prices, 0.5),
                q3,
                upper_whisker,
            }
        })
        .collect()
}

/// Median target per neighborhood, sorted descending, truncated to `top_n`.
fn neighborhood_medians(table: &RecordTable, view: &[usize], top_n: usize) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for &i in view {
        let rec = &table.records[i];
        if let (Some(label), Some(price)) = (rec.text(NEIGHBORHOOD), rec.number(TARGET)) {
            groups.entry(label).or_default().push(price);
        }
    }

    let mut medians: Vec<(String, f64)> = groups
        .into_iter()
        .filter_map(|(label, prices)| median(&prices).map(|m| (label, m)))
        .collect();
    medians.sort_by(|a, b| b.1.total_cmp(&a.1));
    medians.truncate(top_n);
    medians
}

fn heatmap_spec(table: &RecordTable, view: &[usize], drivers: &[Driver]) -> ChartSpec {
    let labels = heatmap_columns(drivers, HEATMAP_DRIVERS);
    let matrix = correlation_matrix(table, view, &labels);
    ChartSpec::Heatmap {
        title: "Correlation heatmap (selected features)".to_string(),
        labels,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Record};
    use crate::data::neighborhood::restore_neighborhood;

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

    fn full_table() -> RecordTable {
        restore_neighborhood(table(
            &[TARGET, YEAR, AREA, QUALITY, "Neighborhood_A", "Neighborhood_B"],
            &[
                &[int(100_000), int(1950), int(900), int(4), int(1), int(0)],
                &[int(180_000), int(1980), int(1400), int(6), int(1), int(0)],
                &[int(250_000), int(2005), int(2000), int(8), int(0), int(1)],
                &[int(320_000), int(2010), int(2600), int(9), int(0), int(1)],
            ],
        ))
    }

    fn kinds(charts: &[ChartSpec]) -> Vec<&'static str> {
        charts
            .iter()
            .map(|c| match c {
                ChartSpec::Histogram { .. } => "histogram",
                ChartSpec::Scatter { .. } => "scatter",
                ChartSpec::BoxPlot { .. } => "box",
                ChartSpec::NeighborhoodBars { .. } => "neighborhood",
                ChartSpec::DriverBars { .. } => "drivers",
                ChartSpec::Heatmap { .. } => "heatmap",
            })
            .collect()
    }

    #[test]
    fn full_schema_offers_every_chart() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        let caps = Capabilities::probe(&t);
        let params = ChartParams {
            show_heatmap: true,
            ..ChartParams::default()
        };
        assert_eq!(
            kinds(&select_charts(&t, &view, caps, params)),
            vec!["histogram", "scatter", "box", "neighborhood", "drivers", "heatmap"]
        );
    }

    /// Missing optional columns drop exactly the charts that need them.
    #[test]
    fn charts_gate_on_column_availability() {
        let t = restore_neighborhood(table(
            &[TARGET, YEAR],
            &[&[int(100_000), int(1950)], &[int(180_000), int(1980)]],
        ));
        let view: Vec<usize> = (0..t.len()).collect();
        let caps = Capabilities::probe(&t);
        let charts = select_charts(&t, &view, caps, ChartParams::default());
        // No area/quality → no scatter, no box; 2 numeric columns → no drivers.
        assert_eq!(kinds(&charts), vec!["histogram", "neighborhood"]);
    }

    #[test]
    fn heatmap_needs_its_toggle() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        let caps = Capabilities::probe(&t);
        let charts = select_charts(&t, &view, caps, ChartParams::default());
        assert!(!kinds(&charts).contains(&"heatmap"));
    }

    #[test]
    fn neighborhood_bars_sort_descending_and_truncate() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        let bars = neighborhood_medians(&t, &view, 1);
        // B holds the two most expensive houses, so it survives the cut.
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].0, "B");
        assert_eq!(bars[0].1, 285_000.0);
    }

    #[test]
    fn driver_bars_respect_top_k() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        let caps = Capabilities::probe(&t);
        let params = ChartParams {
            top_k: 2,
            ..ChartParams::default()
        };
        let charts = select_charts(&t, &view, caps, params);
        let Some(ChartSpec::DriverBars { bars, .. }) =
            charts.iter().find(|c| matches!(c, ChartSpec::DriverBars { .. }))
        else {
            panic!("driver chart missing");
        };
        assert_eq!(bars.len(), 2);
        assert!(bars[0].1 >= bars[1].1);
    }

    #[test]
    fn box_stats_order_five_numbers() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        for b in quality_boxes(&t, &view) {
            assert!(b.lower_whisker <= b.q1);
            assert!(b.q1 <= b.median);
            assert!(b.median <= b.q3);
            assert!(b.q3 <= b.upper_whisker);
        }
    }

    #[test]
    fn scatter_points_carry_color_and_hover_fields() {
        let t = full_table();
        let view: Vec<usize> = (0..t.len()).collect();
        let caps = Capabilities::probe(&t);
        let points = scatter_points(&t, &view, caps);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].quality, Some(int(4)));
        assert_eq!(points[0].year, Some(1950.0));
    }
}
