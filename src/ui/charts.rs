use std::collections::BTreeMap;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, MarkerShape, Plot, PlotPoints, Points};
use egui_extras::{Column, TableBuilder};

use crate::charts::{select_charts, ChartSpec, TOP_K_RANGE, TOP_N_RANGE};
use crate::color::diverging;
use crate::data::export::to_csv_bytes;
use crate::data::model::CellValue;
use crate::data::stats::{summary_metrics, synopsis};
use crate::state::AppState;

/// Default file name offered by the download dialog.
const EXPORT_FILE_NAME: &str = "filtered_train.csv";
/// The Data tab shows at most this many rows.
const PREVIEW_ROWS: usize = 50;

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn overview_tab(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else { return };

    let metrics = summary_metrics(ds, &state.visible_indices);
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Rows (filtered)", metrics.rows.to_string());
        metric(
            &mut cols[1],
            "Median Saleprice",
            metrics
                .median_price
                .map(|v| format!("{v:.0}"))
                .unwrap_or_else(|| "n/a".to_string()),
        );
        metric(
            &mut cols[2],
            "Median GrLivArea",
            metrics
                .median_area
                .map(|v| format!("{v:.0}"))
                .unwrap_or_else(|| "n/a".to_string()),
        );
    });

    ui.separator();
    ui.strong("AI-generated insight summary");
    ui.label(
        RichText::new("AI-assisted draft summary. Please validate using the charts.")
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(synopsis(ds, &state.visible_indices));
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).small().weak());
    ui.label(RichText::new(value).heading());
}

// ---------------------------------------------------------------------------
// Visuals tab
// ---------------------------------------------------------------------------

pub fn visuals_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = state.dataset.clone() else { return };

    ui.add(
        egui::Slider::new(&mut state.params.top_n, TOP_N_RANGE).text("Top N neighborhoods"),
    );
    ui.separator();

    let charts = select_charts(&ds, &state.visible_indices, state.capabilities, state.params);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for chart in &charts {
                match chart {
                    ChartSpec::Histogram { title, values, bins } => {
                        chart_title(ui, title);
                        histogram(ui, values, *bins);
                    }
                    ChartSpec::Scatter { title, points } => {
                        chart_title(ui, title);
                        scatter(ui, state, points);
                    }
                    ChartSpec::BoxPlot { title, boxes } => {
                        chart_title(ui, title);
                        box_plot(ui, boxes);
                    }
                    ChartSpec::NeighborhoodBars { title, bars } => {
                        chart_title(ui, title);
                        labeled_bars(ui, "neighborhood_bars", bars);
                    }
                    // Driver charts live on their own tab.
                    ChartSpec::DriverBars { .. } | ChartSpec::Heatmap { .. } => {}
                }
            }
        });
}

fn chart_title(ui: &mut Ui, title: &str) {
    ui.add_space(8.0);
    ui.strong(title);
}

fn histogram(ui: &mut Ui, values: &[f64], bins: usize) {
    if values.is_empty() || bins == 0 {
        return;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Bar::new(min + (i as f64 + 0.5) * width, c as f64).width(width * 0.95)
        })
        .collect();

    Plot::new("price_histogram")
        .height(260.0)
        .x_axis_label("Saleprice")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

fn scatter(ui: &mut Ui, state: &AppState, points: &[crate::charts::ScatterPoint]) {
    // One Points series per quality value so the legend groups by quality.
    let mut groups: BTreeMap<Option<CellValue>, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        groups
            .entry(p.quality.clone())
            .or_default()
            .push([p.area, p.price]);
    }

    // Hover annotation: the construction year of the nearest point.
    let lookup: Vec<(f64, f64, Option<f64>)> =
        points.iter().map(|p| (p.area, p.price, p.year)).collect();

    Plot::new("area_scatter")
        .height(300.0)
        .legend(Legend::default())
        .x_axis_label("GrLivArea")
        .y_axis_label("Saleprice")
        .label_formatter(move |name, value| {
            let mut text = if name.is_empty() {
                String::new()
            } else {
                format!("OverallQual {name}\n")
            };
            text.push_str(&format!(
                "GrLivArea {:.0}\nSaleprice {:.0}",
                value.x, value.y
            ));
            if let Some(year) = nearest_year(&lookup, value.x, value.y) {
                text.push_str(&format!("\nYearBuilt {year:.0}"));
            }
            text
        })
        .show(ui, |plot_ui| {
            for (quality, coords) in groups {
                let color = quality
                    .as_ref()
                    .and_then(|q| state.color_map.as_ref().map(|cm| cm.color_for(q)))
                    .unwrap_or(Color32::GRAY);
                let name = quality
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "n/a".to_string());
                let plot_points: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(plot_points)
                        .name(name)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(2.5),
                );
            }
        });
}

/// Year of the point closest to the cursor, in axis-relative distance.
fn nearest_year(points: &[(f64, f64, Option<f64>)], x: f64, y: f64) -> Option<f64> {
    let x_span = points
        .iter()
        .map(|p| p.0)
        .fold(f64::NEG_INFINITY, f64::max)
        - points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let y_span = points
        .iter()
        .map(|p| p.1)
        .fold(f64::NEG_INFINITY, f64::max)
        - points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let x_span = if x_span > 0.0 { x_span } else { 1.0 };
    let y_span = if y_span > 0.0 { y_span } else { 1.0 };

    points
        .iter()
        .min_by(|a, b| {
            let da = ((a.0 - x) / x_span).powi(2) + ((a.1 - y) / y_span).powi(2);
            let db = ((b.0 - x) / x_span).powi(2) + ((b.1 - y) / y_span).powi(2);
            da.total_cmp(&db)
        })
        .and_then(|p| p.2)
}

fn box_plot(ui: &mut Ui, boxes: &[crate::charts::BoxStats]) {
    let elems: Vec<BoxElem> = boxes
        .iter()
        .map(|b| {
            BoxElem::new(
                b.quality,
                BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
            )
            .name(format!("OverallQual {}", b.quality))
            .box_width(0.5)
        })
        .collect();

    Plot::new("quality_box_plot")
        .height(260.0)
        .x_axis_label("OverallQual")
        .y_axis_label("Saleprice")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).color(Color32::LIGHT_GREEN));
        });
}

/// Vertical bar chart with category labels on the x axis.
fn labeled_bars(ui: &mut Ui, id: &str, bars: &[(String, f64)]) {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let chart_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (_, v))| Bar::new(i as f64, *v).width(0.6))
        .collect();

    Plot::new(id.to_string())
        .height(260.0)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx >= 0.0 && (mark.value - idx).abs() < 0.3 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Drivers tab
// ---------------------------------------------------------------------------

pub fn drivers_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = state.dataset.clone() else { return };

    ui.add(egui::Slider::new(&mut state.params.top_k, TOP_K_RANGE).text("How many drivers to show?"));
    ui.checkbox(
        &mut state.params.show_heatmap,
        "Show correlation heatmap (top 12 features)",
    );
    ui.separator();

    let charts = select_charts(&ds, &state.visible_indices, state.capabilities, state.params);
    let mut any_drivers = false;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for chart in &charts {
                match chart {
                    ChartSpec::DriverBars { title, bars } => {
                        any_drivers = true;
                        chart_title(ui, title);
                        driver_bars(ui, bars);
                    }
                    ChartSpec::Heatmap { title, labels, matrix } => {
                        chart_title(ui, title);
                        heatmap(ui, labels, matrix);
                    }
                    _ => {}
                }
            }
            if !any_drivers {
                ui.label("Not enough numeric columns for driver analysis.");
            }
        });
}

/// Horizontal bar chart: one bar per driver, feature names on the y axis.
fn driver_bars(ui: &mut Ui, bars: &[(String, f64)]) {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    // Highest correlation on top.
    let n = bars.len();
    let chart_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, (_, r))| Bar::new((n - 1 - i) as f64, *r).width(0.6))
        .collect();

    Plot::new("driver_bars")
        .height((n as f32 * 24.0 + 60.0).max(180.0))
        .x_axis_label("Correlation")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if idx >= 0.0 && (mark.value - idx).abs() < 0.3 {
                let i = idx as usize;
                if i < labels.len() {
                    labels[labels.len() - 1 - i].clone()
                } else {
                    String::new()
                }
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(chart_bars)
                    .horizontal()
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

/// Painter-drawn correlation matrix: row labels in a left gutter, one
/// coloured cell per pair, pair details in the hover tooltip.
fn heatmap(ui: &mut Ui, labels: &[String], matrix: &[Vec<f64>]) {
    let n = labels.len();
    if n == 0 {
        return;
    }

    let gutter = 110.0_f32;
    let avail = (ui.available_width() - gutter).max(100.0);
    let cell = (avail / n as f32).clamp(18.0, 42.0);
    let size = Vec2::new(gutter + cell * n as f32, cell * n as f32);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;

    for (row, row_values) in matrix.iter().enumerate() {
        // Row label, truncated to keep the gutter narrow.
        let label = truncate(&labels[row], 14);
        painter.text(
            egui::pos2(
                origin.x + gutter - 6.0,
                origin.y + (row as f32 + 0.5) * cell,
            ),
            Align2::RIGHT_CENTER,
            label,
            FontId::proportional(10.0),
            ui.visuals().text_color(),
        );

        for (col, &r) in row_values.iter().enumerate() {
            let rect = egui::Rect::from_min_size(
                egui::pos2(origin.x + gutter + col as f32 * cell, origin.y + row as f32 * cell),
                Vec2::splat(cell - 1.0),
            );
            painter.rect_filled(rect, 2.0, diverging(r));
            if cell >= 24.0 && r.is_finite() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{r:.2}"),
                    FontId::proportional(9.0),
                    Color32::BLACK,
                );
            }
        }
    }

    if let Some(pos) = response.hover_pos() {
        let col = ((pos.x - origin.x - gutter) / cell).floor();
        let row = ((pos.y - origin.y) / cell).floor();
        if col >= 0.0 && row >= 0.0 && (col as usize) < n && (row as usize) < n {
            let (col, row) = (col as usize, row as usize);
            let r = matrix[row][col];
            let value = if r.is_finite() {
                format!("{r:.3}")
            } else {
                "n/a".to_string()
            };
            response.on_hover_text(format!("{} × {}: {value}", labels[row], labels[col]));
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars - 1).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Data tab
// ---------------------------------------------------------------------------

pub fn data_tab(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = state.dataset.clone() else { return };

    ui.label(format!(
        "First {} rows of the filtered dataset:",
        PREVIEW_ROWS.min(state.visible_indices.len())
    ));

    if ui.button("Download filtered data (CSV)").clicked() {
        export_dialog(state);
    }
    ui.separator();

    let preview: Vec<usize> = state
        .visible_indices
        .iter()
        .take(PREVIEW_ROWS)
        .copied()
        .collect();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        let mut builder = TableBuilder::new(ui).striped(true);
        for _ in &ds.column_names {
            builder = builder.column(Column::auto().at_least(60.0));
        }

        builder
            .header(20.0, |mut header| {
                for name in &ds.column_names {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, preview.len(), |mut row| {
                    let rec = &ds.records[preview[row.index()]];
                    for name in &ds.column_names {
                        row.col(|ui| {
                            ui.label(rec.text(name).unwrap_or_default());
                        });
                    }
                });
            });
    });
}

/// Ask where to save the filtered CSV and write it there.
fn export_dialog(state: &mut AppState) {
    let Some(ds) = &state.dataset else { return };

    let bytes = match to_csv_bytes(ds, &state.visible_indices) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
            return;
        }
    };

    let target = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = target {
        match std::fs::write(&path, &bytes) {
            Ok(()) => {
                log::info!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", path.display());
                state.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }
}
