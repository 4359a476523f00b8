use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::ColorMap;
use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Categorical bar charts over summary tables
// ---------------------------------------------------------------------------

/// Render a summary table as a bar chart: one bar per row, `category_col`
/// on the x axis, `value_col` as the height.
pub fn bar_chart(ui: &mut Ui, id: &str, table: &Table, category_col: &str, value_col: &str) {
    let categories = category_order(table, category_col);
    let bars: Vec<Bar> = table
        .rows
        .iter()
        .filter_map(|row| {
            let cat = row.get(category_col).cloned().unwrap_or(CellValue::Null);
            let idx = categories.iter().position(|c| *c == cat)?;
            let value = row.get(value_col).and_then(|v| v.as_f64()).unwrap_or(0.0);
            Some(
                Bar::new(idx as f64, value)
                    .width(0.6)
                    .name(cat.to_string()),
            )
        })
        .collect();

    let chart = BarChart::new(bars).color(Color32::LIGHT_BLUE);
    show_category_plot(ui, id, &categories, |plot_ui| {
        plot_ui.bar_chart(chart);
    });
}

/// Render a two-key summary as stacked bars: `category_col` on the x axis,
/// one colour per distinct `series_col` value, heights from `value_col`.
pub fn stacked_bar_chart(
    ui: &mut Ui,
    id: &str,
    table: &Table,
    category_col: &str,
    value_col: &str,
    series_col: &str,
) {
    let categories = category_order(table, category_col);
    let series_values = table.unique_non_null(series_col);
    let colors = ColorMap::new(&series_values);

    let mut offsets = vec![0.0_f64; categories.len()];
    let mut charts = Vec::new();
    for series in &series_values {
        let mut bars = Vec::new();
        for row in &table.rows {
            if row.get(series_col) != Some(series) {
                continue;
            }
            let cat = row.get(category_col).cloned().unwrap_or(CellValue::Null);
            let Some(idx) = categories.iter().position(|c| *c == cat) else {
                continue;
            };
            let value = row.get(value_col).and_then(|v| v.as_f64()).unwrap_or(0.0);
            bars.push(
                Bar::new(idx as f64, value)
                    .base_offset(offsets[idx])
                    .width(0.6)
                    .fill(colors.color_for(series))
                    .name(series.to_string()),
            );
            offsets[idx] += value;
        }
        charts.push(
            BarChart::new(bars)
                .color(colors.color_for(series))
                .name(series.to_string()),
        );
    }

    show_category_plot(ui, id, &categories, |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    });
}

/// Distinct category values in row order (summaries are already sorted).
fn category_order(table: &Table, category_col: &str) -> Vec<CellValue> {
    let mut categories = Vec::new();
    for row in &table.rows {
        let cat = row.get(category_col).cloned().unwrap_or(CellValue::Null);
        if !categories.contains(&cat) {
            categories.push(cat);
        }
    }
    categories
}

/// A locked-down plot with category labels on integer x ticks.
fn show_category_plot(
    ui: &mut Ui,
    id: &str,
    categories: &[CellValue],
    build: impl FnOnce(&mut egui_plot::PlotUi),
) {
    let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(240.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.05 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| build(plot_ui));
}
