use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::to_csv_bytes;
use crate::data::model::Table;
use crate::report::{combined_summary, construction, format_currency, talley};
use crate::state::{AppState, Tab};
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Central panel – the active report
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Construction => construction_view(ui, state),
            Tab::Talley => talley_view(ui, state),
            Tab::Rollup => rollup_view(ui, state),
        });
}

// ---------------------------------------------------------------------------
// Construction report
// ---------------------------------------------------------------------------

fn construction_view(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = state.construction.error.clone() {
        ui.colored_label(Color32::RED, err);
        return;
    }

    let report = {
        let slot = &state.construction;
        match (&slot.table, &slot.selections) {
            (Some(table), Some(sel)) => Some(construction::build(table, sel)),
            _ => None,
        }
    };
    let Some(report) = report else {
        prompt(ui, "Upload a Construction file  (File → Open Construction…)");
        return;
    };

    ui.heading("Construction Overview");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total Construction Records", &report.total_records.to_string());
        metric(ui, "Estimated Bonus", &format_currency(report.total_bonus));
    });

    section(ui, "Weekly Construction Trends", |ui| {
        if report.weekly_trends.is_empty() {
            ui.label("No rows match the current filters.");
        } else {
            charts::stacked_bar_chart(
                ui,
                "weekly_trends",
                &report.weekly_trends,
                "Week",
                "Count",
                "Work Type",
            );
        }
    });

    section(ui, "Per-Tech Bonus Breakdown", |ui| {
        grid(ui, "bonus_by_tech", &report.bonus_by_tech);
    });
    download_button(
        ui,
        "Download Per-Tech Bonus",
        "bonus_by_tech.csv",
        &report.bonus_by_tech,
        &mut state.status_message,
    );

    if let Some(rollup) = &report.project_rollup {
        section(ui, "Project-Level Rollups", |ui| {
            grid(ui, "project_rollup", rollup);
        });
        download_button(
            ui,
            "Download Project Rollups",
            "project_rollup.csv",
            rollup,
            &mut state.status_message,
        );
    }

    section(ui, "Construction Detail Table", |ui| {
        grid(ui, "construction_detail", &report.detail);
    });
    download_button(
        ui,
        "Download Filtered Construction Data",
        "construction_filtered.csv",
        &report.detail,
        &mut state.status_message,
    );

    combined_section(ui, state);
}

// ---------------------------------------------------------------------------
// Talley report
// ---------------------------------------------------------------------------

fn talley_view(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = state.talley.error.clone() {
        ui.colored_label(Color32::RED, err);
        return;
    }

    let report = {
        let slot = &state.talley;
        match (&slot.table, &slot.selections) {
            (Some(table), Some(sel)) => Some(talley::build(table, sel)),
            _ => None,
        }
    };
    let Some(report) = report else {
        prompt(ui, "Upload a Talley file  (File → Open Talley…)");
        return;
    };

    ui.heading("Talley Status Overview");
    ui.add_space(4.0);

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total Talley Records", &report.total_records.to_string());
        if let Some(total) = report.total_mrc {
            metric(ui, "Total MRC", &format_currency(total));
        }
    });
    for warning in &report.warnings {
        ui.colored_label(Color32::YELLOW, warning);
    }

    if let Some(by_category) = &report.mrc_by_category {
        section(ui, "MRC by Category", |ui| {
            charts::bar_chart(
                ui,
                "mrc_by_category",
                by_category,
                talley::CATEGORY_COL,
                talley::MRC_COL,
            );
        });
    }

    if let Some(counts) = &report.status_counts {
        section(ui, "Status Counts", |ui| {
            charts::bar_chart(ui, "status_counts", counts, talley::STATUS_COL, "Count");
        });
    }

    section(ui, "Talley Detail Table", |ui| {
        grid(ui, "talley_detail", &report.detail);
    });
    download_button(
        ui,
        "Download Filtered Talley Data",
        "talley_filtered.csv",
        &report.detail,
        &mut state.status_message,
    );

    combined_section(ui, state);
}

// ---------------------------------------------------------------------------
// Combined summary (both files loaded)
// ---------------------------------------------------------------------------

fn combined_section(ui: &mut Ui, state: &AppState) {
    let construction_report = match (&state.construction.table, &state.construction.selections) {
        (Some(t), Some(s)) => construction::build(t, s),
        _ => return,
    };
    let talley_report = match (&state.talley.table, &state.talley.selections) {
        (Some(t), Some(s)) => talley::build(t, s),
        _ => return,
    };
    let summary = combined_summary(&construction_report, &talley_report);

    ui.add_space(8.0);
    ui.separator();
    ui.heading("Combined Summary");
    ui.columns(2, |cols| {
        metric(
            &mut cols[0],
            "Construction Records",
            &summary.construction_records.to_string(),
        );
        metric(
            &mut cols[0],
            "Bonus Total",
            &format_currency(summary.bonus_total),
        );
        metric(
            &mut cols[1],
            "Talley Records",
            &summary.talley_records.to_string(),
        );
        if let Some(mrc) = summary.talley_mrc {
            metric(&mut cols[1], "Talley MRC", &format_currency(mrc));
        }
    });
}

// ---------------------------------------------------------------------------
// COO rollup dashboard
// ---------------------------------------------------------------------------

fn rollup_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading("COO Dashboard");
    ui.label("Upload the latest CSV exports to view consolidated summaries.");
    ui.add_space(4.0);

    if state.rollup_files.is_empty() {
        prompt(ui, "Upload one or more CSV files to begin  (File → Add Rollup CSVs…)");
        return;
    }

    if ui.button("Clear all").clicked() {
        state.rollup_files.clear();
    }

    for (idx, summary) in state.rollup_files.iter().enumerate() {
        ui.add_space(8.0);
        ui.separator();
        ui.strong(format!("Data Preview: {}", summary.name));

        egui::CollapsingHeader::new("Quick Stats")
            .id_salt(("rollup_stats", idx))
            .show(ui, |ui: &mut Ui| {
                ui.label(format!(
                    "Rows: {}, Columns: {}",
                    summary.row_count, summary.column_count
                ));
                ui.label(format!("Columns: {}", summary.table.columns.join(", ")));
            });

        ui.horizontal(|ui: &mut Ui| {
            for (col, total) in &summary.mrc_totals {
                metric(ui, &format!("Total {col}"), &format_currency(*total));
            }
        });

        grid(ui, &format!("rollup_{idx}"), &summary.table);
    }
}

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

fn prompt(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}

/// A labelled KPI value.
fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small());
            ui.strong(RichText::new(value).size(20.0));
        });
    });
}

fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.add_space(8.0);
    ui.separator();
    ui.strong(title);
    ui.add_space(2.0);
    add_contents(ui);
}

/// Render a table as a grid with a header row.
fn grid(ui: &mut Ui, id: &str, table: &Table) {
    if table.columns.is_empty() {
        ui.label("Empty table.");
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().resizable(true), table.columns.len())
            .max_scroll_height(260.0)
            .header(20.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.len(), |mut row| {
                    let row_idx = row.index();
                    for col in &table.columns {
                        row.col(|ui| {
                            ui.label(table.cell(row_idx, col).to_string());
                        });
                    }
                });
            });
    });
}

/// Offer a summary table as a CSV download via a save-file dialog.
fn download_button(
    ui: &mut Ui,
    label: &str,
    default_name: &str,
    table: &Table,
    status: &mut Option<String>,
) {
    if !ui.button(label).clicked() {
        return;
    }
    let Some(path) = rfd::FileDialog::new()
        .set_title(label)
        .set_file_name(default_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    let result = to_csv_bytes(table).and_then(|bytes| {
        std::fs::write(&path, bytes).map_err(anyhow::Error::from)
    });
    match result {
        Ok(()) => {
            log::info!("Wrote {}", path.display());
            *status = Some(format!("Saved {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to write {}: {e:#}", path.display());
            *status = Some(format!("Error: {e:#}"));
        }
    }
}
