use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, ReportSlot, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open Construction…").clicked() {
                open_slot_dialog(&mut state.construction);
                ui.close_menu();
            }
            if ui.button("Open Talley…").clicked() {
                open_slot_dialog(&mut state.talley);
                ui.close_menu();
            }
            if ui.button("Add Rollup CSVs…").clicked() {
                add_rollup_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for (tab, label) in [
            (Tab::Construction, "Construction"),
            (Tab::Talley, "Talley"),
            (Tab::Rollup, "COO Rollup"),
        ] {
            if ui
                .selectable_label(state.active_tab == tab, label)
                .clicked()
            {
                state.active_tab = tab;
            }
        }

        ui.separator();

        for slot in [&state.construction, &state.talley] {
            if let (Some(name), Some(table)) = (&slot.source_name, &slot.table) {
                ui.label(format!("{}: {} ({} rows)", slot.label, name, table.len()));
            }
        }
        if !state.rollup_files.is_empty() {
            ui.label(format!("Rollup: {} files", state.rollup_files.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets for the active report
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(slot) = state.active_slot_mut() else {
        ui.label("Rollup files are summarised as-is; no filters apply.");
        return;
    };

    if slot.table.is_none() {
        ui.label(format!("No {} file loaded.", slot.label));
        return;
    }

    // Clone the universe so we can mutate the selections inside the loop.
    let universe = slot.person_universe();
    let person_column = slot.person_column.to_string();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            if let Some(sel) = &mut slot.selections {
                ui.horizontal(|ui: &mut Ui| {
                    ui.add(DatePickerButton::new(&mut sel.date_start).id_salt("date_start"));
                    ui.label("to");
                    ui.add(DatePickerButton::new(&mut sel.date_end).id_salt("date_end"));
                });
                if sel.date_end < sel.date_start {
                    ui.colored_label(Color32::YELLOW, "End date is before start date.");
                }
            }
            ui.separator();

            // ---- Person multiselect ----
            let n_selected = slot
                .selections
                .as_ref()
                .map(|s| s.selected.len())
                .unwrap_or(0);
            let header_text = format!("{person_column}  ({n_selected}/{})", universe.len());

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("person_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            slot.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            slot.select_none();
                        }
                    });

                    // Re-borrow after potential mutation from All/None
                    if let Some(sel) = &mut slot.selections {
                        for val in &universe {
                            let mut checked = sel.selected.contains(val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                if checked {
                                    sel.selected.insert(val.clone());
                                } else {
                                    sel.selected.remove(val);
                                }
                            }
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_slot_dialog(slot: &mut ReportSlot) {
    let file = rfd::FileDialog::new()
        .set_title(&format!("Open {} file", slot.label))
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xls", "csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        slot.load(&path);
    }
}

fn add_rollup_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Add rollup CSV exports")
        .add_filter("CSV", &["csv"])
        .pick_files();

    if let Some(paths) = files {
        state.add_rollup_files(&paths);
    }
}
