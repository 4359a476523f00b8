use std::collections::BTreeSet;
use std::path::Path;

use crate::data::loader;
use crate::data::model::{CellValue, Table};
use crate::report::rollup::{self, FileSummary};
use crate::report::{construction, talley, FilterSelections};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which report the central panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Construction,
    Talley,
    Rollup,
}

/// One upload slot and its pipeline state, independent of rendering.
///
/// * no table, no error        → nothing uploaded yet
/// * no table, error           → the file failed to parse
/// * table, selections present → loaded; artifacts recompute every frame
pub struct ReportSlot {
    pub label: &'static str,
    /// Column driving the person multiselect.
    pub person_column: &'static str,
    pub date_column: &'static str,
    /// Loaded-stage transform (coercions + derived columns).
    prepare: fn(&Table) -> Table,
    /// File name of the current upload, for the top bar.
    pub source_name: Option<String>,
    /// The prepared table (None until a file is supplied).
    pub table: Option<Table>,
    /// Current filter widget state; defaults to the full universe.
    pub selections: Option<FilterSelections>,
    /// Parse failure for this slot only; other slots are unaffected.
    pub error: Option<String>,
}

impl ReportSlot {
    fn new(
        label: &'static str,
        person_column: &'static str,
        date_column: &'static str,
        prepare: fn(&Table) -> Table,
    ) -> Self {
        Self {
            label,
            person_column,
            date_column,
            prepare,
            source_name: None,
            table: None,
            selections: None,
            error: None,
        }
    }

    /// Load a file into this slot, replacing any previous upload.
    pub fn load(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match loader::load_file(path) {
            Ok(raw) => {
                log::info!(
                    "Loaded {name}: {} rows, columns {:?}",
                    raw.len(),
                    raw.columns
                );
                let prepared = (self.prepare)(&raw);
                self.set_table(name, prepared);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.error = Some(format!("{name}: {e}"));
            }
        }
    }

    /// Ingest a prepared table and initialise the filters to select
    /// everything.
    pub fn set_table(&mut self, source_name: String, table: Table) {
        let selected = table.unique_non_null(self.person_column);
        let today = chrono::Local::now().date_naive();
        let (date_start, date_end) = table.date_bounds(self.date_column).unwrap_or((today, today));

        self.selections = Some(FilterSelections {
            person_column: self.person_column.to_string(),
            selected,
            date_start,
            date_end,
        });
        self.source_name = Some(source_name);
        self.table = Some(table);
        self.error = None;
    }

    /// The selectable universe for the person multiselect.
    pub fn person_universe(&self) -> BTreeSet<CellValue> {
        self.table
            .as_ref()
            .map(|t| t.unique_non_null(self.person_column))
            .unwrap_or_default()
    }

    /// Toggle a single person in the multiselect.
    pub fn toggle_person(&mut self, value: &CellValue) {
        if let Some(sel) = &mut self.selections {
            if !sel.selected.remove(value) {
                sel.selected.insert(value.clone());
            }
        }
    }

    /// Select every person in the universe.
    pub fn select_all(&mut self) {
        let universe = self.person_universe();
        if let Some(sel) = &mut self.selections {
            sel.selected = universe;
        }
    }

    /// Deselect everyone (matches zero rows, not "no filter").
    pub fn select_none(&mut self) {
        if let Some(sel) = &mut self.selections {
            sel.selected.clear();
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub active_tab: Tab,
    pub construction: ReportSlot,
    pub talley: ReportSlot,
    /// Rollup uploads, in the order they were added.
    pub rollup_files: Vec<FileSummary>,
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Construction,
            construction: ReportSlot::new(
                "Construction",
                construction::TECH_COL,
                construction::DATE_COL,
                construction::prepare,
            ),
            talley: ReportSlot::new(
                "Talley",
                talley::EMPLOYEE_COL,
                talley::DATE_COL,
                talley::prepare,
            ),
            rollup_files: Vec::new(),
            status_message: None,
        }
    }
}

impl AppState {
    pub fn active_slot_mut(&mut self) -> Option<&mut ReportSlot> {
        match self.active_tab {
            Tab::Construction => Some(&mut self.construction),
            Tab::Talley => Some(&mut self.talley),
            Tab::Rollup => None,
        }
    }

    /// Add CSV files to the rollup dashboard; a bad file only produces a
    /// status message, the others still load.
    pub fn add_rollup_files(&mut self, paths: &[std::path::PathBuf]) {
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            match loader::load_file(path) {
                Ok(table) => {
                    log::info!("Rollup file {name}: {} rows", table.len());
                    self.rollup_files.push(rollup::summarize(&name, table));
                }
                Err(e) => {
                    log::error!("Failed to load rollup file {name}: {e}");
                    self.status_message = Some(format!("{name}: {e}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::data::model::Row;

    use super::*;

    fn construction_table() -> Table {
        let mk = |date: &str, tech: &str| -> Row {
            [
                (
                    construction::DATE_COL.to_string(),
                    CellValue::Text(date.to_string()),
                ),
                (
                    construction::TECH_COL.to_string(),
                    CellValue::Text(tech.to_string()),
                ),
                (
                    construction::DESCRIPTION_COL.to_string(),
                    CellValue::Text("Strand run".to_string()),
                ),
            ]
            .into_iter()
            .collect::<BTreeMap<_, _>>()
        };
        Table::new(
            vec![
                construction::DATE_COL.to_string(),
                construction::TECH_COL.to_string(),
                construction::DESCRIPTION_COL.to_string(),
            ],
            vec![mk("2024-01-01", "A"), mk("2024-01-08", "B")],
        )
    }

    #[test]
    fn loading_initialises_filters_to_the_full_universe() {
        let mut state = AppState::default();
        let prepared = construction::prepare(&construction_table());
        state.construction.set_table("c.xlsx".into(), prepared);

        let sel = state.construction.selections.as_ref().unwrap();
        assert_eq!(sel.selected.len(), 2);
        assert_eq!(
            sel.date_start,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            sel.date_end,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
    }

    #[test]
    fn toggle_select_all_none() {
        let mut state = AppState::default();
        let prepared = construction::prepare(&construction_table());
        state.construction.set_table("c.xlsx".into(), prepared);

        let a = CellValue::Text("A".into());
        state.construction.toggle_person(&a);
        assert_eq!(
            state.construction.selections.as_ref().unwrap().selected.len(),
            1
        );
        state.construction.select_none();
        assert!(state
            .construction
            .selections
            .as_ref()
            .unwrap()
            .selected
            .is_empty());
        state.construction.select_all();
        assert_eq!(
            state.construction.selections.as_ref().unwrap().selected.len(),
            2
        );
    }
}
