use crate::data::aggregate::{aggregate, Reduce};
use crate::data::derive::{with_bonus, with_week, with_work_type};
use crate::data::filter::apply_filters;
use crate::data::loader::coerce_dates;
use crate::data::model::Table;

use super::FilterSelections;

// Source columns of the Construction export.
pub const DATE_COL: &str = "Date";
pub const TECH_COL: &str = "Who filled this out?";
pub const DESCRIPTION_COL: &str = "What did you do.";
pub const PROJECT_COL: &str = "Project or labor?";

/// Artifacts of one Construction pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionReport {
    /// The filtered table with derived `Work Type`, `Bonus`, `Week`
    /// columns. Download: `construction_filtered.csv`.
    pub detail: Table,
    pub total_records: usize,
    pub total_bonus: f64,
    /// (`Week`, `Work Type`) → `Count`, for the weekly trends chart.
    pub weekly_trends: Table,
    /// `Technician` → `Total Bonus`. Download: `bonus_by_tech.csv`.
    pub bonus_by_tech: Table,
    /// `Project or labor?` → `Bonus` sum, only when the column exists.
    /// Download: `project_rollup.csv`.
    pub project_rollup: Option<Table>,
}

/// The `Loaded` stage: coerce the date column and append the derived
/// columns. Run once per file; filter changes re-run [`build`] only.
pub fn prepare(raw: &Table) -> Table {
    let t = coerce_dates(raw, DATE_COL);
    let t = with_work_type(&t, DESCRIPTION_COL);
    let t = with_bonus(&t);
    with_week(&t, DATE_COL)
}

/// The `Filtered` stage: apply the selections and compute every artifact
/// from scratch.
pub fn build(prepared: &Table, filters: &FilterSelections) -> ConstructionReport {
    let detail = apply_filters(prepared, &filters.to_spec(DATE_COL));

    let total_records = detail.len();
    let total_bonus = detail.column_sum("Bonus");

    let weekly_trends = aggregate(&detail, &["Week", "Work Type"], "", Reduce::Count, "Count");

    let bonus_by_tech = aggregate(&detail, &[TECH_COL], "Bonus", Reduce::Sum, "Total Bonus")
        .rename_column(TECH_COL, "Technician");

    let project_rollup = detail
        .has_column(PROJECT_COL)
        .then(|| aggregate(&detail, &[PROJECT_COL], "Bonus", Reduce::Sum, "Bonus"));

    ConstructionReport {
        detail,
        total_records,
        total_bonus,
        weekly_trends,
        bonus_by_tech,
        project_rollup,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::data::model::{CellValue, Row};

    use super::*;

    fn raw_row(date: &str, tech: &str, desc: &str) -> Row {
        let mut row: Row = BTreeMap::new();
        row.insert(DATE_COL.to_string(), CellValue::Text(date.to_string()));
        row.insert(TECH_COL.to_string(), CellValue::Text(tech.to_string()));
        row.insert(
            DESCRIPTION_COL.to_string(),
            CellValue::Text(desc.to_string()),
        );
        row
    }

    fn raw_table(rows: Vec<Row>) -> Table {
        Table::new(
            vec![
                DATE_COL.to_string(),
                TECH_COL.to_string(),
                DESCRIPTION_COL.to_string(),
            ],
            rows,
        )
    }

    fn selections(selected: &[&str]) -> FilterSelections {
        FilterSelections {
            person_column: TECH_COL.to_string(),
            selected: selected
                .iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect(),
            date_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        }
    }

    #[test]
    fn tech_filter_and_bonus_summary_scenario() {
        let prepared = prepare(&raw_table(vec![
            raw_row("2024-01-01", "A", "Strand run"),
            raw_row("2024-01-08", "B", "Lashed section"),
        ]));
        let report = build(&prepared, &selections(&["A"]));

        assert_eq!(report.total_records, 1);
        assert_eq!(report.total_bonus, 20.0);
        assert_eq!(report.bonus_by_tech.len(), 1);
        assert_eq!(
            report.bonus_by_tech.cell(0, "Technician"),
            &CellValue::Text("A".into())
        );
        assert_eq!(
            report.bonus_by_tech.cell(0, "Total Bonus"),
            &CellValue::Number(20.0)
        );
    }

    #[test]
    fn aggregate_after_filter_matches_manual_sum() {
        let prepared = prepare(&raw_table(vec![
            raw_row("2024-01-01", "A", "Strand run"),
            raw_row("2024-01-02", "A", "misc task"),
            raw_row("2024-01-08", "B", "Lashed section"),
            raw_row("2024-02-01", "A", "Fiber($0.02) pull"),
        ]));
        let report = build(&prepared, &selections(&["A"]));

        // Manual cross-check over the unfiltered table restricted to A.
        let manual: f64 = prepared
            .rows
            .iter()
            .filter(|r| r.get(TECH_COL) == Some(&CellValue::Text("A".into())))
            .filter_map(|r| r.get("Bonus").and_then(|v| v.as_f64()))
            .sum();
        assert_eq!(report.total_bonus, manual);
        assert_eq!(
            report.bonus_by_tech.cell(0, "Total Bonus"),
            &CellValue::Number(manual)
        );
    }

    #[test]
    fn weekly_trends_group_by_week_and_work_type() {
        let prepared = prepare(&raw_table(vec![
            raw_row("2024-01-01", "A", "Strand run"),
            raw_row("2024-01-03", "B", "Strand splice"),
            raw_row("2024-01-08", "A", "Lashed section"),
        ]));
        let report = build(&prepared, &selections(&["A", "B"]));

        assert_eq!(report.weekly_trends.len(), 2);
        assert_eq!(
            report.weekly_trends.cell(0, "Week"),
            &CellValue::Text("2024-01-01/2024-01-07".into())
        );
        assert_eq!(report.weekly_trends.cell(0, "Count"), &CellValue::Number(2.0));
    }

    #[test]
    fn project_rollup_is_skipped_without_the_column() {
        let prepared = prepare(&raw_table(vec![raw_row("2024-01-01", "A", "Strand run")]));
        let report = build(&prepared, &selections(&["A"]));
        assert!(report.project_rollup.is_none());
    }

    #[test]
    fn project_rollup_sums_bonus_per_project() {
        let mut r1 = raw_row("2024-01-01", "A", "Strand run");
        r1.insert(PROJECT_COL.to_string(), CellValue::Text("Project X".into()));
        let mut r2 = raw_row("2024-01-02", "A", "Lashed run");
        r2.insert(PROJECT_COL.to_string(), CellValue::Text("Project X".into()));
        let columns = vec![
            DATE_COL.to_string(),
            TECH_COL.to_string(),
            DESCRIPTION_COL.to_string(),
            PROJECT_COL.to_string(),
        ];
        let prepared = prepare(&Table::new(columns, vec![r1, r2]));

        let report = build(&prepared, &selections(&["A"]));
        let rollup = report.project_rollup.expect("column present");
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup.cell(0, "Bonus"), &CellValue::Number(40.0));
    }

    #[test]
    fn rows_with_unparseable_dates_are_excluded_by_the_range() {
        let prepared = prepare(&raw_table(vec![
            raw_row("2024-01-01", "A", "Strand run"),
            raw_row("sometime in March", "A", "Strand run"),
        ]));
        let report = build(&prepared, &selections(&["A"]));
        assert_eq!(report.total_records, 1);
    }

    #[test]
    fn empty_selection_yields_empty_report() {
        let prepared = prepare(&raw_table(vec![raw_row("2024-01-01", "A", "Strand run")]));
        let report = build(&prepared, &selections(&[]));
        assert!(report.detail.is_empty());
        assert_eq!(report.total_bonus, 0.0);
        assert!(report.bonus_by_tech.is_empty());
    }
}
