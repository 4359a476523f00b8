use crate::data::aggregate::{aggregate, Reduce};
use crate::data::filter::apply_filters;
use crate::data::loader::{coerce_dates, coerce_numeric};
use crate::data::model::Table;

use super::FilterSelections;

// Source columns of the Talley status export.
pub const DATE_COL: &str = "Date";
pub const EMPLOYEE_COL: &str = "Employee";
pub const MRC_COL: &str = "MRC";
pub const CATEGORY_COL: &str = "Category";
pub const STATUS_COL: &str = "Status";

/// Artifacts of one Talley pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct TalleyReport {
    /// The filtered table. Download: `talley_filtered.csv`.
    pub detail: Table,
    pub total_records: usize,
    /// `None` when the `MRC` column is absent from the upload.
    pub total_mrc: Option<f64>,
    /// `Category` → `MRC` sum, only when both columns exist.
    pub mrc_by_category: Option<Table>,
    /// `Status` → `Count`, only when the column exists.
    pub status_counts: Option<Table>,
    /// Informational notices for skipped metrics/charts.
    pub warnings: Vec<String>,
}

/// The `Loaded` stage: coerce the `Date` and `MRC` columns (both
/// no-ops when absent).
pub fn prepare(raw: &Table) -> Table {
    let t = coerce_dates(raw, DATE_COL);
    coerce_numeric(&t, MRC_COL)
}

/// The `Filtered` stage: apply the selections and compute the metrics
/// and chart tables, skipping whatever the upload's schema cannot
/// support.
pub fn build(prepared: &Table, filters: &FilterSelections) -> TalleyReport {
    let detail = apply_filters(prepared, &filters.to_spec(DATE_COL));
    let total_records = detail.len();
    let mut warnings = Vec::new();

    let total_mrc = if detail.has_column(MRC_COL) {
        Some(detail.column_sum(MRC_COL))
    } else {
        warnings.push(format!("{MRC_COL} column not found in Talley data."));
        None
    };

    let mrc_by_category = (detail.has_column(CATEGORY_COL) && detail.has_column(MRC_COL))
        .then(|| aggregate(&detail, &[CATEGORY_COL], MRC_COL, Reduce::Sum, MRC_COL));

    let status_counts = if detail.has_column(STATUS_COL) {
        Some(aggregate(&detail, &[STATUS_COL], "", Reduce::Count, "Count"))
    } else {
        warnings.push(format!("{STATUS_COL} column not found in Talley data."));
        None
    };

    TalleyReport {
        detail,
        total_records,
        total_mrc,
        mrc_by_category,
        status_counts,
        warnings,
    }
}
