/// Report pipelines: one module per dashboard section, each a pure
/// function from (loaded table, current filter selections) to a set of
/// presentation artifacts. The UI re-runs the affected pipeline on every
/// interaction; there is no incremental state to invalidate.

pub mod construction;
pub mod rollup;
pub mod talley;

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data::filter::FilterSpec;
use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// User filter selections shared by the Construction and Talley pipelines
// ---------------------------------------------------------------------------

/// The filter widgets' current state: a person multiselect plus an
/// inclusive date range. Defaults to the full universe when a file loads.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelections {
    /// Column the multiselect filters on (`Who filled this out?` or
    /// `Employee`).
    pub person_column: String,
    /// Currently selected people. An empty set matches zero rows.
    pub selected: BTreeSet<CellValue>,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

impl FilterSelections {
    /// Lower the widget state into filter predicates.
    pub fn to_spec(&self, date_column: &str) -> FilterSpec {
        FilterSpec::default()
            .with_member(&self.person_column, self.selected.clone())
            .with_date_range(date_column, self.date_start, self.date_end)
    }
}

// ---------------------------------------------------------------------------
// Combined summary (both files loaded)
// ---------------------------------------------------------------------------

/// The side-by-side KPI block shown once both datasets are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedSummary {
    pub construction_records: usize,
    pub bonus_total: f64,
    pub talley_records: usize,
    pub talley_mrc: Option<f64>,
}

pub fn combined_summary(
    construction: &construction::ConstructionReport,
    talley: &talley::TalleyReport,
) -> CombinedSummary {
    CombinedSummary {
        construction_records: construction.total_records,
        bonus_total: construction.total_bonus,
        talley_records: talley.total_records,
        talley_mrc: talley.total_mrc,
    }
}

// ---------------------------------------------------------------------------
// KPI formatting
// ---------------------------------------------------------------------------

/// `$1,234.56` — two decimals with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let negative = amount.is_sign_negative();
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}
