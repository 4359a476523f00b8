use crate::data::model::Table;

// ---------------------------------------------------------------------------
// COO rollup: per-file summaries of already-aggregated CSV exports
// ---------------------------------------------------------------------------

/// Summary of one uploaded CSV. Files are independent: no filtering, no
/// joining across uploads.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub name: String,
    /// The parsed table, previewed as-is.
    pub table: Table,
    pub row_count: usize,
    pub column_count: usize,
    /// `Total <column>` metrics for every MRC-ish column, missing cells
    /// summed as 0.
    pub mrc_totals: Vec<(String, f64)>,
}

/// Columns whose name contains `mrc` case-insensitively, in header order.
pub fn mrc_columns(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.to_lowercase().contains("mrc"))
        .cloned()
        .collect()
}

pub fn summarize(name: &str, table: Table) -> FileSummary {
    let mrc_totals = mrc_columns(&table)
        .into_iter()
        .map(|col| {
            let total = table.column_sum(&col);
            (col, total)
        })
        .collect();

    FileSummary {
        name: name.to_string(),
        row_count: table.len(),
        column_count: table.columns.len(),
        mrc_totals,
        table,
    }
}
