use chrono::{Datelike, Days, NaiveDate};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Work-type classification and bonus rules
// ---------------------------------------------------------------------------

/// Per-1000-ft payout rate by work type.
pub const BONUS_RATES: &[(&str, f64)] = &[("Strand", 0.02), ("Fiber Pull", 0.02), ("Lashing", 0.02)];

/// Fixed footage unit the per-foot rate is paid against.
pub const FOOTAGE_UNIT: f64 = 1000.0;

/// Classify a free-text work description into a work-type label.
///
/// First match wins, plain case-sensitive substring tests. "Strand" is
/// checked first and is not exclusive of the other keywords, so a
/// description containing both "Strand" and "Lashed" is "Strand" — the
/// rule order is the tie-break.
pub fn classify_work_type(description: Option<&str>) -> &'static str {
    let desc = match description {
        Some(d) => d,
        None => return "Unknown",
    };
    if desc.contains("Strand") {
        "Strand"
    } else if desc.contains("Fiber($0.02)") {
        "Fiber Pull"
    } else if desc.contains("Lashed") {
        "Lashing"
    } else {
        "Other"
    }
}

/// Per-unit rate for a work-type label; 0 for anything unlisted.
pub fn bonus_rate(label: &str) -> f64 {
    BONUS_RATES
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, rate)| *rate)
        .unwrap_or(0.0)
}

/// Bonus amount for a work-type label: rate × fixed footage unit.
pub fn compute_bonus(label: &str) -> f64 {
    bonus_rate(label) * FOOTAGE_UNIT
}

// ---------------------------------------------------------------------------
// Week labels
// ---------------------------------------------------------------------------

/// `start/end` label of the Monday-to-Sunday week containing `date`,
/// e.g. `2024-01-01/2024-01-07`. Sorts chronologically as a string.
pub fn week_label(date: NaiveDate) -> String {
    let monday = date - Days::new(date.weekday().num_days_from_monday() as u64);
    let sunday = monday + Days::new(6);
    format!("{}/{}", monday.format("%Y-%m-%d"), sunday.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Derived-column stages
// ---------------------------------------------------------------------------

/// Append a `Work Type` column classified from a description column.
pub fn with_work_type(table: &Table, description_col: &str) -> Table {
    table.with_column("Work Type", |row| {
        let desc = row.get(description_col).and_then(|v| v.as_text());
        CellValue::Text(classify_work_type(desc).to_string())
    })
}

/// Append a `Bonus` column computed from the `Work Type` column.
pub fn with_bonus(table: &Table) -> Table {
    table.with_column("Bonus", |row| {
        let label = row
            .get("Work Type")
            .and_then(|v| v.as_text())
            .unwrap_or("Unknown");
        CellValue::Number(compute_bonus(label))
    })
}

/// Append a `Week` column labelling each row's date; null dates get a
/// null week.
pub fn with_week(table: &Table, date_col: &str) -> Table {
    table.with_column("Week", |row| {
        match row.get(date_col).and_then(|v| v.as_date()) {
            Some(d) => CellValue::Text(week_label(d)),
            None => CellValue::Null,
        }
    })
}
