use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, Row, Table};

// ---------------------------------------------------------------------------
// FilterSpec – a conjunction of predicates over table columns
// ---------------------------------------------------------------------------

/// Inclusive date range over one column. Rows whose cell is null or not a
/// date fail the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub column: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// All predicates are ANDed. The default (empty) spec selects every row.
///
/// Membership semantics per column:
/// * column absent from `member` → no constraint
/// * empty allowed set → nothing selected → matches zero rows
/// * row's value in the allowed set → passes
/// * row missing the column → treated as null (passes only if null is
///   in the allowed set)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// column → set of allowed values.
    pub member: BTreeMap<String, BTreeSet<CellValue>>,
    /// Inclusive [start, end] date windows.
    pub date_ranges: Vec<DateRange>,
    /// column → exact required value.
    pub equals: BTreeMap<String, CellValue>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.member.is_empty() && self.date_ranges.is_empty() && self.equals.is_empty()
    }

    /// Add a membership predicate.
    pub fn with_member(mut self, column: &str, allowed: BTreeSet<CellValue>) -> Self {
        self.member.insert(column.to_string(), allowed);
        self
    }

    /// Add an inclusive date-range predicate.
    pub fn with_date_range(mut self, column: &str, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_ranges.push(DateRange {
            column: column.to_string(),
            start,
            end,
        });
        self
    }

    /// Add an exact-equality predicate.
    pub fn with_equals(mut self, column: &str, value: CellValue) -> Self {
        self.equals.insert(column.to_string(), value);
        self
    }

    fn row_passes(&self, row: &Row) -> bool {
        for (col, allowed) in &self.member {
            if allowed.is_empty() {
                // Nothing selected for this column → hide everything
                return false;
            }
            let value = row.get(col).unwrap_or(&CellValue::Null);
            if !allowed.contains(value) {
                return false;
            }
        }
        for range in &self.date_ranges {
            match row.get(&range.column).and_then(|v| v.as_date()) {
                Some(d) => {
                    if d < range.start || d > range.end {
                        return false;
                    }
                }
                // Null / non-date cells fail the date predicate.
                None => return false,
            }
        }
        for (col, expected) in &self.equals {
            if row.get(col).unwrap_or(&CellValue::Null) != expected {
                return false;
            }
        }
        true
    }
}

/// Apply every predicate to every row, producing a reduced table with the
/// same columns and the surviving rows in their original order.
pub fn apply_filters(table: &Table, spec: &FilterSpec) -> Table {
    if spec.is_empty() {
        return table.clone();
    }
    Table {
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .filter(|row| spec.row_passes(row))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn sample() -> Table {
        let mk = |who: CellValue, when: CellValue| {
            [("Who".to_string(), who), ("Date".to_string(), when)]
                .into_iter()
                .collect()
        };
        Table::new(
            vec!["Who".into(), "Date".into()],
            vec![
                mk(text("A"), date(2024, 1, 1)),
                mk(text("B"), date(2024, 1, 8)),
                mk(text("A"), CellValue::Null),
            ],
        )
    }

    #[test]
    fn empty_spec_is_identity() {
        let t = sample();
        assert_eq!(apply_filters(&t, &FilterSpec::default()), t);
    }

    #[test]
    fn filtering_only_removes_rows() {
        let t = sample();
        let spec = FilterSpec::default().with_member("Who", [text("A")].into());
        let filtered = apply_filters(&t, &spec);
        assert_eq!(filtered.columns, t.columns);
        assert!(filtered.len() <= t.len());
        for row in &filtered.rows {
            assert!(t.rows.contains(row));
        }
    }

    #[test]
    fn empty_allowed_set_matches_nothing() {
        let t = sample();
        let spec = FilterSpec::default().with_member("Who", BTreeSet::new());
        assert!(apply_filters(&t, &spec).is_empty());
    }

    #[test]
    fn null_dates_fail_the_range_predicate() {
        let t = sample();
        let spec = FilterSpec::default().with_date_range(
            "Date",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let filtered = apply_filters(&t, &spec);
        // the null-dated row is excluded
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let t = sample();
        let spec = FilterSpec::default().with_date_range(
            "Date",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        );
        assert_eq!(apply_filters(&t, &spec).len(), 2);
    }

    #[test]
    fn predicates_are_anded() {
        let t = sample();
        let spec = FilterSpec::default()
            .with_member("Who", [text("A")].into())
            .with_date_range(
                "Date",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            );
        let filtered = apply_filters(&t, &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.cell(0, "Who"), &text("A"));
    }

    #[test]
    fn equality_predicate_matches_exactly() {
        let t = sample();
        let spec = FilterSpec::default().with_equals("Who", text("B"));
        let filtered = apply_filters(&t, &spec);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.cell(0, "Date"), &date(2024, 1, 8));
    }
}
