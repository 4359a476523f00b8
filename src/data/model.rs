use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering what field-ops exports contain.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Date(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            // Integral numbers print without a fractional part so CSV
            // serialization re-parses to the same value.
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for sums and charts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to interpret the value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow the value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – header + rows
// ---------------------------------------------------------------------------

/// One row: column_name → value.
pub type Row = BTreeMap<String, CellValue>;

/// An immutable tabular dataset. Every row carries exactly the columns of
/// the header; construction fills gaps with `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Ordered column names, as they appeared in the source file.
    pub columns: Vec<String>,
    /// All rows, in source order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Build a table, normalising each row to the full column set.
    pub fn new(columns: Vec<String>, mut rows: Vec<Row>) -> Self {
        for row in &mut rows {
            for col in &columns {
                row.entry(col.clone()).or_insert(CellValue::Null);
            }
            row.retain(|k, _| columns.iter().any(|c| c == k));
        }
        Table { columns, rows }
    }

    /// An empty table with no columns.
    pub fn empty() -> Self {
        Table {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Schema capability query gating optional derivations and metrics.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Cell accessor; `Null` for anything not present.
    pub fn cell<'a>(&'a self, row: usize, col: &str) -> &'a CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Null)
    }

    /// Sorted set of distinct values in a column (including `Null`).
    pub fn unique_values(&self, col: &str) -> BTreeSet<CellValue> {
        self.rows
            .iter()
            .map(|r| r.get(col).cloned().unwrap_or(CellValue::Null))
            .collect()
    }

    /// Sorted set of distinct non-null values — the selectable universe
    /// for a membership filter.
    pub fn unique_non_null(&self, col: &str) -> BTreeSet<CellValue> {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Min and max dates in a column, ignoring non-date cells.
    pub fn date_bounds(&self, col: &str) -> Option<(NaiveDate, NaiveDate)> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for row in &self.rows {
            if let Some(d) = row.get(col).and_then(|v| v.as_date()) {
                bounds = Some(match bounds {
                    None => (d, d),
                    Some((lo, hi)) => (lo.min(d), hi.max(d)),
                });
            }
        }
        bounds
    }

    /// Sum a numeric column; missing / non-numeric cells count as 0.
    pub fn column_sum(&self, col: &str) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .filter_map(|v| v.as_f64())
            .sum()
    }

    /// Return a new table with a derived column appended (or replaced),
    /// computed per-row by `f`.
    pub fn with_column<F>(&self, name: &str, f: F) -> Table
    where
        F: Fn(&Row) -> CellValue,
    {
        let mut columns = self.columns.clone();
        if !self.has_column(name) {
            columns.push(name.to_string());
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.insert(name.to_string(), f(&row));
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Return a new table with a column renamed; no-op if absent.
    pub fn rename_column(&self, from: &str, to: &str) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| if c == from { to.to_string() } else { c.clone() })
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if let Some(v) = row.remove(from) {
                    row.insert(to.to_string(), v);
                }
                row
            })
            .collect();
        Table { columns, rows }
    }
}
