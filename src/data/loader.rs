use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use thiserror::Error;

use super::model::{CellValue, Row, Table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to decode an uploaded file as tabular data. Cell-level problems
/// never produce this: bad dates and numbers coerce to null instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("workbook contains no sheets")]
    EmptyWorkbook,
    #[error("reading spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("reading CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` – first worksheet, first row is the header
/// * `.csv`                     – header row with column names
pub fn load_file(path: &Path) -> Result<Table, ParseError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_spreadsheet(path),
        "csv" => load_csv(path),
        other => Err(ParseError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an Excel workbook into a [`Table`].
/// Cell types map directly from the workbook; blank header cells get
/// positional `Column N` names.
fn load_spreadsheet(path: &Path) -> Result<Table, ParseError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(h) => h,
        None => return Ok(Table::empty()),
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Column {}", i + 1),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let mut rows = Vec::new();
    for sheet_row in rows_iter {
        let mut row: Row = BTreeMap::new();
        for (col, cell) in columns.iter().zip(sheet_row.iter()) {
            row.insert(col.clone(), sheet_cell_value(cell));
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

fn sheet_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(s.to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Date(ndt.date()),
            None => CellValue::Null,
        },
        Data::DateTimeIso(s) => match parse_date_flexible(s) {
            Some(d) => CellValue::Date(d),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table, ParseError> {
    let file = std::fs::File::open(path)?;
    load_csv_from_reader(file)
}

/// Parse CSV bytes into a [`Table`], guessing cell types per value.
pub fn load_csv_from_reader<R: Read>(input: R) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Row = BTreeMap::new();
        for (col, value) in columns.iter().zip(record.iter()) {
            row.insert(col.clone(), guess_cell_type(value));
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(n) = s.parse::<f64>() {
        if n.is_finite() {
            return CellValue::Number(n);
        }
    }
    if let Some(d) = parse_date_flexible(s) {
        return CellValue::Date(d);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Column coercion (invalid → null, never an error)
// ---------------------------------------------------------------------------

/// Re-coerce a designated column to dates. Values that cannot be read as a
/// date become null. No-op when the column is absent.
pub fn coerce_dates(table: &Table, col: &str) -> Table {
    if !table.has_column(col) {
        return table.clone();
    }
    table.with_column(col, |row| {
        match row.get(col) {
            Some(CellValue::Date(d)) => CellValue::Date(*d),
            Some(CellValue::Text(s)) => match parse_date_flexible(s) {
                Some(d) => CellValue::Date(d),
                None => CellValue::Null,
            },
            _ => CellValue::Null,
        }
    })
}

/// Re-coerce a designated column to numbers with the same null-on-failure
/// policy, forgiving about `$` signs and thousands separators.
pub fn coerce_numeric(table: &Table, col: &str) -> Table {
    if !table.has_column(col) {
        return table.clone();
    }
    table.with_column(col, |row| {
        match row.get(col) {
            Some(CellValue::Number(n)) => CellValue::Number(*n),
            Some(CellValue::Text(s)) => match parse_f64_forgiving(s) {
                Some(n) => CellValue::Number(n),
                None => CellValue::Null,
            },
            _ => CellValue::Null,
        }
    })
}

/// Parse a date in the formats field exports actually use.
pub fn parse_date_flexible(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // ISO timestamps: keep the date part.
    let s = s.split(['T', ' ']).next().unwrap_or(s);
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Forgiving float parse for currency-ish CSV cells.
fn parse_f64_forgiving(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('$').replace(',', "");
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_table(text: &str) -> Table {
        load_csv_from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn csv_types_are_guessed_per_cell() {
        let t = csv_table("Date,Who,MRC\n2024-01-01,Alice,49.99\n,Bob,\n");
        assert_eq!(
            t.cell(0, "Date"),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(t.cell(0, "MRC"), &CellValue::Number(49.99));
        assert_eq!(t.cell(1, "Date"), &CellValue::Null);
        assert_eq!(t.cell(1, "Who"), &CellValue::Text("Bob".into()));
    }

    #[test]
    fn unsupported_extension_is_a_parse_error() {
        let err = load_file(Path::new("report.pdf")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedExtension(ext) if ext == "pdf"));
    }

    #[test]
    fn coerce_dates_nulls_unparseable_cells() {
        let t = csv_table("Date\n2024-02-29\nnot a date\n03/15/2024\n");
        let t = coerce_dates(&t, "Date");
        assert_eq!(
            t.cell(0, "Date"),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(t.cell(1, "Date"), &CellValue::Null);
        assert_eq!(
            t.cell(2, "Date"),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn coerce_numeric_handles_currency_text_and_garbage() {
        let t = csv_table("MRC\n\"$1,250.50\"\npending\n99\n");
        let t = coerce_numeric(&t, "MRC");
        assert_eq!(t.cell(0, "MRC"), &CellValue::Number(1250.50));
        assert_eq!(t.cell(1, "MRC"), &CellValue::Null);
        assert_eq!(t.cell(2, "MRC"), &CellValue::Number(99.0));
    }

    #[test]
    fn coercing_a_missing_column_is_a_no_op() {
        let t = csv_table("Status\nDone\n");
        assert_eq!(coerce_numeric(&t, "MRC"), t);
        assert_eq!(coerce_dates(&t, "Date"), t);
    }
}
