use anyhow::{Context, Result};

use super::model::Table;

// ---------------------------------------------------------------------------
// CSV serialization of download artifacts
// ---------------------------------------------------------------------------

/// Serialize a table as CSV bytes: header row then one record per row,
/// cells rendered through [`CellValue`]'s `Display` (nulls as empty
/// fields).
///
/// [`CellValue`]: super::model::CellValue
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for row in &table.rows {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|col| {
                row.get(col)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_from_reader;
    use crate::data::model::{CellValue, Table};
    use chrono::NaiveDate;

    #[test]
    fn serializes_header_and_rows() {
        let row = [
            ("Technician".to_string(), CellValue::Text("A".into())),
            ("Total Bonus".to_string(), CellValue::Number(20.0)),
        ]
        .into_iter()
        .collect();
        let t = Table::new(vec!["Technician".into(), "Total Bonus".into()], vec![row]);
        let bytes = to_csv_bytes(&t).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Technician,Total Bonus\nA,20\n"
        );
    }

    #[test]
    fn csv_round_trip_preserves_typed_tables() {
        let mk = |who: &str, day: u32, mrc: f64| {
            [
                ("Who".to_string(), CellValue::Text(who.to_string())),
                (
                    "Date".to_string(),
                    CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
                ),
                ("MRC".to_string(), CellValue::Number(mrc)),
            ]
            .into_iter()
            .collect()
        };
        let t = Table::new(
            vec!["Who".into(), "Date".into(), "MRC".into()],
            vec![mk("Alice", 1, 49.99), mk("Bob", 8, 120.0)],
        );
        let bytes = to_csv_bytes(&t).unwrap();
        let reparsed = load_csv_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(reparsed, t);
    }

    #[test]
    fn nulls_round_trip_as_empty_fields() {
        let row = [
            ("A".to_string(), CellValue::Null),
            ("B".to_string(), CellValue::Text("x".into())),
        ]
        .into_iter()
        .collect();
        let t = Table::new(vec!["A".into(), "B".into()], vec![row]);
        let bytes = to_csv_bytes(&t).unwrap();
        let reparsed = load_csv_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(reparsed, t);
    }
}
