use std::collections::BTreeMap;

use super::model::{CellValue, Row, Table};

// ---------------------------------------------------------------------------
// Group-by + reduce into a summary table
// ---------------------------------------------------------------------------

/// Reduction applied to the target column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    /// Sum the target column; missing / non-numeric cells count as 0.
    Sum,
    /// Count rows regardless of target-column content.
    Count,
}

/// Group `table` by the tuple of `group_keys` values (exact equality, null
/// is a legal key) and reduce `target` into a column named `output`.
///
/// The summary's columns are the group keys followed by `output`; its rows
/// are sorted ascending by group-key tuple.
pub fn aggregate(
    table: &Table,
    group_keys: &[&str],
    target: &str,
    op: Reduce,
    output: &str,
) -> Table {
    let mut groups: BTreeMap<Vec<CellValue>, f64> = BTreeMap::new();

    for row in &table.rows {
        let key: Vec<CellValue> = group_keys
            .iter()
            .map(|k| row.get(*k).cloned().unwrap_or(CellValue::Null))
            .collect();
        let acc = groups.entry(key).or_insert(0.0);
        match op {
            Reduce::Sum => {
                *acc += row.get(target).and_then(|v| v.as_f64()).unwrap_or(0.0);
            }
            Reduce::Count => *acc += 1.0,
        }
    }

    let mut columns: Vec<String> = group_keys.iter().map(|k| k.to_string()).collect();
    columns.push(output.to_string());

    let rows: Vec<Row> = groups
        .into_iter()
        .map(|(key, value)| {
            let mut row: Row = group_keys
                .iter()
                .zip(key)
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            row.insert(output.to_string(), CellValue::Number(value));
            row
        })
        .collect();

    Table { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample() -> Table {
        let mk = |who: CellValue, bonus: CellValue| {
            [("Who".to_string(), who), ("Bonus".to_string(), bonus)]
                .into_iter()
                .collect()
        };
        Table::new(
            vec!["Who".into(), "Bonus".into()],
            vec![
                mk(text("B"), CellValue::Number(20.0)),
                mk(text("A"), CellValue::Number(20.0)),
                mk(text("A"), CellValue::Number(0.0)),
                mk(CellValue::Null, CellValue::Number(20.0)),
                mk(text("A"), CellValue::Text("bad".into())),
            ],
        )
    }

    #[test]
    fn sum_groups_and_sorts_by_key() {
        let s = aggregate(&sample(), &["Who"], "Bonus", Reduce::Sum, "Total Bonus");
        assert_eq!(s.columns, vec!["Who".to_string(), "Total Bonus".to_string()]);
        // Null sorts first, then A, then B.
        assert_eq!(s.cell(0, "Who"), &CellValue::Null);
        assert_eq!(s.cell(0, "Total Bonus"), &CellValue::Number(20.0));
        assert_eq!(s.cell(1, "Who"), &text("A"));
        // non-numeric target cell contributes 0
        assert_eq!(s.cell(1, "Total Bonus"), &CellValue::Number(20.0));
        assert_eq!(s.cell(2, "Who"), &text("B"));
    }

    #[test]
    fn count_ignores_target_content() {
        let s = aggregate(&sample(), &["Who"], "Bonus", Reduce::Count, "Count");
        assert_eq!(s.cell(1, "Count"), &CellValue::Number(3.0));
    }

    #[test]
    fn multi_key_grouping() {
        let mk = |week: &str, wt: &str| {
            [
                ("Week".to_string(), text(week)),
                ("Work Type".to_string(), text(wt)),
            ]
            .into_iter()
            .collect()
        };
        let t = Table::new(
            vec!["Week".into(), "Work Type".into()],
            vec![
                mk("2024-01-01/2024-01-07", "Strand"),
                mk("2024-01-01/2024-01-07", "Strand"),
                mk("2024-01-01/2024-01-07", "Lashing"),
                mk("2024-01-08/2024-01-14", "Strand"),
            ],
        );
        let s = aggregate(&t, &["Week", "Work Type"], "", Reduce::Count, "Count");
        assert_eq!(s.len(), 3);
        assert_eq!(s.cell(1, "Work Type"), &text("Strand"));
        assert_eq!(s.cell(1, "Count"), &CellValue::Number(2.0));
    }

    #[test]
    fn aggregating_an_empty_table_yields_an_empty_summary() {
        let t = Table::new(vec!["Who".into(), "Bonus".into()], Vec::new());
        let s = aggregate(&t, &["Who"], "Bonus", Reduce::Sum, "Total");
        assert!(s.is_empty());
        assert_eq!(s.columns, vec!["Who".to_string(), "Total".to_string()]);
    }
}
