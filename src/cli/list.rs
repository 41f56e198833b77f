use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db;
use crate::error::Result;
use crate::filter::{self, Filter};
use crate::fmt::money;
use crate::ledger;
use crate::models::{Transaction, COLUMNS};

pub fn build_table(rows: &[&Transaction]) -> Table {
    let mut table = Table::new();
    let mut header = vec!["#".to_string()];
    header.extend(COLUMNS.iter().map(|c| c.to_string()));
    table.set_header(header);
    for (i, txn) in rows.iter().enumerate() {
        let mut cells = vec![Cell::new(i + 1)];
        cells.extend((0..COLUMNS.len()).map(|col| Cell::new(txn.column(col))));
        table.add_row(cells);
    }
    table
}

pub fn run(db_path: &Path, filters: &[String]) -> Result<()> {
    let filter = Filter::from_pairs(filters)?;
    let conn = db::open(db_path)?;
    let rows = ledger::fetch_all(&conn)?;
    let view = filter::apply(&rows, &filter);
    let shown: Vec<&Transaction> = view.iter().map(|&i| &rows[i]).collect();

    if shown.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{}", build_table(&shown));
    let total = filter::signed_sum(shown.iter().copied());
    let label = format!("TOTAL: {}", money(total));
    let label = if total < 0.0 { label.red() } else { label.green() };
    println!("{} ({} of {} rows)", label.bold(), shown.len(), rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_numbers_rows_from_one() {
        let txn = Transaction {
            id: 7,
            date: "2024-05-01".into(),
            value: "3.00".into(),
            kind: "Debit".into(),
            supplier: "Cafe".into(),
            funds: "Cash".into(),
            category: "Leisure".into(),
            subcategory: "Hobbies".into(),
            subsubcategory: "N/A".into(),
        };
        let rendered = build_table(&[&txn]).to_string();
        assert!(rendered.contains("subsubcategory"));
        assert!(rendered.contains("Cafe"));
        assert!(rendered.contains(" 1 "));
    }
}
