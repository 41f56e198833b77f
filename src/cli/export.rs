use std::io::Write;
use std::path::Path;

use crate::db;
use crate::error::Result;
use crate::filter::{self, Filter};
use crate::ledger;
use crate::models::{Transaction, COLUMNS};

/// Write `rows` as CSV with one header line of column names.
pub fn write_csv<W: Write>(writer: W, rows: &[&Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for txn in rows {
        wtr.write_record((0..COLUMNS.len()).map(|col| txn.column(col)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(db_path: &Path, file: &Path, filters: &[String]) -> Result<()> {
    let filter = Filter::from_pairs(filters)?;
    let conn = db::open(db_path)?;
    let rows = ledger::fetch_all(&conn)?;
    let view = filter::apply(&rows, &filter);
    let shown: Vec<&Transaction> = view.iter().map(|&i| &rows[i]).collect();

    let out = std::fs::File::create(file)?;
    write_csv(out, &shown)?;
    tracing::info!(rows = shown.len(), path = %file.display(), "register exported");
    println!("Exported {} rows to {}", shown.len(), file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_quotes_commas() {
        let txn = Transaction {
            id: 1,
            date: "2024-05-01".into(),
            value: "9.99".into(),
            kind: "Debit".into(),
            supplier: "Smith, Jones & Co".into(),
            funds: "Cash".into(),
            category: "Leisure".into(),
            subcategory: "Hobbies".into(),
            subsubcategory: "N/A".into(),
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &[&txn]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,value,type,supplier,funds,category,subcategory,subsubcategory")
        );
        assert_eq!(
            lines.next(),
            Some("2024-05-01,9.99,Debit,\"Smith, Jones & Co\",Cash,Leisure,Hobbies,N/A")
        );
    }
}
