use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::fmt::amount;
use crate::models::{NewTransaction, Transaction};

pub fn insert(conn: &Connection, txn: &NewTransaction) -> Result<i64> {
    conn.execute(
        "INSERT INTO Transactions \
         (date, value, type, supplier, funds, category, subcategory, subsubcategory) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            txn.date,
            txn.value,
            txn.kind.label(),
            txn.supplier,
            txn.funds,
            txn.category,
            txn.subcategory,
            txn.subsubcategory,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, value = txn.value, category = %txn.category, "transaction inserted");
    Ok(id)
}

/// All rows, newest first.
pub fn fetch_all(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, value, type, supplier, funds, category, subcategory, subsubcategory \
         FROM Transactions ORDER BY id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Transaction {
            id: row.get(0)?,
            date: text(row.get(1)?),
            value: value_text(row.get(2)?),
            kind: text(row.get(3)?),
            supplier: text(row.get(4)?),
            funds: text(row.get(5)?),
            category: text(row.get(6)?),
            subcategory: text(row.get(7)?),
            subsubcategory: text(row.get(8)?),
        })
    })?;
    let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    tracing::debug!(count = rows.len(), "transactions loaded");
    Ok(rows)
}

/// Id of the row at `position` in the newest-first ordering.
pub fn id_at_position(conn: &Connection, position: usize) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM Transactions ORDER BY id DESC LIMIT 1 OFFSET ?1",
            [position as i64],
            |row| row.get(0),
        )
        .optional()?)
}

/// Delete the row at `position` in the newest-first ordering.
/// Returns false when there is no such row.
pub fn delete_at_position(conn: &Connection, position: usize) -> Result<bool> {
    let Some(id) = id_at_position(conn, position)? else {
        tracing::warn!(position, "delete requested for missing position");
        return Ok(false);
    };
    delete_by_id(conn, id)
}

pub fn delete_by_id(conn: &Connection, id: i64) -> Result<bool> {
    let removed = conn.execute("DELETE FROM Transactions WHERE id = ?1", [id])?;
    tracing::info!(id, removed, "transaction deleted");
    Ok(removed == 1)
}

pub fn count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM Transactions", [], |row| row.get(0))?)
}

fn text(value: Value) -> String {
    match value {
        Value::Text(s) => s,
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Null | Value::Blob(_) => String::new(),
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::Real(f) => amount(f),
        Value::Integer(i) => amount(i as f64),
        other => text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::TransactionType;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn new_txn(supplier: &str, value: f64) -> NewTransaction {
        NewTransaction {
            date: "2024-05-01".into(),
            value,
            kind: TransactionType::Debit,
            supplier: supplier.into(),
            funds: "Cash".into(),
            category: "Housing".into(),
            subcategory: "Rent".into(),
            subsubcategory: "N/A".into(),
        }
    }

    #[test]
    fn test_fetch_all_is_newest_first() {
        let (_dir, conn) = test_db();
        for (i, name) in ["first", "second", "third"].iter().enumerate() {
            insert(&conn, &new_txn(name, i as f64 + 1.0)).unwrap();
        }
        let rows = fetch_all(&conn).unwrap();
        assert_eq!(rows.len(), 3);
        let suppliers: Vec<&str> = rows.iter().map(|r| r.supplier.as_str()).collect();
        assert_eq!(suppliers, vec!["third", "second", "first"]);
        assert!(rows[0].id > rows[1].id && rows[1].id > rows[2].id);
    }

    #[test]
    fn test_insert_stores_all_fields() {
        let (_dir, conn) = test_db();
        let mut txn = new_txn("Landlord", 750.5);
        txn.kind = TransactionType::Credit;
        insert(&conn, &txn).unwrap();
        let row = &fetch_all(&conn).unwrap()[0];
        assert_eq!(row.date, "2024-05-01");
        assert_eq!(row.value, "750.50");
        assert_eq!(row.kind, "Credit");
        assert_eq!(row.funds, "Cash");
        assert_eq!(row.subsubcategory, "N/A");
        assert_eq!(row.amount(), Some(750.5));
    }

    #[test]
    fn test_delete_at_position_removes_one_row() {
        let (_dir, conn) = test_db();
        for name in ["a", "b", "c"] {
            insert(&conn, &new_txn(name, 1.0)).unwrap();
        }
        assert!(delete_at_position(&conn, 0).unwrap());
        let rows = fetch_all(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].supplier, "b");

        assert!(delete_at_position(&conn, 1).unwrap());
        let rows = fetch_all(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].supplier, "b");
    }

    #[test]
    fn test_delete_past_end_is_noop() {
        let (_dir, conn) = test_db();
        insert(&conn, &new_txn("a", 1.0)).unwrap();
        assert!(!delete_at_position(&conn, 5).unwrap());
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_id_at_position_tracks_new_rows() {
        let (_dir, conn) = test_db();
        let a = insert(&conn, &new_txn("a", 1.0)).unwrap();
        assert_eq!(id_at_position(&conn, 0).unwrap(), Some(a));
        let b = insert(&conn, &new_txn("b", 1.0)).unwrap();
        assert_eq!(id_at_position(&conn, 0).unwrap(), Some(b));
        assert_eq!(id_at_position(&conn, 1).unwrap(), Some(a));
        assert_eq!(id_at_position(&conn, 2).unwrap(), None);
    }

    #[test]
    fn test_delete_by_id() {
        let (_dir, conn) = test_db();
        let a = insert(&conn, &new_txn("a", 1.0)).unwrap();
        insert(&conn, &new_txn("b", 1.0)).unwrap();
        assert!(delete_by_id(&conn, a).unwrap());
        assert!(!delete_by_id(&conn, a).unwrap());
        let rows = fetch_all(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].supplier, "b");
    }

    #[test]
    fn test_non_numeric_stored_value_still_loads() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO Transactions (date, value, type) VALUES ('2024-01-01', 'oops', 'Debit')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO Transactions (date) VALUES (NULL)", []).unwrap();
        let rows = fetch_all(&conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "");
        assert_eq!(rows[0].value, "");
        assert_eq!(rows[1].value, "oops");
        assert_eq!(rows[1].amount(), None);
    }
}
