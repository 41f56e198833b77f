use std::path::Path;

use crate::db;
use crate::error::{BudgetError, Result};
use crate::ledger;

/// `position` is 1-based, matching the `#` column of `list`.
pub fn run(db_path: &Path, position: usize) -> Result<()> {
    let index = position
        .checked_sub(1)
        .ok_or(BudgetError::NoSuchPosition(position))?;
    let conn = db::open(db_path)?;
    if !ledger::delete_at_position(&conn, index)? {
        return Err(BudgetError::NoSuchPosition(position));
    }
    println!("Deleted transaction at position {position}");
    Ok(())
}
