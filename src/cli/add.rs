use std::path::Path;

use chrono::Local;

use crate::db;
use crate::error::{BudgetError, Result};
use crate::ledger;
use crate::models::{parse_value, NewTransaction, TransactionType};
use crate::taxonomy::INCOME_CATEGORY;

pub struct AddArgs {
    pub value: String,
    pub date: Option<String>,
    pub kind: TransactionType,
    pub supplier: String,
    pub funds: String,
    pub category: String,
    pub subcategory: String,
    pub subsubcategory: String,
}

/// Validate the arguments the same way the entry form does.
pub fn build(args: AddArgs) -> Result<NewTransaction> {
    let value = parse_value(&args.value).ok_or_else(|| BudgetError::InvalidValue(args.value.clone()))?;
    let date = args
        .date
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    let category = match args.kind {
        TransactionType::Credit => INCOME_CATEGORY.to_string(),
        TransactionType::Debit => args.category,
    };
    Ok(NewTransaction {
        date: date.trim().to_string(),
        value,
        kind: args.kind,
        supplier: args.supplier.trim().to_string(),
        funds: args.funds,
        category,
        subcategory: args.subcategory,
        subsubcategory: args.subsubcategory,
    })
}

pub fn run(db_path: &Path, args: AddArgs) -> Result<()> {
    let txn = build(args)?;
    let conn = db::open(db_path)?;
    let id = ledger::insert(&conn, &txn)?;
    println!(
        "Added #{id}: {} {} {:.2} ({})",
        txn.date,
        txn.kind.label(),
        txn.value,
        txn.category
    );
    Ok(())
}
